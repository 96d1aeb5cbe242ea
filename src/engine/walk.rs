//! Schema path traversal.
//!
//! Violations only carry a schema path. To find the subschemas a violation
//! passed through (and which instance location each of them applied to), the
//! path is replayed against the schema document, following local `$ref`s.

use serde_json::Value;

use crate::error::RawViolation;
use crate::path::JsonPointer;

/// A subschema visited on the way to a failing keyword.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame<'s> {
    /// Number of schema path tokens leading to this subschema.
    pub schema_len: usize,
    /// The subschema itself.
    pub node: &'s Value,
    /// Number of instance path tokens consumed when this subschema applies.
    pub instance_len: usize,
}

/// Keywords whose next token names a subschema without moving in the instance.
const NAMED_APPLICATORS: &[&str] = &[
    "allOf",
    "anyOf",
    "oneOf",
    "definitions",
    "$defs",
    "dependencies",
    "dependentSchemas",
];

/// Keywords whose next token names a subschema applied to a child value.
const NAMED_CHILD_APPLICATORS: &[&str] = &["properties", "patternProperties", "prefixItems"];

/// Keywords holding a single subschema applied at the same instance location.
const IN_PLACE_APPLICATORS: &[&str] = &["not", "if", "then", "else", "propertyNames"];

/// Keywords holding a single subschema applied to child values.
const CHILD_APPLICATORS: &[&str] = &[
    "additionalProperties",
    "additionalItems",
    "contains",
    "unevaluatedProperties",
    "unevaluatedItems",
];

const REFERENCES: &[&str] = &["$ref", "$dynamicRef", "$recursiveRef"];

/// Replays the schema path of `violation` against `root`.
///
/// The first frame is always the root schema. Traversal stops at the failing
/// keyword, or earlier if the path leaves the document (e.g. a remote `$ref`).
pub(crate) fn frames<'s>(root: &'s Value, violation: &RawViolation) -> Vec<Frame<'s>> {
    let tokens = violation.schema_path.tokens();
    let instance_limit = violation.instance_path.len();

    let mut frames = vec![Frame {
        schema_len: 0,
        node: root,
        instance_len: 0,
    }];
    let mut node = root;
    let mut instance_len = 0;
    let mut i = 0;

    // The last token is the failing keyword, never a subschema.
    while i + 1 < tokens.len() {
        let token = tokens[i].as_str();
        let (child, consumed, moves) = if REFERENCES.contains(&token) {
            match node.get(token).and_then(Value::as_str).and_then(|r| resolve_ref(root, r)) {
                Some(target) => (target, 1, false),
                None => break,
            }
        } else if NAMED_APPLICATORS.contains(&token) || NAMED_CHILD_APPLICATORS.contains(&token) {
            match child_at(node.get(token), &tokens[i + 1]) {
                Some(child) => (child, 2, NAMED_CHILD_APPLICATORS.contains(&token)),
                None => break,
            }
        } else if token == "items" {
            match node.get("items") {
                Some(items @ Value::Array(_)) => match child_at(Some(items), &tokens[i + 1]) {
                    Some(child) => (child, 2, true),
                    None => break,
                },
                Some(items) => (items, 1, true),
                None => break,
            }
        } else if IN_PLACE_APPLICATORS.contains(&token) || CHILD_APPLICATORS.contains(&token) {
            match node.get(token) {
                Some(child) => (child, 1, CHILD_APPLICATORS.contains(&token)),
                None => break,
            }
        } else {
            break;
        };

        i += consumed;
        if moves {
            instance_len = (instance_len + 1).min(instance_limit);
        }
        node = child;
        frames.push(Frame {
            schema_len: i,
            node,
            instance_len,
        });
    }

    frames
}

/// Resolves the constraint value of the failing keyword of `schema_path`.
pub(crate) fn constraint<'s>(root: &'s Value, violation: &RawViolation) -> Option<&'s Value> {
    let tokens = violation.schema_path.tokens();
    let keyword = tokens.last()?;
    let frame = frames(root, violation).pop()?;

    if frame.schema_len + 1 != tokens.len() {
        return None;
    }
    frame.node.get(keyword)
}

/// Resolves a document-local reference such as `#/definitions/id`.
pub(crate) fn resolve_ref<'s>(root: &'s Value, reference: &str) -> Option<&'s Value> {
    let fragment = reference.strip_prefix('#')?;
    JsonPointer::parse(fragment).resolve(root)
}

fn child_at<'s>(container: Option<&'s Value>, token: &str) -> Option<&'s Value> {
    match container? {
        Value::Object(map) => map.get(token),
        Value::Array(items) => token.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}
