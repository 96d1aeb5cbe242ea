//! Source positions for documents parsed from text.
//!
//! This module maps JSON Pointer paths of a JSON text to the line, column and
//! character offset of the corresponding keys and values, so that violations
//! can point back into the original file. Position mapping is an optional
//! capability: in-memory values have no text and therefore no map.
//!
//! # Example
//!
//! ```rust
//! use coroner::map_positions;
//!
//! let map = map_positions("{\n  \"id\": \"x\"\n}").unwrap();
//! let id = &map["/id"];
//!
//! assert_eq!(id.key.unwrap().line, 1);
//! assert_eq!(id.value.unwrap().column, 8);
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidatorError;
use crate::path::JsonPointer;

/// A location in source text. All fields are zero-based; `column` and `pos`
/// count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Position {
    /// Line number.
    pub line: usize,
    /// Column within the line.
    pub column: usize,
    /// Character offset from the start of the text.
    pub pos: usize,
}

impl Position {
    /// Returns the position as `{ line, column, pos }`.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Key and value ranges of a single value in source text.
///
/// Object members have a key range; array items and the root value only have
/// a value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionPointer {
    /// Start of the member key, including its opening quote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Position>,
    /// End of the member key, after its closing quote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_end: Option<Position>,
    /// Start of the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Position>,
    /// End of the value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_end: Option<Position>,
}

impl PositionPointer {
    /// Returns the earliest known position (the key if any, else the value).
    pub fn start(&self) -> Option<Position> {
        self.key.or(self.value)
    }

    /// Returns the pointer as JSON with `key`, `keyEnd`, `value` and `valueEnd`
    /// entries for the ranges that are known.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Positions by JSON Pointer string, in document order.
pub type PathPositionMap = IndexMap<String, PositionPointer>;

/// Maximum nesting of arrays and objects. `serde_json` rejects deeper texts too.
const MAX_DEPTH: usize = 128;

/// Computes the positions of every value in a JSON text.
///
/// Returns `None` if the text is not a single well-formed JSON value, or if it
/// nests arrays and objects deeper than [`MAX_DEPTH`].
pub fn map_positions(text: &str) -> Option<PathPositionMap> {
    let mut scanner = PositionScanner::new(text);
    let mut map = PathPositionMap::new();

    scanner.skip_whitespace();
    scanner.read_member(&JsonPointer::root(), None, &mut map)?;
    scanner.skip_whitespace();

    if scanner.at_end() {
        Some(map)
    } else {
        None
    }
}

/// A JSON document together with the text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    text: String,
    value: Value,
    positions: PathPositionMap,
}

impl SourceDocument {
    /// Parses JSON text, keeping its position map.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError::Parse` if the text is not valid JSON.
    pub fn parse(text: impl Into<String>) -> Result<Self, ValidatorError> {
        let text = text.into();
        let value = serde_json::from_str(&text).map_err(ValidatorError::Parse)?;
        let positions = map_positions(&text).unwrap_or_default();

        Ok(Self {
            text,
            value,
            positions,
        })
    }

    /// Returns the original text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the parsed value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns the position map.
    pub fn positions(&self) -> &PathPositionMap {
        &self.positions
    }

    /// Consumes the document, returning the parsed value.
    pub fn into_value(self) -> Value {
        self.value
    }
}

struct PositionScanner {
    data: Vec<char>,
    x: usize,
    line: usize,
    column: usize,
    depth: usize,
}

impl PositionScanner {
    fn new(text: &str) -> Self {
        Self {
            data: text.chars().collect(),
            x: 0,
            line: 0,
            column: 0,
            depth: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.x >= self.data.len()
    }

    fn peek(&self) -> Option<char> {
        self.data.get(self.x).copied()
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            pos: self.x,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.x += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn expect(&mut self, expected: char) -> Option<()> {
        (self.bump()? == expected).then_some(())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\n' | '\r')) {
            self.bump();
        }
    }

    /// Reads one value at `pointer`, recording its ranges (and the key ranges,
    /// when it is an object member) before descending into children.
    fn read_member(
        &mut self,
        pointer: &JsonPointer,
        key: Option<(Position, Position)>,
        map: &mut PathPositionMap,
    ) -> Option<()> {
        let path = pointer.to_string();
        map.insert(
            path.clone(),
            PositionPointer {
                key: key.map(|(start, _)| start),
                key_end: key.map(|(_, end)| end),
                value: Some(self.position()),
                value_end: None,
            },
        );

        match self.peek()? {
            '{' => self.nested(|scanner| scanner.read_object(pointer, map))?,
            '[' => self.nested(|scanner| scanner.read_array(pointer, map))?,
            '"' => {
                self.read_string()?;
            }
            't' => self.read_literal("true")?,
            'f' => self.read_literal("false")?,
            'n' => self.read_literal("null")?,
            '-' | '0'..='9' => self.read_number()?,
            _ => return None,
        }

        let end = self.position();
        if let Some(entry) = map.get_mut(&path) {
            entry.value_end = Some(end);
        }
        Some(())
    }

    /// Runs `read` one nesting level deeper, failing past [`MAX_DEPTH`].
    fn nested(&mut self, read: impl FnOnce(&mut Self) -> Option<()>) -> Option<()> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let result = read(self);
        self.depth -= 1;
        result
    }

    fn read_object(&mut self, pointer: &JsonPointer, map: &mut PathPositionMap) -> Option<()> {
        self.expect('{')?;
        self.skip_whitespace();
        if self.peek()? == '}' {
            self.bump();
            return Some(());
        }

        loop {
            self.skip_whitespace();
            let key_start = self.position();
            let key = self.read_string()?;
            let key_end = self.position();

            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            self.read_member(&pointer.push(key), Some((key_start, key_end)), map)?;
            self.skip_whitespace();

            match self.bump()? {
                ',' => continue,
                '}' => return Some(()),
                _ => return None,
            }
        }
    }

    fn read_array(&mut self, pointer: &JsonPointer, map: &mut PathPositionMap) -> Option<()> {
        self.expect('[')?;
        self.skip_whitespace();
        if self.peek()? == ']' {
            self.bump();
            return Some(());
        }

        let mut index = 0;
        loop {
            self.skip_whitespace();
            self.read_member(&pointer.push_index(index), None, map)?;
            self.skip_whitespace();
            index += 1;

            match self.bump()? {
                ',' => continue,
                ']' => return Some(()),
                _ => return None,
            }
        }
    }

    /// Reads a string literal and returns its unescaped contents.
    fn read_string(&mut self) -> Option<String> {
        self.expect('"')?;
        let mut raw = String::from('"');
        loop {
            let ch = self.bump()?;
            raw.push(ch);
            match ch {
                '"' => break,
                '\\' => raw.push(self.bump()?),
                _ => {}
            }
        }
        serde_json::from_str(&raw).ok()
    }

    fn read_literal(&mut self, literal: &str) -> Option<()> {
        for expected in literal.chars() {
            self.expect(expected)?;
        }
        Some(())
    }

    fn read_number(&mut self) -> Option<()> {
        let start = self.x;
        while matches!(self.peek(), Some('-' | '+' | '.' | 'e' | 'E' | '0'..='9')) {
            self.bump();
        }
        let raw: String = self.data[start..self.x].iter().collect();
        raw.parse::<f64>().ok().map(|_| ())
    }
}
