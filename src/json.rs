//! Conversion of serializable values into JSON.
//!
//! `serde_json::to_value` maps non-finite floats (NaN and the infinities) to
//! `null`, which would validate a different value than the caller passed.
//! [`to_value`] rejects them instead.

use serde::ser::{self, Error as _, Serialize};
use serde_json::{Error, Value};

/// Converts `value` to JSON, failing on values JSON cannot represent.
///
/// # Errors
///
/// Returns an error for non-finite floats and for everything
/// `serde_json::to_value` rejects (for example maps with non-string keys).
pub(crate) fn to_value<T>(value: &T) -> Result<Value, Error>
where
    T: Serialize + ?Sized,
{
    value.serialize(FiniteFloats)?;
    serde_json::to_value(value)
}

/// Walks a value and fails on the first non-finite float.
struct FiniteFloats;

impl FiniteFloats {
    fn check(value: f64) -> Result<(), Error> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(Error::custom(format!("{value} is not representable as JSON")))
        }
    }
}

impl ser::Serializer for FiniteFloats {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _v: bool) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_i8(self, _v: i8) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_i16(self, _v: i16) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_i32(self, _v: i32) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_i64(self, _v: i64) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_i128(self, _v: i128) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_u8(self, _v: u8) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_u16(self, _v: u16) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_u32(self, _v: u32) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_u64(self, _v: u64) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_u128(self, _v: u128) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), Error> {
        Self::check(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), Error> {
        Self::check(v)
    }

    fn serialize_char(self, _v: char) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_str(self, _v: &str) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self, Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self, Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self, Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, Error> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self, Error> {
        Ok(self)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self, Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self, Error> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteFloats {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteFloats {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteFloats {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteFloats {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Error> {
        key.serialize(FiniteFloats)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteFloats {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteFloats {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Result<(), Error> {
        Ok(())
    }
}
