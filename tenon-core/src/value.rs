use crate::{Result, SqlType};
use anyhow::anyhow;
use rust_decimal::Decimal;
use std::mem::discriminant;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

/// One variant of a persisted Rust enum: its declared name and position.
///
/// Enum fields travel through [`Value::Enum`] regardless of whether their
/// persister stores the name or the ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub name: &'static str,
    pub ordinal: i32,
}

/// A database value, on either side of a field conversion.
///
/// Field accessors produce `Value`s in the field's native representation and
/// persisters convert them into the argument representation bound to the
/// driver (and back again for result columns). Typed nulls are carried as a
/// `None` payload, `Null` is the untyped null.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Char(Option<char>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Timestamp(Option<PrimitiveDateTime>),
    Uuid(Option<Uuid>),
    Enum(Option<EnumValue>),
    Serialized(Option<serde_json::Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Char(l), Self::Char(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::Enum(l), Self::Enum(r)) => l == r,
            (Self::Serialized(l), Self::Serialized(r)) => l == r,
            _ => discriminant(self) == discriminant(other),
        }
    }
}

impl Value {
    /// True for `Null` and for any typed variant holding `None`.
    pub fn is_null(&self) -> bool {
        use Value::*;
        match self {
            Null => true,
            Boolean(v) => v.is_none(),
            Char(v) => v.is_none(),
            Int16(v) => v.is_none(),
            Int32(v) => v.is_none(),
            Int64(v) => v.is_none(),
            Float32(v) => v.is_none(),
            Float64(v) => v.is_none(),
            Decimal(v) => v.is_none(),
            Varchar(v) => v.is_none(),
            Blob(v) => v.is_none(),
            Date(v) => v.is_none(),
            Timestamp(v) => v.is_none(),
            Uuid(v) => v.is_none(),
            Enum(v) => v.is_none(),
            Serialized(v) => v.is_none(),
        }
    }

    /// Compares the variant only, payloads are ignored.
    pub fn same_type(&self, other: &Self) -> bool {
        discriminant(self) == discriminant(other)
    }

    /// The argument type tag this variant maps to.
    pub fn sql_type(&self) -> SqlType {
        use Value::*;
        match self {
            Null => SqlType::Unknown,
            Boolean(..) => SqlType::Boolean,
            Char(..) => SqlType::Char,
            Int16(..) => SqlType::Short,
            Int32(..) => SqlType::Integer,
            Int64(..) => SqlType::Long,
            Float32(..) => SqlType::Float,
            Float64(..) => SqlType::Double,
            Decimal(..) => SqlType::Decimal,
            Varchar(..) => SqlType::Text,
            Blob(..) => SqlType::Blob,
            Date(..) => SqlType::Date,
            Timestamp(..) => SqlType::Timestamp,
            Uuid(..) => SqlType::Uuid,
            Enum(..) => SqlType::Enum,
            Serialized(..) => SqlType::Serialized,
        }
    }

    pub fn to_bool(&self) -> Result<Option<bool>> {
        match self {
            Value::Null => Ok(None),
            Value::Boolean(v) => Ok(*v),
            other => Err(mismatch("a boolean", other)),
        }
    }

    /// Accepts a `Char` or a single character string, the way drivers
    /// commonly surface CHAR(1) columns.
    pub fn to_char(&self) -> Result<Option<char>> {
        match self {
            Value::Null => Ok(None),
            Value::Char(v) => Ok(*v),
            Value::Varchar(Some(s)) if s.chars().count() == 1 => Ok(s.chars().next()),
            other => Err(mismatch("a single character", other)),
        }
    }

    pub fn to_i16(&self) -> Result<Option<i16>> {
        match self {
            Value::Null => Ok(None),
            Value::Int16(v) => Ok(*v),
            other => Err(mismatch("a 16 bit integer", other)),
        }
    }

    /// Widens from `Int16`.
    pub fn to_i32(&self) -> Result<Option<i32>> {
        match self {
            Value::Null => Ok(None),
            Value::Int16(v) => Ok(v.map(i32::from)),
            Value::Int32(v) => Ok(*v),
            other => Err(mismatch("a 32 bit integer", other)),
        }
    }

    /// Widens from `Int16` and `Int32`.
    pub fn to_i64(&self) -> Result<Option<i64>> {
        match self {
            Value::Null => Ok(None),
            Value::Int16(v) => Ok(v.map(i64::from)),
            Value::Int32(v) => Ok(v.map(i64::from)),
            Value::Int64(v) => Ok(*v),
            other => Err(mismatch("a 64 bit integer", other)),
        }
    }

    pub fn to_f32(&self) -> Result<Option<f32>> {
        match self {
            Value::Null => Ok(None),
            Value::Float32(v) => Ok(*v),
            other => Err(mismatch("a 32 bit float", other)),
        }
    }

    /// Widens from `Float32`.
    pub fn to_f64(&self) -> Result<Option<f64>> {
        match self {
            Value::Null => Ok(None),
            Value::Float32(v) => Ok(v.map(f64::from)),
            Value::Float64(v) => Ok(*v),
            other => Err(mismatch("a 64 bit float", other)),
        }
    }

    pub fn to_decimal(&self) -> Result<Option<Decimal>> {
        match self {
            Value::Null => Ok(None),
            Value::Decimal(v) => Ok(*v),
            other => Err(mismatch("a decimal", other)),
        }
    }

    /// Accepts `Varchar` and `Char`.
    pub fn to_text(&self) -> Result<Option<String>> {
        match self {
            Value::Null => Ok(None),
            Value::Varchar(v) => Ok(v.clone()),
            Value::Char(v) => Ok(v.map(String::from)),
            other => Err(mismatch("a string", other)),
        }
    }

    pub fn to_bytes(&self) -> Result<Option<Box<[u8]>>> {
        match self {
            Value::Null => Ok(None),
            Value::Blob(v) => Ok(v.clone()),
            other => Err(mismatch("a byte array", other)),
        }
    }

    pub fn to_date(&self) -> Result<Option<Date>> {
        match self {
            Value::Null => Ok(None),
            Value::Date(v) => Ok(*v),
            Value::Timestamp(v) => Ok(v.map(|v| v.date())),
            other => Err(mismatch("a date", other)),
        }
    }

    pub fn to_timestamp(&self) -> Result<Option<PrimitiveDateTime>> {
        match self {
            Value::Null => Ok(None),
            Value::Timestamp(v) => Ok(*v),
            other => Err(mismatch("a timestamp", other)),
        }
    }

    pub fn to_uuid(&self) -> Result<Option<Uuid>> {
        match self {
            Value::Null => Ok(None),
            Value::Uuid(v) => Ok(*v),
            other => Err(mismatch("a uuid", other)),
        }
    }

    pub fn to_enum(&self) -> Result<Option<EnumValue>> {
        match self {
            Value::Null => Ok(None),
            Value::Enum(v) => Ok(*v),
            other => Err(mismatch("an enum value", other)),
        }
    }

    pub fn to_json(&self) -> Result<Option<serde_json::Value>> {
        match self {
            Value::Null => Ok(None),
            Value::Serialized(v) => Ok(v.clone()),
            other => Err(mismatch("a serialized document", other)),
        }
    }
}

fn mismatch(expected: &str, found: &Value) -> crate::Error {
    anyhow!("Expected {} but the value is {:?}", expected, found)
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(Some(value))
    }
}
impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(Some(value))
    }
}
impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int16(Some(value))
    }
}
impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int32(Some(value))
    }
}
impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int64(Some(value))
    }
}
impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float32(Some(value))
    }
}
impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float64(Some(value))
    }
}
impl From<Decimal> for Value {
    fn from(value: Decimal) -> Self {
        Value::Decimal(Some(value))
    }
}
impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.to_owned()))
    }
}
impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Varchar(Some(value))
    }
}
impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(Some(value.into()))
    }
}
impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(Some(value.into_boxed_slice()))
    }
}
impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(Some(value))
    }
}
impl From<PrimitiveDateTime> for Value {
    fn from(value: PrimitiveDateTime) -> Self {
        Value::Timestamp(Some(value))
    }
}
impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Value::Uuid(Some(value))
    }
}
impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Value::Enum(Some(value))
    }
}
impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Serialized(Some(value))
    }
}
