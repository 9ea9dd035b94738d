//! Conversion strategies between a field's native representation and its
//! database argument/result representation.
//!
//! Every persister performs four operations: native to argument, default
//! string to native, result column to native, and a native type check. The
//! stock persisters are exposed as statics so field descriptors can share
//! them freely. `from_result(to_argument(x))` round-trips for every
//! supported value except the documented lossy cases (float precision at
//! the driver boundary, ordinal-stored enums across variant renames).

use crate::{EnumValue, Result, ResultCursor, SqlType, Value};
use anyhow::{Context, bail};
use atoi::FromRadix10Signed;
use rust_decimal::Decimal;
use std::{fmt::Debug, sync::OnceLock};
use time::{
    Date, PrimitiveDateTime,
    format_description::{self, OwnedFormatItem},
    macros::format_description,
};
use uuid::Uuid;

pub trait Persister: Debug + Send + Sync {
    /// The argument type tag of the column this persister writes.
    fn sql_type(&self) -> SqlType;

    /// Converts a native value into the argument bound to the driver.
    /// A null input becomes the typed null of the argument representation.
    fn to_argument(&self, value: Value) -> Result<Value>;

    /// Parses a configured default literal into a native value.
    fn parse_default(&self, text: &str) -> Result<Value>;

    /// Reads a result column back into the native representation.
    fn from_result(&self, cursor: &dyn ResultCursor, column: usize) -> Result<Value>;

    /// Whether a native value is acceptable input for this persister.
    fn is_valid_type(&self, value: &Value) -> bool;

    /// Numeric persisters render their literals bare, without quoting.
    fn is_numeric(&self) -> bool {
        self.sql_type().is_numeric()
    }
}

macro_rules! parse_integer {
    ($name:ident, $ty:ty, $what:literal) => {
        fn $name(text: &str) -> Result<$ty> {
            let (num, len) = <$ty>::from_radix_10_signed(text.as_bytes());
            if len == 0 || len != text.len() {
                bail!("Cannot parse '{}' as {}", text, $what);
            }
            Ok(num)
        }
    };
}
parse_integer!(parse_i16, i16, "a 16 bit integer");
parse_integer!(parse_i32, i32, "a 32 bit integer");
parse_integer!(parse_i64, i64, "a 64 bit integer");

macro_rules! parse_float {
    ($name:ident, $ty:ty, $what:literal) => {
        fn $name(text: &str) -> Result<$ty> {
            let (num, len) = fast_float::parse_partial::<$ty, _>(text)
                .with_context(|| format!("Cannot parse '{}' as {}", text, $what))?;
            if len != text.len() {
                bail!("Cannot parse '{}' as {}", text, $what);
            }
            Ok(num)
        }
    };
}
parse_float!(parse_f32, f32, "a 32 bit float");
parse_float!(parse_f64, f64, "a 64 bit float");

fn parse_bool(text: &str) -> Result<bool> {
    match text {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => bail!("Cannot parse '{}' as a boolean", text),
    }
}

fn parse_char(text: &str) -> Result<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => bail!("Cannot parse '{}' as a single character", text),
    }
}

fn parse_decimal(text: &str) -> Result<Decimal> {
    Decimal::from_str_exact(text).with_context(|| format!("Cannot parse '{}' as a decimal", text))
}

fn parse_text(text: &str) -> Result<String> {
    Ok(text.to_owned())
}

fn parse_date(text: &str) -> Result<Date> {
    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .with_context(|| format!("Cannot parse '{}' as a date", text))
}

fn parse_timestamp(text: &str) -> Result<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    )
    .or(PrimitiveDateTime::parse(
        text,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    ))
    .with_context(|| format!("Cannot parse '{}' as a timestamp", text))
}

fn parse_blob(text: &str) -> Result<Box<[u8]>> {
    let bytes =
        hex::decode(text).with_context(|| format!("Cannot parse '{}' as a hex blob", text))?;
    Ok(bytes.into_boxed_slice())
}

fn parse_uuid(text: &str) -> Result<Uuid> {
    Uuid::parse_str(text).with_context(|| format!("Cannot parse '{}' as a uuid", text))
}

fn parse_json(text: &str) -> Result<serde_json::Value> {
    serde_json::from_str(text)
        .with_context(|| format!("Cannot parse '{}' as a serialized document", text))
}

/// Implements an identity persister: the native representation and the
/// argument representation share the same `Value` variant.
macro_rules! impl_persister {
    ($(#[$meta:meta])* $name:ident, $sql_type:ident, $variant:ident, $getter:ident, $parse:expr) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name;

        impl Persister for $name {
            fn sql_type(&self) -> SqlType {
                SqlType::$sql_type
            }
            fn to_argument(&self, value: Value) -> Result<Value> {
                if value.is_null() {
                    return Ok(Value::$variant(None));
                }
                if !self.is_valid_type(&value) {
                    bail!(
                        "{} cannot convert the value {:?}",
                        stringify!($name),
                        value
                    );
                }
                Ok(value)
            }
            fn parse_default(&self, text: &str) -> Result<Value> {
                Ok(Value::$variant(Some($parse(text)?)))
            }
            fn from_result(&self, cursor: &dyn ResultCursor, column: usize) -> Result<Value> {
                Ok(Value::$variant(cursor.$getter(column)?))
            }
            fn is_valid_type(&self, value: &Value) -> bool {
                matches!(value, Value::Null | Value::$variant(..))
            }
        }
    };
}

impl_persister!(BooleanPersister, Boolean, Boolean, get_bool, parse_bool);
impl_persister!(CharPersister, Char, Char, get_char, parse_char);
impl_persister!(ShortPersister, Short, Int16, get_i16, parse_i16);
impl_persister!(IntegerPersister, Integer, Int32, get_i32, parse_i32);
impl_persister!(LongPersister, Long, Int64, get_i64, parse_i64);
impl_persister!(FloatPersister, Float, Float32, get_f32, parse_f32);
impl_persister!(DoublePersister, Double, Float64, get_f64, parse_f64);
impl_persister!(DecimalPersister, Decimal, Decimal, get_decimal, parse_decimal);
impl_persister!(TextPersister, Text, Varchar, get_text, parse_text);
impl_persister!(DatePersister, Date, Date, get_date, parse_date);
impl_persister!(
    TimestampPersister,
    Timestamp,
    Timestamp,
    get_timestamp,
    parse_timestamp
);
impl_persister!(BlobPersister, Blob, Blob, get_bytes, parse_blob);
impl_persister!(UuidPersister, Uuid, Uuid, get_uuid, parse_uuid);
impl_persister!(
    SerializedPersister,
    Serialized,
    Serialized,
    get_json,
    parse_json
);

/// Stores a boolean as the single character `'1'` or `'0'`.
#[derive(Debug)]
pub struct BooleanCharPersister;

impl Persister for BooleanCharPersister {
    fn sql_type(&self) -> SqlType {
        SqlType::Char
    }
    fn to_argument(&self, value: Value) -> Result<Value> {
        match value.to_bool()? {
            Some(v) => Ok(Value::Char(Some(if v { '1' } else { '0' }))),
            None => Ok(Value::Char(None)),
        }
    }
    fn parse_default(&self, text: &str) -> Result<Value> {
        Ok(Value::Boolean(Some(parse_bool(text)?)))
    }
    fn from_result(&self, cursor: &dyn ResultCursor, column: usize) -> Result<Value> {
        match cursor.get_char(column)? {
            Some('1') => Ok(Value::Boolean(Some(true))),
            Some('0') => Ok(Value::Boolean(Some(false))),
            Some(other) => bail!("Cannot read boolean flag from character '{}'", other),
            None => Ok(Value::Boolean(None)),
        }
    }
    fn is_valid_type(&self, value: &Value) -> bool {
        matches!(value, Value::Null | Value::Boolean(..))
    }
}

/// Stores a boolean as the integer `1` or `0`.
#[derive(Debug)]
pub struct BooleanIntegerPersister;

impl Persister for BooleanIntegerPersister {
    fn sql_type(&self) -> SqlType {
        SqlType::Integer
    }
    fn to_argument(&self, value: Value) -> Result<Value> {
        match value.to_bool()? {
            Some(v) => Ok(Value::Int32(Some(v as i32))),
            None => Ok(Value::Int32(None)),
        }
    }
    fn parse_default(&self, text: &str) -> Result<Value> {
        Ok(Value::Boolean(Some(parse_bool(text)?)))
    }
    fn from_result(&self, cursor: &dyn ResultCursor, column: usize) -> Result<Value> {
        Ok(Value::Boolean(cursor.get_i32(column)?.map(|v| v != 0)))
    }
    fn is_valid_type(&self, value: &Value) -> bool {
        matches!(value, Value::Null | Value::Boolean(..))
    }
}

/// Character encoding used when text is persisted as a byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Utf16Le,
}

/// Stores text as an encoded byte sequence under an explicit charset.
#[derive(Debug)]
pub struct TextBytesPersister {
    charset: Charset,
}

impl TextBytesPersister {
    pub const fn new(charset: Charset) -> Self {
        Self { charset }
    }

    fn encode(&self, text: &str) -> Box<[u8]> {
        match self.charset {
            Charset::Utf8 => text.as_bytes().into(),
            Charset::Utf16Le => text
                .encode_utf16()
                .flat_map(u16::to_le_bytes)
                .collect::<Vec<_>>()
                .into_boxed_slice(),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<String> {
        match self.charset {
            Charset::Utf8 => {
                String::from_utf8(bytes.to_vec()).context("Column bytes are not valid UTF-8")
            }
            Charset::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    bail!("Column holds {} bytes, not a whole number of UTF-16 units", bytes.len());
                }
                let units = bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                    .collect::<Vec<_>>();
                String::from_utf16(&units).context("Column bytes are not valid UTF-16")
            }
        }
    }
}

impl Persister for TextBytesPersister {
    fn sql_type(&self) -> SqlType {
        SqlType::Blob
    }
    fn to_argument(&self, value: Value) -> Result<Value> {
        match value.to_text()? {
            Some(v) => Ok(Value::Blob(Some(self.encode(&v)))),
            None => Ok(Value::Blob(None)),
        }
    }
    fn parse_default(&self, text: &str) -> Result<Value> {
        Ok(Value::Varchar(Some(text.to_owned())))
    }
    fn from_result(&self, cursor: &dyn ResultCursor, column: usize) -> Result<Value> {
        match cursor.get_bytes(column)? {
            Some(bytes) => Ok(Value::Varchar(Some(self.decode(&bytes)?))),
            None => Ok(Value::Varchar(None)),
        }
    }
    fn is_valid_type(&self, value: &Value) -> bool {
        matches!(value, Value::Null | Value::Varchar(..) | Value::Char(..))
    }
}

/// Stores a date as text under a configurable pattern, for example
/// `"[month]/[day]/[year]"`. The pattern is validated on first use.
#[derive(Debug)]
pub struct DateTextPersister {
    pattern: &'static str,
    format: OnceLock<OwnedFormatItem>,
}

impl DateTextPersister {
    pub const fn new(pattern: &'static str) -> Self {
        Self {
            pattern,
            format: OnceLock::new(),
        }
    }

    fn items(&self) -> Result<&OwnedFormatItem> {
        if let Some(items) = self.format.get() {
            return Ok(items);
        }
        let parsed = format_description::parse_owned::<2>(self.pattern)
            .with_context(|| format!("Invalid date pattern '{}'", self.pattern))?;
        Ok(self.format.get_or_init(|| parsed))
    }
}

impl Persister for DateTextPersister {
    fn sql_type(&self) -> SqlType {
        SqlType::Text
    }
    fn to_argument(&self, value: Value) -> Result<Value> {
        match value.to_date()? {
            Some(v) => {
                let text = v
                    .format(self.items()?)
                    .with_context(|| format!("Cannot format {} as '{}'", v, self.pattern))?;
                Ok(Value::Varchar(Some(text)))
            }
            None => Ok(Value::Varchar(None)),
        }
    }
    fn parse_default(&self, text: &str) -> Result<Value> {
        let date = Date::parse(text, self.items()?)
            .with_context(|| format!("Cannot parse '{}' with the pattern '{}'", text, self.pattern))?;
        Ok(Value::Date(Some(date)))
    }
    fn from_result(&self, cursor: &dyn ResultCursor, column: usize) -> Result<Value> {
        match cursor.get_text(column)? {
            Some(text) => {
                let date = Date::parse(&text, self.items()?).with_context(|| {
                    format!("Cannot parse '{}' with the pattern '{}'", text, self.pattern)
                })?;
                Ok(Value::Date(Some(date)))
            }
            None => Ok(Value::Date(None)),
        }
    }
    fn is_valid_type(&self, value: &Value) -> bool {
        matches!(value, Value::Null | Value::Date(..) | Value::Timestamp(..))
    }
}

/// Stores an enum by its declared name.
#[derive(Debug)]
pub struct EnumNamePersister {
    variants: &'static [EnumValue],
}

impl EnumNamePersister {
    pub const fn new(variants: &'static [EnumValue]) -> Self {
        Self { variants }
    }
}

impl Persister for EnumNamePersister {
    fn sql_type(&self) -> SqlType {
        SqlType::Enum
    }
    fn to_argument(&self, value: Value) -> Result<Value> {
        match value.to_enum()? {
            Some(v) => Ok(Value::Varchar(Some(v.name.to_owned()))),
            None => Ok(Value::Varchar(None)),
        }
    }
    fn parse_default(&self, text: &str) -> Result<Value> {
        Ok(Value::Enum(Some(lookup_name(self.variants, text)?)))
    }
    fn from_result(&self, cursor: &dyn ResultCursor, column: usize) -> Result<Value> {
        match cursor.get_text(column)? {
            Some(name) => Ok(Value::Enum(Some(lookup_name(self.variants, &name)?))),
            None => Ok(Value::Enum(None)),
        }
    }
    fn is_valid_type(&self, value: &Value) -> bool {
        matches!(value, Value::Null | Value::Enum(..))
    }
}

/// Stores an enum by its ordinal. The stored number keeps working across
/// variant renames but silently changes meaning if variants are reordered.
#[derive(Debug)]
pub struct EnumOrdinalPersister {
    variants: &'static [EnumValue],
}

impl EnumOrdinalPersister {
    pub const fn new(variants: &'static [EnumValue]) -> Self {
        Self { variants }
    }
}

impl Persister for EnumOrdinalPersister {
    fn sql_type(&self) -> SqlType {
        SqlType::Enum
    }
    fn to_argument(&self, value: Value) -> Result<Value> {
        match value.to_enum()? {
            Some(v) => Ok(Value::Int32(Some(v.ordinal))),
            None => Ok(Value::Int32(None)),
        }
    }
    fn parse_default(&self, text: &str) -> Result<Value> {
        Ok(Value::Enum(Some(lookup_ordinal(
            self.variants,
            parse_i32(text)?,
        )?)))
    }
    fn from_result(&self, cursor: &dyn ResultCursor, column: usize) -> Result<Value> {
        match cursor.get_i32(column)? {
            Some(ordinal) => Ok(Value::Enum(Some(lookup_ordinal(self.variants, ordinal)?))),
            None => Ok(Value::Enum(None)),
        }
    }
    fn is_valid_type(&self, value: &Value) -> bool {
        matches!(value, Value::Null | Value::Enum(..))
    }
    // Ordinals bind and render as plain integers.
    fn is_numeric(&self) -> bool {
        true
    }
}

fn lookup_name(variants: &'static [EnumValue], name: &str) -> Result<EnumValue> {
    variants
        .iter()
        .find(|v| v.name == name)
        .copied()
        .with_context(|| format!("'{}' does not name any known enum variant", name))
}

fn lookup_ordinal(variants: &'static [EnumValue], ordinal: i32) -> Result<EnumValue> {
    variants
        .iter()
        .find(|v| v.ordinal == ordinal)
        .copied()
        .with_context(|| format!("Ordinal {} does not match any known enum variant", ordinal))
}

/// Sentinel for field types nothing knows how to persist. A table holding a
/// field with this persister fails construction unless an explicit persister
/// is configured for it.
#[derive(Debug)]
pub struct NoPersister;

impl Persister for NoPersister {
    fn sql_type(&self) -> SqlType {
        SqlType::Unknown
    }
    fn to_argument(&self, value: Value) -> Result<Value> {
        bail!("No persister is available to convert {:?}", value)
    }
    fn parse_default(&self, text: &str) -> Result<Value> {
        bail!("No persister is available to parse the default '{}'", text)
    }
    fn from_result(&self, _cursor: &dyn ResultCursor, column: usize) -> Result<Value> {
        bail!("No persister is available to read column {}", column)
    }
    fn is_valid_type(&self, _value: &Value) -> bool {
        false
    }
}

pub static BOOLEAN: BooleanPersister = BooleanPersister;
pub static BOOLEAN_CHAR: BooleanCharPersister = BooleanCharPersister;
pub static BOOLEAN_INTEGER: BooleanIntegerPersister = BooleanIntegerPersister;
pub static CHAR: CharPersister = CharPersister;
pub static SHORT: ShortPersister = ShortPersister;
pub static INTEGER: IntegerPersister = IntegerPersister;
pub static LONG: LongPersister = LongPersister;
pub static FLOAT: FloatPersister = FloatPersister;
pub static DOUBLE: DoublePersister = DoublePersister;
pub static DECIMAL: DecimalPersister = DecimalPersister;
pub static TEXT: TextPersister = TextPersister;
pub static TEXT_UTF8_BYTES: TextBytesPersister = TextBytesPersister::new(Charset::Utf8);
pub static TEXT_UTF16_BYTES: TextBytesPersister = TextBytesPersister::new(Charset::Utf16Le);
pub static DATE: DatePersister = DatePersister;
pub static TIMESTAMP: TimestampPersister = TimestampPersister;
pub static BLOB: BlobPersister = BlobPersister;
pub static UUID: UuidPersister = UuidPersister;
pub static SERIALIZED: SerializedPersister = SerializedPersister;
pub static NONE: NoPersister = NoPersister;

/// Resolves the stock persister for a type tag.
///
/// `Enum` and `Unknown` resolve to the sentinel, an enum field always needs
/// an explicitly configured persister carrying its variant table.
pub fn for_type(sql_type: SqlType) -> &'static dyn Persister {
    match sql_type {
        SqlType::Unknown | SqlType::Enum => &NONE,
        SqlType::Boolean => &BOOLEAN,
        SqlType::Char => &CHAR,
        SqlType::Short => &SHORT,
        SqlType::Integer => &INTEGER,
        SqlType::Long => &LONG,
        SqlType::Float => &FLOAT,
        SqlType::Double => &DOUBLE,
        SqlType::Decimal => &DECIMAL,
        SqlType::Text => &TEXT,
        SqlType::Date => &DATE,
        SqlType::Timestamp => &TIMESTAMP,
        SqlType::Blob => &BLOB,
        SqlType::Uuid => &UUID,
        SqlType::Serialized => &SERIALIZED,
    }
}
