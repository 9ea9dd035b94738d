use std::fmt::{self, Display};

/// Database argument type tag attached to every field descriptor.
///
/// The tag decides how literals are rendered (numeric tags are written bare,
/// everything else is escaped and quoted) and is the unit of compatibility
/// for sub-query column checks.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    /// No persister could be resolved for the field. A descriptor carrying
    /// this tag fails table construction unless an explicit persister is set.
    #[default]
    Unknown,
    Boolean,
    Char,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Decimal,
    Text,
    Date,
    Timestamp,
    Blob,
    Uuid,
    Enum,
    Serialized,
}

impl SqlType {
    /// Numeric tags render literal values without quoting.
    pub fn is_numeric(&self) -> bool {
        use SqlType::*;
        matches!(self, Short | Integer | Long | Float | Double | Decimal)
    }
}

impl Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use SqlType::*;
        f.write_str(match self {
            Unknown => "UNKNOWN",
            Boolean => "BOOLEAN",
            Char => "CHAR",
            Short => "SHORT",
            Integer => "INTEGER",
            Long => "LONG",
            Float => "FLOAT",
            Double => "DOUBLE",
            Decimal => "DECIMAL",
            Text => "TEXT",
            Date => "DATE",
            Timestamp => "TIMESTAMP",
            Blob => "BLOB",
            Uuid => "UUID",
            Enum => "ENUM",
            Serialized => "SERIALIZED",
        })
    }
}
