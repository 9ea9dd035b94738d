use thiserror::Error;

/// Runtime statement failures a caller may need to tell apart.
///
/// Construction mistakes (bad metadata, malformed clause trees) are reported
/// as plain [`crate::Error`]s at build time and are not represented here.
/// These variants travel through [`crate::Error`] and can be recovered with
/// `err.downcast_ref::<StatementError>()`.
#[derive(Debug, Error)]
pub enum StatementError {
    /// A single-row query matched two or more rows. Zero rows is not an
    /// error, it is reported as an absent value.
    #[error("the query expected at most one row but matched more than one")]
    MoreThanOneRow,
    /// The driver reported no usable generated key after an insert.
    #[error("the insert returned no generated key: {sql}")]
    NoGeneratedKey { sql: String },
    /// A sequence pre-fetch produced zero, which can never be a valid id.
    #[error("sequence {sequence} returned zero instead of a new id value")]
    ZeroSequenceValue { sequence: String },
    /// Any failure surfaced by the driver, tagged with the offending SQL.
    #[error("statement failed: {sql}")]
    Execution {
        sql: String,
        #[source]
        source: anyhow::Error,
    },
}

impl StatementError {
    /// Wraps a driver failure together with the SQL text that triggered it.
    pub fn execution(sql: impl Into<String>, source: anyhow::Error) -> crate::Error {
        StatementError::Execution {
            sql: sql.into(),
            source,
        }
        .into()
    }
}
