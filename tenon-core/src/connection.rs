use crate::{Result, SqlType, Value};
use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

/// What a compiled statement is going to be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// Execution options a driver needs to know before compiling.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultFlags {
    /// The statement is an insert whose generated key must be fetched back.
    pub return_generated_keys: bool,
}

/// Column name and type tag describing one positional placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentSpec {
    pub column: String,
    pub sql_type: SqlType,
}

/// The live database boundary.
///
/// Everything in this layer funnels through these three traits, nothing else
/// talks to a backend. Execution is synchronous blocking I/O, any pooling or
/// transaction handling belongs to the driver behind this trait.
pub trait Connection {
    /// Turns finished SQL text into an executable handle.
    fn compile<'c>(
        &'c self,
        sql: &str,
        kind: StatementKind,
        arguments: &[ArgumentSpec],
        flags: ResultFlags,
    ) -> Result<Box<dyn CompiledHandle + 'c>>;

    /// Runs a query expected to produce a single numeric value, used for
    /// sequence pre-fetch before an insert.
    fn query_for_long(&self, sql: &str) -> Result<i64>;
}

/// A driver-side compiled statement ready for positional binding.
pub trait CompiledHandle {
    /// Executes a modify statement, returns the number of affected rows.
    fn execute_update(&mut self, arguments: &[Value]) -> Result<u64>;

    /// Executes a select, returning a cursor positioned before the first row.
    fn execute_query<'h>(&'h mut self, arguments: &[Value]) -> Result<Box<dyn ResultCursor + 'h>>;

    /// Executes an insert and returns the database generated key.
    fn execute_insert_returning_key(&mut self, arguments: &[Value]) -> Result<i64>;
}

/// Forward-only view over a query result.
///
/// The typed getters have default implementations on top of [`value`], a
/// driver only has to supply the four required methods.
///
/// [`value`]: ResultCursor::value
pub trait ResultCursor {
    /// Advances to the next row, false once the rows are exhausted.
    fn next(&mut self) -> Result<bool>;

    fn is_null(&self, column: usize) -> Result<bool>;

    /// The raw driver value of the given column in the current row.
    fn value(&self, column: usize) -> Result<Value>;

    /// Resolves a column label to its position.
    fn find_column(&self, name: &str) -> Result<usize>;

    fn get_bool(&self, column: usize) -> Result<Option<bool>> {
        self.value(column)?.to_bool()
    }
    fn get_char(&self, column: usize) -> Result<Option<char>> {
        self.value(column)?.to_char()
    }
    fn get_i16(&self, column: usize) -> Result<Option<i16>> {
        self.value(column)?.to_i16()
    }
    fn get_i32(&self, column: usize) -> Result<Option<i32>> {
        self.value(column)?.to_i32()
    }
    fn get_i64(&self, column: usize) -> Result<Option<i64>> {
        self.value(column)?.to_i64()
    }
    fn get_f32(&self, column: usize) -> Result<Option<f32>> {
        self.value(column)?.to_f32()
    }
    fn get_f64(&self, column: usize) -> Result<Option<f64>> {
        self.value(column)?.to_f64()
    }
    fn get_decimal(&self, column: usize) -> Result<Option<Decimal>> {
        self.value(column)?.to_decimal()
    }
    fn get_text(&self, column: usize) -> Result<Option<String>> {
        self.value(column)?.to_text()
    }
    fn get_bytes(&self, column: usize) -> Result<Option<Box<[u8]>>> {
        self.value(column)?.to_bytes()
    }
    fn get_date(&self, column: usize) -> Result<Option<Date>> {
        self.value(column)?.to_date()
    }
    fn get_timestamp(&self, column: usize) -> Result<Option<PrimitiveDateTime>> {
        self.value(column)?.to_timestamp()
    }
    fn get_uuid(&self, column: usize) -> Result<Option<Uuid>> {
        self.value(column)?.to_uuid()
    }
    fn get_json(&self, column: usize) -> Result<Option<serde_json::Value>> {
        self.value(column)?.to_json()
    }
}
