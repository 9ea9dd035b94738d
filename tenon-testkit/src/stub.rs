use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
};
use tenon_core::{
    ArgumentSpec, CompiledHandle, Connection, Context, Result, ResultCursor, ResultFlags,
    StatementKind, Value,
};

/// One statement execution observed by [`StubConnection`], in execution
/// order. Re-running a compiled statement records a fresh entry.
#[derive(Clone, Debug)]
pub struct RecordedStatement {
    pub sql: String,
    pub kind: StatementKind,
    pub flags: ResultFlags,
    pub arguments: Vec<Value>,
}

/// A scripted result set: column labels plus zero or more rows.
#[derive(Clone, Debug, Default)]
pub struct StubRows {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl StubRows {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.rows.push(values.into_iter().collect());
        self
    }
}

#[derive(Default)]
struct Script {
    rows: VecDeque<StubRows>,
    generated_keys: VecDeque<i64>,
    update_counts: VecDeque<u64>,
    longs: VecDeque<i64>,
}

/// Scripted in-memory stand-in for a driver connection.
///
/// Results are queued up front and consumed in execution order: each query
/// pops one result set, each generated-key insert pops one key (falling
/// back to a counter starting at one), each update pops an explicit count
/// or reports one affected row. Everything executed is recorded for later
/// assertions.
pub struct StubConnection {
    script: RefCell<Script>,
    recorded: RefCell<Vec<RecordedStatement>>,
    next_key: Cell<i64>,
}

impl StubConnection {
    pub fn new() -> Self {
        Self {
            script: RefCell::new(Script::default()),
            recorded: RefCell::new(Vec::new()),
            next_key: Cell::new(1),
        }
    }

    /// Queues the result set served to the next query.
    pub fn queue_rows(&self, rows: StubRows) {
        self.script.borrow_mut().rows.push_back(rows);
    }

    /// Queues the key served to the next generated-key insert.
    pub fn queue_generated_key(&self, key: i64) {
        self.script.borrow_mut().generated_keys.push_back(key);
    }

    /// Queues the affected-row count served to the next update.
    pub fn queue_update_count(&self, count: u64) {
        self.script.borrow_mut().update_counts.push_back(count);
    }

    /// Queues the value served to the next single-value query.
    pub fn queue_long(&self, value: i64) {
        self.script.borrow_mut().longs.push_back(value);
    }

    /// Everything executed so far, in order.
    pub fn recorded(&self) -> Vec<RecordedStatement> {
        self.recorded.borrow().clone()
    }

    /// Drains the record, leaving the connection ready for the next phase
    /// of a test.
    pub fn take_recorded(&self) -> Vec<RecordedStatement> {
        self.recorded.borrow_mut().drain(..).collect()
    }

    fn record(&self, statement: RecordedStatement) {
        self.recorded.borrow_mut().push(statement);
    }

    fn next_fallback_key(&self) -> i64 {
        let key = self.next_key.get();
        self.next_key.set(key + 1);
        key
    }
}

impl Default for StubConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl Connection for StubConnection {
    fn compile<'c>(
        &'c self,
        sql: &str,
        kind: StatementKind,
        _arguments: &[ArgumentSpec],
        flags: ResultFlags,
    ) -> Result<Box<dyn CompiledHandle + 'c>> {
        Ok(Box::new(StubHandle {
            connection: self,
            sql: sql.to_owned(),
            kind,
            flags,
        }))
    }

    fn query_for_long(&self, sql: &str) -> Result<i64> {
        self.record(RecordedStatement {
            sql: sql.to_owned(),
            kind: StatementKind::Select,
            flags: ResultFlags::default(),
            arguments: Vec::new(),
        });
        self.script
            .borrow_mut()
            .longs
            .pop_front()
            .with_context(|| format!("The script has no single-value result for {}", sql))
    }
}

struct StubHandle<'c> {
    connection: &'c StubConnection,
    sql: String,
    kind: StatementKind,
    flags: ResultFlags,
}

impl StubHandle<'_> {
    fn record(&self, arguments: &[Value]) {
        self.connection.record(RecordedStatement {
            sql: self.sql.clone(),
            kind: self.kind,
            flags: self.flags,
            arguments: arguments.to_vec(),
        });
    }
}

impl CompiledHandle for StubHandle<'_> {
    fn execute_update(&mut self, arguments: &[Value]) -> Result<u64> {
        self.record(arguments);
        Ok(self
            .connection
            .script
            .borrow_mut()
            .update_counts
            .pop_front()
            .unwrap_or(1))
    }

    fn execute_query<'h>(&'h mut self, arguments: &[Value]) -> Result<Box<dyn ResultCursor + 'h>> {
        self.record(arguments);
        let rows = self
            .connection
            .script
            .borrow_mut()
            .rows
            .pop_front()
            .unwrap_or_default();
        Ok(Box::new(StubCursor::new(rows)))
    }

    fn execute_insert_returning_key(&mut self, arguments: &[Value]) -> Result<i64> {
        self.record(arguments);
        let key = self
            .connection
            .script
            .borrow_mut()
            .generated_keys
            .pop_front();
        Ok(match key {
            Some(key) => key,
            None => self.connection.next_fallback_key(),
        })
    }
}

/// Cursor over a [`StubRows`] script, public so persister conversions can
/// be driven directly against a handmade result row.
pub struct StubCursor {
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<Value>>,
    current: Option<Vec<Value>>,
}

impl StubCursor {
    pub fn new(rows: StubRows) -> Self {
        Self {
            columns: rows.columns,
            rows: rows.rows.into_iter(),
            current: None,
        }
    }

    fn row(&self) -> Result<&Vec<Value>> {
        self.current
            .as_ref()
            .context("The cursor is not positioned on a row")
    }
}

impl ResultCursor for StubCursor {
    fn next(&mut self) -> Result<bool> {
        self.current = self.rows.next();
        Ok(self.current.is_some())
    }

    fn is_null(&self, column: usize) -> Result<bool> {
        Ok(self.value(column)?.is_null())
    }

    fn value(&self, column: usize) -> Result<Value> {
        self.row()?
            .get(column)
            .cloned()
            .with_context(|| format!("Column {} is out of range", column))
    }

    fn find_column(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
            .with_context(|| format!("The result has no column {}", name))
    }
}
