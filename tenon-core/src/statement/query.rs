use crate::{
    CompiledHandle, CompiledStatement, Connection, Dialect, IdentityCache, ParentRef, Result,
    ResultFlags, RowMapper, StatementError, StatementKind, TableDef, Value, truncate_sql,
};
use std::{cell::RefCell, rc::Rc};

/// Compiled SELECT produced by [`crate::QueryBuilder`]. Reusable: holders
/// inside the predicate re-bind between executions without recompiling.
#[derive(Debug)]
pub struct CompiledQuery<T> {
    statement: CompiledStatement<T>,
    mapper: RowMapper<T>,
}

impl<T> CompiledQuery<T> {
    pub(crate) fn new(statement: CompiledStatement<T>, result_indices: Vec<usize>) -> Self {
        let mapper = RowMapper::new(&statement.table, result_indices);
        Self { statement, mapper }
    }

    pub fn sql(&self) -> &str {
        self.statement.sql()
    }

    /// Runs the query and materializes every row.
    pub fn run(
        &self,
        connection: &dyn Connection,
        cache: Option<&IdentityCache<T>>,
    ) -> Result<Vec<Rc<RefCell<T>>>> {
        self.run_with_parent(connection, cache, None)
    }

    pub(crate) fn run_with_parent(
        &self,
        connection: &dyn Connection,
        cache: Option<&IdentityCache<T>>,
        parent: Option<&ParentRef>,
    ) -> Result<Vec<Rc<RefCell<T>>>> {
        let mut rows = Vec::new();
        self.visit(connection, cache, parent, |row| {
            rows.push(row);
            Ok(())
        })?;
        Ok(rows)
    }

    /// Streams the materialized rows through `visit` without collecting
    /// them, returning how many rows the cursor produced.
    pub fn for_each(
        &self,
        connection: &dyn Connection,
        cache: Option<&IdentityCache<T>>,
        visit: impl FnMut(Rc<RefCell<T>>) -> Result<()>,
    ) -> Result<u64> {
        self.visit(connection, cache, None, visit)
    }

    /// Runs the query and materializes the first row, if any.
    pub fn query_first(
        &self,
        connection: &dyn Connection,
        cache: Option<&IdentityCache<T>>,
    ) -> Result<Option<Rc<RefCell<T>>>> {
        let mut handle = self
            .statement
            .compile_handle(connection, ResultFlags::default())?;
        let arguments = self.statement.bind(None)?;
        log::debug!("Running {}", truncate_sql!(self.statement.sql));
        let mut cursor = handle
            .execute_query(&arguments)
            .map_err(|source| StatementError::execution(&self.statement.sql, source))?;
        if !cursor.next()? {
            return Ok(None);
        }
        Ok(Some(self.mapper.map_row(&*cursor, cache, None)?))
    }

    fn visit(
        &self,
        connection: &dyn Connection,
        cache: Option<&IdentityCache<T>>,
        parent: Option<&ParentRef>,
        mut visit: impl FnMut(Rc<RefCell<T>>) -> Result<()>,
    ) -> Result<u64> {
        let mut handle = self
            .statement
            .compile_handle(connection, ResultFlags::default())?;
        let arguments = self.statement.bind(None)?;
        log::debug!("Running {}", truncate_sql!(self.statement.sql));
        let mut cursor = handle
            .execute_query(&arguments)
            .map_err(|source| StatementError::execution(&self.statement.sql, source))?;
        let mut count = 0;
        while cursor.next()? {
            visit(self.mapper.map_row(&*cursor, cache, parent)?)?;
            count += 1;
        }
        Ok(count)
    }
}

/// Compiled single-row SELECT keyed by id:
/// `SELECT * FROM "t" WHERE "id" = ? `.
///
/// Zero rows is an absent value; a second matching row is the
/// [`StatementError::MoreThanOneRow`] sentinel, the caller decides whether
/// that is fatal.
pub struct CompiledQueryById<T> {
    table: Rc<TableDef<T>>,
    sql: String,
    id_index: usize,
    mapper: RowMapper<T>,
}

impl<T> CompiledQueryById<T> {
    pub fn compile(table: &Rc<TableDef<T>>, dialect: &dyn Dialect) -> Result<Self> {
        let (id_index, id_field) = table.require_id()?;
        let mut sql = String::with_capacity(48);
        sql.push_str("SELECT * FROM ");
        dialect.write_identifier(&mut sql, table.table_name());
        sql.push_str(" WHERE ");
        dialect.write_identifier(&mut sql, &id_field.column_name);
        sql.push_str(" = ");
        dialect.write_placeholder(&mut sql);
        sql.push(' ');
        let mapper = RowMapper::new(table, table.scalar_indices().collect());
        Ok(Self {
            table: table.clone(),
            sql,
            id_index,
            mapper,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Fetches the row with the given native id value.
    pub fn execute(
        &self,
        connection: &dyn Connection,
        cache: Option<&IdentityCache<T>>,
        id: Value,
    ) -> Result<Option<Rc<RefCell<T>>>> {
        let field = self.table.field(self.id_index);
        let argument = field.persister.to_argument(id)?;
        let mut handle = self.compile_handle(connection)?;
        log::debug!("Running {}", truncate_sql!(self.sql));
        let mut cursor = handle
            .execute_query(&[argument])
            .map_err(|source| StatementError::execution(&self.sql, source))?;
        if !cursor.next()? {
            return Ok(None);
        }
        let row = self.mapper.map_row(&*cursor, cache, None)?;
        if cursor.next()? {
            return Err(StatementError::MoreThanOneRow.into());
        }
        Ok(Some(row))
    }

    /// Re-reads the row keyed by the object's own id and copies every
    /// non-id column back onto the object in place. Reports whether the
    /// row was found.
    pub fn refresh(&self, connection: &dyn Connection, object: &mut T) -> Result<bool> {
        let field = self.table.field(self.id_index);
        let argument = field.extract_argument(object)?;
        let mut handle = self.compile_handle(connection)?;
        log::debug!("Running {}", truncate_sql!(self.sql));
        let mut cursor = handle
            .execute_query(&[argument])
            .map_err(|source| StatementError::execution(&self.sql, source))?;
        if !cursor.next()? {
            return Ok(false);
        }
        self.mapper.assign_row(&*cursor, object, true)?;
        if cursor.next()? {
            return Err(StatementError::MoreThanOneRow.into());
        }
        Ok(true)
    }

    fn compile_handle<'c>(
        &self,
        connection: &'c dyn Connection,
    ) -> Result<Box<dyn CompiledHandle + 'c>> {
        let field = self.table.field(self.id_index);
        let specs = [field.argument_spec()];
        connection
            .compile(
                &self.sql,
                StatementKind::Select,
                &specs,
                ResultFlags::default(),
            )
            .map_err(|source| StatementError::execution(&self.sql, source))
    }
}
