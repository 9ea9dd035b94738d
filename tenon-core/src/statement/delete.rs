use crate::{
    CompiledArgument, CompiledStatement, Connection, Dialect, Result, StatementError,
    StatementKind, TableDef, Value, separated_by, truncate_sql,
};
use anyhow::bail;
use std::rc::Rc;

/// Compiled by-id DELETE for one mapped type:
/// `DELETE FROM "t" WHERE "id" = ? `.
pub struct CompiledDelete<T> {
    statement: CompiledStatement<T>,
}

impl<T> CompiledDelete<T> {
    pub fn compile(table: &Rc<TableDef<T>>, dialect: &dyn Dialect) -> Result<Self> {
        let (id_index, id_field) = table.require_id()?;
        let mut sql = String::with_capacity(48);
        sql.push_str("DELETE FROM ");
        dialect.write_identifier(&mut sql, table.table_name());
        sql.push_str(" WHERE ");
        dialect.write_identifier(&mut sql, &id_field.column_name);
        sql.push_str(" = ");
        dialect.write_placeholder(&mut sql);
        sql.push(' ');
        Ok(Self {
            statement: CompiledStatement {
                table: table.clone(),
                sql,
                kind: StatementKind::Delete,
                arguments: vec![CompiledArgument::Field(id_index)],
            },
        })
    }

    pub fn sql(&self) -> &str {
        self.statement.sql()
    }

    pub fn execute(&self, connection: &dyn Connection, object: &T) -> Result<u64> {
        self.statement.execute_update(connection, Some(object))
    }
}

/// Compiled id-list DELETE sized to one collection:
/// `DELETE FROM "t" WHERE "id" IN (? ,? ) `.
///
/// An empty collection never reaches compilation; the `delete_ids` and
/// `delete_objects` entry points report zero affected rows up front.
#[derive(Debug)]
pub struct CompiledDeleteCollection<T> {
    table: Rc<TableDef<T>>,
    sql: String,
    id_index: usize,
    count: usize,
}

impl<T> CompiledDeleteCollection<T> {
    pub fn compile(table: &Rc<TableDef<T>>, dialect: &dyn Dialect, count: usize) -> Result<Self> {
        if count == 0 {
            bail!("Cannot compile a delete over zero ids");
        }
        let (id_index, id_field) = table.require_id()?;
        let mut sql = String::with_capacity(48 + count * 3);
        sql.push_str("DELETE FROM ");
        dialect.write_identifier(&mut sql, table.table_name());
        sql.push_str(" WHERE ");
        dialect.write_identifier(&mut sql, &id_field.column_name);
        sql.push_str(" IN (");
        separated_by(
            &mut sql,
            0..count,
            |out, _| {
                dialect.write_placeholder(out);
                out.push(' ');
            },
            ",",
        );
        sql.push_str(") ");
        Ok(Self {
            table: table.clone(),
            sql,
            id_index,
            count,
        })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Deletes the rows whose ids are given as native values. The list
    /// length must match the compiled placeholder count.
    pub fn execute_ids(&self, connection: &dyn Connection, ids: &[Value]) -> Result<u64> {
        let field = self.table.field(self.id_index);
        let arguments = ids
            .iter()
            .map(|id| field.persister.to_argument(id.clone()))
            .collect::<Result<Vec<_>>>()?;
        self.execute(connection, arguments)
    }

    /// Deletes the rows identified by the given objects' id fields.
    pub fn execute_objects(&self, connection: &dyn Connection, objects: &[T]) -> Result<u64> {
        let field = self.table.field(self.id_index);
        let arguments = objects
            .iter()
            .map(|object| field.extract_argument(object))
            .collect::<Result<Vec<_>>>()?;
        self.execute(connection, arguments)
    }

    /// Convenience path compiling one statement sized to `ids` and running
    /// it. Empty input returns zero without touching the database.
    pub fn delete_ids(
        table: &Rc<TableDef<T>>,
        dialect: &dyn Dialect,
        connection: &dyn Connection,
        ids: &[Value],
    ) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        Self::compile(table, dialect, ids.len())?.execute_ids(connection, ids)
    }

    pub fn delete_objects(
        table: &Rc<TableDef<T>>,
        dialect: &dyn Dialect,
        connection: &dyn Connection,
        objects: &[T],
    ) -> Result<u64> {
        if objects.is_empty() {
            return Ok(0);
        }
        Self::compile(table, dialect, objects.len())?.execute_objects(connection, objects)
    }

    fn execute(&self, connection: &dyn Connection, arguments: Vec<Value>) -> Result<u64> {
        if arguments.len() != self.count {
            bail!(
                "The statement was compiled for {} ids but {} were bound",
                self.count,
                arguments.len()
            );
        }
        let field = self.table.field(self.id_index);
        let specs = vec![field.argument_spec(); self.count];
        let mut handle = connection
            .compile(&self.sql, StatementKind::Delete, &specs, Default::default())
            .map_err(|source| StatementError::execution(&self.sql, source))?;
        log::debug!("Running {}", truncate_sql!(self.sql));
        handle
            .execute_update(&arguments)
            .map_err(|source| StatementError::execution(&self.sql, source))
    }
}
