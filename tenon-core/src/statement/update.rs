use crate::{
    CompiledArgument, CompiledStatement, Connection, Dialect, Result, StatementKind, TableDef,
    separated_by,
};
use std::rc::Rc;

/// Compiled by-id UPDATE for one mapped type:
/// `UPDATE "t" SET "a" = ? ,"b" = ? WHERE "id" = ? `.
///
/// The id is excluded from the SET list and bound last for the WHERE. A
/// table whose only column is the id compiles to a no-op that reports zero
/// affected rows instead of failing.
#[derive(Debug)]
pub struct CompiledUpdate<T> {
    statement: Option<CompiledStatement<T>>,
}

impl<T> CompiledUpdate<T> {
    pub fn compile(table: &Rc<TableDef<T>>, dialect: &dyn Dialect) -> Result<Self> {
        let (id_index, id_field) = table.require_id()?;
        let columns = table
            .scalar_indices()
            .filter(|index| *index != id_index)
            .collect::<Vec<_>>();
        if columns.is_empty() {
            return Ok(Self { statement: None });
        }
        let mut sql = String::with_capacity(64);
        sql.push_str("UPDATE ");
        dialect.write_identifier(&mut sql, table.table_name());
        sql.push_str(" SET ");
        separated_by(
            &mut sql,
            &columns,
            |out, index| {
                dialect.write_identifier(out, &table.field(*index).column_name);
                out.push_str(" = ");
                dialect.write_placeholder(out);
                out.push(' ');
            },
            ",",
        );
        sql.push_str("WHERE ");
        dialect.write_identifier(&mut sql, &id_field.column_name);
        sql.push_str(" = ");
        dialect.write_placeholder(&mut sql);
        sql.push(' ');
        let arguments = columns
            .into_iter()
            .chain([id_index])
            .map(CompiledArgument::Field)
            .collect();
        Ok(Self {
            statement: Some(CompiledStatement {
                table: table.clone(),
                sql,
                kind: StatementKind::Update,
                arguments,
            }),
        })
    }

    /// None when the table has nothing to update besides its id.
    pub fn sql(&self) -> Option<&str> {
        self.statement.as_ref().map(CompiledStatement::sql)
    }

    pub fn execute(&self, connection: &dyn Connection, object: &T) -> Result<u64> {
        match &self.statement {
            Some(statement) => statement.execute_update(connection, Some(object)),
            None => {
                log::debug!("The table has no updatable columns, nothing to run");
                Ok(0)
            }
        }
    }
}
