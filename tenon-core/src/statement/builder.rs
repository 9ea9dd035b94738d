use crate::{
    ArgumentHolder, CompiledArgument, CompiledQuery, CompiledStatement, Connection, Dialect,
    Operand, Result, SqlType, StatementKind, SubQueryRender, TableDef, Where, separated_by,
};
use anyhow::bail;
use std::rc::Rc;

/// Fluent SELECT builder: optional projection, predicate, ordering and
/// paging over one mapped table.
///
/// `compile` renders the SQL once; the produced [`CompiledQuery`] is then
/// re-executed freely, re-binding any [`ArgumentHolder`]s in the predicate.
#[derive(Debug)]
pub struct QueryBuilder<T> {
    table: Rc<TableDef<T>>,
    columns: Option<Vec<usize>>,
    where_: Where<T>,
    order_by: Vec<(usize, bool)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl<T> QueryBuilder<T> {
    pub fn new(table: &Rc<TableDef<T>>) -> Self {
        Self {
            table: table.clone(),
            columns: None,
            where_: Where::new(table),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Restricts the projection. Without this the query selects `*` and
    /// materializes every persisted column.
    pub fn select_columns<'a>(
        &mut self,
        columns: impl IntoIterator<Item = &'a str>,
    ) -> Result<&mut Self> {
        let mut indices = Vec::new();
        for column in columns {
            indices.push(self.table.find_column(column)?);
        }
        if indices.is_empty() {
            bail!("The projection needs at least one column");
        }
        self.columns = Some(indices);
        Ok(self)
    }

    pub fn where_(&mut self) -> &mut Where<T> {
        &mut self.where_
    }

    pub fn order_by(&mut self, column: &str, ascending: bool) -> Result<&mut Self> {
        let index = self.table.find_column(column)?;
        self.order_by.push((index, ascending));
        Ok(self)
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Rejected at compile time when the dialect cannot render OFFSET.
    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// Type tags of the projected columns, in projection order.
    pub fn projected_types(&self) -> Vec<SqlType> {
        self.result_indices()
            .iter()
            .map(|&index| self.table.field(index).sql_type)
            .collect()
    }

    pub fn compile(&self, dialect: &dyn Dialect) -> Result<CompiledQuery<T>> {
        let mut sql = String::with_capacity(64);
        let mut holders = Vec::new();
        self.append_sql(dialect, &mut sql, &mut holders)?;
        let statement = CompiledStatement {
            table: self.table.clone(),
            sql,
            kind: StatementKind::Select,
            arguments: holders.into_iter().map(CompiledArgument::Holder).collect(),
        };
        Ok(CompiledQuery::new(statement, self.result_indices()))
    }

    pub(crate) fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        out.push_str("SELECT ");
        if dialect.limit_after_select()
            && let Some(limit) = self.limit
        {
            dialect.write_limit(out, limit);
        }
        match &self.columns {
            None => out.push_str("* "),
            Some(columns) => separated_by(
                out,
                columns,
                |out, index| {
                    dialect.write_identifier(out, &self.table.field(*index).column_name);
                    out.push(' ');
                },
                ",",
            ),
        }
        out.push_str("FROM ");
        dialect.write_identifier(out, self.table.table_name());
        out.push(' ');
        if !self.where_.is_empty() {
            out.push_str("WHERE ");
            self.where_.append_sql(dialect, out, arguments)?;
        }
        if !self.order_by.is_empty() {
            out.push_str("ORDER BY ");
            separated_by(
                out,
                &self.order_by,
                |out, &(index, ascending)| {
                    dialect.write_identifier(out, &self.table.field(index).column_name);
                    if !ascending {
                        out.push_str(" DESC");
                    }
                    out.push(' ');
                },
                ",",
            );
        }
        if !dialect.limit_after_select()
            && let Some(limit) = self.limit
        {
            dialect.write_limit(out, limit);
        }
        if let Some(offset) = self.offset {
            if !dialect.supports_offset() {
                bail!("The dialect cannot render OFFSET");
            }
            dialect.write_offset(out, offset);
        }
        Ok(())
    }

    fn result_indices(&self) -> Vec<usize> {
        match &self.columns {
            Some(columns) => columns.clone(),
            None => self.table.scalar_indices().collect(),
        }
    }
}

impl<T: 'static> QueryBuilder<T> {
    /// Captures the builder for embedding as a sub-query of another
    /// statement. Rendering is deferred to the outer compilation.
    pub(crate) fn into_render(self) -> SubQueryRender {
        SubQueryRender::new(move |dialect, out, arguments| {
            self.append_sql(dialect, out, arguments)
        })
    }
}

/// Fluent column-value UPDATE builder:
/// `UPDATE "t" SET "a" = 'x' ,"b" = ? WHERE ... `.
pub struct UpdateBuilder<T> {
    table: Rc<TableDef<T>>,
    sets: Vec<(usize, Operand)>,
    where_: Where<T>,
}

impl<T> UpdateBuilder<T> {
    pub fn new(table: &Rc<TableDef<T>>) -> Self {
        Self {
            table: table.clone(),
            sets: Vec::new(),
            where_: Where::new(table),
        }
    }

    /// Sets a column to a literal, a null, or a re-bindable holder.
    pub fn set(&mut self, column: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        let index = self.table.find_column(column)?;
        let field = self.table.field(index);
        let operand = match value.into() {
            // NULL is a legal SET target, unlike a comparison argument.
            Operand::Literal(value) if value.is_null() => Operand::Literal(value),
            Operand::Literal(value) => Operand::Literal(field.persister.to_argument(value)?),
            holder => holder,
        };
        self.sets.push((index, operand));
        Ok(self)
    }

    pub fn where_(&mut self) -> &mut Where<T> {
        &mut self.where_
    }

    pub fn compile(&self, dialect: &dyn Dialect) -> Result<CompiledMutation<T>> {
        if self.sets.is_empty() {
            bail!(
                "The update of {} sets no columns",
                self.table.table_name()
            );
        }
        let mut sql = String::with_capacity(64);
        let mut holders = Vec::new();
        sql.push_str("UPDATE ");
        dialect.write_identifier(&mut sql, self.table.table_name());
        sql.push_str(" SET ");
        let last = self.sets.len() - 1;
        for (i, (index, operand)) in self.sets.iter().enumerate() {
            let field = self.table.field(*index);
            dialect.write_identifier(&mut sql, &field.column_name);
            sql.push_str(" = ");
            operand.append(
                dialect,
                &mut sql,
                &mut holders,
                &field.column_name,
                !field.persister.is_numeric(),
            )?;
            if i < last {
                sql.push(',');
            }
        }
        if !self.where_.is_empty() {
            sql.push_str("WHERE ");
            self.where_.append_sql(dialect, &mut sql, &mut holders)?;
        }
        Ok(CompiledMutation {
            statement: CompiledStatement {
                table: self.table.clone(),
                sql,
                kind: StatementKind::Update,
                arguments: holders.into_iter().map(CompiledArgument::Holder).collect(),
            },
        })
    }
}

/// Fluent DELETE builder. Without a predicate it deletes every row.
pub struct DeleteBuilder<T> {
    table: Rc<TableDef<T>>,
    where_: Where<T>,
}

impl<T> DeleteBuilder<T> {
    pub fn new(table: &Rc<TableDef<T>>) -> Self {
        Self {
            table: table.clone(),
            where_: Where::new(table),
        }
    }

    pub fn where_(&mut self) -> &mut Where<T> {
        &mut self.where_
    }

    pub fn compile(&self, dialect: &dyn Dialect) -> Result<CompiledMutation<T>> {
        let mut sql = String::with_capacity(48);
        let mut holders = Vec::new();
        sql.push_str("DELETE FROM ");
        dialect.write_identifier(&mut sql, self.table.table_name());
        sql.push(' ');
        if !self.where_.is_empty() {
            sql.push_str("WHERE ");
            self.where_.append_sql(dialect, &mut sql, &mut holders)?;
        }
        Ok(CompiledMutation {
            statement: CompiledStatement {
                table: self.table.clone(),
                sql,
                kind: StatementKind::Delete,
                arguments: holders.into_iter().map(CompiledArgument::Holder).collect(),
            },
        })
    }
}

/// Compiled prepared UPDATE or DELETE. Reusable like [`CompiledQuery`]:
/// holders re-bind between executions without recompiling the SQL.
#[derive(Debug)]
pub struct CompiledMutation<T> {
    statement: CompiledStatement<T>,
}

impl<T> CompiledMutation<T> {
    pub fn sql(&self) -> &str {
        self.statement.sql()
    }

    pub fn execute(&self, connection: &dyn Connection) -> Result<u64> {
        self.statement.execute_update(connection, None)
    }
}
