use crate::{
    ArgumentHolder, ArgumentSpec, CompiledHandle, Connection, Result, ResultFlags,
    StatementError, StatementKind, TableDef, Value, truncate_sql,
};
use anyhow::{Context, bail};
use std::rc::Rc;

/// Where one positional argument's value comes from at execution time.
#[derive(Debug)]
pub enum CompiledArgument {
    /// Extracted from the subject object's field.
    Field(usize),
    /// Read from a mutable holder bound while the statement was compiled.
    Holder(ArgumentHolder),
}

/// The compiled core every statement kind shares: immutable SQL text, the
/// statement kind, and the ordered argument sources.
///
/// The argument order is the placeholder emission order; binding walks the
/// same list, which keeps positional binding correct by construction.
#[derive(Debug)]
pub struct CompiledStatement<T> {
    pub(crate) table: Rc<TableDef<T>>,
    pub(crate) sql: String,
    pub(crate) kind: StatementKind,
    pub(crate) arguments: Vec<CompiledArgument>,
}

impl<T> CompiledStatement<T> {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn table(&self) -> &Rc<TableDef<T>> {
        &self.table
    }

    /// Placeholder descriptions handed to the driver, in binding order.
    pub fn argument_specs(&self) -> Result<Vec<ArgumentSpec>> {
        self.arguments
            .iter()
            .map(|argument| {
                Ok(match argument {
                    CompiledArgument::Field(index) => self.table.field(*index).argument_spec(),
                    CompiledArgument::Holder(holder) => {
                        let index = self.holder_field(holder)?;
                        self.table.field(index).argument_spec()
                    }
                })
            })
            .collect()
    }

    /// Extracts and converts the positional argument values. `object` is
    /// required when any argument reads a field of the subject object.
    pub(crate) fn bind(&self, object: Option<&T>) -> Result<Vec<Value>> {
        self.arguments
            .iter()
            .map(|argument| match argument {
                CompiledArgument::Field(index) => {
                    let Some(object) = object else {
                        bail!("The statement binds object fields but no object was given");
                    };
                    self.table.field(*index).extract_argument(object)
                }
                CompiledArgument::Holder(holder) => {
                    let index = self.holder_field(holder)?;
                    let field = self.table.field(index);
                    let value = holder.value().with_context(|| {
                        format!("The argument for {} was never set", field.column_name)
                    })?;
                    field.persister.to_argument(value)
                }
            })
            .collect()
    }

    pub(crate) fn compile_handle<'c>(
        &self,
        connection: &'c dyn Connection,
        flags: ResultFlags,
    ) -> Result<Box<dyn CompiledHandle + 'c>> {
        let specs = self.argument_specs()?;
        connection
            .compile(&self.sql, self.kind, &specs, flags)
            .map_err(|source| StatementError::execution(&self.sql, source))
    }

    pub(crate) fn execute_update(
        &self,
        connection: &dyn Connection,
        object: Option<&T>,
    ) -> Result<u64> {
        let mut handle = self.compile_handle(connection, ResultFlags::default())?;
        let arguments = self.bind(object)?;
        log::debug!("Running {}", truncate_sql!(self.sql));
        handle
            .execute_update(&arguments)
            .map_err(|source| StatementError::execution(&self.sql, source))
    }

    fn holder_field(&self, holder: &ArgumentHolder) -> Result<usize> {
        let column = holder
            .column()
            .context("The holder was never bound to a column")?;
        self.table.find_column(column)
    }
}
