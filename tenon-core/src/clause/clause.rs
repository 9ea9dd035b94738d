use crate::{
    ArgumentHolder, BetweenClause, CompareClause, Dialect, EnumValue, ExistsClause, InClause,
    ManyClause, NotClause, NullClause, Result, SubQueryClause, Value,
};
use anyhow::bail;
use rust_decimal::Decimal;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

/// One node of a predicate tree.
///
/// Built through [`crate::Where`] and compiled by appending dialect-correct
/// SQL to a buffer while the bound-argument holders are collected in strict
/// left-to-right order. That order is the binding order at execution.
#[derive(Debug)]
pub enum Clause {
    Compare(CompareClause),
    Null(NullClause),
    Between(BetweenClause),
    In(InClause),
    Combined(ManyClause),
    Not(NotClause),
    Exists(ExistsClause),
    SubQuery(SubQueryClause),
    Raw(RawClause),
}

impl Clause {
    pub fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        match self {
            Clause::Compare(clause) => clause.append_sql(dialect, out, arguments),
            Clause::Null(clause) => clause.append_sql(dialect, out),
            Clause::Between(clause) => clause.append_sql(dialect, out, arguments),
            Clause::In(clause) => clause.append_sql(dialect, out, arguments),
            Clause::Combined(clause) => clause.append_sql(dialect, out, arguments),
            Clause::Not(clause) => clause.append_sql(dialect, out, arguments),
            Clause::Exists(clause) => clause.append_sql(dialect, out, arguments),
            Clause::SubQuery(clause) => clause.append_sql(dialect, out, arguments),
            Clause::Raw(clause) => {
                out.push_str(&clause.text);
                out.push(' ');
                Ok(())
            }
        }
    }

    /// Comparison leaves are the only clauses NOT accepts.
    pub(crate) fn is_comparison(&self) -> bool {
        matches!(
            self,
            Clause::Compare(..)
                | Clause::Null(..)
                | Clause::Between(..)
                | Clause::In(..)
                | Clause::SubQuery(..)
        )
    }

    /// True while the node still waits for a clause from the builder.
    pub(crate) fn is_pending(&self) -> bool {
        match self {
            Clause::Combined(clause) => clause.is_pending(),
            Clause::Not(clause) => clause.is_pending(),
            _ => false,
        }
    }

    pub(crate) fn fill(&mut self, clause: Clause) -> Result<()> {
        match self {
            Clause::Combined(combined) => combined.fill(clause),
            Clause::Not(not) => not.fill(clause),
            _ => bail!("The clause does not accept a filling clause"),
        }
    }
}

/// Caller-supplied SQL carried verbatim into the statement.
#[derive(Debug)]
pub struct RawClause {
    pub(crate) text: String,
}

/// Right-hand side of a comparison: an inline literal or a mutable
/// placeholder re-bindable between executions.
#[derive(Debug)]
pub enum Operand {
    Literal(Value),
    Holder(ArgumentHolder),
}

impl Operand {
    /// Renders the operand and a trailing space. A holder binds its column
    /// name here and joins the argument list in emission order.
    pub(crate) fn append(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
        column: &str,
        quote: bool,
    ) -> Result<()> {
        match self {
            Operand::Literal(value) => dialect.write_value(out, value, quote),
            Operand::Holder(holder) => {
                holder.bind_column(column)?;
                dialect.write_placeholder(out);
                arguments.push(holder.clone());
            }
        }
        out.push(' ');
        Ok(())
    }
}

macro_rules! operand_from {
    ($($source:ty),* $(,)?) => {$(
        impl From<$source> for Operand {
            fn from(value: $source) -> Self {
                Operand::Literal(value.into())
            }
        }
    )*};
}
operand_from!(
    bool,
    char,
    i16,
    i32,
    i64,
    f32,
    f64,
    Decimal,
    &str,
    String,
    &[u8],
    Vec<u8>,
    Date,
    PrimitiveDateTime,
    Uuid,
    EnumValue,
    serde_json::Value,
    Value,
);

impl From<ArgumentHolder> for Operand {
    fn from(value: ArgumentHolder) -> Self {
        Operand::Holder(value)
    }
}

impl From<&ArgumentHolder> for Operand {
    fn from(value: &ArgumentHolder) -> Self {
        Operand::Holder(value.clone())
    }
}
