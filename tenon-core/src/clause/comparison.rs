use crate::{ArgumentHolder, Dialect, Operand, Result};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
}

impl CompareOp {
    /// Operation segment, trailing space included.
    pub fn sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "= ",
            CompareOp::Ne => "<> ",
            CompareOp::Gt => "> ",
            CompareOp::Ge => ">= ",
            CompareOp::Lt => "< ",
            CompareOp::Le => "<= ",
            CompareOp::Like => "LIKE ",
        }
    }
}

/// Binary comparison leaf: `"column" <op> <value> `.
#[derive(Debug)]
pub struct CompareClause {
    pub(crate) column: String,
    pub(crate) operation: CompareOp,
    pub(crate) operand: Operand,
    pub(crate) quote: bool,
}

impl CompareClause {
    pub(crate) fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        dialect.write_identifier(out, &self.column);
        out.push(' ');
        out.push_str(self.operation.sql());
        self.operand
            .append(dialect, out, arguments, &self.column, self.quote)
    }
}

/// `"column" IS NULL ` or `"column" IS NOT NULL `.
#[derive(Debug)]
pub struct NullClause {
    pub(crate) column: String,
    pub(crate) negated: bool,
}

impl NullClause {
    pub(crate) fn append_sql(&self, dialect: &dyn Dialect, out: &mut String) -> Result<()> {
        dialect.write_identifier(out, &self.column);
        out.push_str(if self.negated {
            " IS NOT NULL "
        } else {
            " IS NULL "
        });
        Ok(())
    }
}

/// `"column" BETWEEN <low> AND <high> `. Both bounds were checked non-null
/// when the clause was built.
#[derive(Debug)]
pub struct BetweenClause {
    pub(crate) column: String,
    pub(crate) low: Operand,
    pub(crate) high: Operand,
    pub(crate) quote: bool,
}

impl BetweenClause {
    pub(crate) fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        dialect.write_identifier(out, &self.column);
        out.push_str(" BETWEEN ");
        self.low
            .append(dialect, out, arguments, &self.column, self.quote)?;
        out.push_str("AND ");
        self.high
            .append(dialect, out, arguments, &self.column, self.quote)
    }
}

/// `"column" IN (<v1> ,<v2> ,...) `. Elements were checked non-null and
/// non-empty when the clause was built.
#[derive(Debug)]
pub struct InClause {
    pub(crate) column: String,
    pub(crate) values: Vec<Operand>,
    pub(crate) quote: bool,
}

impl InClause {
    pub(crate) fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        dialect.write_identifier(out, &self.column);
        out.push_str(" IN (");
        let last = self.values.len() - 1;
        for (i, value) in self.values.iter().enumerate() {
            value.append(dialect, out, arguments, &self.column, self.quote)?;
            if i < last {
                out.push(',');
            }
        }
        out.push_str(") ");
        Ok(())
    }
}
