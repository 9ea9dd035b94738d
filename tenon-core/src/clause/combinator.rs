use crate::{ArgumentHolder, Clause, Dialect, Result};
use anyhow::bail;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ManyOp {
    And,
    Or,
}

impl ManyOp {
    /// Joining keyword, trailing space included.
    pub fn sql(&self) -> &'static str {
        match self {
            ManyOp::And => "AND ",
            ManyOp::Or => "OR ",
        }
    }
}

/// The right-hand side a combinator may still be waiting for. Filling a
/// filled slot is rejected, never overwritten.
#[derive(Debug)]
pub enum Slot {
    Unfilled,
    Filled(Box<Clause>),
}

/// Variable-arity AND/OR group: `(<c1> AND <c2> ... ) `.
///
/// A group created by the infix builder path starts with an unfilled slot
/// for the clause that has not been written yet. Chaining the same
/// operation extends one flat group instead of nesting pairs; both shapes
/// are query-equivalent, the flat one just reads better.
#[derive(Debug)]
pub struct ManyClause {
    pub(crate) op: ManyOp,
    pub(crate) clauses: Vec<Clause>,
    pub(crate) slot: Option<Slot>,
}

impl ManyClause {
    /// A complete group over an already built clause list.
    pub(crate) fn group(op: ManyOp, clauses: Vec<Clause>) -> Self {
        Self {
            op,
            clauses,
            slot: None,
        }
    }

    /// An infix group holding the left side and waiting for the right one.
    /// A complete left group of the same operation is flattened into it.
    pub(crate) fn joining(op: ManyOp, left: Clause) -> Self {
        let clauses = match left {
            Clause::Combined(many) if many.op == op && !many.is_pending() => many.into_children(),
            left => vec![left],
        };
        Self {
            op,
            clauses,
            slot: Some(Slot::Unfilled),
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self.slot, Some(Slot::Unfilled))
    }

    pub(crate) fn fill(&mut self, clause: Clause) -> Result<()> {
        match &self.slot {
            Some(Slot::Unfilled) => {
                self.slot = Some(Slot::Filled(Box::new(clause)));
                Ok(())
            }
            Some(Slot::Filled(..)) => {
                bail!("The {}group was already filled", self.op.sql())
            }
            None => bail!("The {}group does not expect another clause", self.op.sql()),
        }
    }

    fn into_children(self) -> Vec<Clause> {
        let mut clauses = self.clauses;
        if let Some(Slot::Filled(filled)) = self.slot {
            clauses.push(*filled);
        }
        clauses
    }

    pub(crate) fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        out.push('(');
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                out.push_str(self.op.sql());
            }
            clause.append_sql(dialect, out, arguments)?;
        }
        match &self.slot {
            Some(Slot::Filled(filled)) => {
                if !self.clauses.is_empty() {
                    out.push_str(self.op.sql());
                }
                filled.append_sql(dialect, out, arguments)?;
            }
            Some(Slot::Unfilled) => {
                bail!("The {}group is still missing its right-hand side", self.op.sql())
            }
            None => {}
        }
        out.push_str(") ");
        Ok(())
    }
}

/// Negation of exactly one comparison leaf: `(NOT <comparison>) `.
/// Anything other than a comparison is rejected when the slot is filled.
#[derive(Debug)]
pub struct NotClause {
    comparison: Option<Box<Clause>>,
}

impl NotClause {
    pub(crate) fn pending() -> Self {
        Self { comparison: None }
    }

    pub(crate) fn is_pending(&self) -> bool {
        self.comparison.is_none()
    }

    pub(crate) fn fill(&mut self, clause: Clause) -> Result<()> {
        if self.comparison.is_some() {
            bail!("NOT already negates a comparison, it cannot take a second one");
        }
        if !clause.is_comparison() {
            bail!("NOT only works with a comparison clause");
        }
        self.comparison = Some(Box::new(clause));
        Ok(())
    }

    pub(crate) fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        let Some(comparison) = &self.comparison else {
            bail!("NOT is still missing its comparison");
        };
        out.push_str("(NOT ");
        comparison.append_sql(dialect, out, arguments)?;
        out.push_str(") ");
        Ok(())
    }
}
