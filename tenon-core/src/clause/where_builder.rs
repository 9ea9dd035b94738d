use crate::{
    ArgumentHolder, BetweenClause, Clause, CompareClause, CompareOp, Dialect, ExistsClause,
    FieldDef, InClause, ManyClause, ManyOp, NotClause, NullClause, Operand, QueryBuilder,
    RawClause, Result, SubQueryClause, TableDef,
};
use anyhow::{Context, bail};
use std::rc::Rc;

/// Fluent predicate builder over one mapped table.
///
/// Comparisons push onto an internal stack; `and`/`or` join the top entry
/// with the next one to be written, `and_group`/`or_group` collapse the top
/// `count` entries, `not` negates the next comparison. Compiling requires
/// the stack to hold exactly one complete clause.
///
/// Literal values are converted through the column's persister as soon as
/// the comparison is written, so a type mismatch or a null argument fails
/// while the query is being built, not when it runs.
#[derive(Debug)]
pub struct Where<T> {
    table: Rc<TableDef<T>>,
    stack: Vec<Clause>,
}

impl<T> Where<T> {
    pub fn new(table: &Rc<TableDef<T>>) -> Self {
        Self {
            table: table.clone(),
            stack: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn eq(&mut self, column: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.comparison(column, CompareOp::Eq, value.into())
    }

    pub fn ne(&mut self, column: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.comparison(column, CompareOp::Ne, value.into())
    }

    pub fn gt(&mut self, column: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.comparison(column, CompareOp::Gt, value.into())
    }

    pub fn ge(&mut self, column: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.comparison(column, CompareOp::Ge, value.into())
    }

    pub fn lt(&mut self, column: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.comparison(column, CompareOp::Lt, value.into())
    }

    pub fn le(&mut self, column: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.comparison(column, CompareOp::Le, value.into())
    }

    pub fn like(&mut self, column: &str, value: impl Into<Operand>) -> Result<&mut Self> {
        self.comparison(column, CompareOp::Like, value.into())
    }

    pub fn is_null(&mut self, column: &str) -> Result<&mut Self> {
        let clause = {
            let field = self.field(column)?;
            Clause::Null(NullClause {
                column: field.column_name.clone(),
                negated: false,
            })
        };
        self.add(clause)?;
        Ok(self)
    }

    pub fn is_not_null(&mut self, column: &str) -> Result<&mut Self> {
        let clause = {
            let field = self.field(column)?;
            Clause::Null(NullClause {
                column: field.column_name.clone(),
                negated: true,
            })
        };
        self.add(clause)?;
        Ok(self)
    }

    pub fn between(
        &mut self,
        column: &str,
        low: impl Into<Operand>,
        high: impl Into<Operand>,
    ) -> Result<&mut Self> {
        let clause = {
            let field = self.field(column)?;
            let low = convert_operand(field, low.into())
                .with_context(|| format!("Invalid low bound of BETWEEN on {}", column))?;
            let high = convert_operand(field, high.into())
                .with_context(|| format!("Invalid high bound of BETWEEN on {}", column))?;
            Clause::Between(BetweenClause {
                column: field.column_name.clone(),
                low,
                high,
                quote: !field.persister.is_numeric(),
            })
        };
        self.add(clause)?;
        Ok(self)
    }

    pub fn is_in<V: Into<Operand>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Result<&mut Self> {
        let clause = {
            let field = self.field(column)?;
            let values = values
                .into_iter()
                .map(|value| convert_operand(field, value.into()))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Invalid element of IN on {}", column))?;
            if values.is_empty() {
                bail!("IN on {} requires at least one value", column);
            }
            Clause::In(InClause {
                column: field.column_name.clone(),
                values,
                quote: !field.persister.is_numeric(),
            })
        };
        self.add(clause)?;
        Ok(self)
    }

    /// `column IN (sub-query)`. The sub-query must project exactly one
    /// column whose type tag matches this column's tag.
    pub fn in_sub_query<C: 'static>(
        &mut self,
        column: &str,
        query: QueryBuilder<C>,
    ) -> Result<&mut Self> {
        let clause = {
            let field = self.field(column)?;
            let projected = query.projected_types();
            if projected.len() != 1 {
                bail!(
                    "The sub-query for {} must select exactly one column, it selects {}",
                    column,
                    projected.len()
                );
            }
            if projected[0] != field.sql_type {
                bail!(
                    "The sub-query for {} selects a {} column where {} is expected",
                    column,
                    projected[0],
                    field.sql_type
                );
            }
            Clause::SubQuery(SubQueryClause {
                column: field.column_name.clone(),
                render: query.into_render(),
            })
        };
        self.add(clause)?;
        Ok(self)
    }

    pub fn exists<C: 'static>(&mut self, query: QueryBuilder<C>) -> Result<&mut Self> {
        let clause = Clause::Exists(ExistsClause {
            render: query.into_render(),
        });
        self.add(clause)?;
        Ok(self)
    }

    /// Caller-supplied SQL carried verbatim. Arguments belong in
    /// [`ArgumentHolder`]s inside structured clauses, not here.
    pub fn raw(&mut self, text: &str) -> Result<&mut Self> {
        self.add(Clause::Raw(RawClause {
            text: text.to_owned(),
        }))?;
        Ok(self)
    }

    /// Joins the clause on top of the stack with the next one written.
    pub fn and(&mut self) -> Result<&mut Self> {
        self.join(ManyOp::And)
    }

    pub fn or(&mut self) -> Result<&mut Self> {
        self.join(ManyOp::Or)
    }

    /// Collapses the top `count` stack entries into one AND group.
    pub fn and_group(&mut self, count: usize) -> Result<&mut Self> {
        self.group(ManyOp::And, count)
    }

    pub fn or_group(&mut self, count: usize) -> Result<&mut Self> {
        self.group(ManyOp::Or, count)
    }

    /// Negates the next comparison written. Anything other than a
    /// comparison, a second NOT included, is rejected when it arrives.
    pub fn not(&mut self) -> Result<&mut Self> {
        self.stack.push(Clause::Not(NotClause::pending()));
        Ok(self)
    }

    /// Compiles the finished predicate. The stack must hold exactly one
    /// complete clause.
    pub fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        match self.stack.as_slice() {
            [] => bail!("No clauses were built"),
            [clause] => clause.append_sql(dialect, out, arguments),
            stack => bail!(
                "{} clauses remain unjoined, use and_group or or_group",
                stack.len()
            ),
        }
    }

    fn field(&self, column: &str) -> Result<&FieldDef<T>> {
        let index = self.table.find_column(column)?;
        Ok(self.table.field(index))
    }

    fn comparison(&mut self, column: &str, operation: CompareOp, value: Operand) -> Result<&mut Self> {
        let clause = {
            let field = self.field(column)?;
            let operand = convert_operand(field, value)
                .with_context(|| format!("Invalid {}comparison on {}", operation.sql(), column))?;
            Clause::Compare(CompareClause {
                column: field.column_name.clone(),
                operation,
                operand,
                quote: !field.persister.is_numeric(),
            })
        };
        self.add(clause)?;
        Ok(self)
    }

    /// Pushes a clause, first filling and popping every node still waiting
    /// on top of the stack (a pending NOT, then a pending group, and so on).
    fn add(&mut self, clause: Clause) -> Result<()> {
        let mut current = clause;
        while self.stack.last().is_some_and(Clause::is_pending) {
            let mut pending = self.stack.pop().context("The clause stack is empty")?;
            pending.fill(current)?;
            current = pending;
        }
        self.stack.push(current);
        Ok(())
    }

    fn join(&mut self, op: ManyOp) -> Result<&mut Self> {
        let left = self.stack.pop().with_context(|| {
            format!(
                "{}needs an existing clause on its left",
                op.sql()
            )
        })?;
        if left.is_pending() {
            bail!(
                "{}cannot join a clause that is still missing its right-hand side",
                op.sql()
            );
        }
        self.stack
            .push(Clause::Combined(ManyClause::joining(op, left)));
        Ok(self)
    }

    fn group(&mut self, op: ManyOp, count: usize) -> Result<&mut Self> {
        if count == 0 {
            bail!("A {}group needs at least one clause", op.sql());
        }
        if self.stack.len() < count {
            bail!(
                "A {}group over {} clauses was requested but only {} were built",
                op.sql(),
                count,
                self.stack.len()
            );
        }
        let clauses = self.stack.split_off(self.stack.len() - count);
        if let Some(pending) = clauses.iter().find(|clause| clause.is_pending()) {
            bail!(
                "A grouped clause is still missing its right-hand side: {:?}",
                pending
            );
        }
        self.stack
            .push(Clause::Combined(ManyClause::group(op, clauses)));
        Ok(self)
    }
}

fn convert_operand<T>(field: &FieldDef<T>, operand: Operand) -> Result<Operand> {
    match operand {
        Operand::Literal(value) => {
            if value.is_null() {
                bail!(
                    "The value for {} is null, use is_null instead",
                    field.column_name
                );
            }
            Ok(Operand::Literal(field.persister.to_argument(value)?))
        }
        holder => Ok(holder),
    }
}
