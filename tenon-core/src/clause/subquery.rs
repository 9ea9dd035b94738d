use crate::{ArgumentHolder, Dialect, Result};
use std::fmt::{self, Debug, Formatter};

/// Deferred rendering of an embedded sub-query.
///
/// The query builder is captured by value; compilation runs when the outer
/// clause renders, against the outer statement's dialect, and its argument
/// holders join the outer list in emission order.
pub struct SubQueryRender(
    Box<dyn Fn(&dyn Dialect, &mut String, &mut Vec<ArgumentHolder>) -> Result<()>>,
);

impl SubQueryRender {
    pub(crate) fn new(
        render: impl Fn(&dyn Dialect, &mut String, &mut Vec<ArgumentHolder>) -> Result<()> + 'static,
    ) -> Self {
        Self(Box::new(render))
    }

    pub(crate) fn append(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        (self.0)(dialect, out, arguments)
    }
}

impl Debug for SubQueryRender {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("SubQueryRender(..)")
    }
}

/// `EXISTS (<sub-query>) `, trimming one trailing separator of the embedded
/// text before the closing parenthesis.
#[derive(Debug)]
pub struct ExistsClause {
    pub(crate) render: SubQueryRender,
}

impl ExistsClause {
    pub(crate) fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        out.push_str("EXISTS (");
        self.render.append(dialect, out, arguments)?;
        if out.ends_with(' ') {
            out.pop();
        }
        out.push_str(") ");
        Ok(())
    }
}

/// `"column" IN (<sub-query>) `. The sub-query was checked at construction
/// to project exactly one column of the outer column's type.
#[derive(Debug)]
pub struct SubQueryClause {
    pub(crate) column: String,
    pub(crate) render: SubQueryRender,
}

impl SubQueryClause {
    pub(crate) fn append_sql(
        &self,
        dialect: &dyn Dialect,
        out: &mut String,
        arguments: &mut Vec<ArgumentHolder>,
    ) -> Result<()> {
        dialect.write_identifier(out, &self.column);
        out.push_str(" IN (");
        self.render.append(dialect, out, arguments)?;
        out.push_str(") ");
        Ok(())
    }
}
