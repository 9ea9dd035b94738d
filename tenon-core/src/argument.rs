use crate::{Result, Value};
use anyhow::bail;
use std::{
    cell::{OnceCell, RefCell},
    fmt::{self, Display},
    rc::Rc,
};

/// A late-bound value slot inside a compiled statement.
///
/// A holder renders as a `?` placeholder instead of a literal. Its column
/// name is fixed exactly once while the statement compiles, its value can be
/// set any number of times between executions, so one compiled statement can
/// be re-run with fresh values without rebuilding any SQL text.
///
/// Clones share the same slot. Holders are deliberately single-threaded,
/// sharing across threads is not supported anywhere in this layer.
#[derive(Clone, Debug, Default)]
pub struct ArgumentHolder {
    inner: Rc<HolderInner>,
}

#[derive(Debug, Default)]
struct HolderInner {
    column: OnceCell<String>,
    value: RefCell<Option<Value>>,
}

impl ArgumentHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<Value>) -> Self {
        let holder = Self::new();
        holder.set_value(value);
        holder
    }

    /// Last write wins, the current value is picked up at the next execution.
    pub fn set_value(&self, value: impl Into<Value>) {
        *self.inner.value.borrow_mut() = Some(value.into());
    }

    pub fn value(&self) -> Option<Value> {
        self.inner.value.borrow().clone()
    }

    /// The column this holder compiled against, if it compiled already.
    pub fn column(&self) -> Option<&str> {
        self.inner.column.get().map(String::as_str)
    }

    /// Fixes the column name. Re-binding to the same column is a no-op, a
    /// different column means the holder was reused across incompatible
    /// spots of the statement and is rejected.
    pub fn bind_column(&self, column: &str) -> Result<()> {
        if let Some(existing) = self.inner.column.get() {
            if existing != column {
                bail!(
                    "Argument holder is already bound to column {} and cannot be moved to {}",
                    existing,
                    column
                );
            }
            return Ok(());
        }
        let _ = self.inner.column.set(column.to_owned());
        Ok(())
    }
}

impl Display for ArgumentHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.column(), self.value()) {
            (Some(column), Some(value)) => write!(f, "{} = {:?}", column, value),
            (Some(column), None) => write!(f, "{} = <unset>", column),
            (None, Some(value)) => write!(f, "<unbound> = {:?}", value),
            (None, None) => f.write_str("<unbound>"),
        }
    }
}
