use crate::Dialect;
use std::fmt::Write;

/// Double-quoted identifiers, `LIMIT`/`OFFSET` paging, auto-increment
/// generated ids. The baseline the other dialects deviate from.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardDialect;

impl StandardDialect {
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for StandardDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }
}

/// Backtick-quoted identifiers, otherwise the standard shapes.
#[derive(Clone, Copy, Debug, Default)]
pub struct MySqlDialect;

impl MySqlDialect {
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MySqlDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push('`');
        self.write_escaped(out, value, '`', "``");
        out.push('`');
    }
}

/// Upper-cased entity names, sequence-based generated ids, `FIRST n`
/// row limiting right after SELECT and no offset support.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirebirdDialect;

impl FirebirdDialect {
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for FirebirdDialect {
    fn as_dyn(&self) -> &dyn Dialect {
        self
    }

    fn upcase_entity_names(&self) -> bool {
        true
    }

    fn generated_id_is_sequence(&self) -> bool {
        true
    }

    fn limit_after_select(&self) -> bool {
        true
    }

    fn write_limit(&self, out: &mut String, limit: u64) {
        let _ = write!(out, "FIRST {} ", limit);
    }

    fn supports_offset(&self) -> bool {
        false
    }

    fn write_next_sequence(&self, out: &mut String, sequence: &str) {
        out.push_str("SELECT NEXT VALUE FOR ");
        self.write_identifier(out, sequence);
        out.push_str(" FROM RDB$DATABASE");
    }
}
