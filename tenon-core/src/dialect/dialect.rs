use crate::Value;
use std::fmt::Write;

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}
macro_rules! write_float {
    ($out:ident, $value:expr) => {{
        let mut buffer = ryu::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Dialect strategy rendering identifiers, literals and paging clauses.
///
/// Concrete dialects are plain data: a unit struct overriding the handful
/// of methods where its database deviates from the defaults.
pub trait Dialect {
    fn as_dyn(&self) -> &dyn Dialect;

    /// Table, column and sequence names must be stored upper-cased.
    fn upcase_entity_names(&self) -> bool {
        false
    }

    /// Generated ids come from a sequence fetched before the insert
    /// instead of an auto-increment column read after it.
    fn generated_id_is_sequence(&self) -> bool {
        false
    }

    /// Sequence name synthesized for a generated id when the dialect is
    /// sequence based and no explicit name was configured.
    fn default_sequence_name(&self, table_name: &str) -> String {
        format!("{}_id_seq", table_name)
    }

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + 1;
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier(&self, out: &mut String, value: &str) {
        out.push('"');
        self.write_escaped(out, value, '"', "\"\"");
        out.push('"');
    }

    /// Render and escape a string literal using single quotes.
    fn write_string_literal(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    /// The placeholder emitted for one bound argument.
    fn write_placeholder(&self, out: &mut String) {
        out.push('?');
    }

    /// Render an inline literal. `quote` reflects whether the owning
    /// field is non-numeric; numeric payloads always render bare.
    fn write_value(&self, out: &mut String, value: &Value, quote: bool) {
        match value {
            v if v.is_null() => out.push_str("NULL"),
            Value::Boolean(Some(v)) => {
                let text = ["false", "true"][*v as usize];
                if quote {
                    self.write_string_literal(out, text);
                } else {
                    out.push_str(text);
                }
            }
            Value::Int16(Some(v)) => write_integer!(out, *v),
            Value::Int32(Some(v)) => write_integer!(out, *v),
            Value::Int64(Some(v)) => write_integer!(out, *v),
            Value::Float32(Some(v)) => write_float!(out, *v),
            Value::Float64(Some(v)) => write_float!(out, *v),
            Value::Decimal(Some(v)) => {
                let _ = write!(out, "{}", v);
            }
            Value::Char(Some(v)) => {
                let mut buf = [0u8; 4];
                self.write_text(out, v.encode_utf8(&mut buf), quote);
            }
            Value::Varchar(Some(v)) => self.write_text(out, v, quote),
            Value::Blob(Some(v)) => self.write_blob_literal(out, v.as_ref()),
            Value::Date(Some(v)) => {
                let quote = if quote { "'" } else { "" };
                let _ = write!(
                    out,
                    "{}{:04}-{:02}-{:02}{}",
                    quote,
                    v.year(),
                    v.month() as u8,
                    v.day(),
                    quote,
                );
            }
            Value::Timestamp(Some(v)) => {
                let quote = if quote { "'" } else { "" };
                let _ = write!(
                    out,
                    "{}{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    quote,
                    v.year(),
                    v.month() as u8,
                    v.day(),
                    v.hour(),
                    v.minute(),
                    v.second(),
                );
                if v.nanosecond() != 0 {
                    let mut fraction = format!("{:09}", v.nanosecond());
                    fraction.truncate(fraction.trim_end_matches('0').len());
                    let _ = write!(out, ".{}", fraction);
                }
                out.push_str(quote);
            }
            Value::Uuid(Some(v)) => {
                let _ = write!(out, "'{}'", v);
            }
            Value::Enum(Some(v)) => {
                if quote {
                    self.write_string_literal(out, v.name);
                } else {
                    write_integer!(out, v.ordinal);
                }
            }
            Value::Serialized(Some(v)) => self.write_string_literal(out, &v.to_string()),
            _ => out.push_str("NULL"),
        }
    }

    /// Render a blob literal using hex escapes.
    fn write_blob_literal(&self, out: &mut String, value: &[u8]) {
        out.push('\'');
        for b in value {
            let _ = write!(out, "\\x{:02X}", b);
        }
        out.push('\'');
    }

    /// Whether the row limit renders right after SELECT instead of at the
    /// end of the statement.
    fn limit_after_select(&self) -> bool {
        false
    }

    fn write_limit(&self, out: &mut String, limit: u64) {
        let _ = write!(out, "LIMIT {} ", limit);
    }

    fn supports_offset(&self) -> bool {
        true
    }

    fn write_offset(&self, out: &mut String, offset: u64) {
        let _ = write!(out, "OFFSET {} ", offset);
    }

    /// SQL fetching the next value of a sequence as a single-long query.
    fn write_next_sequence(&self, out: &mut String, sequence: &str) {
        out.push_str("SELECT NEXTVAL(");
        self.write_string_literal(out, sequence);
        out.push(')');
    }

    fn write_text(&self, out: &mut String, value: &str, quote: bool) {
        if quote {
            self.write_string_literal(out, value);
        } else {
            out.push_str(value);
        }
    }
}
