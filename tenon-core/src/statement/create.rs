use crate::{
    CompiledArgument, CompiledStatement, Connection, Dialect, FieldDef, Result, ResultFlags,
    SqlType, StatementError, StatementKind, TableDef, Value, separated_by, truncate_sql,
};
use anyhow::bail;
use std::rc::Rc;

/// How the row identity is produced when an object is inserted.
#[derive(Debug)]
enum KeyMode {
    /// Caller supplied, or no id field at all.
    None,
    /// Auto-increment key reported by the driver after the insert.
    PostInsert { id_index: usize },
    /// Number pre-fetched from a sequence and assigned before the insert.
    Sequence {
        id_index: usize,
        sequence: String,
        sql: String,
    },
}

/// Compiled INSERT for one mapped type:
/// `INSERT INTO "t" ("a" ,"b" ) VALUES (? ,? ) `.
///
/// A post-insert generated id is excluded from the column list; a sequence
/// id is included, with the sequence queried first.
#[derive(Debug)]
pub struct CompiledCreate<T> {
    statement: CompiledStatement<T>,
    key_mode: KeyMode,
}

impl<T> CompiledCreate<T> {
    pub fn compile(table: &Rc<TableDef<T>>, dialect: &dyn Dialect) -> Result<Self> {
        let mut key_mode = KeyMode::None;
        if let Some((id_index, id_field)) = table.id_field() {
            if let Some(sequence) = &id_field.sequence {
                require_numeric_id(table, id_field)?;
                let mut sql = String::new();
                dialect.write_next_sequence(&mut sql, sequence);
                key_mode = KeyMode::Sequence {
                    id_index,
                    sequence: sequence.clone(),
                    sql,
                };
            } else if id_field.is_generated_id {
                require_numeric_id(table, id_field)?;
                key_mode = KeyMode::PostInsert { id_index };
            }
        }
        let columns = table
            .scalar_indices()
            .filter(|index| match key_mode {
                KeyMode::PostInsert { id_index } => *index != id_index,
                _ => true,
            })
            .collect::<Vec<_>>();
        if columns.is_empty() {
            bail!(
                "Table {} has no insertable columns",
                table.table_name()
            );
        }
        let mut sql = String::with_capacity(64);
        sql.push_str("INSERT INTO ");
        dialect.write_identifier(&mut sql, table.table_name());
        sql.push_str(" (");
        separated_by(
            &mut sql,
            &columns,
            |out, index| {
                dialect.write_identifier(out, &table.field(*index).column_name);
                out.push(' ');
            },
            ",",
        );
        sql.push_str(") VALUES (");
        separated_by(
            &mut sql,
            &columns,
            |out, _| {
                dialect.write_placeholder(out);
                out.push(' ');
            },
            ",",
        );
        sql.push_str(") ");
        Ok(Self {
            statement: CompiledStatement {
                table: table.clone(),
                sql,
                kind: StatementKind::Insert,
                arguments: columns.into_iter().map(CompiledArgument::Field).collect(),
            },
            key_mode,
        })
    }

    pub fn sql(&self) -> &str {
        self.statement.sql()
    }

    /// Inserts the object, producing its id first where the key mode asks
    /// for it and assigning a driver-generated key back afterwards.
    pub fn execute(&self, connection: &dyn Connection, object: &mut T) -> Result<u64> {
        match &self.key_mode {
            KeyMode::None => self.statement.execute_update(connection, Some(object)),
            KeyMode::Sequence {
                id_index,
                sequence,
                sql,
            } => {
                log::debug!("Running {}", truncate_sql!(sql));
                let key = connection
                    .query_for_long(sql)
                    .map_err(|source| StatementError::execution(sql, source))?;
                if key == 0 {
                    return Err(StatementError::ZeroSequenceValue {
                        sequence: sequence.clone(),
                    }
                    .into());
                }
                let field = self.statement.table.field(*id_index);
                field.assign(object, key_value(field, key)?)?;
                self.statement.execute_update(connection, Some(object))
            }
            KeyMode::PostInsert { id_index } => {
                let flags = ResultFlags {
                    return_generated_keys: true,
                };
                let mut handle = self.statement.compile_handle(connection, flags)?;
                let arguments = self.statement.bind(Some(object))?;
                log::debug!("Running {}", truncate_sql!(self.statement.sql));
                let key = handle
                    .execute_insert_returning_key(&arguments)
                    .map_err(|source| StatementError::execution(&self.statement.sql, source))?;
                if key == 0 {
                    return Err(StatementError::NoGeneratedKey {
                        sql: self.statement.sql.clone(),
                    }
                    .into());
                }
                let field = self.statement.table.field(*id_index);
                field.assign(object, key_value(field, key)?)?;
                Ok(1)
            }
        }
    }
}

fn require_numeric_id<T>(table: &TableDef<T>, field: &FieldDef<T>) -> Result<()> {
    if !matches!(
        field.sql_type,
        SqlType::Short | SqlType::Integer | SqlType::Long
    ) {
        bail!(
            "The generated id {}.{} must be an integer, it is {}",
            table.table_name(),
            field.field_name,
            field.sql_type
        );
    }
    Ok(())
}

/// Converts a driver-reported key into the id field's native width.
fn key_value<T>(field: &FieldDef<T>, key: i64) -> Result<Value> {
    Ok(match field.sql_type {
        SqlType::Short => Value::Int16(Some(i16::try_from(key)?)),
        SqlType::Integer => Value::Int32(Some(i32::try_from(key)?)),
        _ => Value::Int64(Some(key)),
    })
}
