use crate::{
    ArgumentSpec, CollectionSeed, Dialect, Persister, Result, SqlType, Value, persister,
};
use anyhow::{Context, bail};
use std::{any::Any, rc::Rc};

/// Per-field metadata binding a native struct field to a database column.
///
/// Descriptors are built once through [`FieldConfig`] while the owning
/// [`crate::TableDef`] is constructed and are immutable afterwards.
#[derive(Debug)]
pub struct FieldDef<T> {
    /// Column name, already cased the way the dialect wants it.
    pub column_name: String,
    /// Native field name, used for diagnostics.
    pub field_name: String,
    /// Argument type tag of the persisted representation.
    pub sql_type: SqlType,
    /// Conversion strategy between native and argument values.
    pub persister: &'static dyn Persister,
    /// Caller-supplied id.
    pub is_id: bool,
    /// Id assigned by the database after the insert.
    pub is_generated_id: bool,
    /// Id pre-fetched from this sequence before the insert.
    pub sequence: Option<String>,
    /// The column stores the id of another persisted type.
    pub is_foreign: bool,
    /// Not a column at all: a deferred collection of child rows.
    pub is_foreign_collection: bool,
    /// Parsed default, substituted when the native value is null.
    pub default_value: Option<Value>,
    /// Child column holding the owner id (foreign collections only).
    pub key_column: Option<String>,
    get: Option<fn(&T) -> Value>,
    set: Option<fn(&mut T, Value) -> Result<()>>,
    set_parent: Option<fn(&mut T, &Rc<dyn Any>) -> bool>,
    set_collection: Option<fn(&mut T, CollectionSeed) -> Result<()>>,
}

impl<T> FieldDef<T> {
    /// True when the field supplies the row identity in any of the three
    /// flavors (caller supplied, post-insert generated, sequence).
    pub fn is_id_like(&self) -> bool {
        self.is_id || self.is_generated_id || self.sequence.is_some()
    }

    /// Reads the native field, substitutes the configured default when the
    /// value is null, and converts the result into an argument value.
    pub fn extract_argument(&self, object: &T) -> Result<Value> {
        let get = self
            .get
            .with_context(|| format!("Field {} has no accessor", self.field_name))?;
        let mut value = get(object);
        if value.is_null()
            && let Some(default) = &self.default_value
        {
            value = default.clone();
        }
        self.persister
            .to_argument(value)
            .with_context(|| format!("Cannot convert field {}", self.field_name))
    }

    /// Reads the native field without default substitution or conversion.
    pub fn peek(&self, object: &T) -> Result<Value> {
        let get = self
            .get
            .with_context(|| format!("Field {} has no accessor", self.field_name))?;
        Ok(get(object))
    }

    /// Writes a materialized native value back onto the object.
    pub fn assign(&self, object: &mut T, value: Value) -> Result<()> {
        let set = self
            .set
            .with_context(|| format!("Field {} has no mutator", self.field_name))?;
        set(object, value).with_context(|| format!("Cannot assign field {}", self.field_name))
    }

    /// Attempts to hand the already materialized parent object to a foreign
    /// field, skipping the usual id-based conversion. False when the parent
    /// type does not match.
    pub fn try_assign_parent(&self, object: &mut T, parent: &Rc<dyn Any>) -> bool {
        match self.set_parent {
            Some(assign) => assign(object, parent),
            None => false,
        }
    }

    /// Installs the deferred collection seed on a foreign-collection field.
    pub fn assign_collection(&self, object: &mut T, seed: CollectionSeed) -> Result<()> {
        let assign = self.set_collection.with_context(|| {
            format!("Field {} has no collection constructor", self.field_name)
        })?;
        assign(object, seed)
            .with_context(|| format!("Cannot build the collection for field {}", self.field_name))
    }

    /// The placeholder description handed to the driver for this field.
    pub fn argument_spec(&self) -> ArgumentSpec {
        ArgumentSpec {
            column: self.column_name.clone(),
            sql_type: self.sql_type,
        }
    }
}

/// Declarative description of one persisted field, consumed by
/// [`crate::TableConfig::field`].
///
/// Accessors are plain function pointers so a descriptor stays a passive
/// piece of data. Non-capturing closures coerce:
///
/// ```rust,ignore
/// FieldConfig::new("age", SqlType::Integer)
///     .get(|a: &Account| Value::Int32(Some(a.age)))
///     .set(|a, v| Ok(a.age = v.to_i32()?.unwrap_or(0)))
/// ```
pub struct FieldConfig<T> {
    field_name: String,
    column_name: Option<String>,
    sql_type: SqlType,
    persister: Option<&'static dyn Persister>,
    is_id: bool,
    is_generated_id: bool,
    sequence: Option<String>,
    is_foreign: bool,
    is_foreign_collection: bool,
    default_literal: Option<String>,
    key_column: Option<String>,
    get: Option<fn(&T) -> Value>,
    set: Option<fn(&mut T, Value) -> Result<()>>,
    set_parent: Option<fn(&mut T, &Rc<dyn Any>) -> bool>,
    set_collection: Option<fn(&mut T, CollectionSeed) -> Result<()>>,
}

impl<T> FieldConfig<T> {
    pub fn new(field_name: &str, sql_type: SqlType) -> Self {
        Self {
            field_name: field_name.to_owned(),
            column_name: None,
            sql_type,
            persister: None,
            is_id: false,
            is_generated_id: false,
            sequence: None,
            is_foreign: false,
            is_foreign_collection: false,
            default_literal: None,
            key_column: None,
            get: None,
            set: None,
            set_parent: None,
            set_collection: None,
        }
    }

    /// Declares a deferred child collection. `key_column` names the column
    /// of the child table that stores the owner id.
    pub fn foreign_collection(field_name: &str, key_column: &str) -> Self {
        let mut config = Self::new(field_name, SqlType::Unknown);
        config.is_foreign_collection = true;
        config.key_column = Some(key_column.to_owned());
        config
    }

    /// Overrides the column name derived from the field name.
    pub fn column_name(mut self, name: &str) -> Self {
        self.column_name = Some(name.to_owned());
        self
    }

    /// Overrides the stock persister resolved from the type tag.
    pub fn persister(mut self, persister: &'static dyn Persister) -> Self {
        self.persister = Some(persister);
        self
    }

    pub fn id(mut self) -> Self {
        self.is_id = true;
        self
    }

    pub fn generated_id(mut self) -> Self {
        self.is_generated_id = true;
        self
    }

    pub fn generated_id_sequence(mut self, sequence: &str) -> Self {
        self.sequence = Some(sequence.to_owned());
        self
    }

    pub fn foreign(mut self) -> Self {
        self.is_foreign = true;
        self
    }

    /// Default literal substituted when the native value is null. Parsed
    /// through the persister while the table is built, so a bad literal
    /// fails construction and not some later insert.
    pub fn default_value(mut self, literal: &str) -> Self {
        self.default_literal = Some(literal.to_owned());
        self
    }

    pub fn get(mut self, get: fn(&T) -> Value) -> Self {
        self.get = Some(get);
        self
    }

    pub fn set(mut self, set: fn(&mut T, Value) -> Result<()>) -> Self {
        self.set = Some(set);
        self
    }

    /// Installs the parent shortcut used while mapping child rows during
    /// foreign-collection iteration.
    pub fn parent(mut self, set_parent: fn(&mut T, &Rc<dyn Any>) -> bool) -> Self {
        self.set_parent = Some(set_parent);
        self
    }

    pub fn collection(mut self, set_collection: fn(&mut T, CollectionSeed) -> Result<()>) -> Self {
        self.set_collection = Some(set_collection);
        self
    }

    pub(crate) fn build(self, dialect: &dyn Dialect, table_name: &str) -> Result<FieldDef<T>> {
        let field_name = self.field_name;
        let mut column_name = self
            .column_name
            .unwrap_or_else(|| field_name.to_lowercase());
        if dialect.upcase_entity_names() {
            column_name = column_name.to_uppercase();
        }
        let id_flavors =
            self.is_id as u8 + self.is_generated_id as u8 + self.sequence.is_some() as u8;
        if id_flavors > 1 {
            bail!(
                "Field {}.{} mixes more than one id flavor",
                table_name,
                field_name
            );
        }
        if self.is_foreign_collection {
            if id_flavors > 0 || self.is_foreign {
                bail!(
                    "Field {}.{} is a foreign collection and cannot also be an id or a foreign column",
                    table_name,
                    field_name
                );
            }
            let Some(set_collection) = self.set_collection else {
                bail!(
                    "Foreign collection {}.{} has no collection constructor",
                    table_name,
                    field_name
                );
            };
            let mut key_column = self.key_column.with_context(|| {
                format!(
                    "Foreign collection {}.{} does not name its key column",
                    table_name, field_name
                )
            })?;
            if dialect.upcase_entity_names() {
                key_column = key_column.to_uppercase();
            }
            return Ok(FieldDef {
                column_name,
                field_name,
                sql_type: SqlType::Unknown,
                persister: &persister::NONE,
                is_id: false,
                is_generated_id: false,
                sequence: None,
                is_foreign: false,
                is_foreign_collection: true,
                default_value: None,
                key_column: Some(key_column),
                get: None,
                set: None,
                set_parent: None,
                set_collection: Some(set_collection),
            });
        }
        let persister = self
            .persister
            .unwrap_or_else(|| persister::for_type(self.sql_type));
        if persister.sql_type() == SqlType::Unknown {
            bail!(
                "Field {}.{} of type {} has no persister, configure one explicitly",
                table_name,
                field_name,
                self.sql_type
            );
        }
        if self.get.is_none() || self.set.is_none() {
            bail!(
                "Field {}.{} needs both an accessor and a mutator",
                table_name,
                field_name
            );
        }
        let mut sequence = self.sequence;
        if self.is_generated_id && dialect.generated_id_is_sequence() {
            sequence = Some(dialect.default_sequence_name(table_name));
        }
        if dialect.upcase_entity_names()
            && let Some(name) = sequence.as_mut()
        {
            *name = name.to_uppercase();
        }
        let default_value = self
            .default_literal
            .map(|literal| {
                persister.parse_default(&literal).with_context(|| {
                    format!(
                        "Invalid default for field {}.{}",
                        table_name, field_name
                    )
                })
            })
            .transpose()?;
        Ok(FieldDef {
            column_name,
            field_name,
            sql_type: persister.sql_type(),
            persister,
            is_id: self.is_id,
            is_generated_id: self.is_generated_id && sequence.is_none(),
            sequence,
            is_foreign: self.is_foreign,
            is_foreign_collection: false,
            default_value,
            key_column: None,
            get: self.get,
            set: self.set,
            set_parent: self.set_parent,
            set_collection: None,
        })
    }
}
