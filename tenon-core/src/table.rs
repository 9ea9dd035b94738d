use crate::{Dialect, FieldConfig, FieldDef, Result};
use anyhow::bail;
use std::{any::type_name, rc::Rc};

/// Immutable per-type metadata: table name, field descriptors and the
/// factory used to materialize fresh instances from rows.
///
/// Built once per mapped type through [`TableConfig`] and shared behind an
/// [`Rc`] by every statement compiled against the type.
#[derive(Debug)]
pub struct TableDef<T> {
    table_name: String,
    fields: Vec<FieldDef<T>>,
    id_index: Option<usize>,
    collection_indices: Vec<usize>,
    factory: fn() -> T,
}

impl<T> TableDef<T> {
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// All descriptors, foreign collections included, in declaration order.
    pub fn fields(&self) -> &[FieldDef<T>] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> &FieldDef<T> {
        &self.fields[index]
    }

    pub fn id_field(&self) -> Option<(usize, &FieldDef<T>)> {
        self.id_index.map(|index| (index, &self.fields[index]))
    }

    /// The id descriptor, or an error naming the table for statements that
    /// cannot work without one.
    pub fn require_id(&self) -> Result<(usize, &FieldDef<T>)> {
        match self.id_field() {
            Some(id) => Ok(id),
            None => bail!("Table {} has no id field", self.table_name),
        }
    }

    /// Indices of the fields that persist as columns, in declaration order.
    pub fn scalar_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.fields
            .iter()
            .enumerate()
            .filter(|(.., field)| !field.is_foreign_collection)
            .map(|(index, ..)| index)
    }

    pub fn collection_indices(&self) -> &[usize] {
        &self.collection_indices
    }

    /// Resolves a column name to its descriptor index. Exact matches on the
    /// stored (already dialect-cased) name win, then a case-insensitive
    /// pass so logical names keep working under an upper-casing dialect.
    pub fn find_column(&self, column: &str) -> Result<usize> {
        for (index, field) in self.fields.iter().enumerate() {
            if !field.is_foreign_collection && field.column_name == column {
                return Ok(index);
            }
        }
        for (index, field) in self.fields.iter().enumerate() {
            if !field.is_foreign_collection && field.column_name.eq_ignore_ascii_case(column) {
                return Ok(index);
            }
        }
        bail!("Table {} has no column {}", self.table_name, column)
    }

    pub fn new_instance(&self) -> T {
        (self.factory)()
    }
}

/// Declarative table description. Validation runs in [`TableConfig::build`]
/// so a misconfigured mapping fails before the first statement is compiled.
pub struct TableConfig<T> {
    table_name: Option<String>,
    factory: fn() -> T,
    fields: Vec<FieldConfig<T>>,
}

impl<T> TableConfig<T> {
    pub fn new(factory: fn() -> T) -> Self {
        Self {
            table_name: None,
            factory,
            fields: Vec::new(),
        }
    }

    /// Overrides the table name derived from the type name.
    pub fn table_name(mut self, name: &str) -> Self {
        self.table_name = Some(name.to_owned());
        self
    }

    pub fn field(mut self, field: FieldConfig<T>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self, dialect: &dyn Dialect) -> Result<Rc<TableDef<T>>> {
        let mut table_name = self.table_name.unwrap_or_else(derived_table_name::<T>);
        if dialect.upcase_entity_names() {
            table_name = table_name.to_uppercase();
        }
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in self.fields {
            fields.push(field.build(dialect, &table_name)?);
        }
        let mut id_index: Option<usize> = None;
        let mut scalar_count = 0;
        let mut collection_indices = Vec::new();
        for (index, field) in fields.iter().enumerate() {
            if field.is_foreign_collection {
                collection_indices.push(index);
                continue;
            }
            scalar_count += 1;
            if field.is_id_like() {
                if let Some(previous) = id_index {
                    bail!(
                        "Table {} declares more than one id field: {} and {}",
                        table_name,
                        fields[previous].field_name,
                        field.field_name
                    );
                }
                id_index = Some(index);
            }
        }
        if scalar_count == 0 {
            bail!("Table {} has no persisted fields", table_name);
        }
        for first in 0..fields.len() {
            for second in first + 1..fields.len() {
                if !fields[first].is_foreign_collection
                    && !fields[second].is_foreign_collection
                    && fields[first].column_name == fields[second].column_name
                {
                    bail!(
                        "Table {} maps the column {} twice",
                        table_name,
                        fields[first].column_name
                    );
                }
            }
        }
        Ok(Rc::new(TableDef {
            table_name,
            fields,
            id_index,
            collection_indices,
            factory: self.factory,
        }))
    }
}

/// Lowercased last segment of the type name, matching the usual convention
/// of a table named after its type.
fn derived_table_name<T>() -> String {
    let name = type_name::<T>();
    name.rsplit("::")
        .next()
        .unwrap_or(name)
        .to_lowercase()
}
