use crate::{CollectionSeed, IdKey, IdentityCache, Result, ResultCursor, TableDef, Value};
use anyhow::Context;
use std::{
    any::Any,
    cell::{OnceCell, RefCell},
    fmt::{self, Debug, Formatter},
    rc::Rc,
};

/// An already materialized owner handed down while its child rows are
/// mapped, letting a child's foreign field take the owner directly instead
/// of querying it again.
pub struct ParentRef {
    object: Rc<dyn Any>,
}

impl ParentRef {
    pub fn new<P: 'static>(object: Rc<RefCell<P>>) -> Self {
        let object: Rc<dyn Any> = object;
        Self { object }
    }

    pub(crate) fn any(&self) -> &Rc<dyn Any> {
        &self.object
    }
}

impl Debug for ParentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("ParentRef(..)")
    }
}

/// Materializes result rows into shared native instances.
///
/// Column names resolve to cursor positions once, on the first row, and
/// the positions are reused for the rest of the compiled query's life. A
/// mapper is build-once-read-many and deliberately unsynchronized.
#[derive(Debug)]
pub struct RowMapper<T> {
    table: Rc<TableDef<T>>,
    result_indices: Vec<usize>,
    positions: OnceCell<Vec<usize>>,
}

impl<T> RowMapper<T> {
    pub fn new(table: &Rc<TableDef<T>>, result_indices: Vec<usize>) -> Self {
        Self {
            table: table.clone(),
            result_indices,
            positions: OnceCell::new(),
        }
    }

    /// Materializes the cursor's current row.
    ///
    /// With a cache attached the row's id is extracted first and a hit
    /// returns the cached instance unchanged. Otherwise a blank instance
    /// is built, scalar columns are assigned through their persisters (the
    /// supplied parent short-circuits its own foreign field), and foreign
    /// collections are installed in a second pass.
    pub fn map_row(
        &self,
        cursor: &dyn ResultCursor,
        cache: Option<&IdentityCache<T>>,
        parent: Option<&ParentRef>,
    ) -> Result<Rc<RefCell<T>>> {
        let positions = self.positions(cursor)?;
        let mut key = None;
        if let Some(cache) = cache {
            key = self.row_key(cursor, positions)?;
            if let Some(key) = &key
                && let Some(hit) = cache.get(key)
            {
                return Ok(hit);
            }
        }
        let mut object = self.table.new_instance();
        for (position, &index) in positions.iter().zip(&self.result_indices) {
            let field = self.table.field(index);
            if field.is_foreign
                && let Some(parent) = parent
                && field.try_assign_parent(&mut object, parent.any())
            {
                continue;
            }
            let value = field.persister.from_result(cursor, *position)?;
            field.assign(&mut object, value)?;
        }
        let shared = Rc::new(RefCell::new(object));
        // Recursive lookups can see the instance from here on: scalar
        // columns complete, collections still pending.
        if let (Some(cache), Some(key)) = (cache, key) {
            cache.insert(key, shared.clone());
        }
        self.install_collections(cursor, positions, &mut shared.borrow_mut())?;
        Ok(shared)
    }

    /// Copies the cursor's current row onto an existing object in place,
    /// optionally leaving the id field untouched. Foreign collections are
    /// re-seeded from the row's id.
    pub fn assign_row(
        &self,
        cursor: &dyn ResultCursor,
        object: &mut T,
        skip_id: bool,
    ) -> Result<()> {
        let positions = self.positions(cursor)?;
        for (position, &index) in positions.iter().zip(&self.result_indices) {
            let field = self.table.field(index);
            if skip_id && field.is_id_like() {
                continue;
            }
            let value = field.persister.from_result(cursor, *position)?;
            field.assign(object, value)?;
        }
        self.install_collections(cursor, positions, object)
    }

    fn install_collections(
        &self,
        cursor: &dyn ResultCursor,
        positions: &[usize],
        object: &mut T,
    ) -> Result<()> {
        if self.table.collection_indices().is_empty() {
            return Ok(());
        }
        let owner_id = self.row_id(cursor, positions)?.with_context(|| {
            format!(
                "The projection of {} must include the id to build its collections",
                self.table.table_name()
            )
        })?;
        for &index in self.table.collection_indices() {
            let field = self.table.field(index);
            let key_column = field.key_column.as_deref().with_context(|| {
                format!("Field {} does not name its key column", field.field_name)
            })?;
            let seed = CollectionSeed::new(owner_id.clone(), key_column.to_owned());
            field.assign_collection(object, seed)?;
        }
        Ok(())
    }

    fn positions(&self, cursor: &dyn ResultCursor) -> Result<&[usize]> {
        if let Some(positions) = self.positions.get() {
            return Ok(positions);
        }
        let computed = self
            .result_indices
            .iter()
            .map(|&index| cursor.find_column(&self.table.field(index).column_name))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.positions.get_or_init(|| computed))
    }

    /// The row's native id value, when the id is part of the projection
    /// and the column is non-null.
    fn row_id(&self, cursor: &dyn ResultCursor, positions: &[usize]) -> Result<Option<Value>> {
        let Some((id_index, id_field)) = self.table.id_field() else {
            return Ok(None);
        };
        let Some(slot) = self.result_indices.iter().position(|&i| i == id_index) else {
            return Ok(None);
        };
        let value = id_field.persister.from_result(cursor, positions[slot])?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    fn row_key(&self, cursor: &dyn ResultCursor, positions: &[usize]) -> Result<Option<IdKey>> {
        match self.row_id(cursor, positions)? {
            Some(id) => Ok(Some(IdKey::try_from(&id)?)),
            None => Ok(None),
        }
    }
}
