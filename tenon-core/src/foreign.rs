use crate::{
    Connection, Dialect, IdentityCache, ParentRef, QueryBuilder, Result, TableDef, Value,
};
use std::{
    cell::{OnceCell, RefCell},
    fmt::{self, Debug, Formatter},
    rc::Rc,
};

/// What a foreign-collection field receives while its owner row is being
/// mapped: the owner's id and the child column that stores it.
#[derive(Clone, Debug)]
pub struct CollectionSeed {
    owner_id: Value,
    key_column: String,
}

impl CollectionSeed {
    pub(crate) fn new(owner_id: Value, key_column: String) -> Self {
        Self {
            owner_id,
            key_column,
        }
    }

    pub fn owner_id(&self) -> &Value {
        &self.owner_id
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }
}

/// Deferred collection of child rows bound to one owner row.
///
/// The first fetch runs a child query keyed by the owner id and memoizes
/// the materialized rows for the collection's lifetime.
pub struct ForeignCollection<C> {
    seed: CollectionSeed,
    loaded: OnceCell<Vec<Rc<RefCell<C>>>>,
}

impl<C: 'static> ForeignCollection<C> {
    pub fn new(seed: CollectionSeed) -> Self {
        Self {
            seed,
            loaded: OnceCell::new(),
        }
    }

    pub fn owner_id(&self) -> &Value {
        &self.seed.owner_id
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.get().is_some()
    }

    /// The rows of an earlier fetch, without touching the database.
    pub fn cached(&self) -> Option<&[Rc<RefCell<C>>]> {
        self.loaded.get().map(Vec::as_slice)
    }

    /// Loads the children on first use. `parent` lets each child's foreign
    /// field take the owner instance directly instead of querying it back.
    pub fn fetch(
        &self,
        table: &Rc<TableDef<C>>,
        dialect: &dyn Dialect,
        connection: &dyn Connection,
        cache: Option<&IdentityCache<C>>,
        parent: Option<&ParentRef>,
    ) -> Result<&[Rc<RefCell<C>>]> {
        if let Some(loaded) = self.loaded.get() {
            return Ok(loaded);
        }
        let mut query = QueryBuilder::new(table);
        query
            .where_()
            .eq(&self.seed.key_column, self.seed.owner_id.clone())?;
        let rows = query
            .compile(dialect)?
            .run_with_parent(connection, cache, parent)?;
        Ok(self.loaded.get_or_init(|| rows))
    }
}

impl<C> Debug for ForeignCollection<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ForeignCollection");
        debug.field("owner_id", &self.seed.owner_id);
        debug.field("key_column", &self.seed.key_column);
        match self.loaded.get() {
            Some(loaded) => debug.field("loaded", &loaded.len()),
            None => debug.field("loaded", &"pending"),
        };
        debug.finish()
    }
}
