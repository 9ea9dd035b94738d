use crate::{Result, Value};
use anyhow::bail;
use rust_decimal::Decimal;
use std::{cell::RefCell, collections::HashMap, rc::Rc};
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

/// Hashable form of an id value. Floats key by their bit pattern.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum IdKey {
    Bool(bool),
    Char(char),
    Int(i64),
    FloatBits(u64),
    Decimal(Decimal),
    Text(String),
    Bytes(Box<[u8]>),
    Date(Date),
    Timestamp(PrimitiveDateTime),
    Uuid(Uuid),
    Enum(i32),
}

impl TryFrom<&Value> for IdKey {
    type Error = crate::Error;

    fn try_from(value: &Value) -> Result<Self> {
        Ok(match value {
            Value::Boolean(Some(v)) => IdKey::Bool(*v),
            Value::Char(Some(v)) => IdKey::Char(*v),
            Value::Int16(Some(v)) => IdKey::Int(*v as i64),
            Value::Int32(Some(v)) => IdKey::Int(*v as i64),
            Value::Int64(Some(v)) => IdKey::Int(*v),
            Value::Float32(Some(v)) => IdKey::FloatBits((*v as f64).to_bits()),
            Value::Float64(Some(v)) => IdKey::FloatBits(v.to_bits()),
            Value::Decimal(Some(v)) => IdKey::Decimal(*v),
            Value::Varchar(Some(v)) => IdKey::Text(v.clone()),
            Value::Blob(Some(v)) => IdKey::Bytes(v.clone()),
            Value::Date(Some(v)) => IdKey::Date(*v),
            Value::Timestamp(Some(v)) => IdKey::Timestamp(*v),
            Value::Uuid(Some(v)) => IdKey::Uuid(*v),
            Value::Enum(Some(v)) => IdKey::Enum(v.ordinal),
            _ => bail!("{:?} cannot key the identity cache", value),
        })
    }
}

/// Per-session map from id to the instance already materialized for it.
///
/// An aide for duplicate avoidance and for resolving cross-references
/// within one result set, never required for correctness. The interior
/// mutability is single-threaded; callers wanting concurrent queries use
/// independent cache instances. A hit during recursive materialization may
/// observe an instance whose foreign collections are not installed yet;
/// scalar columns are always complete by then.
pub struct IdentityCache<T> {
    entries: RefCell<HashMap<IdKey, Rc<RefCell<T>>>>,
}

impl<T> IdentityCache<T> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &IdKey) -> Option<Rc<RefCell<T>>> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn insert(&self, key: IdKey, object: Rc<RefCell<T>>) {
        self.entries.borrow_mut().insert(key, object);
    }

    pub fn remove(&self, key: &IdKey) -> Option<Rc<RefCell<T>>> {
        self.entries.borrow_mut().remove(key)
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<T> Default for IdentityCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
