//! Mock database module
//!
//! In-memory mapping from a collection name to an ordered list of records.
//! Each record is a JSON object carrying an integer `id` assigned by the store.
//! The database is passed around as an explicit handle (see `AppState`);
//! every operation holds the lock for its whole duration.

mod seed;

pub use seed::load_seed_file;

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

/// A single stored record: field name -> value
pub type Record = Map<String, Value>;

/// Name of the identifier field managed by the store
pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    LockPoisoned(&'static str),
    Seed(String),
    /// The collection's id counter reached `u64::MAX`
    IdsExhausted(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {operation}")
            }
            Self::Seed(detail) => write!(f, "invalid seed data: {detail}"),
            Self::IdsExhausted(collection) => {
                write!(f, "no ids left in collection '{collection}'")
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Records of one collection plus its id counter
#[derive(Debug, Default)]
struct Collection {
    records: Vec<Record>,
    /// Highest id ever handed out; ids are never reused
    last_id: u64,
}

impl Collection {
    fn position(&self, id: u64) -> Option<usize> {
        self.records.iter().position(|r| record_id(r) == Some(id))
    }

    fn next_id(&mut self, collection: &str) -> Result<u64, StoreError> {
        self.last_id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| StoreError::IdsExhausted(collection.to_string()))?;
        Ok(self.last_id)
    }
}

/// In-memory mock database
#[derive(Debug, Default)]
pub struct MockDb {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MockDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert seed records into a collection.
    ///
    /// Records that already carry an `id` keep it (it must be a non-negative
    /// integer not used yet in the collection); the others get a fresh one.
    pub fn seed(&self, collection: &str, records: Vec<Record>) -> Result<(), StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("seed"))?;
        let coll = collections.entry(collection.to_string()).or_default();

        for mut record in records {
            let id = match record.get(ID_FIELD) {
                None => coll.next_id(collection)?,
                Some(value) => {
                    let id = value.as_u64().ok_or_else(|| {
                        StoreError::Seed(format!(
                            "record in '{collection}' has a non-integer id: {value}"
                        ))
                    })?;
                    if coll.position(id).is_some() {
                        return Err(StoreError::Seed(format!(
                            "duplicate id {id} in collection '{collection}'"
                        )));
                    }
                    coll.last_id = coll.last_id.max(id);
                    id
                }
            };
            record.insert(ID_FIELD.to_string(), Value::from(id));
            coll.records.push(record);
        }
        Ok(())
    }

    /// All records of a collection, in insertion order.
    /// An unknown collection reads as empty.
    pub fn get(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("get"))?;
        Ok(collections
            .get(collection)
            .map(|c| c.records.clone())
            .unwrap_or_default())
    }

    pub fn get_by_id(&self, collection: &str, id: u64) -> Result<Option<Record>, StoreError> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::LockPoisoned("get_by_id"))?;
        Ok(collections
            .get(collection)
            .and_then(|c| c.position(id).map(|i| c.records[i].clone())))
    }

    /// Append a record and return it with its newly assigned id.
    /// Any `id` supplied by the caller is replaced.
    pub fn create(&self, collection: &str, mut record: Record) -> Result<Record, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("create"))?;
        let coll = collections.entry(collection.to_string()).or_default();

        let id = coll.next_id(collection)?;
        record.insert(ID_FIELD.to_string(), Value::from(id));
        coll.records.push(record.clone());
        Ok(record)
    }

    /// Merge `fields` into the record with the given id.
    ///
    /// Returns `None` when no such record exists. The `id` field itself is
    /// never overwritten.
    pub fn update_by_id(
        &self,
        collection: &str,
        id: u64,
        fields: Record,
    ) -> Result<Option<Record>, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("update_by_id"))?;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(index) = coll.position(id) else {
            return Ok(None);
        };

        let record = &mut coll.records[index];
        for (key, value) in fields {
            if key != ID_FIELD {
                record.insert(key, value);
            }
        }
        Ok(Some(record.clone()))
    }

    /// Remove the record with the given id. Returns whether one was removed.
    pub fn delete_by_id(&self, collection: &str, id: u64) -> Result<bool, StoreError> {
        let mut collections = self
            .collections
            .write()
            .map_err(|_| StoreError::LockPoisoned("delete_by_id"))?;
        let Some(coll) = collections.get_mut(collection) else {
            return Ok(false);
        };
        match coll.position(id) {
            Some(index) => {
                coll.records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
impl MockDb {
    /// A database whose lock was poisoned by a panicking writer
    pub(crate) fn poisoned() -> std::sync::Arc<Self> {
        let db = std::sync::Arc::new(Self::new());
        let writer = std::sync::Arc::clone(&db);
        let _ = std::thread::spawn(move || {
            let _guard = writer.collections.write().unwrap();
            panic!("writer died holding the store lock");
        })
        .join();
        db
    }
}

/// Read the store-managed id of a record
pub fn record_id(record: &Record) -> Option<u64> {
    record.get(ID_FIELD).and_then(Value::as_u64)
}
