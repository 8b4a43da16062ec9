// Shows resource types

use serde_json::Value;

use crate::store::{Record, ID_FIELD};

/// Collection holding the shows
pub const SHOWS: &str = "shows";

/// A show as stored by the mock database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Show {
    pub id: u64,
    pub name: String,
    pub episodes_seen: u64,
}

impl Show {
    fn new(id: u64, name: &str, episodes_seen: u64) -> Self {
        Self {
            id,
            name: name.to_string(),
            episodes_seen,
        }
    }
}

impl From<Show> for Record {
    fn from(show: Show) -> Self {
        let mut record = Self::new();
        record.insert(ID_FIELD.to_string(), Value::from(show.id));
        record.insert("name".to_string(), Value::from(show.name));
        record.insert("episodes_seen".to_string(), Value::from(show.episodes_seen));
        record
    }
}

/// Shows the database starts with when `store.seed` is on
pub fn default_shows() -> Vec<Record> {
    vec![
        Show::new(1, "Game of Thrones", 0),
        Show::new(2, "Naruto", 220),
        Show::new(3, "Black Mirror", 3),
        Show::new(4, "Brooklyn Nine-Nine", 0),
    ]
    .into_iter()
    .map(Record::from)
    .collect()
}
