//! Decoded rows and row identifiers

use std::fmt;

use crate::config::IdMode;
use crate::error::Result;
use crate::field::Value;
use crate::id;

/// External identifier of a row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowId {
    /// Raw row index
    Index(u64),

    /// Surrogate string from `id::encode`
    Surrogate(String),
}

impl RowId {
    pub(crate) fn for_index(index: u64, mode: IdMode) -> Self {
        match mode {
            IdMode::Numeric => RowId::Index(index),
            IdMode::Surrogate => RowId::Surrogate(id::encode(index)),
        }
    }

    /// Resolve to a row index
    pub fn index(&self) -> Result<u64> {
        match self {
            RowId::Index(index) => Ok(*index),
            RowId::Surrogate(s) => id::decode(s),
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowId::Index(index) => write!(f, "{}", index),
            RowId::Surrogate(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RowId {
    fn from(index: u64) -> Self {
        RowId::Index(index)
    }
}

impl From<usize> for RowId {
    fn from(index: usize) -> Self {
        RowId::Index(index as u64)
    }
}

impl From<&str> for RowId {
    fn from(s: &str) -> Self {
        RowId::Surrogate(s.to_string())
    }
}

impl From<String> for RowId {
    fn from(s: String) -> Self {
        RowId::Surrogate(s)
    }
}

impl From<&RowId> for RowId {
    fn from(id: &RowId) -> Self {
        id.clone()
    }
}

/// A decoded row: its id plus one value per schema column, in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: RowId,
    values: Vec<(String, Value)>,
}

impl Record {
    pub(crate) fn new(id: RowId, values: Vec<(String, Value)>) -> Self {
        Self { id, values }
    }

    pub fn id(&self) -> &RowId {
        &self.id
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Column values in schema order
    pub fn values(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// `{"_id": ..., column: value, ...}`
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        let id = match &self.id {
            RowId::Index(index) => serde_json::Value::from(*index),
            RowId::Surrogate(s) => serde_json::Value::from(s.as_str()),
        };
        object.insert("_id".to_string(), id);
        for (name, value) in &self.values {
            object.insert(name.clone(), value.to_json());
        }
        serde_json::Value::Object(object)
    }
}
