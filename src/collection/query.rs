//! Query predicates and update patches

use crate::field::Value;

/// Equality predicate over columns; a row matches when every term matches
///
/// Terms compare packed bytes, so two values match exactly when the
/// column's codec encodes them identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    terms: Vec<(String, Value)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// The empty query: matches every row
    pub fn all() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value` (replaces an earlier term on it)
    pub fn where_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        set(&mut self.terms, column.into(), value.into());
        self
    }

    pub fn terms(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.terms.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Query::new(), |query, (column, value)| query.where_eq(column, value))
    }
}

/// Column assignments applied by `update` / `update_one`
///
/// Only columns set on the patch change; a set value is always written,
/// including `0`, `""` and `false`-like values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    values: Vec<(String, Value)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `column` (replaces an earlier assignment)
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        set(&mut self.values, column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Patch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Patch::new(), |patch, (column, value)| patch.set(column, value))
    }
}

fn set(entries: &mut Vec<(String, Value)>, column: String, value: Value) {
    match entries.iter_mut().find(|(name, _)| *name == column) {
        Some(entry) => entry.1 = value,
        None => entries.push((column, value)),
    }
}
