//! Schema and Row Layout
//!
//! A schema is an ordered list of named fields; the layout turns it into a
//! fixed row size and per-column byte offsets.
//!
//! ```text
//! schema { created: DateTime, username: InlineText(255) }
//!
//! ┌──────────────────┬──────────────────────────────────┐
//! │ created  @0  (8) │ username  @8  (256)              │  row_size = 264
//! └──────────────────┴──────────────────────────────────┘
//! ```

use std::collections::HashSet;
use std::str::FromStr;

use crate::error::{Result, RowDbError};
use crate::field::Field;

// =============================================================================
// Schema
// =============================================================================

/// Ordered mapping from column name to field codec
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<(String, Field)>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Columns in row order
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.columns.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.position(name).map(|i| &self.columns[i].1)
    }

    /// Index of `name` in row order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl FromStr for Schema {
    type Err = RowDbError;

    /// Parse `name:type,name:type`, e.g. `created:datetime,username:inline(255)`
    fn from_str(s: &str) -> Result<Self> {
        let mut builder = Schema::builder();
        for column in s.split(',').filter(|c| !c.trim().is_empty()) {
            let (name, ty) = column
                .split_once(':')
                .ok_or_else(|| RowDbError::Schema(format!("expected name:type, got {:?}", column)))?;
            builder = builder.column(name.trim(), ty.parse::<Field>()?);
        }
        builder.build()
    }
}

/// Builder for Schema
#[derive(Default)]
pub struct SchemaBuilder {
    columns: Vec<(String, Field)>,
}

impl SchemaBuilder {
    /// Append a column (row order follows call order)
    pub fn column(mut self, name: impl Into<String>, field: Field) -> Self {
        self.columns.push((name.into(), field));
        self
    }

    /// Validate and build; rejects empty schemas and duplicate names
    pub fn build(self) -> Result<Schema> {
        if self.columns.is_empty() {
            return Err(RowDbError::Schema("schema has no columns".to_string()));
        }

        let mut seen = HashSet::new();
        for (name, _) in &self.columns {
            if name.is_empty() {
                return Err(RowDbError::Schema("empty column name".to_string()));
            }
            if !seen.insert(name.as_str()) {
                return Err(RowDbError::Schema(format!("duplicate column {:?}", name)));
            }
        }

        Ok(Schema {
            columns: self.columns,
        })
    }
}

// =============================================================================
// Row Layout
// =============================================================================

/// Placement of one column inside a row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub name: String,
    /// Byte offset from the start of the row
    pub offset: usize,
    pub size: usize,
}

/// Fixed row geometry computed once per collection open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    row_size: usize,
    columns: Vec<ColumnLayout>,
}

impl RowLayout {
    /// Compute offsets: each column starts where the previous one ends
    pub fn new(schema: &Schema) -> Self {
        let mut offset = 0;
        let columns = schema
            .columns()
            .map(|(name, field)| {
                let column = ColumnLayout {
                    name: name.to_string(),
                    offset,
                    size: field.size(),
                };
                offset += column.size;
                column
            })
            .collect();

        Self {
            row_size: offset,
            columns,
        }
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    /// Column placements in row order
    pub fn columns(&self) -> &[ColumnLayout] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> &ColumnLayout {
        &self.columns[index]
    }

    /// Absolute file offset of row `index`
    pub fn row_offset(&self, index: u64) -> u64 {
        index * self.row_size as u64
    }
}
