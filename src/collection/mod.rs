//! Collection Module
//!
//! The record store: one data file of fixed-width rows per collection.
//!
//! ## Responsibilities
//! - Append rows and hand out row ids
//! - Point lookups by id
//! - Predicate scans comparing packed bytes without decoding
//! - In-place rewrites that never change the file size
//!
//! ## File Format
//! ```text
//! {dir}/data.db
//! ┌──────────────┬──────────────┬──────────────┬─────
//! │ Row 0        │ Row 1        │ Row 2        │ ...
//! └──────────────┴──────────────┴──────────────┴─────
//! offset(i) = i * row_size, no header or footer
//! ```

mod file;
mod query;
mod record;
mod scan;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::config::CollectionConfig;
use crate::error::{Result, RowDbError};
use crate::field::{Field, Value};
use crate::layout::{RowLayout, Schema};

use file::RowFile;
use scan::Term;

pub use query::{Patch, Query};
pub use record::{Record, RowId};
pub use scan::Scan;

/// An open collection
///
/// ## Concurrency:
/// - `file`: every access is a positional read/write under its own mutex
/// - `rows`: atomic row count, published after the row bytes are written
/// - `write_lock`: serializes insert/update/update_one
///
/// Readers (`by_id`, `all`, `one`) never take the write lock; a scan sees
/// the rows that existed when it started. Nothing guards against a second
/// process opening the same directory.
pub struct Collection {
    config: CollectionConfig,
    schema: Schema,
    layout: RowLayout,
    file: RowFile,
    rows: AtomicU64,
    write_lock: Mutex<()>,
}

impl Collection {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const DATA_FILENAME: &'static str = "data.db";

    /// Open or create the collection in `config.dir`
    ///
    /// The schema is not persisted: it must be supplied identically on every
    /// open, or existing rows are silently misread.
    pub fn open(config: CollectionConfig, schema: Schema) -> Result<Self> {
        let layout = RowLayout::new(&schema);
        let row_size = layout.row_size() as u64;
        let (file, file_len) = RowFile::open(&config.dir.join(Self::DATA_FILENAME))?;

        let rows = file_len / row_size;
        let torn = file_len % row_size;
        if torn != 0 {
            tracing::warn!(
                path = %file.path().display(),
                torn_bytes = torn,
                "data file ends in a partial row; it will be overwritten by the next insert"
            );
        }

        tracing::debug!(
            dir = %config.dir.display(),
            row_size,
            rows,
            "collection opened"
        );

        Ok(Self {
            config,
            schema,
            layout,
            file,
            rows: AtomicU64::new(rows),
            write_lock: Mutex::new(()),
        })
    }

    /// Open with a directory path and numeric ids
    pub fn open_path(path: &Path, schema: Schema) -> Result<Self> {
        let config = CollectionConfig::builder().dir(path).build();
        Self::open(config, schema)
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Append a row; every schema column must be given exactly once
    ///
    /// Returns the new row's id: the number of rows before the insert.
    pub fn insert<I, K>(&self, record: I) -> Result<RowId>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut slots: Vec<Option<Value>> = vec![None; self.schema.len()];
        for (column, value) in record {
            let (position, _) = self.column(column.as_ref())?;
            slots[position] = Some(value);
        }

        let values = slots
            .into_iter()
            .zip(self.layout.columns())
            .map(|(value, column)| value.ok_or_else(|| RowDbError::MissingColumn(column.name.clone())))
            .collect::<Result<Vec<_>>>()?;

        let row = self.pack_row(values.iter())?;

        let _write_guard = self.write_lock.lock();
        let index = self.rows.load(Ordering::Acquire);
        self.file.write_at(self.layout.row_offset(index), &row)?;
        self.rows.store(index + 1, Ordering::Release);

        tracing::trace!(index, "row inserted");
        Ok(self.row_id(index))
    }

    /// Fetch a single row
    ///
    /// Returns `RowNotFound` when the id is past the last row.
    pub fn by_id(&self, id: impl Into<RowId>) -> Result<Record> {
        let index = id.into().index()?;
        if index >= self.len() {
            return Err(RowDbError::RowNotFound(index));
        }
        self.read_record(index)
    }

    /// Lazily scan rows matching `query`, in ascending row order
    ///
    /// Predicate values are packed once up front; blob-backed columns store
    /// the predicate payload as a side effect of packing.
    pub fn all(&self, query: &Query) -> Result<Scan<'_>> {
        let mut terms = Vec::new();
        for (column, value) in query.terms() {
            let (position, field) = self.column(column)?;
            let layout = self.layout.column(position);

            let mut expected = vec![0u8; layout.size];
            field.pack(value, &mut expected)?;
            terms.push(Term {
                offset: layout.offset,
                expected,
            });
        }

        Ok(Scan::new(self, terms, self.len()))
    }

    /// First row matching `query`, if any
    pub fn one(&self, query: &Query) -> Result<Option<Record>> {
        self.all(query)?.next().transpose()
    }

    /// Rewrite every row matching `query` with `patch` applied
    ///
    /// Returns the ids of the rewritten rows in ascending order.
    pub fn update(&self, query: &Query, patch: &Patch) -> Result<Vec<RowId>> {
        self.check_patch(patch)?;

        let _write_guard = self.write_lock.lock();
        let mut updated = Vec::new();
        for record in self.all(query)? {
            let record = record?;
            self.rewrite(&record, patch)?;
            updated.push(record.id().clone());
        }

        tracing::debug!(count = updated.len(), "rows updated");
        Ok(updated)
    }

    /// Rewrite the first row matching `query`; `None` when nothing matched
    pub fn update_one(&self, query: &Query, patch: &Patch) -> Result<Option<RowId>> {
        self.check_patch(patch)?;

        let _write_guard = self.write_lock.lock();
        let Some(record) = self.one(query)? else {
            return Ok(None);
        };
        self.rewrite(&record, patch)?;

        tracing::debug!(id = %record.id(), "row updated");
        Ok(Some(record.id().clone()))
    }

    /// Flush written rows to disk
    pub fn sync(&self) -> Result<()> {
        self.file.sync()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of rows
    pub fn len(&self) -> u64 {
        self.rows.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row_size(&self) -> usize {
        self.layout.row_size()
    }

    pub fn layout(&self) -> &RowLayout {
        &self.layout
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Path of the data file
    pub fn data_path(&self) -> &Path {
        self.file.path()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Position and codec of a named column
    fn column(&self, name: &str) -> Result<(usize, &Field)> {
        self.schema
            .columns()
            .enumerate()
            .find(|(_, (column, _))| *column == name)
            .map(|(position, (_, field))| (position, field))
            .ok_or_else(|| RowDbError::UnknownColumn(name.to_string()))
    }

    fn row_id(&self, index: u64) -> RowId {
        RowId::for_index(index, self.config.id_mode)
    }

    /// Pack one value per column (schema order) into a fresh row buffer
    fn pack_row<'v>(&self, values: impl Iterator<Item = &'v Value>) -> Result<Vec<u8>> {
        let mut row = vec![0u8; self.layout.row_size()];
        for ((_, field), (column, value)) in self
            .schema
            .columns()
            .zip(self.layout.columns().iter().zip(values))
        {
            field.pack(value, &mut row[column.offset..column.offset + column.size])?;
        }
        Ok(row)
    }

    /// Read and decode row `index`
    fn read_record(&self, index: u64) -> Result<Record> {
        let mut row = vec![0u8; self.layout.row_size()];
        self.file.read_at(self.layout.row_offset(index), &mut row)?;
        self.decode_row(index, &row)
    }

    /// Decode the bytes of row `index`
    fn decode_row(&self, index: u64, row: &[u8]) -> Result<Record> {
        let mut reader = row;
        let mut values = Vec::with_capacity(self.schema.len());
        for (name, field) in self.schema.columns() {
            values.push((name.to_string(), field.read(&mut reader)?));
        }
        Ok(Record::new(self.row_id(index), values))
    }

    fn check_patch(&self, patch: &Patch) -> Result<()> {
        for column in patch.columns() {
            self.column(column)?;
        }
        Ok(())
    }

    /// Merge `patch` over `record` and overwrite the row in place
    fn rewrite(&self, record: &Record, patch: &Patch) -> Result<()> {
        let merged = record
            .values()
            .map(|(name, existing)| patch.get(name).unwrap_or(existing));
        let row = self.pack_row(merged)?;

        let index = record.id().index()?;
        self.file.write_at(self.layout.row_offset(index), &row)
    }
}
