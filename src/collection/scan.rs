//! Predicate Scan
//!
//! Lazy, forward-only iteration over matching rows in ascending row order.

use crate::error::Result;

use super::{Collection, Record};

/// One packed predicate term
pub(super) struct Term {
    /// Byte offset of the column within a row
    pub offset: usize,
    /// Predicate value packed with the column's codec
    pub expected: Vec<u8>,
}

/// Iterator over the rows matching a query
///
/// Each row is read once; its bytes are compared field by field against the
/// packed predicate and only matches are decoded, from that same buffer, so a
/// concurrent rewrite can never produce a record that fails the predicate.
/// The row count is fixed when the scan starts. Iteration ends after the
/// first error.
pub struct Scan<'a> {
    collection: &'a Collection,
    terms: Vec<Term>,
    next: u64,
    end: u64,
    scratch: Vec<u8>,
}

impl<'a> Scan<'a> {
    pub(super) fn new(collection: &'a Collection, terms: Vec<Term>, end: u64) -> Self {
        Self {
            collection,
            terms,
            next: 0,
            end,
            scratch: Vec::new(),
        }
    }

    /// Read row `index` into scratch and compare each term, stopping at the
    /// first mismatch
    fn matches(&mut self, index: u64) -> Result<bool> {
        let layout = self.collection.layout();
        self.scratch.resize(layout.row_size(), 0);
        self.collection
            .file
            .read_at(layout.row_offset(index), &mut self.scratch)?;

        let row = &self.scratch;
        Ok(self
            .terms
            .iter()
            .all(|term| row[term.offset..term.offset + term.expected.len()] == term.expected[..]))
    }
}

impl<'a> Iterator for Scan<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.end {
            let index = self.next;
            self.next += 1;

            let result = match self.matches(index) {
                Ok(false) => continue,
                Ok(true) => self.collection.decode_row(index, &self.scratch),
                Err(e) => Err(e),
            };

            if result.is_err() {
                self.next = self.end;
            }
            return Some(result);
        }
        None
    }
}
