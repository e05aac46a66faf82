use std::ops::Range;

use tracing::debug;

use crate::error::{ensure_arg, Result};
use crate::row::{Row, RowSet};

/// A contiguous range of rows of a [RowSet], used as a single ingestion batch.
///
/// A chunk does not own any rows, it only remembers its position in the
/// sequence produced by [chunk] and the boundaries of its row range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Position of the chunk in the sequence it was produced in.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.len()
    }

    /// Resolves the chunk against the row set it was produced from.
    pub fn rows<'a>(&self, rows: &'a RowSet) -> &'a [Row] {
        rows.slice(self.range())
    }
}

/// Splits `rows` into consecutive chunks of `chunk_size` rows.
///
/// Every chunk except the last one has exactly `chunk_size` rows, the last
/// one holds the remainder. The chunks cover the whole row set in order.
pub fn chunk(rows: &RowSet, chunk_size: usize) -> Result<Vec<Chunk>> {
    ensure_arg!(chunk_size > 0, "chunk size must be greater than zero");

    let total = rows.len();
    let chunks: Vec<Chunk> = (0..total)
        .step_by(chunk_size)
        .enumerate()
        .map(|(index, start)| Chunk {
            index,
            start,
            end: std::cmp::min(start + chunk_size, total),
        })
        .collect();

    debug!(rows = total, chunk_size, chunks = chunks.len(), "split row set");

    Ok(chunks)
}
