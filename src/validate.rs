//! Consistency checks for chunking and worker assignment.
//!
//! Both checks are pure and only ever read the row set. A failure means the
//! partitioning code is broken, so callers must abort the benchmark instead
//! of ingesting a corrupted split.

use tracing::debug;

use crate::assign::WorkerPlan;
use crate::chunk::Chunk;
use crate::error::{Result, SplitMismatch};
use crate::row::{Row, RowSet};

/// Checks that concatenating `chunks` in order reproduces `rows` exactly.
///
/// Chunks are views into `rows`, so this comes down to verifying that the
/// chunk boundaries are contiguous, start at the first row and end
/// at the last one.
pub fn validate_chunking(rows: &RowSet, chunks: &[Chunk]) -> Result<()> {
    let mut expected_start = 0;
    for (position, chunk) in chunks.iter().enumerate() {
        if chunk.start != expected_start {
            return Err(SplitMismatch::ChunkBoundary {
                chunk: position,
                expected_start,
                actual_start: chunk.start,
            }
            .into());
        }
        expected_start = chunk.start + chunk.len();
        if expected_start > rows.len() {
            return Err(SplitMismatch::ChunkOutOfBounds {
                chunk: position,
                end: expected_start,
                len: rows.len(),
            }
            .into());
        }
    }

    if expected_start != rows.len() {
        return Err(SplitMismatch::RowCount {
            expected: rows.len(),
            actual: expected_start,
        }
        .into());
    }

    debug!(chunks = chunks.len(), "chunking validated");
    Ok(())
}

/// Checks that pooling the chunks of all workers reconstitutes `rows`.
///
/// The rows of all lanes are pooled together and ordered by timestamp,
/// then compared with a timestamp-ordered view of `rows`. The lane traversal
/// order does not matter; timestamps are assumed to be unique.
pub fn validate_worker_plan(rows: &RowSet, plan: &WorkerPlan) -> Result<()> {
    let mut pooled: Vec<&Row> = Vec::with_capacity(rows.len());
    for (_, lane) in plan.lanes() {
        for chunk in lane {
            if chunk.start + chunk.len() > rows.len() {
                return Err(SplitMismatch::ChunkOutOfBounds {
                    chunk: chunk.index,
                    end: chunk.start + chunk.len(),
                    len: rows.len(),
                }
                .into());
            }
            pooled.extend(chunk.rows(rows));
        }
    }

    if pooled.len() != rows.len() {
        return Err(SplitMismatch::RowCount {
            expected: rows.len(),
            actual: pooled.len(),
        }
        .into());
    }

    pooled.sort_by_key(|row| row.timestamp);
    let mut expected: Vec<&Row> = rows.iter().collect();
    expected.sort_by_key(|row| row.timestamp);

    if let Some(index) = pooled
        .iter()
        .zip(expected.iter())
        .position(|(actual, expected)| actual != expected)
    {
        return Err(SplitMismatch::Row { index }.into());
    }

    debug!(
        workers = plan.worker_count(),
        rows = pooled.len(),
        "worker plan validated"
    );
    Ok(())
}
