use tracing::debug;

use crate::chunk::Chunk;
use crate::error::{ensure_arg, Result};

/// Maps every worker lane to the ordered list of chunks it should ingest.
///
/// Lanes are indexed `0..worker_count()`. Every lane is present, even
/// if it did not receive any chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerPlan {
    lanes: Vec<Vec<Chunk>>,
}

impl WorkerPlan {
    /// Builds a plan from explicit per-worker chunk lists.
    ///
    /// Intended for callers which distribute chunks on their own; such plans
    /// should be checked with [crate::validate::validate_worker_plan].
    pub fn from_lanes(lanes: Vec<Vec<Chunk>>) -> Self {
        Self { lanes }
    }

    pub fn worker_count(&self) -> usize {
        self.lanes.len()
    }

    /// Returns the chunks of the given worker, in the order they should be sent,
    /// or `None` if there is no such worker.
    pub fn chunks_for(&self, worker: usize) -> Option<&[Chunk]> {
        self.lanes.get(worker).map(Vec::as_slice)
    }

    pub fn lanes(&self) -> impl Iterator<Item = (usize, &[Chunk])> + '_ {
        self.lanes
            .iter()
            .enumerate()
            .map(|(worker, chunks)| (worker, chunks.as_slice()))
    }

    pub fn into_lanes(self) -> Vec<Vec<Chunk>> {
        self.lanes
    }

    pub fn chunk_count(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn row_count(&self) -> usize {
        self.lanes.iter().flatten().map(Chunk::len).sum()
    }
}

/// Distributes `chunks` across `worker_count` lanes in a round-robin fashion.
///
/// The chunk at position `i` goes to worker `i % worker_count`, so each
/// worker receives its chunks in ascending original order.
pub fn assign(chunks: &[Chunk], worker_count: usize) -> Result<WorkerPlan> {
    ensure_arg!(worker_count > 0, "worker count must be greater than zero");

    let mut lanes: Vec<Vec<Chunk>> = vec![Vec::new(); worker_count];
    for (i, chunk) in chunks.iter().enumerate() {
        lanes[i % worker_count].push(chunk.clone());
    }

    debug!(chunks = chunks.len(), worker_count, "assigned chunks to workers");

    Ok(WorkerPlan { lanes })
}
