use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::FutureExt;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::time::Instant;
use tracing::{debug, error};

use crate::chunk::Chunk;
use crate::configuration::Configuration;
use crate::error::Result;
use crate::row::RowSet;
use crate::sink::SinkFactory;
use crate::stats::RunStats;

// Represents state shared by all worker lanes.
struct WorkerContext {
    rows: Arc<RowSet>,
    sink_factory: Arc<dyn SinkFactory>,
    stopped: AtomicBool,
}

impl WorkerContext {
    // Prevents lanes from sending any more chunks
    pub fn ask_to_stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }

    fn should_stop(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }

    // Sends the chunks of one lane, in order, until all of them are sent,
    // the run is asked to stop or sending a chunk fails.
    pub async fn run_worker(&self, worker: usize, chunks: Vec<Chunk>) -> Result<RunStats> {
        let start_time = Instant::now();
        let mut stats = RunStats::default();
        let mut sink = self.sink_factory.create(worker).await?;

        for chunk in &chunks {
            if self.should_stop() {
                debug!(worker, chunk = chunk.index, "lane stopped early");
                return Ok(stats);
            }

            let rows = chunk.rows(&self.rows);
            match sink.send_chunk(rows).await {
                Ok(bytes) => stats.account_chunk(rows.len(), bytes),
                Err(err) => {
                    error!(
                        error = %err,
                        worker,
                        chunk = chunk.index,
                        rows = rows.len(),
                        "failed to send chunk",
                    );
                    return Err(err);
                }
            }
        }

        sink.finish().await?;
        stats.elapsed = start_time.elapsed();
        Ok(stats)
    }
}

/// Ingests all chunks of the configured plan, one tokio task per worker lane.
///
/// Chunks of a single lane are sent strictly in the plan's order. If any lane
/// fails, the remaining lanes are asked to stop and the first error is returned.
pub async fn run(config: Configuration) -> Result<RunStats> {
    let start_time = Instant::now();
    let ctx = Arc::new(WorkerContext {
        rows: config.rows,
        sink_factory: config.sink_factory,
        stopped: AtomicBool::new(false),
    });

    // Spawn one task for each worker lane
    let mut worker_handles = config
        .plan
        .into_lanes()
        .into_iter()
        .enumerate()
        .map(|(worker, chunks)| {
            let ctx_clone = Arc::clone(&ctx);
            let (fut, handle) =
                async move { ctx_clone.run_worker(worker, chunks).await }.remote_handle();
            tokio::task::spawn(fut);
            handle
        })
        .collect::<FuturesUnordered<_>>();

    let mut combined = RunStats::default();
    let mut first_error = None;

    // TODO: Collect all errors and report them
    while let Some(worker_result) = worker_handles.next().await {
        match worker_result {
            Ok(lane_stats) => combined.combine(&lane_stats),
            Err(err) => {
                if first_error.is_none() {
                    first_error = Some(err);
                    ctx.ask_to_stop();
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    combined.elapsed = start_time.elapsed();
    Ok(combined)
}
