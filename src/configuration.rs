use std::sync::Arc;

use crate::assign::WorkerPlan;
use crate::row::RowSet;
use crate::sink::SinkFactory;

/// Defines a single ingestion run.
pub struct Configuration {
    /// The rows to be ingested, shared by all worker lanes.
    pub rows: Arc<RowSet>,

    /// Chunks of `rows`, grouped by the worker lane which should send them.
    ///
    /// The tool spawns one tokio task per lane. Each task sends its chunks
    /// sequentially, in the order given by the plan. There is no ordering
    /// between chunks of different lanes.
    ///
    /// Must be a plan built for `rows`, see [crate::partition::partition].
    pub plan: WorkerPlan,

    /// Creates the destination for each of the worker lanes.
    pub sink_factory: Arc<dyn SinkFactory>,
}
