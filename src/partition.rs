use tracing::info;

use crate::assign::{assign, WorkerPlan};
use crate::chunk::chunk;
use crate::error::Result;
use crate::row::RowSet;
use crate::validate::{validate_chunking, validate_worker_plan};

/// Splits `rows` into chunks of `chunk_size` rows and deals them out
/// to `worker_count` workers.
///
/// Both the chunking and the resulting plan are validated before the plan
/// is returned; a mismatch is reported as [crate::Error::SplitMismatch].
pub fn partition(rows: &RowSet, worker_count: usize, chunk_size: usize) -> Result<WorkerPlan> {
    let chunks = chunk(rows, chunk_size)?;
    validate_chunking(rows, &chunks)?;

    let plan = assign(&chunks, worker_count)?;
    validate_worker_plan(rows, &plan)?;

    info!(
        rows = rows.len(),
        chunks = chunks.len(),
        worker_count,
        chunk_size,
        "partitioned rows across workers"
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_util::small_rowset;

    #[test]
    fn test_partition() {
        let rows = small_rowset(1000);
        let plan = partition(&rows, 4, 100).unwrap();
        assert_eq!(plan.worker_count(), 4);
        assert_eq!(plan.chunk_count(), 10);
        assert_eq!(plan.row_count(), 1000);
        assert_eq!(plan.chunks_for(0).unwrap().len(), 3);
        assert_eq!(plan.chunks_for(3).unwrap().len(), 2);
    }

    #[test]
    fn test_partition_invalid_arguments() {
        let rows = small_rowset(10);
        assert!(matches!(
            partition(&rows, 0, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            partition(&rows, 2, 0),
            Err(Error::InvalidArgument(_))
        ));
    }
}
