#[cfg(test)]
pub(crate) mod test_util;

pub mod assign;
pub mod chunk;
pub mod configuration;
pub mod error;
pub mod generator;
pub mod ilp;
pub mod partition;
pub mod row;
pub mod run;
pub mod schema;
pub mod sink;
pub mod stats;
pub mod store;
pub mod validate;
pub mod version;

pub use assign::{assign, WorkerPlan};
pub use chunk::{chunk, Chunk};
pub use error::{Error, Result, SplitMismatch};
pub use generator::{clip_add, generate};
pub use partition::partition;
pub use row::{Row, RowSet};
pub use validate::{validate_chunking, validate_worker_plan};
