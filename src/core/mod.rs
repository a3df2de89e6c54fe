pub mod batcher;
pub mod date_filter;
pub mod parser;
pub mod pipeline;
pub mod processor;
pub mod projector;

pub use crate::domain::model::{Batch, ProjectedRecord, Record, RunSummary};
pub use crate::domain::ports::InputSource;
pub use crate::utils::error::Result;
