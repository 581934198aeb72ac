pub mod aggregator;
pub mod classifier;
pub mod differ;
pub mod engine;
pub mod mining;
pub mod rollup;
pub mod snapshot;

pub use crate::domain::model::{Category, ChangeSet, Snapshot};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
