pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::storage::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::classifier::Classifier;
pub use core::differ::{Differ, IdentityKind};
pub use core::engine::AuditEngine;
pub use core::snapshot::SnapshotBuilder;
pub use domain::model::{Category, ChangeSet, Snapshot};
pub use domain::ports::{Pipeline, Storage};
pub use utils::error::{AuditError, Result};
