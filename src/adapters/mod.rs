// Adapters layer: concrete implementations for external systems (filesystem, capture formats)

pub mod activedns;
pub mod storage;

pub use activedns::TxtExtractor;
pub use storage::LocalStorage;
