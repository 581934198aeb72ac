// Domain layer: record/snapshot models and ports. No I/O beyond the Storage trait.

pub mod model;
pub mod ports;
