#[cfg(feature = "cli")]
pub mod cli;
pub mod rule_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, Command, LogFormat};
pub use rule_config::RuleTableConfig;
