use crate::config::rule_config::RuleTableConfig;
use crate::core::aggregator::Orientation;
use crate::core::classifier::Classifier;
use crate::core::differ::IdentityKind;
use crate::app::pipelines::TimeseriesSource;
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_paths, validate_positive_number, Validate};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "txt-audit")]
#[command(about = "Classify DNS TXT records and track how they change across captures")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[arg(long, global = true, default_value = ".", help = "Directory relative paths are resolved against")]
    pub base_dir: String,

    #[arg(long, global = true, help = "TOML rule table replacing the built-in one")]
    pub rules: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Classify "domain rdata" lines into a snapshot JSON file
    Classify {
        input: String,
        output: String,
        #[arg(long, help = "Report identifiers shared by unknown records")]
        mine: bool,
    },
    /// Compare two snapshots
    Diff {
        old: String,
        new: String,
        output: String,
        #[arg(long, default_value = "prefix-count")]
        identity: IdentityKind,
    },
    /// Fold dated snapshots or diffs into CSV tables
    Timeseries {
        #[arg(required = true)]
        files: Vec<String>,
        #[arg(long)]
        output_dir: String,
        #[arg(long, default_value = "snapshots")]
        source: TimeseriesSource,
        #[arg(long, default_value = "dates")]
        orientation: Orientation,
    },
    /// Merge dated snapshots into one domain / category / date JSON file
    Merge {
        #[arg(required = true)]
        files: Vec<String>,
        #[arg(long)]
        output: String,
    },
    /// Print reporting-group counts of a snapshot
    Summary { snapshot: String },
    /// Print identifiers shared by the unknown records of a snapshot
    Mine { snapshot: String },
    /// Turn a snapshot back into "domain rdata" lines
    Strip { snapshot: String, output: String },
    /// Pull TXT records out of an ActiveDNS line-JSON capture
    Extract {
        input: String,
        output: String,
        #[arg(long)]
        max_rrsets: Option<usize>,
    },
}

impl CliConfig {
    /// 載入 --rules 指定的規則表，未指定時使用內建規則
    pub fn classifier(&self) -> Result<Classifier> {
        match &self.rules {
            Some(path) => {
                tracing::info!(rules = %path, "📋 Loading rule table");
                Classifier::from_config(&RuleTableConfig::from_file(path)?)
            }
            None => Classifier::builtin(),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("base_dir", &self.base_dir)?;
        if let Some(rules) = &self.rules {
            validate_path("rules", rules)?;
        }

        match &self.command {
            Command::Classify { input, output, .. } => {
                validate_path("input", input)?;
                validate_path("output", output)?;
            }
            Command::Diff { old, new, output, .. } => {
                validate_path("old", old)?;
                validate_path("new", new)?;
                validate_path("output", output)?;
            }
            Command::Timeseries { files, output_dir, .. } => {
                validate_paths("files", files, 2)?;
                validate_path("output_dir", output_dir)?;
            }
            Command::Merge { files, output } => {
                validate_paths("files", files, 2)?;
                validate_path("output", output)?;
            }
            Command::Summary { snapshot } | Command::Mine { snapshot } => {
                validate_path("snapshot", snapshot)?;
            }
            Command::Strip { snapshot, output } => {
                validate_path("snapshot", snapshot)?;
                validate_path("output", output)?;
            }
            Command::Extract {
                input,
                output,
                max_rrsets,
            } => {
                validate_path("input", input)?;
                validate_path("output", output)?;
                if let Some(max) = max_rrsets {
                    validate_positive_number("max_rrsets", *max, 1)?;
                }
            }
        }
        Ok(())
    }
}
