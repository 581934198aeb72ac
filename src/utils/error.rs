use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid rule '{label}': {reason}")]
    InvalidRule { label: String, reason: String },

    #[error("Corrupt snapshot '{source_name}': {reason}")]
    CorruptSnapshot { source_name: String, reason: String },

    #[error("No date label found in file name '{path}'")]
    MissingDateLabel { path: String },

    #[error("Invalid value for '{field}': '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// 錯誤分類，用於決定退出碼與提示
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Config,
    Data,
    System,
}

impl AuditError {
    pub fn corrupt(source_name: &str, reason: impl Into<String>) -> Self {
        AuditError::CorruptSnapshot {
            source_name: source_name.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AuditError::IoError(_) => ErrorCategory::System,
            AuditError::ConfigError { .. }
            | AuditError::InvalidRule { .. }
            | AuditError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            AuditError::MissingDateLabel { .. } | AuditError::ValidationError { .. } => {
                ErrorCategory::Input
            }
            AuditError::CsvError(_)
            | AuditError::SerializationError(_)
            | AuditError::CorruptSnapshot { .. } => ErrorCategory::Data,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Input => 2,
            ErrorCategory::Config => 3,
            ErrorCategory::Data => 4,
            ErrorCategory::System => 1,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AuditError::IoError(_) => "Check that the input path exists and the output directory is writable",
            AuditError::SerializationError(_) | AuditError::CorruptSnapshot { .. } => {
                "Re-run `classify` or `diff` to regenerate the JSON file"
            }
            AuditError::CsvError(_) => "Check free disk space and the output directory",
            AuditError::ConfigError { .. } | AuditError::InvalidRule { .. } => {
                "Fix the rule table TOML, or drop --rules to use the built-in table"
            }
            AuditError::MissingDateLabel { .. } => {
                "Name capture files with a YYYYMMDD date, e.g. activedns-20171101-class.json"
            }
            AuditError::InvalidConfigValueError { .. } | AuditError::ValidationError { .. } => {
                "Run with --help to see the expected arguments"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AuditError::CorruptSnapshot { source_name, .. } => {
                format!("{} is not a valid classified snapshot", source_name)
            }
            AuditError::MissingDateLabel { path } => {
                format!("Cannot tell which capture date {} belongs to", path)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuditError>;
