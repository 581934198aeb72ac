use crate::utils::error::{AuditError, Result};
use chrono::NaiveDate;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// 擷取檔名中的日期標籤格式
pub const DATE_LABEL_FORMAT: &str = "%Y%m%d";

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_paths(field_name: &str, paths: &[String], min_count: usize) -> Result<()> {
    if paths.len() < min_count {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: paths.len().to_string(),
            reason: format!("At least {} input file(s) required", min_count),
        });
    }
    for path in paths {
        validate_path(field_name, path)?;
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 驗證日期標籤 (YYYYMMDD) 並回傳對應日期
pub fn validate_date_label(field_name: &str, label: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(label, DATE_LABEL_FORMAT).map_err(|e| {
        AuditError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: label.to_string(),
            reason: format!("Not a {} date: {}", DATE_LABEL_FORMAT, e),
        }
    })
}
