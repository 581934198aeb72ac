pub mod classify_pipeline;
pub mod diff_pipeline;
pub mod extract_pipeline;
pub mod merge_pipeline;
pub mod report_pipeline;
pub mod strip_pipeline;
pub mod timeseries_pipeline;

pub use classify_pipeline::ClassifyPipeline;
pub use diff_pipeline::DiffPipeline;
pub use extract_pipeline::ExtractPipeline;
pub use merge_pipeline::DomainMergePipeline;
pub use report_pipeline::{ReportKind, ReportPipeline};
pub use strip_pipeline::StripPipeline;
pub use timeseries_pipeline::{TimeseriesPipeline, TimeseriesSource};

use crate::core::snapshot::{parse_changeset, parse_snapshot};
use crate::domain::model::{ChangeSet, Snapshot};
use crate::domain::ports::Storage;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::validate_date_label;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// 檔名 (不含副檔名) 中最後一段數字即為擷取日期
///
/// `activedns-20171101-class.json` → `20171101`,
/// `diff-20171101-20171108.json` → `20171108`.
pub fn date_label_from_path(path: &str) -> Result<String> {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();

    let label = DIGIT_RUN
        .find_iter(stem)
        .last()
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| AuditError::MissingDateLabel {
            path: path.to_string(),
        })?;

    validate_date_label(path, &label)?;
    Ok(label)
}

/// 依檔名日期排序，回傳 (日期, 路徑)；日期重複時保留輸入順序
pub fn dated_inputs(paths: &[String]) -> Result<Vec<(String, String)>> {
    let mut dated = paths
        .iter()
        .map(|path| Ok((date_label_from_path(path)?, path.clone())))
        .collect::<Result<Vec<_>>>()?;
    dated.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(dated)
}

/// 讀取持久化的 JSON；非 UTF-8 內容視為損毀
fn read_persisted<S: Storage>(storage: &S, path: &str) -> Result<String> {
    String::from_utf8(storage.read_file(path)?)
        .map_err(|e| AuditError::corrupt(path, format!("not valid UTF-8: {}", e)))
}

pub(crate) fn load_snapshot<S: Storage>(storage: &S, path: &str) -> Result<Snapshot> {
    let content = read_persisted(storage, path)?;
    let snapshot = parse_snapshot(path, &content)?;
    tracing::debug!(path = %path, records = snapshot.total(), "Loaded snapshot");
    Ok(snapshot)
}

pub(crate) fn load_changeset<S: Storage>(storage: &S, path: &str) -> Result<ChangeSet> {
    let content = read_persisted(storage, path)?;
    parse_changeset(path, &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_label_uses_last_digit_run() {
        assert_eq!(date_label_from_path("out/activedns-20171101-class.json").unwrap(), "20171101");
        assert_eq!(date_label_from_path("diff-20171101-20171108.json").unwrap(), "20171108");
    }

    #[test]
    fn test_date_label_errors() {
        assert!(matches!(
            date_label_from_path("snapshot.json").unwrap_err(),
            AuditError::MissingDateLabel { .. }
        ));
        // digits present but not a calendar date
        assert!(matches!(
            date_label_from_path("capture-20171345.json").unwrap_err(),
            AuditError::InvalidConfigValueError { .. }
        ));
    }

    #[test]
    fn test_invalid_utf8_snapshot_is_corrupt() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = crate::adapters::storage::LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        storage
            .write_file("snap.json", b"{\"spf\": {\"count\": 1, \"records\": [\"a.com v=spf1 \xff\"]}}")
            .unwrap();

        match load_snapshot(&storage, "snap.json") {
            Err(AuditError::CorruptSnapshot { source_name, reason }) => {
                assert_eq!(source_name, "snap.json");
                assert!(reason.contains("UTF-8"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("invalid UTF-8 was accepted"),
        }
        assert!(matches!(
            load_changeset(&storage, "snap.json").unwrap_err(),
            AuditError::CorruptSnapshot { .. }
        ));
    }

    #[test]
    fn test_dated_inputs_sorted_by_label() {
        let paths = vec![
            "b/activedns-20171115-class.json".to_string(),
            "a/activedns-20171101-class.json".to_string(),
            "activedns-20171108-class.json".to_string(),
        ];
        let dates: Vec<String> = dated_inputs(&paths).unwrap().into_iter().map(|(d, _)| d).collect();
        assert_eq!(dates, vec!["20171101", "20171108", "20171115"]);
    }
}
