use crate::core::classifier::Classifier;
use crate::domain::model::{ChangeKind, ChangeSet, RawRecord, Snapshot};
use crate::utils::error::{AuditError, Result};
use serde::Serialize;

/// 將 "domain rdata" 行分類並累積成快照
pub struct SnapshotBuilder<'a> {
    classifier: &'a Classifier,
    snapshot: Snapshot,
    skipped: usize,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self {
            classifier,
            snapshot: Snapshot::new(),
            skipped: 0,
        }
    }

    pub fn push_record(&mut self, record: &RawRecord) {
        let rdata = record.rdata.replace('"', "");
        let category = self.classifier.classify(&rdata);
        self.snapshot
            .push(category, format!("{} {}", record.domain, rdata));
    }

    /// 回傳 false 表示該行沒有 rdata 而被略過
    pub fn push_line(&mut self, line: &str) -> bool {
        match RawRecord::parse(line) {
            Some(record) => {
                self.push_record(&record);
                true
            }
            None => {
                if !line.trim().is_empty() {
                    tracing::warn!(line = %line.trim(), "Skipping record without rdata");
                }
                self.skipped += 1;
                false
            }
        }
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn finish(self) -> Snapshot {
        self.snapshot
    }

    pub fn build<I, S>(classifier: &'a Classifier, lines: I) -> Snapshot
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = Self::new(classifier);
        for line in lines {
            builder.push_line(line.as_ref());
        }
        builder.finish()
    }
}

/// 以 4 格縮排輸出 JSON，鍵值排序，結尾換行
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    buf.push(b'\n');
    String::from_utf8(buf).map_err(|e| AuditError::ValidationError {
        message: format!("JSON output is not UTF-8: {}", e),
    })
}

fn check_counts(source_name: &str, scope: &str, snapshot: &Snapshot) -> Result<()> {
    for (category, entry) in snapshot.categories() {
        if !entry.is_consistent() {
            return Err(AuditError::corrupt(
                source_name,
                format!(
                    "{}'{}' has count {} but {} records",
                    scope,
                    category,
                    entry.count(),
                    entry.records().len()
                ),
            ));
        }
    }
    Ok(())
}

pub fn parse_snapshot(source_name: &str, content: &str) -> Result<Snapshot> {
    let snapshot: Snapshot = serde_json::from_str(content)
        .map_err(|e| AuditError::corrupt(source_name, e.to_string()))?;
    check_counts(source_name, "", &snapshot)?;
    Ok(snapshot)
}

pub fn parse_changeset(source_name: &str, content: &str) -> Result<ChangeSet> {
    let changeset: ChangeSet = serde_json::from_str(content)
        .map_err(|e| AuditError::corrupt(source_name, e.to_string()))?;
    for kind in ChangeKind::ALL {
        check_counts(source_name, &format!("{}/", kind), changeset.kind(kind))?;
    }
    Ok(changeset)
}
