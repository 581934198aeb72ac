use super::load_snapshot;
use crate::core::classifier::Classifier;
use crate::core::mining::mine_unknown;
use crate::core::rollup::GroupSummary;
use crate::domain::model::{Category, Snapshot};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// 報告群組的筆數與百分比
    Summary,
    /// unknown 記錄中被多個網域共用的前導識別字
    Mine,
}

/// 讀取快照並產生文字報告；load 回傳報告內容本身
pub struct ReportPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) classifier: Classifier,
    pub(crate) snapshot: String,
    pub(crate) kind: ReportKind,
}

impl<S: Storage> ReportPipeline<S> {
    pub fn new(storage: S, classifier: Classifier, snapshot: String, kind: ReportKind) -> Self {
        Self {
            storage,
            classifier,
            snapshot,
            kind,
        }
    }
}

impl<S: Storage> Pipeline for ReportPipeline<S> {
    type Extracted = Snapshot;
    type Transformed = String;

    fn name(&self) -> &str {
        match self.kind {
            ReportKind::Summary => "summary",
            ReportKind::Mine => "mine",
        }
    }

    fn extract(&self) -> Result<Snapshot> {
        load_snapshot(&self.storage, &self.snapshot)
    }

    fn transform(&self, data: Snapshot) -> Result<String> {
        let report = match self.kind {
            ReportKind::Summary => GroupSummary::from_snapshot(&data, &self.classifier).render(),
            ReportKind::Mine => {
                let unknown = data
                    .get(&Category::unknown())
                    .map(|entry| entry.records())
                    .unwrap_or_default();
                mine_unknown(unknown)
                    .iter()
                    .map(|candidate| format!("{} {}", candidate.identifier, candidate.domains))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        };
        Ok(report)
    }

    fn load(&self, result: String) -> Result<String> {
        Ok(result)
    }
}
