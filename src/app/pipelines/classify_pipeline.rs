use crate::core::classifier::Classifier;
use crate::core::mining::{mine_unknown, CandidateIdentifier};
use crate::core::snapshot::{to_json_pretty, SnapshotBuilder};
use crate::domain::model::{Category, Snapshot};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;

pub struct ClassifyResult {
    pub snapshot: Snapshot,
    pub skipped: usize,
    pub candidates: Vec<CandidateIdentifier>,
}

/// "domain rdata" 文字檔 → 分類快照 JSON
pub struct ClassifyPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) classifier: Classifier,
    pub(crate) input: String,
    pub(crate) output: String,
    pub(crate) mine: bool,
}

impl<S: Storage> ClassifyPipeline<S> {
    pub fn new(storage: S, classifier: Classifier, input: String, output: String) -> Self {
        Self {
            storage,
            classifier,
            input,
            output,
            mine: false,
        }
    }

    /// 額外分析 unknown 記錄的前導識別字
    pub fn with_mining(mut self, mine: bool) -> Self {
        self.mine = mine;
        self
    }
}

impl<S: Storage> Pipeline for ClassifyPipeline<S> {
    type Extracted = String;
    type Transformed = ClassifyResult;

    fn name(&self) -> &str {
        "classify"
    }

    fn extract(&self) -> Result<String> {
        self.storage.read_to_string(&self.input)
    }

    fn transform(&self, data: String) -> Result<ClassifyResult> {
        let mut builder = SnapshotBuilder::new(&self.classifier);
        for line in data.lines() {
            builder.push_line(line);
        }
        let skipped = builder.skipped();
        let snapshot = builder.finish();

        for (category, entry) in snapshot.categories() {
            tracing::info!(category = %category, count = entry.count(), "Classified");
        }
        tracing::info!(records = snapshot.total(), skipped, "Records classified");

        let candidates = if self.mine {
            let unknown = snapshot
                .get(&Category::unknown())
                .map(|entry| entry.records())
                .unwrap_or_default();
            let candidates = mine_unknown(unknown);
            for candidate in &candidates {
                tracing::info!(
                    identifier = %candidate.identifier,
                    domains = candidate.domains,
                    "Unknown record pattern"
                );
            }
            candidates
        } else {
            Vec::new()
        };

        Ok(ClassifyResult {
            snapshot,
            skipped,
            candidates,
        })
    }

    fn load(&self, result: ClassifyResult) -> Result<String> {
        let json = to_json_pretty(&result.snapshot)?;
        self.storage.write_file(&self.output, json.as_bytes())?;
        Ok(self.output.clone())
    }
}
