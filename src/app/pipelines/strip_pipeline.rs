use super::load_snapshot;
use crate::domain::model::Snapshot;
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;

/// 移除快照的分類，還原成 "domain rdata" 文字檔
pub struct StripPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) snapshot: String,
    pub(crate) output: String,
}

impl<S: Storage> StripPipeline<S> {
    pub fn new(storage: S, snapshot: String, output: String) -> Self {
        Self {
            storage,
            snapshot,
            output,
        }
    }
}

impl<S: Storage> Pipeline for StripPipeline<S> {
    type Extracted = Snapshot;
    type Transformed = Vec<String>;

    fn name(&self) -> &str {
        "strip"
    }

    fn extract(&self) -> Result<Snapshot> {
        load_snapshot(&self.storage, &self.snapshot)
    }

    fn transform(&self, data: Snapshot) -> Result<Vec<String>> {
        let lines: Vec<String> = data.lines().map(str::to_string).collect();
        tracing::info!(records = lines.len(), "Removed classification");
        Ok(lines)
    }

    fn load(&self, result: Vec<String>) -> Result<String> {
        let mut content = String::new();
        for line in &result {
            content.push_str(line);
            content.push('\n');
        }
        self.storage.write_file(&self.output, content.as_bytes())?;
        Ok(self.output.clone())
    }
}
