use super::{dated_inputs, load_snapshot};
use crate::core::aggregator::DomainTimeline;
use crate::core::snapshot::to_json_pretty;
use crate::domain::model::Snapshot;
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;

/// 多份快照 → 網域 / 分類 / 日期 的合併 JSON
pub struct DomainMergePipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) inputs: Vec<String>,
    pub(crate) output: String,
}

impl<S: Storage> DomainMergePipeline<S> {
    pub fn new(storage: S, inputs: Vec<String>, output: String) -> Self {
        Self {
            storage,
            inputs,
            output,
        }
    }
}

impl<S: Storage> Pipeline for DomainMergePipeline<S> {
    type Extracted = Vec<(String, Snapshot)>;
    type Transformed = DomainTimeline;

    fn name(&self) -> &str {
        "merge"
    }

    fn extract(&self) -> Result<Vec<(String, Snapshot)>> {
        dated_inputs(&self.inputs)?
            .into_iter()
            .map(|(date, path)| {
                tracing::info!(date = %date, "Processing capture");
                Ok((date, load_snapshot(&self.storage, &path)?))
            })
            .collect::<Result<Vec<_>>>()
    }

    fn transform(&self, data: Vec<(String, Snapshot)>) -> Result<DomainTimeline> {
        let timeline = DomainTimeline::fold(data.iter().map(|(date, snapshot)| (date.as_str(), snapshot)));
        tracing::info!(domains = timeline.domain_count(), captures = data.len(), "Merged captures");
        Ok(timeline)
    }

    fn load(&self, result: DomainTimeline) -> Result<String> {
        let json = to_json_pretty(&result)?;
        self.storage.write_file(&self.output, json.as_bytes())?;
        Ok(self.output.clone())
    }
}
