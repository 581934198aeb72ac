use crate::adapters::activedns::TxtExtractor;
use crate::domain::model::RawRecord;
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;

/// ActiveDNS line-JSON → "qname rdata" 文字檔，可直接交給 classify
pub struct ExtractPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) input: String,
    pub(crate) output: String,
    pub(crate) max_rrsets: Option<usize>,
}

impl<S: Storage> ExtractPipeline<S> {
    pub fn new(storage: S, input: String, output: String) -> Self {
        Self {
            storage,
            input,
            output,
            max_rrsets: None,
        }
    }

    pub fn with_max_rrsets(mut self, max_rrsets: Option<usize>) -> Self {
        self.max_rrsets = max_rrsets;
        self
    }
}

impl<S: Storage> Pipeline for ExtractPipeline<S> {
    type Extracted = String;
    type Transformed = Vec<RawRecord>;

    fn name(&self) -> &str {
        "extract"
    }

    fn extract(&self) -> Result<String> {
        self.storage.read_to_string(&self.input)
    }

    fn transform(&self, data: String) -> Result<Vec<RawRecord>> {
        let mut extractor = TxtExtractor::new(self.max_rrsets);
        let records = extractor.extract(data.lines());
        let stats = extractor.stats();
        tracing::info!(
            records = records.len(),
            rrsets = extractor.rrset_count(),
            malformed = stats.malformed,
            capped = stats.capped,
            "TXT records extracted"
        );
        Ok(records)
    }

    fn load(&self, result: Vec<RawRecord>) -> Result<String> {
        let mut content = String::new();
        for record in &result {
            content.push_str(&record.to_line());
            content.push('\n');
        }
        self.storage.write_file(&self.output, content.as_bytes())?;
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use tempfile::TempDir;

    #[test]
    fn test_extract_writes_record_lines() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
        storage
            .write_file(
                "capture.json",
                br#"{"qname": "a.com.", "qtype": 16, "rdata": "v=spf1 -all"}
{"qname": "b.com.", "qtype": 16, "rdata": "ms=123"}
{"qname": "b.com.", "qtype": 15, "rdata": "10 mx.b.com."}
"#,
            )
            .unwrap();

        let pipeline = ExtractPipeline::new(storage.clone(), "capture.json".to_string(), "records.txt".to_string())
            .with_max_rrsets(Some(1));
        let data = pipeline.extract().unwrap();
        let records = pipeline.transform(data).unwrap();
        let output = pipeline.load(records).unwrap();

        assert_eq!(storage.read_to_string(&output).unwrap(), "a.com. v=spf1 -all\n");
    }
}
