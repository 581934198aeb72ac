use super::{dated_inputs, load_changeset, load_snapshot};
use crate::core::aggregator::{Orientation, Timeline};
use crate::domain::model::{ChangeKind, ChangeSet, Snapshot};
use crate::domain::ports::{Pipeline, Storage};
use crate::utils::error::Result;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeseriesSource {
    /// 分類快照 → counts.csv
    #[default]
    Snapshots,
    /// 差異檔 → new.csv / changed.csv / missing.csv
    Changesets,
}

impl FromStr for TimeseriesSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "snapshots" => Ok(TimeseriesSource::Snapshots),
            "changesets" => Ok(TimeseriesSource::Changesets),
            other => Err(format!(
                "unknown time-series source '{}' (expected snapshots or changesets)",
                other
            )),
        }
    }
}

pub enum DatedInputs {
    Snapshots(Vec<(String, Snapshot)>),
    Changesets(Vec<(String, ChangeSet)>),
}

/// 將一系列依日期命名的檔案彙總成 CSV 時間序列
pub struct TimeseriesPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) inputs: Vec<String>,
    pub(crate) output_dir: String,
    pub(crate) source: TimeseriesSource,
    pub(crate) orientation: Orientation,
}

impl<S: Storage> TimeseriesPipeline<S> {
    pub fn new(storage: S, inputs: Vec<String>, output_dir: String) -> Self {
        Self {
            storage,
            inputs,
            output_dir,
            source: TimeseriesSource::default(),
            orientation: Orientation::default(),
        }
    }

    pub fn with_source(mut self, source: TimeseriesSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    fn output_path(&self, file_name: &str) -> String {
        Path::new(&self.output_dir)
            .join(file_name)
            .to_string_lossy()
            .into_owned()
    }
}

impl<S: Storage> Pipeline for TimeseriesPipeline<S> {
    type Extracted = DatedInputs;
    type Transformed = Vec<(String, String)>;

    fn name(&self) -> &str {
        "timeseries"
    }

    fn extract(&self) -> Result<DatedInputs> {
        let dated = dated_inputs(&self.inputs)?;
        for (date, path) in &dated {
            tracing::info!(date = %date, path = %path, "Processing capture");
        }

        match self.source {
            TimeseriesSource::Snapshots => {
                let snapshots = dated
                    .into_iter()
                    .map(|(date, path)| Ok((date, load_snapshot(&self.storage, &path)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(DatedInputs::Snapshots(snapshots))
            }
            TimeseriesSource::Changesets => {
                let changesets = dated
                    .into_iter()
                    .map(|(date, path)| Ok((date, load_changeset(&self.storage, &path)?)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(DatedInputs::Changesets(changesets))
            }
        }
    }

    fn transform(&self, data: DatedInputs) -> Result<Vec<(String, String)>> {
        let tables = match data {
            DatedInputs::Snapshots(snapshots) => {
                let timeline = Timeline::fold(snapshots.iter().map(|(date, s)| (date.as_str(), s)));
                tracing::debug!(
                    dates = timeline.dates().len(),
                    categories = timeline.categories().len(),
                    "Folded snapshot counts"
                );
                vec![("counts.csv".to_string(), timeline.to_csv_string(self.orientation)?)]
            }
            DatedInputs::Changesets(changesets) => ChangeKind::ALL
                .iter()
                .map(|kind| {
                    let timeline = Timeline::fold(
                        changesets
                            .iter()
                            .map(|(date, changes)| (date.as_str(), changes.kind(*kind))),
                    );
                    Ok((format!("{}.csv", kind), timeline.to_csv_string(self.orientation)?))
                })
                .collect::<Result<Vec<_>>>()?,
        };
        Ok(tables)
    }

    fn load(&self, result: Vec<(String, String)>) -> Result<String> {
        let mut written = Vec::new();
        for (file_name, csv) in result {
            let path = self.output_path(&file_name);
            self.storage.write_file(&path, csv.as_bytes())?;
            written.push(path);
        }
        Ok(written.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::core::snapshot::to_json_pretty;
    use crate::domain::model::Category;
    use tempfile::TempDir;

    fn run(pipeline: &TimeseriesPipeline<LocalStorage>) -> Result<String> {
        let data = pipeline.extract()?;
        let tables = pipeline.transform(data)?;
        pipeline.load(tables)
    }

    #[test]
    fn test_changeset_series_writes_three_tables() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        let mut later = ChangeSet::default();
        later.new.push(Category::from("spf"), "b.com v=spf1 -all".to_string());
        later.missing.push(Category::from("dkim"), "s._domainkey.a.com v=dkim1; p=x".to_string());
        let mut earlier = ChangeSet::default();
        earlier.new.push(Category::from("dmarc"), "_dmarc.a.com v=dmarc1; p=none".to_string());

        storage
            .write_file("diff-20171108-20171115.json", to_json_pretty(&later).unwrap().as_bytes())
            .unwrap();
        storage
            .write_file("diff-20171101-20171108.json", to_json_pretty(&earlier).unwrap().as_bytes())
            .unwrap();

        let pipeline = TimeseriesPipeline::new(
            storage.clone(),
            vec![
                "diff-20171108-20171115.json".to_string(),
                "diff-20171101-20171108.json".to_string(),
            ],
            "series".to_string(),
        )
        .with_source(TimeseriesSource::Changesets);
        run(&pipeline).unwrap();

        assert_eq!(
            storage.read_to_string("series/new.csv").unwrap(),
            "date,dmarc,spf\n20171108,1,0\n20171115,0,1\n"
        );
        assert_eq!(
            storage.read_to_string("series/missing.csv").unwrap(),
            "date,dkim\n20171108,0\n20171115,1\n"
        );
        assert_eq!(
            storage.read_to_string("series/changed.csv").unwrap(),
            "date\n20171108\n20171115\n"
        );
    }

    #[test]
    fn test_snapshot_series_category_rows() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        for (date, records) in [("20171101", 1), ("20171108", 3)] {
            let mut snapshot = Snapshot::new();
            for i in 0..records {
                snapshot.push(Category::from("spf"), format!("d{}.com v=spf1 -all", i));
            }
            storage
                .write_file(
                    &format!("activedns-{}-class.json", date),
                    to_json_pretty(&snapshot).unwrap().as_bytes(),
                )
                .unwrap();
        }

        let pipeline = TimeseriesPipeline::new(
            storage.clone(),
            vec![
                "activedns-20171101-class.json".to_string(),
                "activedns-20171108-class.json".to_string(),
            ],
            "series".to_string(),
        )
        .with_orientation(Orientation::CategoriesAsRows);
        run(&pipeline).unwrap();

        assert_eq!(
            storage.read_to_string("series/counts.csv").unwrap(),
            "category,20171101,20171108\nspf,1,3\n"
        );
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("changesets".parse::<TimeseriesSource>().unwrap(), TimeseriesSource::Changesets);
        assert!("avro".parse::<TimeseriesSource>().is_err());
    }
}
