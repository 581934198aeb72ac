use crate::domain::model::{Category, CategoryRecords, RawRecord, Snapshot};
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::str::FromStr;

/// 可提供「分類 → 筆數」的資料來源 (快照或某一類變更)
pub trait CategoryCounts {
    fn category_counts(&self) -> Vec<(Category, usize)>;
}

impl CategoryCounts for Snapshot {
    fn category_counts(&self) -> Vec<(Category, usize)> {
        self.categories()
            .map(|(category, entry)| (category.clone(), entry.count()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// one row per date, one column per category
    #[default]
    DatesAsRows,
    /// one row per category, one column per date
    CategoriesAsRows,
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "dates" => Ok(Orientation::DatesAsRows),
            "categories" => Ok(Orientation::CategoriesAsRows),
            other => Err(format!("unknown orientation '{}' (expected dates or categories)", other)),
        }
    }
}

/// 依日期排列的分類筆數；任何 (日期, 分類) 缺值皆視為 0
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    dates: Vec<String>,
    categories: Vec<Category>,
    cells: HashMap<(usize, usize), usize>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold<'a, I, D, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (D, &'a C)>,
        D: AsRef<str>,
        C: CategoryCounts + 'a,
    {
        let mut timeline = Self::new();
        for (date, source) in entries {
            timeline.push(date.as_ref(), source);
        }
        timeline
    }

    /// 同一日期重複加入時筆數會累加
    pub fn push<C: CategoryCounts + ?Sized>(&mut self, date: &str, source: &C) {
        let date_idx = match self.dates.iter().position(|d| d == date) {
            Some(idx) => idx,
            None => {
                self.dates.push(date.to_string());
                self.dates.len() - 1
            }
        };

        for (category, count) in source.category_counts() {
            let cat_idx = match self.categories.iter().position(|c| c == &category) {
                Some(idx) => idx,
                None => {
                    self.categories.push(category);
                    self.categories.len() - 1
                }
            };
            *self.cells.entry((date_idx, cat_idx)).or_insert(0) += count;
        }
    }

    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn get(&self, date: &str, category: &Category) -> usize {
        let date_idx = self.dates.iter().position(|d| d == date);
        let cat_idx = self.categories.iter().position(|c| c == category);
        match (date_idx, cat_idx) {
            (Some(d), Some(c)) => self.cell(d, c),
            _ => 0,
        }
    }

    fn cell(&self, date_idx: usize, cat_idx: usize) -> usize {
        self.cells.get(&(date_idx, cat_idx)).copied().unwrap_or(0)
    }

    pub fn date_major(&self) -> BTreeMap<String, BTreeMap<Category, usize>> {
        self.dates
            .iter()
            .enumerate()
            .map(|(d, date)| {
                let row = self
                    .categories
                    .iter()
                    .enumerate()
                    .map(|(c, category)| (category.clone(), self.cell(d, c)))
                    .collect();
                (date.clone(), row)
            })
            .collect()
    }

    pub fn category_major(&self) -> BTreeMap<Category, BTreeMap<String, usize>> {
        self.categories
            .iter()
            .enumerate()
            .map(|(c, category)| {
                let row = self
                    .dates
                    .iter()
                    .enumerate()
                    .map(|(d, date)| (date.clone(), self.cell(d, c)))
                    .collect();
                (category.clone(), row)
            })
            .collect()
    }

    /// 輸出矩形 CSV 表格
    pub fn write_csv<W: Write>(&self, writer: W, orientation: Orientation) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        match orientation {
            Orientation::DatesAsRows => {
                let mut header = vec!["date".to_string()];
                header.extend(self.categories.iter().map(|c| c.to_string()));
                csv_writer.write_record(&header)?;

                for (d, date) in self.dates.iter().enumerate() {
                    let mut row = vec![date.clone()];
                    row.extend((0..self.categories.len()).map(|c| self.cell(d, c).to_string()));
                    csv_writer.write_record(&row)?;
                }
            }
            Orientation::CategoriesAsRows => {
                let mut header = vec!["category".to_string()];
                header.extend(self.dates.iter().cloned());
                csv_writer.write_record(&header)?;

                for (c, category) in self.categories.iter().enumerate() {
                    let mut row = vec![category.to_string()];
                    row.extend((0..self.dates.len()).map(|d| self.cell(d, c).to_string()));
                    csv_writer.write_record(&row)?;
                }
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self, orientation: Orientation) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf, orientation)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

type DateSeries = BTreeMap<String, CategoryRecords>;

/// 每個網域、每個分類在各擷取日期的記錄 (rdata)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainTimeline {
    domains: BTreeMap<String, BTreeMap<Category, DateSeries>>,
}

impl DomainTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold<'a, I, D>(entries: I) -> Self
    where
        I: IntoIterator<Item = (D, &'a Snapshot)>,
        D: AsRef<str>,
    {
        let mut timeline = Self::new();
        for (date, snapshot) in entries {
            timeline.push(date.as_ref(), snapshot);
        }
        timeline
    }

    pub fn push(&mut self, date: &str, snapshot: &Snapshot) {
        for (category, entry) in snapshot.categories() {
            for line in entry.records() {
                let Some(record) = RawRecord::parse(line) else {
                    tracing::warn!(record = %line, "Skipping record without rdata");
                    continue;
                };
                self.domains
                    .entry(record.domain)
                    .or_default()
                    .entry(category.clone())
                    .or_default()
                    .entry(date.to_string())
                    .or_default()
                    .push(record.rdata);
            }
        }
    }

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    pub fn series(&self, domain: &str, category: &Category) -> Option<&DateSeries> {
        self.domains.get(domain).and_then(|cats| cats.get(category))
    }

    pub fn has_record(&self, domain: &str, category: &Category, date: &str) -> bool {
        self.series(domain, category)
            .and_then(|series| series.get(date))
            .is_some_and(|entry| entry.count() > 0)
    }

    /// 在 `from` 有該分類記錄、但在 `to` 沒有的網域
    pub fn dropped_between(&self, category: &Category, from: &str, to: &str) -> Vec<&str> {
        self.domains
            .keys()
            .filter(|domain| {
                self.has_record(domain, category, from) && !self.has_record(domain, category, to)
            })
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ChangeKind, ChangeSet};

    fn snapshot(entries: &[(&str, &str)]) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for (label, record) in entries {
            snapshot.push(Category::from(*label), record.to_string());
        }
        snapshot
    }

    #[test]
    fn test_fold_fills_missing_cells_with_zero() {
        let first = snapshot(&[("spf", "a.com v=spf1 -all"), ("spf", "b.com v=spf1 -all")]);
        let second = snapshot(&[("dkim", "s.a.com v=dkim1; p=x")]);
        let timeline = Timeline::fold([("20171101", &first), ("20171108", &second)]);

        assert_eq!(timeline.dates(), ["20171101", "20171108"]);
        assert_eq!(timeline.get("20171101", &Category::from("spf")), 2);
        assert_eq!(timeline.get("20171108", &Category::from("spf")), 0);
        assert_eq!(timeline.get("20990101", &Category::from("spf")), 0);

        let by_date = timeline.date_major();
        assert_eq!(by_date["20171101"][&Category::from("dkim")], 0);
        assert_eq!(by_date["20171108"][&Category::from("dkim")], 1);

        let by_category = timeline.category_major();
        assert_eq!(by_category[&Category::from("spf")]["20171108"], 0);
        assert_eq!(by_category[&Category::from("dkim")].len(), 2);
    }

    #[test]
    fn test_csv_both_orientations_are_rectangular() {
        let first = snapshot(&[("spf", "a.com v=spf1 -all")]);
        let second = snapshot(&[("dkim", "s.a.com v=dkim1; p=x"), ("spf", "a.com v=spf1 -all")]);
        let timeline = Timeline::fold([("20171101", &first), ("20171108", &second)]);

        let rows = timeline.to_csv_string(Orientation::DatesAsRows).unwrap();
        assert_eq!(rows, "date,spf,dkim\n20171101,1,0\n20171108,1,1\n");

        let columns = timeline.to_csv_string(Orientation::CategoriesAsRows).unwrap();
        assert_eq!(columns, "category,20171101,20171108\nspf,1,1\ndkim,0,1\n");
    }

    #[test]
    fn test_fold_changesets_by_kind() {
        let mut changes = ChangeSet::default();
        changes.new.push(Category::from("spf"), "a.com v=spf1 -all".to_string());
        changes.missing.push(Category::from("dmarc"), "b.com v=dmarc1; p=none".to_string());

        let new_counts = Timeline::fold([("20171108", changes.kind(ChangeKind::New))]);
        assert_eq!(new_counts.get("20171108", &Category::from("spf")), 1);
        assert_eq!(new_counts.categories().len(), 1);
    }

    #[test]
    fn test_same_date_accumulates() {
        let part = snapshot(&[("spf", "a.com v=spf1 -all")]);
        let timeline = Timeline::fold([("20171101", &part), ("20171101", &part)]);
        assert_eq!(timeline.dates().len(), 1);
        assert_eq!(timeline.get("20171101", &Category::from("spf")), 2);
    }

    #[test]
    fn test_orientation_from_str() {
        assert_eq!("dates".parse::<Orientation>().unwrap(), Orientation::DatesAsRows);
        assert_eq!("categories".parse::<Orientation>().unwrap(), Orientation::CategoriesAsRows);
        assert!("rows".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_domain_timeline_tracks_presence() {
        let first = snapshot(&[
            ("dkim", "a.com v=dkim1; p=abc"),
            ("dkim", "b.com v=dkim1; p=def"),
            ("spf", "a.com v=spf1 -all"),
        ]);
        let second = snapshot(&[("dkim", "b.com v=dkim1; p=def"), ("spf", "a.com v=spf1 -all")]);
        let timeline = DomainTimeline::fold([("20171101", &first), ("20171108", &second)]);

        let dkim = Category::from("dkim");
        assert_eq!(timeline.domain_count(), 2);
        assert!(timeline.has_record("a.com", &dkim, "20171101"));
        assert!(!timeline.has_record("a.com", &dkim, "20171108"));
        assert_eq!(timeline.dropped_between(&dkim, "20171101", "20171108"), vec!["a.com"]);
        assert!(timeline
            .dropped_between(&Category::from("spf"), "20171101", "20171108")
            .is_empty());

        let series = timeline.series("b.com", &dkim).unwrap();
        assert_eq!(series["20171108"].records(), ["v=dkim1; p=def"]);
    }

    #[test]
    fn test_domain_timeline_json_shape() {
        let first = snapshot(&[("spf", "a.com v=spf1 -all")]);
        let timeline = DomainTimeline::fold([("20171101", &first)]);
        let value = serde_json::to_value(&timeline).unwrap();
        assert_eq!(value["a.com"]["spf"]["20171101"]["count"], 1);
        assert_eq!(value["a.com"]["spf"]["20171101"]["records"][0], "v=spf1 -all");
    }
}
