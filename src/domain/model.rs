use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 單筆 TXT 記錄: 擁有者名稱與 rdata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub domain: String,
    pub rdata: String,
}

impl RawRecord {
    /// 以第一段空白切分 "domain rdata"；沒有 rdata 的行回傳 None
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let domain = parts.next()?;
        let rdata = parts.collect::<Vec<_>>().join(" ");
        if rdata.is_empty() {
            return None;
        }
        Some(Self {
            domain: domain.to_string(),
            rdata,
        })
    }

    pub fn to_line(&self) -> String {
        format!("{} {}", self.domain, self.rdata)
    }
}

/// rrset key: 記錄行的第一個空白分隔欄位
pub fn rrset_key(record: &str) -> &str {
    record.split_whitespace().next().unwrap_or("")
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub const UNKNOWN: &'static str = "unknown";

    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// 單一分類下的記錄清單；count 永遠等於 records 長度
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRecords {
    count: usize,
    records: Vec<String>,
    /// 只出現在 changed 分組: 新快照中對應的新內容
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    current: Vec<String>,
}

impl CategoryRecords {
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn records(&self) -> &[String] {
        &self.records
    }

    pub fn current(&self) -> &[String] {
        &self.current
    }

    pub fn push(&mut self, record: String) {
        self.records.push(record);
        self.count = self.records.len();
    }

    pub fn push_current(&mut self, record: String) {
        self.current.push(record);
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.count == self.records.len()
    }
}

/// 一次擷取的完整分類結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    categories: BTreeMap<Category, CategoryRecords>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: Category, record: String) {
        self.categories.entry(category).or_default().push(record);
    }

    pub fn get(&self, category: &Category) -> Option<&CategoryRecords> {
        self.categories.get(category)
    }

    pub(crate) fn entry_mut(&mut self, category: &Category) -> &mut CategoryRecords {
        self.categories.entry(category.clone()).or_default()
    }

    pub fn count(&self, category: &Category) -> usize {
        self.get(category).map(CategoryRecords::count).unwrap_or(0)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&Category, &CategoryRecords)> {
        self.categories.iter()
    }

    pub fn labels(&self) -> impl Iterator<Item = &Category> {
        self.categories.keys()
    }

    pub fn total(&self) -> usize {
        self.categories.values().map(CategoryRecords::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// 依分類附加另一份快照的記錄 (分批建立時使用)
    pub fn merge(&mut self, other: Snapshot) {
        for (category, entry) in other.categories {
            let target = self.categories.entry(category).or_default();
            for record in entry.records {
                target.push(record);
            }
            target.current.extend(entry.current);
        }
    }

    /// 移除分類，還原成 "domain rdata" 行
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.categories
            .values()
            .flat_map(|entry| entry.records.iter().map(String::as_str))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    New,
    Changed,
    Missing,
}

impl ChangeKind {
    pub const ALL: [ChangeKind; 3] = [ChangeKind::New, ChangeKind::Changed, ChangeKind::Missing];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::New => "new",
            ChangeKind::Changed => "changed",
            ChangeKind::Missing => "missing",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 兩份快照之間的差異
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub changed: Snapshot,
    pub missing: Snapshot,
    pub new: Snapshot,
}

impl ChangeSet {
    pub fn kind(&self, kind: ChangeKind) -> &Snapshot {
        match kind {
            ChangeKind::New => &self.new,
            ChangeKind::Changed => &self.changed,
            ChangeKind::Missing => &self.missing,
        }
    }

    pub fn kind_mut(&mut self, kind: ChangeKind) -> &mut Snapshot {
        match kind {
            ChangeKind::New => &mut self.new,
            ChangeKind::Changed => &mut self.changed,
            ChangeKind::Missing => &mut self.missing,
        }
    }

    pub fn is_empty(&self) -> bool {
        ChangeKind::ALL.iter().all(|kind| self.kind(*kind).is_empty())
    }
}
