use crate::domain::model::{rrset_key, Category, CategoryRecords, ChangeKind, ChangeSet, Snapshot};
use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

/// 決定兩筆記錄是否屬於同一個 rrset 的策略
///
/// 原始擷取格式沒有穩定的記錄 ID，差異比對只能依 rrset key 的出現次數判斷
/// 記錄是新增、修改或消失。
pub trait IdentityStrategy {
    fn name(&self) -> &'static str;

    fn key<'r>(&self, record: &'r str) -> &'r str {
        rrset_key(record)
    }

    /// `key` 在 `records` 中出現的次數
    fn occurrences(&self, key: &str, records: &[String]) -> usize;
}

/// 以 rrset key 作為前綴計數 (預設)
///
/// `a.com` also counts `a.com.au` records.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrefixCount;

impl IdentityStrategy for PrefixCount {
    fn name(&self) -> &'static str {
        "prefix-count"
    }

    fn occurrences(&self, key: &str, records: &[String]) -> usize {
        records.iter().filter(|record| record.starts_with(key)).count()
    }
}

/// 只計算擁有者名稱完全相同的記錄
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactOwner;

impl IdentityStrategy for ExactOwner {
    fn name(&self) -> &'static str {
        "exact-owner"
    }

    fn occurrences(&self, key: &str, records: &[String]) -> usize {
        records.iter().filter(|record| rrset_key(record) == key).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityKind {
    #[default]
    PrefixCount,
    ExactOwner,
}

impl IdentityKind {
    pub fn strategy(&self) -> Box<dyn IdentityStrategy> {
        match self {
            IdentityKind::PrefixCount => Box::new(PrefixCount),
            IdentityKind::ExactOwner => Box::new(ExactOwner),
        }
    }
}

impl FromStr for IdentityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "prefix-count" => Ok(IdentityKind::PrefixCount),
            "exact-owner" => Ok(IdentityKind::ExactOwner),
            other => Err(format!(
                "unknown identity strategy '{}' (expected prefix-count or exact-owner)",
                other
            )),
        }
    }
}

pub struct Differ<S: IdentityStrategy + ?Sized = PrefixCount> {
    strategy: Box<S>,
}

impl Differ<PrefixCount> {
    pub fn new() -> Self {
        Self {
            strategy: Box::new(PrefixCount),
        }
    }
}

impl Default for Differ<PrefixCount> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: IdentityStrategy + ?Sized> Differ<S> {
    pub fn with_strategy(strategy: Box<S>) -> Self {
        Self { strategy }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn diff(&self, old: &Snapshot, new: &Snapshot) -> ChangeSet {
        let mut changes = ChangeSet::default();
        let labels: BTreeSet<&Category> = old.labels().chain(new.labels()).collect();

        for category in labels {
            match (old.get(category), new.get(category)) {
                (Some(before), None) => {
                    for record in before.records() {
                        changes.kind_mut(ChangeKind::Missing).push(category.clone(), record.clone());
                    }
                }
                (None, Some(after)) => {
                    for record in after.records() {
                        changes.kind_mut(ChangeKind::New).push(category.clone(), record.clone());
                    }
                }
                (Some(before), Some(after)) => {
                    self.diff_category(category, before, after, &mut changes);
                }
                (None, None) => {}
            }
        }

        tracing::debug!(
            strategy = self.strategy.name(),
            new = changes.new.total(),
            changed = changes.changed.total(),
            missing = changes.missing.total(),
            "Diffed snapshots"
        );
        changes
    }

    fn diff_category(
        &self,
        category: &Category,
        before: &CategoryRecords,
        after: &CategoryRecords,
        changes: &mut ChangeSet,
    ) {
        let old_records = before.records();
        let new_records = after.records();
        let old_set: HashSet<&str> = old_records.iter().map(String::as_str).collect();
        let new_set: HashSet<&str> = new_records.iter().map(String::as_str).collect();

        for record in old_records.iter().filter(|r| !new_set.contains(r.as_str())) {
            let key = self.strategy.key(record);
            let old_count = self.strategy.occurrences(key, old_records);
            let new_count = self.strategy.occurrences(key, new_records);

            if new_count < old_count {
                changes.kind_mut(ChangeKind::Missing).push(category.clone(), record.clone());
            } else if new_count == old_count {
                changes.kind_mut(ChangeKind::Changed).push(category.clone(), record.clone());
            }
        }

        for record in new_records.iter().filter(|r| !old_set.contains(r.as_str())) {
            let key = self.strategy.key(record);
            let old_count = self.strategy.occurrences(key, old_records);
            let new_count = self.strategy.occurrences(key, new_records);

            if new_count > old_count {
                changes.kind_mut(ChangeKind::New).push(category.clone(), record.clone());
            } else if new_count == old_count {
                // current content only attaches to an old record changed under the same key
                let paired = changes
                    .changed
                    .get(category)
                    .is_some_and(|changed| self.strategy.occurrences(key, changed.records()) > 0);
                if paired {
                    changes
                        .kind_mut(ChangeKind::Changed)
                        .entry_mut(category)
                        .push_current(record.clone());
                } else {
                    tracing::debug!(category = %category, record = %record, "Unpaired record dropped");
                }
            }
        }
    }
}
