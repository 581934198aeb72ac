use crate::config::rule_config::REPORTING_GROUPS;
use crate::core::classifier::Classifier;
use crate::domain::model::Snapshot;
use std::collections::BTreeMap;

pub const UNGROUPED: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct GroupShare {
    pub group: String,
    pub count: usize,
    pub percent: f64,
}

/// 將細分類彙總到三個報告群組 (protocol-enhancement / domain-verification / resource-location)
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub shares: Vec<GroupShare>,
    pub total: usize,
}

impl GroupSummary {
    pub fn from_snapshot(snapshot: &Snapshot, classifier: &Classifier) -> Self {
        let mut counts: BTreeMap<&str, usize> = REPORTING_GROUPS.iter().map(|g| (*g, 0)).collect();
        counts.insert(UNGROUPED, 0);

        for (category, entry) in snapshot.categories() {
            let group = classifier.group_of(category).unwrap_or(UNGROUPED);
            *counts.entry(group).or_insert(0) += entry.count();
        }

        let total = snapshot.total();
        let shares = counts
            .into_iter()
            .map(|(group, count)| GroupShare {
                group: group.to_string(),
                count,
                percent: percent_of(count, total),
            })
            .collect();

        Self { shares, total }
    }

    pub fn share(&self, group: &str) -> Option<&GroupShare> {
        self.shares.iter().find(|share| share.group == group)
    }

    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .shares
            .iter()
            .map(|share| format!("{} {} {}%", share.group, share.count, share.percent))
            .collect();
        lines.push(format!("total {} {}%", self.total, percent_of(self.total, self.total)));
        lines.join("\n")
    }
}

/// 百分比取到小數第二位；總數為 0 時回傳 0
fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 10000.0).round() / 100.0
}
