use crate::domain::model::RawRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

static COLON_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z0-9_/-]*:)").unwrap());
static EQUALS_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Za-z0-9_/-]*=)").unwrap());

/// 在 unknown 記錄中找到的候選識別字
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateIdentifier {
    pub identifier: String,
    pub domains: usize,
}

/// Leading `name:` / `name=` identifiers of `rdata`. A record can yield both.
pub fn leading_identifiers(rdata: &str) -> Vec<&str> {
    [&*COLON_IDENTIFIER, &*EQUALS_IDENTIFIER]
        .iter()
        .filter_map(|re| re.captures(rdata).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str())
        .collect()
}

/// 統計 unknown 記錄的前導識別字被多少個不同網域使用
///
/// Only identifiers seen on more than one distinct domain are returned,
/// ordered by domain count and then identifier, so the output does not
/// depend on input order.
pub fn mine_unknown<I, S>(records: I) -> Vec<CandidateIdentifier>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut domains_by_identifier: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for line in records {
        let Some(record) = RawRecord::parse(line.as_ref()) else {
            continue;
        };
        for identifier in leading_identifiers(&record.rdata) {
            domains_by_identifier
                .entry(identifier.to_string())
                .or_default()
                .insert(record.domain.clone());
        }
    }

    let mut candidates: Vec<CandidateIdentifier> = domains_by_identifier
        .into_iter()
        .map(|(identifier, domains)| CandidateIdentifier {
            identifier,
            domains: domains.len(),
        })
        .filter(|candidate| candidate.domains > 1)
        .collect();

    candidates.sort_by(|a, b| a.domains.cmp(&b.domains).then_with(|| a.identifier.cmp(&b.identifier)));
    tracing::debug!(candidates = candidates.len(), "Mined unknown record identifiers");
    candidates
}
