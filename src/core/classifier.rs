use crate::config::rule_config::{RuleSpec, RuleTableConfig};
use crate::domain::model::Category;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::Validate;
use regex::Regex;

/// 規則比對方式
#[derive(Debug, Clone)]
pub enum Matcher {
    Prefix(String),
    AnyPrefix(Vec<String>),
    Contains(String),
    Pattern { pattern: Regex, unless: Option<Regex> },
    Suffix(Vec<String>),
}

impl Matcher {
    /// `lowered` is the lower-cased form of `record`; only prefix matchers use it.
    fn matches(&self, record: &str, lowered: &str) -> bool {
        match self {
            Matcher::Prefix(prefix) => lowered.starts_with(prefix.as_str()),
            Matcher::AnyPrefix(prefixes) => prefixes.iter().any(|p| lowered.starts_with(p.as_str())),
            Matcher::Contains(needle) => record.contains(needle.as_str()),
            Matcher::Pattern { pattern, unless } => {
                pattern.is_match(record) && !unless.as_ref().is_some_and(|u| u.is_match(record))
            }
            Matcher::Suffix(suffixes) => suffixes.iter().any(|s| record.ends_with(s.as_str())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub category: Category,
    pub matcher: Matcher,
    pub group: Option<String>,
    pub diagnostic: bool,
}

fn compile_regex(spec: &RuleSpec, source: &str) -> Result<Regex> {
    Regex::new(source).map_err(|e| AuditError::InvalidRule {
        label: spec.label.clone(),
        reason: format!("invalid regex '{}': {}", source, e),
    })
}

impl Rule {
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        spec.validate_rule()?;

        let lowered = |items: &Vec<String>| items.iter().map(|p| p.to_lowercase()).collect();
        let matcher = if let Some(prefix) = &spec.prefix {
            Matcher::Prefix(prefix.to_lowercase())
        } else if let Some(prefixes) = &spec.prefixes {
            Matcher::AnyPrefix(lowered(prefixes))
        } else if let Some(needle) = &spec.contains {
            Matcher::Contains(needle.clone())
        } else if let Some(pattern) = &spec.pattern {
            Matcher::Pattern {
                pattern: compile_regex(spec, pattern)?,
                unless: spec.unless.as_deref().map(|u| compile_regex(spec, u)).transpose()?,
            }
        } else if let Some(suffixes) = &spec.suffixes {
            Matcher::Suffix(suffixes.clone())
        } else {
            // validate_rule guarantees one matcher
            return Err(AuditError::InvalidRule {
                label: spec.label.clone(),
                reason: "no matcher given".to_string(),
            });
        };

        Ok(Self {
            category: Category::new(spec.label.clone()),
            matcher,
            group: spec.group.clone(),
            diagnostic: spec.diagnostic.unwrap_or(false),
        })
    }
}

/// 依序比對的規則表；第一個命中的規則決定分類
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    pub fn from_config(config: &RuleTableConfig) -> Result<Self> {
        config.validate()?;
        let rules = config.rules.iter().map(Rule::compile).collect::<Result<Vec<_>>>()?;
        tracing::debug!(rule_count = rules.len(), "Compiled classification rule table");
        Ok(Self { rules })
    }

    /// 使用內建規則表
    pub fn builtin() -> Result<Self> {
        Self::from_config(&RuleTableConfig::builtin()?)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn classify(&self, raw_rdata: &str) -> Category {
        let record = raw_rdata.replace('"', "");
        let lowered = record.to_lowercase();

        for rule in &self.rules {
            if rule.matcher.matches(&record, &lowered) {
                if rule.diagnostic {
                    tracing::debug!(category = %rule.category, record = %record, "Malformed versioned record");
                }
                return rule.category.clone();
            }
        }

        Category::unknown()
    }

    /// 分類體系: 規則表中的標籤依序排列，最後是 unknown
    pub fn taxonomy(&self) -> Vec<Category> {
        let mut labels: Vec<Category> = Vec::new();
        for rule in &self.rules {
            if labels.last() != Some(&rule.category) {
                labels.push(rule.category.clone());
            }
        }
        labels.push(Category::unknown());
        labels
    }

    pub fn group_of(&self, category: &Category) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| &rule.category == category)
            .and_then(|rule| rule.group.as_deref())
    }
}
