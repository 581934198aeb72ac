use crate::domain::model::Category;
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 內建分類規則表，編譯時嵌入
pub const DEFAULT_RULES_TOML: &str = include_str!("../../rules/default_rules.toml");

pub const REPORTING_GROUPS: [&str; 3] = [
    "protocol-enhancement",
    "domain-verification",
    "resource-location",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleTableConfig {
    pub rules: Vec<RuleSpec>,
}

/// 單條規則: 只能指定一種比對方式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub label: String,
    pub group: Option<String>,
    pub prefix: Option<String>,
    pub prefixes: Option<Vec<String>>,
    pub contains: Option<String>,
    pub pattern: Option<String>,
    pub unless: Option<String>,
    pub suffixes: Option<Vec<String>>,
    pub diagnostic: Option<bool>,
}

impl RuleSpec {
    fn matcher_kinds(&self) -> usize {
        [
            self.prefix.is_some(),
            self.prefixes.is_some(),
            self.contains.is_some(),
            self.pattern.is_some(),
            self.suffixes.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count()
    }

    fn invalid(&self, reason: impl Into<String>) -> AuditError {
        AuditError::InvalidRule {
            label: self.label.clone(),
            reason: reason.into(),
        }
    }

    pub fn validate_rule(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(self.invalid("label cannot be empty"));
        }
        if self.label == Category::UNKNOWN {
            return Err(self.invalid("'unknown' is the reserved fallback label"));
        }
        match self.matcher_kinds() {
            1 => {}
            0 => return Err(self.invalid("no matcher given (prefix, prefixes, contains, pattern, suffixes)")),
            _ => return Err(self.invalid("more than one matcher given")),
        }
        if self.unless.is_some() && self.pattern.is_none() {
            return Err(self.invalid("'unless' only applies to 'pattern' rules"));
        }
        let empty_list = |list: &Option<Vec<String>>| {
            list.as_ref()
                .map(|items| items.is_empty() || items.iter().any(|item| item.is_empty()))
                .unwrap_or(false)
        };
        if empty_list(&self.prefixes) || empty_list(&self.suffixes) {
            return Err(self.invalid("matcher lists cannot be empty or hold empty strings"));
        }
        if matches!(self.prefix.as_deref(), Some("")) || matches!(self.contains.as_deref(), Some("")) {
            return Err(self.invalid("matcher text cannot be empty"));
        }
        if let Some(group) = &self.group {
            if !REPORTING_GROUPS.contains(&group.as_str()) {
                return Err(self.invalid(format!(
                    "unknown group '{}'. Valid groups: {}",
                    group,
                    REPORTING_GROUPS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

impl RuleTableConfig {
    /// 從 TOML 檔案載入規則表
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AuditError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析規則表
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AuditError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(DEFAULT_RULES_TOML)
    }
}

impl Validate for RuleTableConfig {
    fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(AuditError::ConfigError {
                message: "rule table has no rules".to_string(),
            });
        }
        let mut seen = HashSet::new();
        let mut last_label: Option<&str> = None;
        for rule in &self.rules {
            rule.validate_rule()?;
            // 同一標籤必須連續出現，否則表格順序難以閱讀
            if last_label != Some(rule.label.as_str()) && !seen.insert(rule.label.as_str()) {
                return Err(rule.invalid("label appears in two separate places of the table"));
            }
            last_label = Some(rule.label.as_str());
        }
        Ok(())
    }
}
