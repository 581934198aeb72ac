use crate::domain::model::RawRecord;
use serde::Deserialize;
use std::collections::HashSet;

pub const TXT_QTYPE: u16 = 16;

/// ActiveDNS 匯出檔中的單行 JSON 記錄 (只取用需要的欄位)
#[derive(Debug, Clone, Deserialize)]
pub struct ActiveDnsRecord {
    pub qname: String,
    pub qtype: u16,
    #[serde(default)]
    pub rdata: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub lines: usize,
    pub malformed: usize,
    pub non_txt: usize,
    pub capped: usize,
}

/// 從 line-JSON 中取出 TXT 記錄並轉成 "qname rdata" 行
#[derive(Debug, Clone, Default)]
pub struct TxtExtractor {
    max_rrsets: Option<usize>,
    rrsets: HashSet<String>,
    stats: ExtractStats,
}

impl TxtExtractor {
    pub fn new(max_rrsets: Option<usize>) -> Self {
        Self {
            max_rrsets,
            ..Self::default()
        }
    }

    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    pub fn rrset_count(&self) -> usize {
        self.rrsets.len()
    }

    /// 回傳 None 表示該行被略過
    pub fn push_line(&mut self, line: &str) -> Option<RawRecord> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        self.stats.lines += 1;

        let record: ActiveDnsRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed ActiveDNS line");
                self.stats.malformed += 1;
                return None;
            }
        };

        if record.qtype != TXT_QTYPE {
            self.stats.non_txt += 1;
            return None;
        }

        let Some(rdata) = record.rdata.filter(|r| !r.trim().is_empty()) else {
            tracing::warn!(qname = %record.qname, "Skipping TXT record without rdata");
            self.stats.malformed += 1;
            return None;
        };

        // once the cap is reached no further TXT record is accepted, even for known rrsets
        if self.max_rrsets.is_some_and(|max| self.rrsets.len() >= max) {
            self.stats.capped += 1;
            return None;
        }
        self.rrsets.insert(record.qname.clone());

        RawRecord::parse(&format!("{} {}", record.qname, rdata))
    }

    pub fn extract<I, S>(&mut self, lines: I) -> Vec<RawRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let records: Vec<RawRecord> = lines
            .into_iter()
            .filter_map(|line| self.push_line(line.as_ref()))
            .collect();

        tracing::debug!(
            kept = records.len(),
            rrsets = self.rrsets.len(),
            malformed = self.stats.malformed,
            non_txt = self.stats.non_txt,
            capped = self.stats.capped,
            "Extracted TXT records"
        );
        records
    }
}
