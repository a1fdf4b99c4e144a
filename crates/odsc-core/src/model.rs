use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One human judgment of one report, as appended to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub timestamp: DateTime<Utc>,
    pub rater_id: String,
    pub report_id: String,
    pub odsc_score: f64,
    pub dimension_localfit: bool,
    pub dimension_minimal_followups: bool,
    pub failure_retrieval_miss: bool,
    pub failure_overconfident_or_drift: bool,
    #[serde(default)]
    pub comment: String,
}

impl EvaluationRecord {
    /// The nine ledger fields in header order, unencoded.
    pub fn to_fields(&self) -> [String; 9] {
        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.rater_id.clone(),
            self.report_id.clone(),
            format_score(self.odsc_score),
            flag(self.dimension_localfit),
            flag(self.dimension_minimal_followups),
            flag(self.failure_retrieval_miss),
            flag(self.failure_overconfident_or_drift),
            self.comment.clone(),
        ]
    }
}

/// Integral scores render without a fractional part (`2`, not `2.0`).
pub fn format_score(score: f64) -> String {
    // -0.0 + 0.0 == +0.0
    format!("{}", score + 0.0)
}

fn flag(value: bool) -> String {
    if value { "1" } else { "0" }.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    PerReport,
    PerRater,
    Overall,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::PerReport => "per_report",
            Section::PerRater => "per_rater",
            Section::Overall => "overall",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub section: Section,
    pub key: String,
    pub count: u64,
    pub avg: f64,
}

impl SummaryRow {
    /// Average with exactly three decimal digits.
    pub fn avg_display(&self) -> String {
        format!("{:.3}", self.avg)
    }
}

/// Aggregate statistics derived from the ledger at regeneration time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub rows: Vec<SummaryRow>,
    /// Data rows skipped because their score did not parse.
    pub skipped_rows: usize,
}

impl Summary {
    pub fn section(&self, section: Section) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter(move |r| r.section == section)
    }

    pub fn overall(&self) -> Option<&SummaryRow> {
        self.section(Section::Overall).next()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactStatus {
    pub exists: bool,
    pub bytes: u64,
}

impl ArtifactStatus {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn present(bytes: u64) -> Self {
        Self {
            exists: true,
            bytes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageStatus {
    pub write_dir: Option<PathBuf>,
    pub ledger: ArtifactStatus,
    pub summary: ArtifactStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> EvaluationRecord {
        EvaluationRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 3, 4, 10, 11, 12).unwrap(),
            rater_id: "Ana".into(),
            report_id: "report_07".into(),
            odsc_score: 2.0,
            dimension_localfit: true,
            dimension_minimal_followups: false,
            failure_retrieval_miss: false,
            failure_overconfident_or_drift: true,
            comment: "ok".into(),
        }
    }

    #[test]
    fn fields_follow_header_order() {
        let fields = record().to_fields();
        assert_eq!(
            fields,
            [
                "2025-03-04T10:11:12.000Z",
                "Ana",
                "report_07",
                "2",
                "1",
                "0",
                "0",
                "1",
                "ok"
            ]
            .map(String::from)
        );
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(0.0), "0");
        assert_eq!(format_score(-0.0), "0");
        assert_eq!(format_score(3.0), "3");
        assert_eq!(format_score(2.5), "2.5");
    }

    #[test]
    fn avg_uses_three_decimals() {
        let row = SummaryRow {
            section: Section::Overall,
            key: "ALL".into(),
            count: 3,
            avg: 5.0 / 3.0,
        };
        assert_eq!(row.avg_display(), "1.667");
    }
}
