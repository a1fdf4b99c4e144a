//! One rater's pass over a shuffled set of reports.

use anyhow::bail;
use odsc_core::validate::{
    FIELD_COMMENT, FIELD_LOCALFIT, FIELD_MINIMAL_FOLLOWUPS, FIELD_OVERCONFIDENT, FIELD_RATER,
    FIELD_REPORT, FIELD_RETRIEVAL_MISS, FIELD_SCORE,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde_json::{json, Value};

use crate::reports::ReportEntry;

/// Answers collected for the current report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rating {
    pub score: u8,
    pub localfit: bool,
    pub minimal_followups: bool,
    pub retrieval_miss: bool,
    pub overconfident: bool,
    pub comment: String,
}

#[derive(Debug)]
pub struct RatingSession {
    rater: String,
    order: Vec<ReportEntry>,
    position: usize,
}

impl RatingSession {
    pub fn new(rater: &str, mut reports: Vec<ReportEntry>, seed: Option<u64>) -> anyhow::Result<Self> {
        let rater = rater.trim();
        if rater.is_empty() {
            bail!("rater name must not be empty");
        }
        if reports.is_empty() {
            bail!("no reports to rate");
        }
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        reports.shuffle(&mut rng);
        Ok(Self {
            rater: rater.to_string(),
            order: reports,
            position: 0,
        })
    }

    pub fn rater(&self) -> &str {
        &self.rater
    }

    pub fn current(&self) -> Option<&ReportEntry> {
        self.order.get(self.position)
    }

    /// Moves to the next report; call only after a successful submit.
    pub fn advance(&mut self) {
        if self.position < self.order.len() {
            self.position += 1;
        }
    }

    /// (1-based index of the current report, total).
    pub fn progress(&self) -> (usize, usize) {
        ((self.position + 1).min(self.order.len()), self.order.len())
    }

    pub fn is_done(&self) -> bool {
        self.position >= self.order.len()
    }

    /// Submission payload for the current report.
    pub fn payload(&self, rating: &Rating) -> Option<Value> {
        let report = self.current()?;
        Some(json!({
            FIELD_RATER: self.rater,
            FIELD_REPORT: report.id,
            FIELD_SCORE: rating.score,
            FIELD_LOCALFIT: rating.localfit,
            FIELD_MINIMAL_FOLLOWUPS: rating.minimal_followups,
            FIELD_RETRIEVAL_MISS: rating.retrieval_miss,
            FIELD_OVERCONFIDENT: rating.overconfident,
            FIELD_COMMENT: rating.comment,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn reports(n: usize) -> Vec<ReportEntry> {
        (0..n)
            .map(|i| ReportEntry {
                id: format!("r{i}"),
                path: PathBuf::from(format!("r{i}.md")),
            })
            .collect()
    }

    fn ids(s: &mut RatingSession) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(r) = s.current() {
            out.push(r.id.clone());
            s.advance();
        }
        out
    }

    #[test]
    fn seeded_order_is_reproducible_permutation() {
        let mut a = RatingSession::new("Ana", reports(8), Some(7)).unwrap();
        let mut b = RatingSession::new("Ana", reports(8), Some(7)).unwrap();
        let order_a = ids(&mut a);
        assert_eq!(order_a, ids(&mut b));

        let mut sorted = order_a.clone();
        sorted.sort();
        let mut expected: Vec<_> = (0..8).map(|i| format!("r{i}")).collect();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn rejects_blank_rater_and_empty_set() {
        assert!(RatingSession::new("  ", reports(2), None).is_err());
        assert!(RatingSession::new("Ana", Vec::new(), None).is_err());
    }

    #[test]
    fn progress_and_completion() {
        let mut s = RatingSession::new(" Ana ", reports(2), Some(1)).unwrap();
        assert_eq!(s.rater(), "Ana");
        assert_eq!(s.progress(), (1, 2));
        s.advance();
        assert_eq!(s.progress(), (2, 2));
        assert!(!s.is_done());
        s.advance();
        assert!(s.is_done());
        assert!(s.current().is_none());
        s.advance();
        assert_eq!(s.progress(), (2, 2));
    }

    #[test]
    fn payload_passes_validation() {
        let s = RatingSession::new("Ana", reports(1), Some(3)).unwrap();
        let rating = Rating {
            score: 2,
            retrieval_miss: true,
            comment: "thin sources".into(),
            ..Rating::default()
        };
        let payload = s.payload(&rating).unwrap();
        let record = odsc_core::validate::validate_submission(&payload).unwrap();
        assert_eq!(record.rater_id, "Ana");
        assert_eq!(record.report_id, "r0");
        assert_eq!(record.odsc_score, 2.0);
        assert!(record.failure_retrieval_miss);
    }
}
