use std::io::Read;
use std::path::Path;

use anyhow::Context;
use odsc_core::validate::{
    FIELD_COMMENT, FIELD_LOCALFIT, FIELD_MINIMAL_FOLLOWUPS, FIELD_OVERCONFIDENT, FIELD_RATER,
    FIELD_REPORT, FIELD_RETRIEVAL_MISS, FIELD_SCORE,
};
use odsc_core::EvalService;
use serde_json::{json, Value};

use super::super::args::SubmitArgs;
use super::report_error;
use crate::exit_codes::{SUCCESS, VALIDATION_FAILED};

pub(crate) async fn run(svc: &EvalService, args: SubmitArgs) -> anyhow::Result<i32> {
    let payload = match &args.payload {
        Some(path) => match read_payload(path)? {
            Ok(v) => v,
            Err(e) => {
                eprintln!("error: validation error: payload is not valid JSON: {e}");
                return Ok(VALIDATION_FAILED);
            }
        },
        None => payload_from_flags(&args),
    };

    match svc.submit_evaluation(&payload).await {
        Ok(record) => {
            eprintln!(
                "evaluation recorded: rater={} report={} score={}",
                record.rater_id, record.report_id, record.odsc_score
            );
            Ok(SUCCESS)
        }
        Err(e) => Ok(report_error(&e)),
    }
}

/// The outer error is an I/O failure; the inner one a malformed submission.
fn read_payload(path: &Path) -> anyhow::Result<Result<Value, serde_json::Error>> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display()))?
    };
    Ok(serde_json::from_str(&raw))
}

/// Flags become the same untyped payload a transport would send, so the
/// validator sees one input shape. Options left unset are omitted, not null.
fn payload_from_flags(args: &SubmitArgs) -> Value {
    let mut body = json!({
        FIELD_LOCALFIT: args.localfit,
        FIELD_MINIMAL_FOLLOWUPS: args.minimal_followups,
        FIELD_RETRIEVAL_MISS: args.retrieval_miss,
        FIELD_OVERCONFIDENT: args.overconfident,
        FIELD_COMMENT: args.comment,
    });
    for (key, value) in [
        (FIELD_RATER, &args.rater),
        (FIELD_REPORT, &args.report),
        (FIELD_SCORE, &args.score),
    ] {
        if let Some(v) = value {
            body[key] = json!(v);
        }
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SubmitArgs {
        SubmitArgs {
            payload: None,
            rater: Some("Ana".into()),
            report: Some("r1".into()),
            score: Some("2".into()),
            localfit: true,
            minimal_followups: false,
            retrieval_miss: false,
            overconfident: true,
            comment: "ok".into(),
        }
    }

    #[test]
    fn flags_map_to_submission_fields() {
        let v = payload_from_flags(&args());
        assert_eq!(v[FIELD_RATER], "Ana");
        assert_eq!(v[FIELD_SCORE], "2");
        assert_eq!(v[FIELD_LOCALFIT], true);
        assert_eq!(v[FIELD_OVERCONFIDENT], true);
        assert_eq!(v[FIELD_RETRIEVAL_MISS], false);
    }

    #[test]
    fn unset_score_is_omitted_and_rejected() {
        let mut a = args();
        a.score = None;
        let v = payload_from_flags(&a);
        assert!(v.get(FIELD_SCORE).is_none());
        assert!(odsc_core::validate::validate_submission(&v).unwrap_err().is_validation());
    }

    #[test]
    fn malformed_payload_file_is_not_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(read_payload(&path).unwrap().is_err());
        assert!(read_payload(&dir.path().join("absent.json")).is_err());
    }
}
