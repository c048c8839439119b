//! Quota detection for YouTube Data API responses
//!
//! Distinguishes quota exhaustion (403 with a quota reason in the body) from
//! every other failure. Only quota exhaustion makes the key pool mark the key
//! exhausted and rotate; anything else fails the current cycle.

use provider::Error;

/// Body fragments that identify quota exhaustion.
///
/// `quota` covers both the `quotaExceeded` reason and the human-readable
/// "you have exceeded your quota" message.
const QUOTA_PATTERNS: &[&str] = &["quota", "dailylimitexceeded", "ratelimitexceeded"];

/// Whether an error body reports quota exhaustion. Case-insensitive.
pub fn is_quota_body(body: &str) -> bool {
    let lower = body.to_lowercase();
    QUOTA_PATTERNS.iter().any(|pattern| lower.contains(pattern))
}

/// Classify a non-success upstream response.
///
/// A 403 with a quota body becomes `QuotaExceeded`; every other status is
/// returned as `Status` with the body attached.
pub fn classify_failure(status: u16, body: String) -> Error {
    match status {
        403 if is_quota_body(&body) => Error::QuotaExceeded(quota_message(&body)),
        _ => Error::Status { status, body },
    }
}

/// Extract `error.message` from a Google API error body, falling back to the
/// raw body.
fn quota_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_owned))
        .unwrap_or_else(|| body.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTA_BODY: &str = r#"{
        "error": {
            "code": 403,
            "message": "The request cannot be completed because you have exceeded your quota.",
            "errors": [{"domain": "youtube.quota", "reason": "quotaExceeded"}]
        }
    }"#;

    #[test]
    fn quota_exceeded_reason_detected() {
        assert!(is_quota_body(QUOTA_BODY));
    }

    #[test]
    fn daily_limit_reason_detected() {
        let body = r#"{"error":{"errors":[{"reason":"dailyLimitExceeded"}]}}"#;
        assert!(is_quota_body(body));
    }

    #[test]
    fn rate_limit_reason_detected_case_insensitive() {
        assert!(is_quota_body("RATELIMITEXCEEDED"));
    }

    #[test]
    fn forbidden_without_quota_is_not_quota() {
        let body = r#"{"error":{"code":403,"message":"The request is not properly authorized.","errors":[{"reason":"forbidden"}]}}"#;
        assert!(!is_quota_body(body));
    }

    #[test]
    fn empty_body_is_not_quota() {
        assert!(!is_quota_body(""));
    }

    #[test]
    fn classify_403_quota_extracts_message() {
        match classify_failure(403, QUOTA_BODY.to_string()) {
            Error::QuotaExceeded(msg) => {
                assert!(msg.contains("exceeded your quota"), "got: {msg}")
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[test]
    fn classify_429_is_status() {
        let err = classify_failure(429, "rateLimitExceeded".into());
        assert!(matches!(err, Error::Status { status: 429, .. }));
    }

    #[test]
    fn classify_403_without_quota_is_status() {
        let err = classify_failure(403, "forbidden".into());
        assert!(matches!(err, Error::Status { status: 403, .. }));
    }

    #[test]
    fn classify_500_with_quota_word_is_status() {
        let err = classify_failure(500, "quota backend unavailable".into());
        assert!(matches!(err, Error::Status { status: 500, .. }));
    }

    #[test]
    fn classify_non_json_quota_body_keeps_raw_message() {
        match classify_failure(403, "quotaExceeded".into()) {
            Error::QuotaExceeded(msg) => assert_eq!(msg, "quotaExceeded"),
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }
}
