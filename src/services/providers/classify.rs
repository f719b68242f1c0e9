/// Failure classification for provider errors. The substring tables, not
/// error types, drive every failover decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Connection,
    Quota,
    Other,
}

const CONNECTION_INDICATORS: &[&str] = &[
    "connection refused",
    "no such host",
    "network unreachable",
    "connection reset",
    "timeout",
    "dial failure",
    "unexpected end of input",
];

const QUOTA_INDICATORS: &[&str] = &[
    "429",
    "quota",
    "rate limit",
    "too many requests",
    "resource exhausted",
];

pub fn classify(error: &str) -> FailureClass {
    let lowered = error.to_lowercase();
    if CONNECTION_INDICATORS.iter().any(|hint| lowered.contains(hint)) {
        return FailureClass::Connection;
    }
    if QUOTA_INDICATORS.iter().any(|hint| lowered.contains(hint)) {
        return FailureClass::Quota;
    }
    FailureClass::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_matches_connection_indicators_case_insensitively() {
        assert_eq!(classify("dial tcp: Connection Refused"), FailureClass::Connection);
        assert_eq!(classify("lookup api.test: no such host"), FailureClass::Connection);
        assert_eq!(classify("provider call timeout after 60s"), FailureClass::Connection);
        assert_eq!(classify("read: connection reset by peer"), FailureClass::Connection);
        assert_eq!(classify("Unexpected end of input"), FailureClass::Connection);
    }

    #[test]
    fn classify_matches_quota_indicators() {
        assert_eq!(classify("provider error (status 429): slow down"), FailureClass::Quota);
        assert_eq!(classify("monthly QUOTA exceeded"), FailureClass::Quota);
        assert_eq!(classify("rate limit reached for model"), FailureClass::Quota);
        assert_eq!(classify("Too Many Requests"), FailureClass::Quota);
        assert_eq!(classify("RESOURCE_EXHAUSTED"), FailureClass::Other);
        assert_eq!(classify("resource exhausted"), FailureClass::Quota);
    }

    #[test]
    fn classify_falls_back_to_other() {
        assert_eq!(classify("invalid api key"), FailureClass::Other);
        assert_eq!(classify(""), FailureClass::Other);
    }

    #[test]
    fn connection_wins_when_both_tables_match() {
        // "timeout ... 429" — the connection table is checked first.
        assert_eq!(classify("timeout waiting for 429 retry"), FailureClass::Connection);
    }
}
