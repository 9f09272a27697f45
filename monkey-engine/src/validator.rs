//! Status checks for received responses

use crate::{ReceivedResponse, ResponseSignal};

pub const NO_RESPONSE_REPORT: &str = "Error occurred during HTTP request";
pub const NO_RESPONSE_EXPECTED: &str = "A valid HTTP Response";
pub const NO_RESPONSE_ACTUAL: &str = "No HTTP Response";

/// Pass/fail plus the text needed to explain a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub passed: bool,
    pub report: String,
    pub expected: String,
    pub actual: String,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            passed: true,
            report: String::new(),
            expected: String::new(),
            actual: String::new(),
        }
    }

    pub fn fail(report: String, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            passed: false,
            report,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Compare one response against the expected status, ignoring surrounding
/// whitespace. Either the bare code (`200`) or the status line (`200 OK`)
/// matches.
pub fn check_response(response: &ReceivedResponse, expected_status: &str) -> Verdict {
    let expected = expected_status.trim();
    let actual = response.status();

    if !response.matches_status(expected) {
        let report = format!(
            "Invalid status code of {} detected. Expected {}",
            actual, expected
        );
        return Verdict::fail(report, expected, actual);
    }

    Verdict::pass()
}

/// Check responses in order, stopping at the first mismatch
pub fn check_responses(responses: &[ReceivedResponse], expected_status: &str) -> Verdict {
    responses
        .iter()
        .map(|response| check_response(response, expected_status))
        .find(|verdict| !verdict.passed)
        .unwrap_or_else(Verdict::pass)
}

/// Like [`check_responses`], but a failure signal in the set fails the check
pub fn check_signals(signals: &[ResponseSignal], expected_status: &str) -> Verdict {
    for signal in signals {
        let verdict = match signal {
            ResponseSignal::Received(response) => check_response(response, expected_status),
            ResponseSignal::TransportFailure { .. } => {
                return Verdict::fail(
                    NO_RESPONSE_REPORT.to_string(),
                    NO_RESPONSE_EXPECTED,
                    NO_RESPONSE_ACTUAL,
                );
            }
        };

        if !verdict.passed {
            return verdict;
        }
    }

    Verdict::pass()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses(statuses: &[u16]) -> Vec<ReceivedResponse> {
        statuses.iter().map(|s| ReceivedResponse::new(*s)).collect()
    }

    #[test]
    fn test_trim_insensitive_match() {
        let verdict = check_response(&ReceivedResponse::new(200), " 200 ");
        assert!(verdict.passed);
        assert!(verdict.report.is_empty());
    }

    #[test]
    fn test_status_line_match() {
        let ok = ReceivedResponse::new(200).with_reason("OK");
        assert!(check_response(&ok, "200 OK").passed);
        assert!(check_response(&ok, " 200 OK ").passed);
        assert!(check_response(&ok, " 200 ").passed);

        let verdict = check_response(&ok, "200 Created");
        assert!(!verdict.passed);
        assert_eq!(verdict.expected, "200 Created");
        assert_eq!(verdict.actual, "200");
    }

    #[test]
    fn test_status_line_needs_reason() {
        assert!(!check_response(&ReceivedResponse::new(200), "200 OK").passed);
        assert!(check_response(&ReceivedResponse::new(200), "200").passed);
    }

    #[test]
    fn test_mismatch_reports_expected_and_actual() {
        let verdict = check_response(&ReceivedResponse::new(500), "200");
        assert!(!verdict.passed);
        assert_eq!(verdict.expected, "200");
        assert_eq!(verdict.actual, "500");
        assert_eq!(verdict.report, "Invalid status code of 500 detected. Expected 200");
    }

    #[test]
    fn test_first_mismatch_wins() {
        let verdict = check_responses(&responses(&[200, 404, 500]), "200");
        assert!(!verdict.passed);
        assert_eq!(verdict.actual, "404");
    }

    #[test]
    fn test_all_matching() {
        assert!(check_responses(&responses(&[200, 200, 200]), "200").passed);
        assert!(check_responses(&[], "200").passed);
    }

    #[test]
    fn test_failure_signal_in_set() {
        let signals = vec![
            ResponseSignal::Received(ReceivedResponse::new(200)),
            ResponseSignal::failure("reset"),
            ResponseSignal::Received(ReceivedResponse::new(404)),
        ];

        let verdict = check_signals(&signals, "200");
        assert!(!verdict.passed);
        assert_eq!(verdict.report, NO_RESPONSE_REPORT);
        assert_eq!(verdict.expected, NO_RESPONSE_EXPECTED);
        assert_eq!(verdict.actual, NO_RESPONSE_ACTUAL);
    }

    #[test]
    fn test_signal_mismatch_before_failure() {
        let signals = vec![
            ResponseSignal::Received(ReceivedResponse::new(418)),
            ResponseSignal::failure("reset"),
        ];

        assert_eq!(check_signals(&signals, "200").actual, "418");
    }
}
