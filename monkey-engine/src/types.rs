//! Core data types for the attack engine

use crate::error::UnknownMethod;
use monkey_common::AttackConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP methods the engine can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Head,
}

impl HttpMethod {
    /// Every method, in the order random selection draws from
    pub const ALL: [HttpMethod; 7] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Pick one method uniformly at random
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMethod {
                method: s.to_string(),
            })
    }
}

/// How each request of an attack picks its method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSelection {
    Fixed(HttpMethod),
    Random,
}

impl MethodSelection {
    /// Empty text means random selection per request
    pub fn from_config(method: &str) -> Result<Self, UnknownMethod> {
        if method.trim().is_empty() {
            Ok(MethodSelection::Random)
        } else {
            method.parse().map(MethodSelection::Fixed)
        }
    }

    pub fn resolve<R: Rng>(&self, rng: &mut R) -> HttpMethod {
        match self {
            MethodSelection::Fixed(method) => *method,
            MethodSelection::Random => HttpMethod::random(rng),
        }
    }
}

/// Adversarial values injected into query parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FakeValue {
    Benign,
    Ampersand,
    At,
    DoubleQuote,
}

impl FakeValue {
    pub const ALL: [FakeValue; 4] = [
        FakeValue::Benign,
        FakeValue::Ampersand,
        FakeValue::At,
        FakeValue::DoubleQuote,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FakeValue::Benign => "hello",
            FakeValue::Ampersand => "&hello",
            FakeValue::At => "@",
            FakeValue::DoubleQuote => "\"",
        }
    }
}

/// Status of one received HTTP response.
///
/// Transports drop the body unread before building this value, so
/// holding one never keeps a connection busy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceivedResponse {
    pub status_code: u16,
    pub reason: Option<String>,
}

impl ReceivedResponse {
    pub fn new(status_code: u16) -> Self {
        Self {
            status_code,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Status code as text, the form expected statuses are compared against
    pub fn status(&self) -> String {
        self.status_code.to_string()
    }

    /// Code and reason phrase, e.g. `200 OK`, when the reason is known
    pub fn status_line(&self) -> Option<String> {
        self.reason
            .as_ref()
            .map(|reason| format!("{} {}", self.status_code, reason))
    }

    /// Whether `expected` names this status, either as the bare code or as
    /// the full status line
    pub fn matches_status(&self, expected: &str) -> bool {
        let expected = expected.trim();
        expected == self.status() || self.status_line().as_deref() == Some(expected)
    }
}

/// One unit of work arriving on the fan-in channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSignal {
    Received(ReceivedResponse),
    TransportFailure { reason: String },
}

impl ResponseSignal {
    pub fn failure(reason: impl Into<String>) -> Self {
        ResponseSignal::TransportFailure {
            reason: reason.into(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResponseSignal::TransportFailure { .. })
    }
}

impl From<ReceivedResponse> for ResponseSignal {
    fn from(response: ReceivedResponse) -> Self {
        ResponseSignal::Received(response)
    }
}

/// Verdict of a single attack run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub endpoint: String,
    pub passed: bool,
    /// Empty on a plain pass
    pub report: String,
    pub expected: String,
    pub actual: String,
    pub attack: AttackConfig,
}

impl Outcome {
    pub fn pass(endpoint: &str, attack: &AttackConfig, report: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            passed: true,
            report: report.into(),
            expected: String::new(),
            actual: String::new(),
            attack: attack.clone(),
        }
    }

    pub fn fail(endpoint: &str, attack: &AttackConfig, report: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            passed: false,
            report: report.into(),
            expected: String::new(),
            actual: String::new(),
            attack: attack.clone(),
        }
    }

    /// Attach the expected and observed values of a failed check
    pub fn with_mismatch(mut self, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        self.expected = expected.into();
        self.actual = actual.into();
        self
    }
}
