//! Aggregation and rendering of attack outcomes

use chrono::{DateTime, Utc};
use monkey_engine::Outcome;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tokio::sync::mpsc;

/// Every outcome of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<Outcome>,
}

impl RunSummary {
    /// Drain `results` until every writer is gone
    pub async fn collect(
        started_at: DateTime<Utc>,
        mut results: mpsc::UnboundedReceiver<Outcome>,
    ) -> Self {
        let mut outcomes = Vec::new();
        while let Some(outcome) = results.recv().await {
            outcomes.push(outcome);
        }

        Self {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        }
    }

    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    /// Process exit status for this run
    pub fn exit_code(&self) -> u8 {
        if self.all_passed() {
            0
        } else {
            1
        }
    }

    /// One line per attack, with details under each failure
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        for outcome in &self.outcomes {
            let mark = if outcome.passed { "PASS" } else { "FAIL" };
            let _ = write!(out, "[{}] {} / {}", mark, outcome.endpoint, outcome.attack.kind);
            if !outcome.report.is_empty() {
                let _ = write!(out, ": {}", outcome.report);
            }
            out.push('\n');

            if !outcome.passed && (!outcome.expected.is_empty() || !outcome.actual.is_empty()) {
                let _ = writeln!(out, "    expected: {}", outcome.expected);
                let _ = writeln!(out, "    actual:   {}", outcome.actual);
            }
        }

        let elapsed = self.finished_at - self.started_at;
        let _ = writeln!(
            out,
            "{} attacks, {} passed, {} failed in {}ms",
            self.outcomes.len(),
            self.passed(),
            self.failed(),
            elapsed.num_milliseconds()
        );

        out
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monkey_common::fixtures::endpoint_and_attack;

    fn summary(outcomes: Vec<Outcome>) -> RunSummary {
        let now = Utc::now();
        RunSummary {
            started_at: now,
            finished_at: now,
            outcomes,
        }
    }

    #[tokio::test]
    async fn test_collect_until_writers_gone() {
        let (_, attack) = endpoint_and_attack("200");
        let (tx, rx) = mpsc::unbounded_channel();
        let second = tx.clone();

        tx.send(Outcome::pass("a", &attack, "")).unwrap();
        second.send(Outcome::fail("b", &attack, "nope")).unwrap();
        drop(tx);
        drop(second);

        let summary = RunSummary::collect(Utc::now(), rx).await;
        assert_eq!(summary.outcomes.len(), 2);
        assert_eq!(summary.passed(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.exit_code(), 1);
    }

    #[test]
    fn test_render_text_shows_mismatch() {
        let (_, attack) = endpoint_and_attack("200");
        let summary = summary(vec![
            Outcome::pass("Login", &attack, ""),
            Outcome::fail("Search", &attack, "Failure during HTTP Spam.").with_mismatch("200", "503"),
        ]);

        let text = summary.render_text();
        assert!(text.contains("[PASS] Login / HTTP Spam\n"));
        assert!(text.contains("[FAIL] Search / HTTP Spam: Failure during HTTP Spam."));
        assert!(text.contains("expected: 200"));
        assert!(text.contains("actual:   503"));
        assert!(text.contains("2 attacks, 1 passed, 1 failed"));
    }

    #[test]
    fn test_render_json() {
        let (_, attack) = endpoint_and_attack("200");
        let summary = summary(vec![Outcome::pass("Login", &attack, "")]);

        let value: serde_json::Value = serde_json::from_str(&summary.render_json().unwrap()).unwrap();
        assert_eq!(value["outcomes"][0]["endpoint"], "Login");
        assert!(summary.all_passed());
        assert_eq!(summary.exit_code(), 0);
    }

    #[test]
    fn test_empty_run_passes() {
        assert!(summary(Vec::new()).all_passed());
    }
}
