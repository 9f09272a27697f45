//! Attack engine: owns the transports and reports every attack exactly once

use crate::runner::{AttackRunner, AttackRunnerFactory};
use crate::transport::{ReqwestSender, TcpCorruptSender};
use crate::{CorruptSender, Dispatcher, HttpSender, Outcome, TransportError};
use monkey_common::{AttackConfig, AttackKind, Config, EndpointConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Shared sink every attack reports its outcome to
pub type ResultSender = mpsc::UnboundedSender<Outcome>;

/// Core attack execution engine
#[derive(Clone)]
pub struct AttackEngine {
    http_sender: Arc<dyn HttpSender>,
    corrupt_sender: Arc<dyn CorruptSender>,
    deadline: Option<Duration>,
    seed: Option<u64>,
}

impl AttackEngine {
    /// Create a new attack engine
    pub fn new(http_sender: Arc<dyn HttpSender>, corrupt_sender: Arc<dyn CorruptSender>) -> Self {
        Self {
            http_sender,
            corrupt_sender,
            deadline: None,
            seed: None,
        }
    }

    /// Engine backed by a reqwest client and raw TCP for corrupt requests
    pub fn with_default_transports() -> Result<Self, TransportError> {
        Ok(Self::new(
            Arc::new(ReqwestSender::new()?),
            Arc::new(TcpCorruptSender::new()),
        ))
    }

    /// Per-request deadline. None keeps the blocking default.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Seed for random method selection
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::clone(&self.http_sender))
            .with_deadline(self.deadline)
            .with_seed(self.seed)
    }

    pub fn corrupt_sender(&self) -> Arc<dyn CorruptSender> {
        Arc::clone(&self.corrupt_sender)
    }

    pub fn runner(&self, kind: AttackKind) -> Box<dyn AttackRunner> {
        AttackRunnerFactory::create(kind, self)
    }

    /// Run one attack and return its outcome
    pub async fn execute(&self, endpoint: &EndpointConfig, attack: &AttackConfig) -> Outcome {
        let span = info_span!(
            "attack",
            run_id = %Uuid::new_v4(),
            endpoint = %endpoint.name,
            kind = %attack.kind
        );

        async {
            let runner = self.runner(attack.kind);
            info!("Starting {}", runner.description());
            let outcome = runner.run(endpoint, attack).await;

            if outcome.passed {
                info!("{} attack passed", attack.kind);
            } else {
                warn!("{} attack failed: {}", attack.kind, outcome.report);
            }

            outcome
        }
        .instrument(span)
        .await
    }

    /// Run one attack and write its outcome onto `results`
    pub async fn run_attack(
        &self,
        endpoint: &EndpointConfig,
        attack: &AttackConfig,
        results: &ResultSender,
    ) {
        let outcome = self.execute(endpoint, attack).await;
        report(results, outcome);
    }

    /// Run every attack of every endpoint concurrently and wait for all of
    /// them. Returns the number of outcomes the consumer received.
    pub async fn run_all(&self, config: &Config, results: ResultSender) -> usize {
        let mut attacks = JoinSet::new();

        for endpoint in &config.endpoints {
            for attack in &endpoint.attacks {
                let engine = self.clone();
                let endpoint = endpoint.clone();
                let attack = attack.clone();
                let results = results.clone();

                attacks.spawn(async move {
                    let (name, fallback) = (endpoint.name.clone(), attack.clone());
                    let run = tokio::spawn(async move { engine.execute(&endpoint, &attack).await });

                    let outcome = match run.await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            error!("Attack task on {} died: {}", name, e);
                            Outcome::fail(&name, &fallback, format!("Attack task failed: {}", e))
                        }
                    };
                    report(&results, outcome)
                });
            }
        }

        let mut reported = 0;
        while let Some(joined) = attacks.join_next().await {
            match joined {
                Ok(true) => reported += 1,
                Ok(false) => {}
                Err(e) => error!("Attack reporter task failed: {}", e),
            }
        }

        info!("Finished {} attacks", reported);
        reported
    }
}

/// Returns false when the outcome had nowhere to go
fn report(results: &ResultSender, outcome: Outcome) -> bool {
    if results.send(outcome).is_err() {
        warn!("Result consumer is gone, outcome dropped");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{FixedCorruptSender, ScriptedSender};
    use monkey_common::fixtures::{endpoint_and_attack, full_config};

    fn engine(status: u16, corrupt_reply: &str) -> AttackEngine {
        AttackEngine::new(
            Arc::new(ScriptedSender::always(status)),
            Arc::new(FixedCorruptSender::reply(corrupt_reply)),
        )
    }

    #[tokio::test]
    async fn test_run_attack_emits_exactly_once() {
        let (endpoint, attack) = endpoint_and_attack("200");
        let (tx, mut rx) = mpsc::unbounded_channel();

        engine(200, "").run_attack(&endpoint, &attack, &tx).await;
        drop(tx);

        let outcome = rx.recv().await.unwrap();
        assert!(outcome.passed);
        assert_eq!(outcome.endpoint, "Test Endpoint");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_mismatch_emits_once() {
        let (endpoint, mut attack) = endpoint_and_attack("400");
        attack.kind = AttackKind::CorruptHttp;
        let (tx, mut rx) = mpsc::unbounded_channel();

        engine(200, "HTTP/1.1 200 OK").run_attack(&endpoint, &attack, &tx).await;
        drop(tx);

        assert!(!rx.recv().await.unwrap().passed);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_run_all_reports_every_attack() {
        let mut config = full_config();
        let (mut second, attack) = endpoint_and_attack("200");
        second.name = "Second".to_string();

        let mut corrupt = attack.clone();
        corrupt.kind = AttackKind::CorruptHttp;
        let mut query = attack.clone();
        query.kind = AttackKind::UrlQuery;
        query.parameters = "id".to_string();
        second.attacks = vec![attack, corrupt, query];
        config.endpoints.push(second);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let reported = engine(200, "HTTP/1.1 200 OK").run_all(&config, tx).await;
        assert_eq!(reported, 4);

        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|o| o.passed));
    }

    #[tokio::test]
    async fn test_dropped_consumer_does_not_panic() {
        let (endpoint, attack) = endpoint_and_attack("200");
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        engine(200, "").run_attack(&endpoint, &attack, &tx).await;
    }

    #[tokio::test]
    async fn test_run_all_counts_only_delivered_outcomes() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);

        let reported = engine(200, "").run_all(&full_config(), tx).await;
        assert_eq!(reported, 0);
    }
}
