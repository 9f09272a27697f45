//! Attack runner implementations
//!
//! Each runner dispatches its traffic, collects and validates what comes
//! back, and returns a single [`Outcome`]. Runners never fail: every
//! transport or validation problem is folded into the outcome.

use crate::collector::{collect_responses, Collection};
use crate::dispatcher::{Dispatcher, SpamPlan};
use crate::validator::check_responses;
use crate::{AttackEngine, CorruptSender, FakeValue, Outcome};
use async_trait::async_trait;
use monkey_common::{build_network_path, AttackConfig, AttackKind, EndpointConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Runs one kind of attack against an endpoint
#[async_trait]
pub trait AttackRunner: Send + Sync {
    /// Execute the attack and produce its verdict
    async fn run(&self, endpoint: &EndpointConfig, attack: &AttackConfig) -> Outcome;

    /// Attack kind this runner handles
    fn kind(&self) -> AttackKind;

    /// Get a description of this runner
    fn description(&self) -> String;
}

/// Fires `concurrents x messagesPerConcurrent` requests at the endpoint path
pub struct HttpSpamRunner {
    dispatcher: Dispatcher,
}

impl HttpSpamRunner {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl AttackRunner for HttpSpamRunner {
    async fn run(&self, endpoint: &EndpointConfig, attack: &AttackConfig) -> Outcome {
        let target = endpoint_url(endpoint);

        let plan = match SpamPlan::from_attack(attack) {
            Ok(plan) => plan,
            Err(e) => {
                return Outcome::fail(&endpoint.name, attack, format!("Failure during HTTP Spam. {}", e));
            }
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let workers = self.dispatcher.dispatch_spam(&target, &plan, tx);

        debug!("Collecting {} responses from {}", plan.total(), target);
        let collection = collect_responses(&mut rx, plan.total()).await;
        let responses = settle(workers, collection).await;

        if responses.is_empty() {
            return Outcome::fail(&endpoint.name, attack, "Error occurred during HTTP Spam.");
        }

        let verdict = check_responses(&responses, &attack.expected_status);
        if !verdict.passed {
            return Outcome::fail(
                &endpoint.name,
                attack,
                format!("Failure during HTTP Spam. {}", verdict.report),
            )
            .with_mismatch(verdict.expected, verdict.actual);
        }

        Outcome::pass(&endpoint.name, attack, "")
    }

    fn kind(&self) -> AttackKind {
        AttackKind::HttpSpam
    }

    fn description(&self) -> String {
        "HTTP Spam: concurrent bursts of requests against one path".to_string()
    }
}

/// Writes a malformed request straight to the endpoint's host and port
pub struct CorruptHttpRunner {
    sender: Arc<dyn CorruptSender>,
    deadline: Option<Duration>,
}

impl CorruptHttpRunner {
    pub fn new(sender: Arc<dyn CorruptSender>) -> Self {
        Self {
            sender,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

#[async_trait]
impl AttackRunner for CorruptHttpRunner {
    async fn run(&self, endpoint: &EndpointConfig, attack: &AttackConfig) -> Outcome {
        let address = build_network_path("", &endpoint.host, &endpoint.port, "");

        let (tx, rx) = oneshot::channel();
        let sender = Arc::clone(&self.sender);
        let deadline = self.deadline;

        tokio::spawn(async move {
            let result = match deadline {
                Some(limit) => tokio::time::timeout(limit, sender.send_corrupt(&address))
                    .await
                    .unwrap_or_else(|_| {
                        Err(crate::TransportError::timeout(
                            &format!("corrupt request to {}", address),
                            limit,
                        ))
                    }),
                None => sender.send_corrupt(&address).await,
            };

            let raw = result.unwrap_or_else(|e| {
                warn!("Corrupt request to {} failed: {}", address, e);
                String::new()
            });
            let _ = tx.send(raw);
        });

        let raw = rx.await.unwrap_or_default();

        if raw.is_empty() {
            return Outcome::fail(
                &endpoint.name,
                attack,
                "Expected valid response but got empty String.",
            );
        }

        let expected = attack.expected_status.trim();
        if !raw.contains(expected) {
            return Outcome::fail(
                &endpoint.name,
                attack,
                format!("Expected Status = {} | Actual Response = {}", expected, raw),
            )
            .with_mismatch(expected, raw);
        }

        Outcome::pass(
            &endpoint.name,
            attack,
            format!("Corrupt HTTP Test passed for endpoint {}", endpoint.name),
        )
    }

    fn kind(&self) -> AttackKind {
        AttackKind::CorruptHttp
    }

    fn description(&self) -> String {
        "Corrupt HTTP: one malformed raw request, raw reply checked for the status".to_string()
    }
}

/// Injects every fake value into every declared query parameter
pub struct UrlQueryRunner {
    dispatcher: Dispatcher,
}

impl UrlQueryRunner {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl AttackRunner for UrlQueryRunner {
    async fn run(&self, endpoint: &EndpointConfig, attack: &AttackConfig) -> Outcome {
        let target = endpoint_url(endpoint);
        let parameters = attack.parameter_list();
        let expected_count = parameters.len() * FakeValue::ALL.len();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let workers = self.dispatcher.dispatch_query(&target, &parameters, tx);

        debug!("Collecting {} query responses from {}", expected_count, target);
        let collection = collect_responses(&mut rx, expected_count).await;
        let responses = settle(workers, collection).await;

        if responses.is_empty() {
            return Outcome::fail(&endpoint.name, attack, "Web Error Occurred.");
        }

        let verdict = check_responses(&responses, &attack.expected_status);
        if !verdict.passed {
            return Outcome::fail(&endpoint.name, attack, verdict.report)
                .with_mismatch(verdict.expected, verdict.actual);
        }

        Outcome::pass(
            &endpoint.name,
            attack,
            format!("URL Query Spam passed for endpoint {}", endpoint.name),
        )
    }

    fn kind(&self) -> AttackKind {
        AttackKind::UrlQuery
    }

    fn description(&self) -> String {
        "URL Query: adversarial values injected into each query parameter".to_string()
    }
}

/// Factory for creating attack runners
pub struct AttackRunnerFactory;

impl AttackRunnerFactory {
    /// Create a runner for `kind` backed by the engine's transports
    pub fn create(kind: AttackKind, engine: &AttackEngine) -> Box<dyn AttackRunner> {
        match kind {
            AttackKind::HttpSpam => Box::new(HttpSpamRunner::new(engine.dispatcher())),
            AttackKind::CorruptHttp => Box::new(
                CorruptHttpRunner::new(engine.corrupt_sender()).with_deadline(engine.deadline()),
            ),
            AttackKind::UrlQuery => Box::new(UrlQueryRunner::new(engine.dispatcher())),
        }
    }

    /// Get all supported attack kinds
    pub fn supported_kinds() -> &'static [AttackKind] {
        AttackKind::all()
    }
}

fn endpoint_url(endpoint: &EndpointConfig) -> String {
    build_network_path(&endpoint.protocol, &endpoint.host, &endpoint.port, &endpoint.path)
}

/// Reap the sender group once collection is over. An aborted collection
/// cancels the senders still running.
async fn settle(mut workers: JoinSet<()>, collection: Collection) -> Vec<crate::ReceivedResponse> {
    match collection {
        Collection::Complete(responses) => {
            while workers.join_next().await.is_some() {}
            responses
        }
        Collection::Aborted { reason, received } => {
            warn!("Collection aborted after {} responses: {}", received, reason);
            workers.abort_all();
            Vec::new()
        }
    }
}
