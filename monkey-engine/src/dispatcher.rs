//! Fan-out of concurrent request senders
//!
//! Every sender writes one [`ResponseSignal`] per request onto the shared
//! channel. Senders never talk to each other; the endpoint text and the
//! channel are the only things they share.

use crate::error::UnknownMethod;
use crate::{FakeValue, HttpMethod, HttpSender, MethodSelection, ResponseSignal, TransportError};
use monkey_common::AttackConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, trace, warn};

/// Shape of an HTTP Spam burst
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpamPlan {
    pub concurrency: usize,
    pub messages_per_worker: usize,
    pub methods: MethodSelection,
}

impl SpamPlan {
    pub fn from_attack(attack: &AttackConfig) -> Result<Self, UnknownMethod> {
        Ok(Self {
            concurrency: attack.concurrents,
            messages_per_worker: attack.messages_per_concurrent,
            methods: MethodSelection::from_config(&attack.method)?,
        })
    }

    /// Number of signals the collector has to wait for
    pub fn total(&self) -> usize {
        self.concurrency.saturating_mul(self.messages_per_worker)
    }
}

/// Launches groups of request senders against one endpoint.
///
/// Each dispatch returns the [`JoinSet`] owning its senders; dropping the
/// set cancels whatever is still in flight.
#[derive(Clone)]
pub struct Dispatcher {
    sender: Arc<dyn HttpSender>,
    deadline: Option<Duration>,
    seed: Option<u64>,
}

impl Dispatcher {
    pub fn new(sender: Arc<dyn HttpSender>) -> Self {
        Self {
            sender,
            deadline: None,
            seed: None,
        }
    }

    /// Give up on any single request after `deadline`. Without one a hung
    /// request blocks its sender, and with it the whole attack.
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Seed random method selection. Worker `n` uses `seed + n`.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Start `plan.concurrency` senders, each issuing
    /// `plan.messages_per_worker` sequential requests against `endpoint`.
    pub fn dispatch_spam(
        &self,
        endpoint: &str,
        plan: &SpamPlan,
        tx: mpsc::UnboundedSender<ResponseSignal>,
    ) -> JoinSet<()> {
        debug!(
            "Dispatching {} workers x {} messages at {}",
            plan.concurrency, plan.messages_per_worker, endpoint
        );

        let endpoint: Arc<str> = Arc::from(endpoint);
        let mut workers = JoinSet::new();

        for worker in 0..plan.concurrency {
            let sender = Arc::clone(&self.sender);
            let endpoint = Arc::clone(&endpoint);
            let tx = tx.clone();
            let methods = plan.methods;
            let count = plan.messages_per_worker;
            let deadline = self.deadline;
            let mut rng = self.worker_rng(worker);

            workers.spawn(async move {
                for _ in 0..count {
                    let method = methods.resolve(&mut rng);
                    let signal = send_one(sender.as_ref(), &endpoint, method, deadline).await;

                    if tx.send(signal).is_err() {
                        trace!("Collector stopped listening, worker {} exits early", worker);
                        return;
                    }
                }
            });
        }

        workers
    }

    /// Start one GET per (parameter, fake value) pair
    pub fn dispatch_query(
        &self,
        endpoint: &str,
        parameters: &[String],
        tx: mpsc::UnboundedSender<ResponseSignal>,
    ) -> JoinSet<()> {
        let attack_points = query_attack_points(endpoint, parameters);
        debug!("Dispatching {} query injections at {}", attack_points.len(), endpoint);

        let mut workers = JoinSet::new();

        for attack_point in attack_points {
            let sender = Arc::clone(&self.sender);
            let tx = tx.clone();
            let deadline = self.deadline;

            workers.spawn(async move {
                let signal = send_one(sender.as_ref(), &attack_point, HttpMethod::Get, deadline).await;
                let _ = tx.send(signal);
            });
        }

        workers
    }

    fn worker_rng(&self, worker: usize) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(worker as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

/// Every `endpoint?param=value` target of a URL Query attack, parameters
/// in declared order and fake values in [`FakeValue::ALL`] order
pub fn query_attack_points(endpoint: &str, parameters: &[String]) -> Vec<String> {
    parameters
        .iter()
        .flat_map(|param| {
            FakeValue::ALL
                .iter()
                .map(move |value| format!("{}?{}={}", endpoint, param, value.as_str()))
        })
        .collect()
}

async fn send_one(
    sender: &dyn HttpSender,
    endpoint: &str,
    method: HttpMethod,
    deadline: Option<Duration>,
) -> ResponseSignal {
    let result = match deadline {
        Some(limit) => match tokio::time::timeout(limit, sender.send(endpoint, method)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::timeout(
                &format!("{} {}", method, endpoint),
                limit,
            )),
        },
        None => sender.send(endpoint, method).await,
    };

    match result {
        Ok(response) => {
            trace!("{} {} -> {}", method, endpoint, response.status_code);
            ResponseSignal::Received(response)
        }
        Err(e) if e.is_timeout() => {
            warn!("{} {} hit the request deadline: {}", method, endpoint, e);
            ResponseSignal::failure(e.to_string())
        }
        Err(e) => {
            warn!("{} {} failed: {}", method, endpoint, e);
            ResponseSignal::failure(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::ScriptedSender;

    fn drain(rx: &mut mpsc::UnboundedReceiver<ResponseSignal>) -> Vec<ResponseSignal> {
        let mut signals = Vec::new();
        while let Ok(signal) = rx.try_recv() {
            signals.push(signal);
        }
        signals
    }

    #[test]
    fn test_query_attack_points_count_and_order() {
        let params = vec!["a".to_string(), "b".to_string()];
        let points = query_attack_points("http://h/p", &params);

        assert_eq!(points.len(), 8);
        assert_eq!(points[0], "http://h/p?a=hello");
        assert_eq!(points[1], "http://h/p?a=&hello");
        assert_eq!(points[2], "http://h/p?a=@");
        assert_eq!(points[3], "http://h/p?a=\"");
        assert_eq!(points[4], "http://h/p?b=hello");
    }

    #[test]
    fn test_spam_plan_from_attack() {
        let (_, mut attack) = monkey_common::fixtures::endpoint_and_attack("200");
        attack.concurrents = 2;
        attack.messages_per_concurrent = 3;
        attack.method = String::new();

        let plan = SpamPlan::from_attack(&attack).unwrap();
        assert_eq!(plan.total(), 6);
        assert_eq!(plan.methods, MethodSelection::Random);

        attack.method = "TRACE".to_string();
        assert!(SpamPlan::from_attack(&attack).is_err());
    }

    #[tokio::test]
    async fn test_dispatch_spam_sends_every_request() {
        let sender = Arc::new(ScriptedSender::always(200));
        let dispatcher = Dispatcher::new(sender.clone());
        let plan = SpamPlan {
            concurrency: 3,
            messages_per_worker: 4,
            methods: MethodSelection::Fixed(HttpMethod::Post),
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = dispatcher.dispatch_spam("http://h/p", &plan, tx);
        while workers.join_next().await.is_some() {}

        let signals = drain(&mut rx);
        assert_eq!(signals.len(), 12);
        assert!(signals.iter().all(|s| !s.is_failure()));

        let calls = sender.calls();
        assert_eq!(calls.len(), 12);
        assert!(calls.iter().all(|(endpoint, method)| endpoint == "http://h/p" && *method == HttpMethod::Post));
    }

    #[tokio::test]
    async fn test_dispatch_spam_with_zero_workers_closes_channel() {
        let dispatcher = Dispatcher::new(Arc::new(ScriptedSender::always(200)));
        let plan = SpamPlan {
            concurrency: 0,
            messages_per_worker: 5,
            methods: MethodSelection::Random,
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let workers = dispatcher.dispatch_spam("http://h/p", &plan, tx);
        assert!(workers.is_empty());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_transport_error_becomes_failure_signal() {
        let sender = Arc::new(ScriptedSender::scripted(vec![None], 200));
        let dispatcher = Dispatcher::new(sender);
        let plan = SpamPlan {
            concurrency: 1,
            messages_per_worker: 2,
            methods: MethodSelection::Fixed(HttpMethod::Get),
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = dispatcher.dispatch_spam("http://h/p", &plan, tx);
        while workers.join_next().await.is_some() {}

        let signals = drain(&mut rx);
        assert_eq!(signals.len(), 2);
        assert!(signals[0].is_failure());
        assert_eq!(signals[1], ResponseSignal::Received(crate::ReceivedResponse::new(200)));
    }

    #[tokio::test]
    async fn test_seeded_random_methods_are_reproducible() {
        let plan = SpamPlan {
            concurrency: 1,
            messages_per_worker: 20,
            methods: MethodSelection::Random,
        };

        let mut runs = Vec::new();
        for _ in 0..2 {
            let sender = Arc::new(ScriptedSender::always(200));
            let dispatcher = Dispatcher::new(sender.clone()).with_seed(Some(7));
            let (tx, _rx) = mpsc::unbounded_channel();
            let mut workers = dispatcher.dispatch_spam("http://h/p", &plan, tx);
            while workers.join_next().await.is_some() {}
            runs.push(sender.calls().into_iter().map(|(_, m)| m).collect::<Vec<_>>());
        }

        assert_eq!(runs[0].len(), 20);
        assert_eq!(runs[0], runs[1]);
    }

    #[tokio::test]
    async fn test_dispatch_query_uses_get() {
        let sender = Arc::new(ScriptedSender::always(400));
        let dispatcher = Dispatcher::new(sender.clone());
        let params = vec!["q".to_string()];

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workers = dispatcher.dispatch_query("http://h/p", &params, tx);
        while workers.join_next().await.is_some() {}

        assert_eq!(drain(&mut rx).len(), 4);
        let calls = sender.calls();
        assert!(calls.iter().all(|(_, m)| *m == HttpMethod::Get));
        assert!(calls.iter().any(|(e, _)| e == "http://h/p?q=@"));
    }

    #[tokio::test]
    async fn test_deadline_turns_hung_request_into_failure() {
        let sender = Arc::new(ScriptedSender::always(200).with_delay(Duration::from_secs(30)));
        let dispatcher = Dispatcher::new(sender).with_deadline(Some(Duration::from_millis(20)));
        let plan = SpamPlan {
            concurrency: 1,
            messages_per_worker: 1,
            methods: MethodSelection::Fixed(HttpMethod::Get),
        };

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _workers = dispatcher.dispatch_spam("http://h/p", &plan, tx);

        match rx.recv().await {
            Some(ResponseSignal::TransportFailure { reason }) => assert!(reason.contains("Timeout")),
            other => panic!("expected timeout failure, got {:?}", other),
        }
    }
}
