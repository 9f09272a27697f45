//! Fail-fast fan-in of response signals

use crate::{ReceivedResponse, ResponseSignal};
use tokio::sync::mpsc;
use tracing::debug;

/// Result of draining the response channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    /// Exactly the expected number of responses, in arrival order
    Complete(Vec<ReceivedResponse>),
    /// A failure signal arrived, or every sender went away early.
    /// Whatever had been collected is discarded.
    Aborted { reason: String, received: usize },
}

impl Collection {
    pub fn is_complete(&self) -> bool {
        matches!(self, Collection::Complete(_))
    }

    /// Accepted responses; empty when aborted
    pub fn into_responses(self) -> Vec<ReceivedResponse> {
        match self {
            Collection::Complete(responses) => responses,
            Collection::Aborted { .. } => Vec::new(),
        }
    }
}

/// Block until `expected` responses have arrived or the first failure
/// signal shows up. Zero expected completes immediately with nothing.
pub async fn collect_responses(
    rx: &mut mpsc::UnboundedReceiver<ResponseSignal>,
    expected: usize,
) -> Collection {
    let mut responses = Vec::with_capacity(expected);

    while responses.len() < expected {
        match rx.recv().await {
            Some(ResponseSignal::Received(response)) => responses.push(response),
            Some(ResponseSignal::TransportFailure { reason }) => {
                debug!(
                    "Aborting collection after {} of {} responses: {}",
                    responses.len(),
                    expected,
                    reason
                );
                return Collection::Aborted {
                    reason,
                    received: responses.len(),
                };
            }
            None => {
                let received = responses.len();
                return Collection::Aborted {
                    reason: format!(
                        "response channel closed after {} of {} responses",
                        received, expected
                    ),
                    received,
                };
            }
        }
    }

    Collection::Complete(responses)
}
