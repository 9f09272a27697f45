//! Monkey Engine - concurrent attack dispatch, collection and validation
//!
//! Fans out bursts of HTTP traffic against an endpoint, fans the responses
//! back in through a single channel and turns them into exactly one
//! [`Outcome`] per attack run.

pub mod types;
pub mod traits;
pub mod error;
pub mod dispatcher;
pub mod collector;
pub mod validator;
pub mod runner;
pub mod engine;
pub mod transport;


pub use types::{
    FakeValue, HttpMethod, MethodSelection, Outcome, ReceivedResponse, ResponseSignal,
};

pub use traits::{CorruptSender, HttpSender};

pub use error::TransportError;

pub use dispatcher::{query_attack_points, Dispatcher, SpamPlan};

pub use collector::{collect_responses, Collection};

pub use validator::{check_response, check_responses, check_signals, Verdict};

pub use runner::{
    AttackRunner, AttackRunnerFactory, CorruptHttpRunner, HttpSpamRunner, UrlQueryRunner,
};

pub use engine::{AttackEngine, ResultSender};

pub use transport::{ReqwestSender, TcpCorruptSender, CORRUPT_REQUEST};
