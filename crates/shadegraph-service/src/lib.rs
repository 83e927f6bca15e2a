//! Asynchronous build service for the shadegraph editor.
//!
//! Two cooperative sides talk over one message channel: the interactive
//! side calls the [`RequestBroker`], which tags each build with a
//! correlation id; the orchestration side runs the build pipeline and
//! replies with the same id. Replies may arrive in any order relative to
//! submission; the broker pairs them back to callers by id.
//!
//! Logging goes through `tracing`; installing a subscriber is the
//! embedding application's job.

pub mod broker;
pub mod message;
pub mod orchestrator;

pub use broker::{BrokerError, RequestBroker};
pub use message::{BuildMessage, BuildReply};
pub use orchestrator::spawn_orchestrator;

use std::sync::Arc;

use tokio::sync::mpsc;

use shadegraph_build::{BuildPipeline, NativeCompiler};

/// Wires a broker to a freshly spawned orchestrator over a new channel
/// pair. Must run inside a tokio runtime.
pub fn start<B>(pipeline: BuildPipeline<B>) -> Arc<RequestBroker>
where
    B: NativeCompiler + 'static,
{
    let (request_tx, request_rx) = mpsc::unbounded_channel();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    spawn_orchestrator(pipeline, request_rx, reply_tx);
    RequestBroker::connect(request_tx, reply_rx)
}
