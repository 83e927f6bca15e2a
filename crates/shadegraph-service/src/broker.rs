//! Correlation-id multiplexing of concurrent build requests.
//!
//! [`RequestBroker`] owns the pending-request table: each submitted build
//! gets a fresh id from a monotonically increasing counter, a one-shot
//! completion slot keyed by that id, and a message on the build channel.
//! When a reply with a matching id comes back, the slot is removed and
//! fulfilled -- removal makes fulfillment exactly-once, and a reply for an
//! id with no slot (duplicate or unknown) is silently dropped.
//!
//! The broker does no compute and never blocks: sends are unbounded and
//! any number of requests may be in flight. There is no timeout and no
//! cancellation; a caller that stops caring just drops its future, and the
//! eventual reply is discarded at the slot.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};

use shadegraph_build::{BuildArtifacts, BuildError};
use shadegraph_core::payload::GraphPayload;

use crate::message::{BuildMessage, BuildReply};

type PendingTable = DashMap<u64, oneshot::Sender<Result<BuildArtifacts, BuildError>>>;

/// Broker-side failures.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The build failed; compile-stage messages pass through verbatim.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The orchestration side is gone; no reply can ever arrive.
    #[error("build channel closed")]
    ChannelClosed,
}

/// Multiplexes concurrent build requests over one channel.
pub struct RequestBroker {
    requests: mpsc::UnboundedSender<BuildMessage>,
    pending: Arc<PendingTable>,
    next_id: AtomicU64,
}

impl RequestBroker {
    /// Wires a broker to a request sender and a reply receiver, spawning
    /// the dispatch task that resolves pending requests as replies arrive.
    pub fn connect(
        requests: mpsc::UnboundedSender<BuildMessage>,
        mut replies: mpsc::UnboundedReceiver<BuildReply>,
    ) -> Arc<Self> {
        let broker = Arc::new(RequestBroker {
            requests,
            pending: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(0),
        });

        let pending = Arc::clone(&broker.pending);
        tokio::spawn(async move {
            while let Some(reply) = replies.recv().await {
                match pending.remove(&reply.id) {
                    Some((_, slot)) => {
                        // A caller that dropped its future just loses the
                        // reply here.
                        let _ = slot.send(reply.result);
                    }
                    None => {
                        tracing::debug!(id = reply.id, "dropping reply with no pending request");
                    }
                }
            }
        });

        broker
    }

    /// Submits one build and waits for its matching reply.
    ///
    /// There is no timeout: if the orchestrator never replies while the
    /// channel stays open, the returned future stays pending. A closed
    /// channel fails fast with [`BrokerError::ChannelClosed`] instead.
    pub async fn submit(&self, payload: GraphPayload) -> Result<BuildArtifacts, BrokerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (slot, reply) = oneshot::channel();
        self.pending.insert(id, slot);

        if self.requests.send(BuildMessage::Build { id, payload }).is_err() {
            self.pending.remove(&id);
            return Err(BrokerError::ChannelClosed);
        }

        match reply.await {
            Ok(result) => result.map_err(BrokerError::Build),
            // Slot dropped without a send: the dispatch side is gone.
            Err(_) => Err(BrokerError::ChannelClosed),
        }
    }

    /// Queues a fire-and-forget export.
    pub fn export(&self, payload: GraphPayload, path: PathBuf) -> Result<(), BrokerError> {
        self.requests
            .send(BuildMessage::Export { payload, path })
            .map_err(|_| BrokerError::ChannelClosed)
    }

    /// Number of requests still waiting for a reply.
    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }
}
