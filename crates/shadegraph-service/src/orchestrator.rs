//! Orchestration-side event loop for the build channel.
//!
//! One long-lived task owns the request receiver; each incoming build runs
//! in its own task so in-flight builds interleave freely. Replies carry the
//! originating request id and may complete out of submission order -- the
//! broker pairs them back up. Exports are fire-and-forget: failures are
//! logged, never replied.
//!
//! There is no cancellation: once a build is received it runs to
//! completion, and an abandoned result is simply dropped at the broker.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use shadegraph_build::{BuildPipeline, NativeCompiler};

use crate::message::{BuildMessage, BuildReply};

/// Spawns the orchestration loop over a pipeline. The loop ends when the
/// request channel closes.
pub fn spawn_orchestrator<B>(
    pipeline: BuildPipeline<B>,
    mut requests: mpsc::UnboundedReceiver<BuildMessage>,
    replies: mpsc::UnboundedSender<BuildReply>,
) -> JoinHandle<()>
where
    B: NativeCompiler + 'static,
{
    let pipeline = Arc::new(pipeline);
    tokio::spawn(async move {
        while let Some(message) = requests.recv().await {
            match message {
                BuildMessage::Build { id, payload } => {
                    let pipeline = Arc::clone(&pipeline);
                    let replies = replies.clone();
                    tokio::spawn(async move {
                        let result = pipeline.handle(id, &payload).await;
                        match &result {
                            Ok(artifacts) => tracing::info!(
                                id,
                                bytecode_len = artifacts.bin.len(),
                                "build finished"
                            ),
                            Err(err) => tracing::warn!(id, %err, "build failed"),
                        }
                        // The interactive side may already be gone.
                        let _ = replies.send(BuildReply { id, result });
                    });
                }
                BuildMessage::Export { payload, path } => {
                    let pipeline = Arc::clone(&pipeline);
                    tokio::spawn(async move {
                        match pipeline.export(&payload, &path).await {
                            Ok(()) => {
                                tracing::info!(path = %path.display(), "export written")
                            }
                            Err(err) => {
                                tracing::error!(path = %path.display(), %err, "export failed")
                            }
                        }
                    });
                }
            }
        }
    })
}
