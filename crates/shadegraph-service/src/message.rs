//! Messages exchanged on the build channel.

use std::path::PathBuf;

use shadegraph_build::{BuildArtifacts, BuildError};
use shadegraph_core::payload::GraphPayload;

/// Requests flowing from the interactive side to the orchestrator.
#[derive(Debug)]
pub enum BuildMessage {
    /// Compile a payload; a [`BuildReply`] tagged with `id` follows
    /// eventually.
    Build {
        /// Correlation id pairing this request with its reply.
        id: u64,
        payload: GraphPayload,
    },

    /// Fire-and-forget export. Failures are logged on the orchestration
    /// side and never replied.
    Export { payload: GraphPayload, path: PathBuf },
}

/// Reply for one build, tagged with the originating request id.
#[derive(Debug)]
pub struct BuildReply {
    pub id: u64,
    pub result: Result<BuildArtifacts, BuildError>,
}
