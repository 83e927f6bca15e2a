//! Failure taxonomy for the build pipeline.
//!
//! Two failure channels exist and stay separate: [`BuildError`] aborts a
//! build, while [`TranspileError`] only degrades the `glsl` field of an
//! otherwise successful build. There is deliberately no conversion between
//! the two.

use std::process::ExitStatus;

use shadegraph_core::listing::ListingError;

use crate::buffer::BufferError;

/// Fatal build failures: anything at or before the bytecode stage.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The native compiler reported a structured error. The message is
    /// surfaced verbatim to the caller.
    #[error("{0}")]
    Compile(String),

    /// The assembly reply was not valid listing JSON.
    #[error("malformed assembly reply: {0}")]
    MalformedListing(serde_json::Error),

    /// The bytecode entry point returned an unusable handle.
    #[error(transparent)]
    Buffer(#[from] BufferError),

    /// The bytecode entry point returned an empty module.
    #[error("bytecode generation produced an empty module")]
    EmptyBytecode,

    /// The graph payload could not be JSON-encoded.
    #[error("payload encoding failed: {0}")]
    Payload(serde_json::Error),
}

impl From<ListingError> for BuildError {
    fn from(err: ListingError) -> Self {
        match err {
            ListingError::Reported(message) => BuildError::Compile(message),
            ListingError::Malformed(err) => BuildError::MalformedListing(err),
        }
    }
}

/// Non-fatal shading-language stage failures.
///
/// A rendering of this error replaces the `glsl` source of a successful
/// build; it never aborts the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TranspileError {
    /// Temp file or subprocess I/O failed.
    #[error("transpiler I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transpiler exited with a failure status.
    #[error("transpiler exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    /// Clean exit, but the diagnostic stream was not empty.
    #[error("{0}")]
    Diagnostics(String),
}

/// Export failures. Nothing is written when any variant occurs.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// An underlying build stage failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Unrecognized output extension.
    #[error("unsupported export extension: {0:?}")]
    UnsupportedExport(String),

    /// Writing the artifact failed.
    #[error("export I/O error: {0}")]
    Io(#[from] std::io::Error),
}
