//! Build orchestration for shadegraph programs.
//!
//! Drives a serialized graph payload through the native compiler bridge in
//! stages -- assembly generation, bytecode generation, best-effort
//! shading-language transpilation -- and writes export artifacts to disk.
//! The first two stages are fatal on failure; the transpile stage only
//! degrades the GLSL field of an otherwise successful build.
//!
//! # Modules
//!
//! - [`bridge`] -- native compiler entry points and the raw buffer handle
//! - [`buffer`] -- copy-on-receive marshaling of native buffers
//! - [`pipeline`] -- the staged build pipeline
//! - [`export`] -- extension-dispatched artifact export
//! - [`error`] -- fatal and degradable failure types

pub mod bridge;
pub mod buffer;
pub mod error;
pub mod export;
pub mod pipeline;

pub use bridge::{NativeCompiler, RawBuffer};
pub use buffer::{materialize, BufferError};
pub use error::{BuildError, ExportError, TranspileError};
pub use pipeline::{BuildArtifacts, BuildPipeline, TranspilerConfig};
