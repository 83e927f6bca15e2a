//! The staged build pipeline.
//!
//! [`BuildPipeline::handle`] is the main entry point. It drives one build
//! request through the native bridge:
//!
//! 1. Assembly generation -- a reported compiler error aborts the build
//!    before any other native call is made.
//! 2. Bytecode generation -- the raw handle is marshaled into an owned
//!    buffer immediately; null or empty output aborts the build.
//! 3. Shading-language transpilation -- an external process run against a
//!    temp bytecode file. Failures here degrade the `glsl` field instead of
//!    aborting: the assembly and bytecode are still valid artifacts.

use std::io::Write;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use shadegraph_core::listing::AssemblyListing;
use shadegraph_core::payload::GraphPayload;

use crate::bridge::NativeCompiler;
use crate::buffer;
use crate::error::{BuildError, TranspileError};

/// External transpiler invocation settings.
///
/// The command runs once per build as
/// `<command> <args..> <bytecode file>`, shading-language source on stdout
/// and diagnostics on stderr.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranspilerConfig {
    /// Command name or path.
    pub command: String,
    /// Flags inserted before the bytecode file path.
    pub args: Vec<String>,
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        TranspilerConfig {
            command: "spirv-cross".to_string(),
            args: vec!["--version".into(), "100".into(), "--es".into()],
        }
    }
}

/// Artifacts of a successful build.
///
/// `asm` and `bin` are always genuine compiler output. `glsl` holds the
/// transpiled source, or a rendered transpiler error when that stage
/// failed (degraded success).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildArtifacts {
    /// Structured assembly listing.
    pub asm: AssemblyListing,
    /// Raw bytecode module.
    pub bin: Vec<u8>,
    /// Transpiled shading-language source, or a rendered transpiler error.
    pub glsl: String,
}

/// Drives the native compiler and the external transpiler for one build
/// at a time; concurrent builds share one pipeline behind an `Arc`.
pub struct BuildPipeline<B> {
    bridge: B,
    transpiler: TranspilerConfig,
}

impl<B: NativeCompiler> BuildPipeline<B> {
    pub fn new(bridge: B) -> Self {
        BuildPipeline {
            bridge,
            transpiler: TranspilerConfig::default(),
        }
    }

    pub fn with_transpiler(bridge: B, transpiler: TranspilerConfig) -> Self {
        BuildPipeline { bridge, transpiler }
    }

    /// Runs the full pipeline for one build request.
    pub async fn handle(
        &self,
        request_id: u64,
        payload: &GraphPayload,
    ) -> Result<BuildArtifacts, BuildError> {
        let payload_json = payload.to_json().map_err(BuildError::Payload)?;

        // 1. Assembly stage -- fatal on reported error
        let asm = self.assembly_stage(&payload_json)?;

        // 2. Bytecode stage -- fatal on null or empty buffer
        let bin = self.bytecode_stage(&payload_json)?;

        // 3. Transpile stage -- failures degrade into the glsl field
        let glsl = match self.transpile_stage(request_id, &bin).await {
            Ok(source) => source,
            Err(err) => err.to_string(),
        };

        Ok(BuildArtifacts { asm, bin, glsl })
    }

    pub(crate) fn assembly_stage(&self, payload_json: &str) -> Result<AssemblyListing, BuildError> {
        let reply = self.bridge.generate_assembly(payload_json);
        Ok(AssemblyListing::parse_reply(&reply)?)
    }

    /// Calls the bytecode entry point and copies the result out in the same
    /// synchronous frame; the raw handle never reaches an await point.
    pub(crate) fn bytecode_stage(&self, payload_json: &str) -> Result<Vec<u8>, BuildError> {
        let handle = self.bridge.generate_bytecode(payload_json);
        let bin = unsafe { buffer::materialize(handle)? };
        if bin.is_empty() {
            return Err(BuildError::EmptyBytecode);
        }
        Ok(bin)
    }

    /// Writes the bytecode to a temp file and runs the external transpiler
    /// against it. The temp file name combines the request id with
    /// tempfile's random component, so concurrent builds cannot collide,
    /// and the file is removed on drop whether or not the stage succeeds.
    async fn transpile_stage(
        &self,
        request_id: u64,
        bin: &[u8],
    ) -> Result<String, TranspileError> {
        let mut file = tempfile::Builder::new()
            .prefix(&format!("shadegraph_{}_", request_id))
            .suffix(".spv")
            .tempfile()?;
        file.write_all(bin)?;
        file.flush()?;

        let output = Command::new(&self.transpiler.command)
            .args(&self.transpiler.args)
            .arg(file.path())
            .output()
            .await?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if !output.status.success() {
            return Err(TranspileError::Failed {
                status: output.status,
                stderr,
            });
        }
        if !stderr.is_empty() {
            return Err(TranspileError::Diagnostics(stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::bridge::RawBuffer;

    const LISTING_REPLY: &str = r#"{
        "bound": 3,
        "instructions": [
            { "class": "OpLabel", "result_id": 1, "operands": [] },
            { "class": "OpReturn", "result_id": null, "operands": [] }
        ]
    }"#;

    /// Canned native compiler: fixed assembly reply, optional bytecode.
    /// `None` bytecode produces a null handle, like the real library on
    /// failure.
    pub(crate) struct FakeBridge {
        pub asm_reply: String,
        pub bytecode: Option<Vec<u8>>,
        pub bytecode_calls: AtomicUsize,
    }

    impl FakeBridge {
        pub fn new(asm_reply: &str, bytecode: Option<&[u8]>) -> Self {
            FakeBridge {
                asm_reply: asm_reply.to_string(),
                bytecode: bytecode.map(<[u8]>::to_vec),
                bytecode_calls: AtomicUsize::new(0),
            }
        }
    }

    impl NativeCompiler for FakeBridge {
        fn generate_assembly(&self, _payload_json: &str) -> String {
            self.asm_reply.clone()
        }

        fn generate_bytecode(&self, _payload_json: &str) -> RawBuffer {
            self.bytecode_calls.fetch_add(1, Ordering::SeqCst);
            match &self.bytecode {
                Some(payload) => {
                    let mut encoded = (payload.len() as u64).to_le_bytes().to_vec();
                    encoded.extend_from_slice(payload);
                    // leak so the handle outlives this call, as the native
                    // allocation would
                    RawBuffer(Box::leak(encoded.into_boxed_slice()).as_ptr())
                }
                None => RawBuffer(std::ptr::null()),
            }
        }
    }

    fn stub_transpiler(command: &str, args: &[&str]) -> TranspilerConfig {
        TranspilerConfig {
            command: command.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    fn empty_payload() -> GraphPayload {
        GraphPayload::from_snapshot(&Default::default())
    }

    #[tokio::test]
    async fn test_reported_assembly_error_short_circuits() {
        let bridge = FakeBridge::new(r#"{"error": "unknown node type"}"#, Some(b"beef"));
        let pipeline = BuildPipeline::new(bridge);

        let err = pipeline.handle(0, &empty_payload()).await.unwrap_err();
        assert_eq!(err.to_string(), "unknown node type");
        // the bytecode entry point is never reached
        assert_eq!(pipeline.bridge.bytecode_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_null_bytecode_handle_is_fatal() {
        let bridge = FakeBridge::new(LISTING_REPLY, None);
        let pipeline = BuildPipeline::new(bridge);

        let err = pipeline.handle(0, &empty_payload()).await.unwrap_err();
        assert!(matches!(err, BuildError::Buffer(_)));
    }

    #[tokio::test]
    async fn test_empty_bytecode_is_fatal() {
        let bridge = FakeBridge::new(LISTING_REPLY, Some(b""));
        let pipeline = BuildPipeline::new(bridge);

        let err = pipeline.handle(0, &empty_payload()).await.unwrap_err();
        assert!(matches!(err, BuildError::EmptyBytecode));
    }

    #[tokio::test]
    async fn test_successful_transpile_captures_stdout() {
        let bridge = FakeBridge::new(LISTING_REPLY, Some(b"void main() {}"));
        // `cat <file>` stands in for the transpiler: stdout is the file body
        let pipeline = BuildPipeline::with_transpiler(bridge, stub_transpiler("cat", &[]));

        let artifacts = pipeline.handle(7, &empty_payload()).await.unwrap();
        assert_eq!(artifacts.bin, b"void main() {}");
        assert_eq!(artifacts.glsl, "void main() {}");
        assert_eq!(artifacts.asm.bound, 3);
    }

    #[tokio::test]
    async fn test_transpiler_failure_degrades_glsl_only() {
        let bridge = FakeBridge::new(LISTING_REPLY, Some(b"\x03\x02\x23\x07"));
        let pipeline =
            BuildPipeline::with_transpiler(bridge, stub_transpiler("sh", &["-c", "exit 3"]));

        let artifacts = pipeline.handle(0, &empty_payload()).await.unwrap();
        assert_eq!(artifacts.bin, b"\x03\x02\x23\x07");
        assert_eq!(artifacts.asm.instructions.len(), 2);
        assert!(artifacts.glsl.contains("transpiler exited"));
    }

    #[tokio::test]
    async fn test_nonempty_stderr_degrades_despite_clean_exit() {
        let bridge = FakeBridge::new(LISTING_REPLY, Some(b"\x03\x02\x23\x07"));
        let pipeline = BuildPipeline::with_transpiler(
            bridge,
            stub_transpiler("sh", &["-c", "echo oops >&2"]),
        );

        let artifacts = pipeline.handle(0, &empty_payload()).await.unwrap();
        assert_eq!(artifacts.glsl, "oops\n");
        assert_eq!(artifacts.bin, b"\x03\x02\x23\x07");
    }

    #[tokio::test]
    async fn test_missing_transpiler_binary_degrades_glsl_only() {
        let bridge = FakeBridge::new(LISTING_REPLY, Some(b"\x03\x02\x23\x07"));
        let pipeline = BuildPipeline::with_transpiler(
            bridge,
            stub_transpiler("shadegraph-no-such-binary", &[]),
        );

        let artifacts = pipeline.handle(0, &empty_payload()).await.unwrap();
        assert!(artifacts.glsl.contains("transpiler I/O error"));
    }

    #[tokio::test]
    async fn test_malformed_assembly_reply_is_fatal() {
        let bridge = FakeBridge::new("not json at all", Some(b"beef"));
        let pipeline = BuildPipeline::new(bridge);

        let err = pipeline.handle(0, &empty_payload()).await.unwrap_err();
        assert!(matches!(err, BuildError::MalformedListing(_)));
    }
}
