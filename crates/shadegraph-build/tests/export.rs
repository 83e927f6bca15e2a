//! Integration tests for artifact export.

use shadegraph_build::{BuildPipeline, ExportError, NativeCompiler, RawBuffer};
use shadegraph_core::listing::AssemblyListing;
use shadegraph_core::payload::GraphPayload;
use shadegraph_core::printer::render_listing;

const LISTING_REPLY: &str = r#"{
    "bound": 3,
    "instructions": [
        { "class": "OpLabel", "result_id": 1, "operands": [] },
        { "class": "OpReturn", "result_id": null, "operands": [] }
    ]
}"#;

const BYTECODE: &[u8] = b"\x03\x02\x23\x07\x00\x05\x01\x00";

/// Canned native compiler used across the export scenarios.
struct FixedBridge;

impl NativeCompiler for FixedBridge {
    fn generate_assembly(&self, _payload_json: &str) -> String {
        LISTING_REPLY.to_string()
    }

    fn generate_bytecode(&self, _payload_json: &str) -> RawBuffer {
        let mut encoded = (BYTECODE.len() as u64).to_le_bytes().to_vec();
        encoded.extend_from_slice(BYTECODE);
        RawBuffer(Box::leak(encoded.into_boxed_slice()).as_ptr())
    }
}

fn empty_payload() -> GraphPayload {
    GraphPayload::from_snapshot(&Default::default())
}

#[tokio::test]
async fn test_spv_export_writes_exact_bytecode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shader.spv");

    let pipeline = BuildPipeline::new(FixedBridge);
    pipeline.export(&empty_payload(), &path).await.unwrap();

    // raw module bytes, no header
    assert_eq!(std::fs::read(&path).unwrap(), BYTECODE);
}

#[tokio::test]
async fn test_spvasm_export_matches_renderer_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shader.spvasm");

    let pipeline = BuildPipeline::new(FixedBridge);
    pipeline.export(&empty_payload(), &path).await.unwrap();

    let expected = render_listing(&AssemblyListing::parse_reply(LISTING_REPLY).unwrap());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), expected);
}

#[tokio::test]
async fn test_unrecognized_extension_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shader.txt");

    let pipeline = BuildPipeline::new(FixedBridge);
    let err = pipeline.export(&empty_payload(), &path).await.unwrap_err();

    assert!(matches!(err, ExportError::UnsupportedExport(ext) if ext == "txt"));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_failed_stage_writes_nothing() {
    struct FailingBridge;
    impl NativeCompiler for FailingBridge {
        fn generate_assembly(&self, _payload_json: &str) -> String {
            r#"{"error": "unknown node type"}"#.to_string()
        }
        fn generate_bytecode(&self, _payload_json: &str) -> RawBuffer {
            RawBuffer(std::ptr::null())
        }
    }

    let dir = tempfile::tempdir().unwrap();

    let pipeline = BuildPipeline::new(FailingBridge);
    let asm_path = dir.path().join("shader.spvasm");
    assert!(pipeline.export(&empty_payload(), &asm_path).await.is_err());
    assert!(!asm_path.exists());

    let bin_path = dir.path().join("shader.spv");
    assert!(pipeline.export(&empty_payload(), &bin_path).await.is_err());
    assert!(!bin_path.exists());
}
