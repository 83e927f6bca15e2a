//! File export of build artifacts.
//!
//! The output form follows the target extension: `.spv` writes the raw
//! bytecode module byte-for-byte, `.spvasm` writes the formatted listing
//! text. Any other extension is rejected and nothing is written -- the
//! stages run before the file is touched, so a failed stage also leaves
//! no partial file behind.

use std::path::Path;

use shadegraph_core::payload::GraphPayload;
use shadegraph_core::printer::render_listing;

use crate::bridge::NativeCompiler;
use crate::error::{BuildError, ExportError};
use crate::pipeline::BuildPipeline;

impl<B: NativeCompiler> BuildPipeline<B> {
    /// Exports the compiled form of `payload` to `path`.
    ///
    /// The `.spvasm` text is exactly the listing renderer's output, so an
    /// exported file matches the interactive preview byte for byte.
    pub async fn export(&self, payload: &GraphPayload, path: &Path) -> Result<(), ExportError> {
        let payload_json = payload.to_json().map_err(BuildError::Payload)?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
        let data = match extension {
            "spv" => self.bytecode_stage(&payload_json)?,
            "spvasm" => {
                let asm = self.assembly_stage(&payload_json)?;
                render_listing(&asm).into_bytes()
            }
            other => return Err(ExportError::UnsupportedExport(other.to_string())),
        };

        tokio::fs::write(path, data).await?;
        Ok(())
    }
}
