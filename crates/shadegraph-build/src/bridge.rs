//! Seam to the native compiler library.
//!
//! The native compiler is an external shared library; this module only
//! defines the two entry points the pipeline drives and the raw handle its
//! bytecode entry point returns. The concrete FFI binding lives in the
//! embedding editor shell.

/// Handle to a length-prefixed buffer allocated by the native compiler.
///
/// Layout: an 8-byte little-endian unsigned length, immediately followed by
/// that many payload bytes. The native side gives no free signal, so the
/// handle is only assumed valid until control returns to native code; it
/// must be decoded synchronously via [`crate::buffer::materialize`].
/// Holding a raw pointer keeps the type `!Send`, so a handle cannot be held
/// across an await point.
#[derive(Debug)]
pub struct RawBuffer(pub *const u8);

impl RawBuffer {
    /// Returns `true` if the native side signaled failure with a null handle.
    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// Entry points of the native compiler.
///
/// Both take the JSON-encoded graph payload. Implementations must be safe
/// to call from any thread; the calls themselves may block and expose no
/// cancellation point.
pub trait NativeCompiler: Send + Sync {
    /// JSON-encoded assembly listing, or an `{"error"}` reply.
    fn generate_assembly(&self, payload_json: &str) -> String;

    /// Length-prefixed bytecode buffer, or a null handle on failure.
    fn generate_bytecode(&self, payload_json: &str) -> RawBuffer;
}
