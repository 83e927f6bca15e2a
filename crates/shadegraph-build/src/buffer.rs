//! Copy-on-receive marshaling of native length-prefixed buffers.
//!
//! The native bytecode entry point returns a raw handle with no ownership
//! transfer and no free signal. [`materialize`] copies the indicated span
//! into an owned vector in one synchronous step, so no foreign pointer is
//! ever retained past the decode.

use crate::bridge::RawBuffer;

/// Marshaling failures.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    /// The native side returned a null handle.
    #[error("invalid bytecode buffer: null handle")]
    InvalidBuffer,
}

/// Copies the payload span out of a native buffer.
///
/// Decodes the first 8 bytes as an unsigned little-endian length `n`, then
/// copies exactly the next `n` bytes into a freshly owned vector. Never
/// reads past byte index `8 + n` of the handle.
///
/// # Safety
///
/// A non-null `buffer` must point to at least 8 readable bytes holding a
/// length `n`, followed by `n` readable payload bytes, and must stay valid
/// for the duration of this call. The native bytecode entry point
/// guarantees this layout for every non-null handle it returns.
pub unsafe fn materialize(buffer: RawBuffer) -> Result<Vec<u8>, BufferError> {
    if buffer.is_null() {
        return Err(BufferError::InvalidBuffer);
    }

    let mut prefix = [0u8; 8];
    std::ptr::copy_nonoverlapping(buffer.0, prefix.as_mut_ptr(), 8);
    let len = u64::from_le_bytes(prefix) as usize;

    let payload = std::slice::from_raw_parts(buffer.0.add(8), len);
    Ok(payload.to_vec())
}
