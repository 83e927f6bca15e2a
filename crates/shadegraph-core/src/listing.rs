//! Structured assembly listing returned by the native compiler.
//!
//! The assembly entry point replies with JSON: either a listing object
//! (`{"bound", "instructions"}`) or a reported error (`{"error"}`).
//! [`AssemblyListing::parse_reply`] distinguishes the two; the reported
//! error message is carried verbatim.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A single operand, tagged with its rendering kind.
///
/// The kind decides how the operand renders as text, nothing more; numeric
/// values are never altered. On the wire the catch-all kind is tagged
/// `"Text"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operand", content = "value")]
pub enum Operand {
    /// Reference to a result id; renders as `%n`.
    Id(u32),
    /// Reference to a type id; renders as `%n`.
    Type(u32),
    /// String literal; renders quoted, unescaped.
    String(String),
    /// Integer literal; renders bare.
    Int(i64),
    /// 32-bit float literal; renders bare.
    Float(f32),
    /// 64-bit float literal; renders bare.
    Double(f64),
    /// Extended-instruction name; renders bare.
    ExtInst(String),
    /// Catch-all for operands with no dedicated rendering; renders bare.
    #[serde(rename = "Text")]
    Other(String),
}

/// One instruction in the listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Opcode name; the literal `";"` marks a comment/no-op line.
    pub class: String,
    /// Result id, when the instruction produces one.
    #[serde(default)]
    pub result_id: Option<u32>,
    /// Operands in source order. Order is the only meaningful order.
    #[serde(default)]
    pub operands: SmallVec<[Operand; 4]>,
}

impl Instruction {
    /// Returns `true` for comment/no-op lines.
    pub fn is_comment(&self) -> bool {
        self.class == ";"
    }
}

/// A compiled module's instruction stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyListing {
    /// Exclusive upper bound on ids: at least `1 + max(result_id)`.
    pub bound: u32,
    pub instructions: Vec<Instruction>,
}

/// Raw reply from the assembly entry point.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AssemblyReply {
    Error { error: String },
    Listing(AssemblyListing),
}

/// Failure to obtain a listing from the native reply.
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// The compiler reported a structured error; message is verbatim.
    #[error("{0}")]
    Reported(String),

    /// The reply was not valid listing JSON.
    #[error("malformed assembly reply: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl AssemblyListing {
    /// Parses the native compiler's assembly reply.
    pub fn parse_reply(json: &str) -> Result<Self, ListingError> {
        match serde_json::from_str(json)? {
            AssemblyReply::Error { error } => Err(ListingError::Reported(error)),
            AssemblyReply::Listing(listing) => Ok(listing),
        }
    }
}
