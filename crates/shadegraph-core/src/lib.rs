//! Core data model for the shadegraph build pipeline.
//!
//! This crate holds the pure, I/O-free parts of the system: the editor
//! graph snapshot and its canonicalization into a compiler-ready payload,
//! the structured assembly listing returned by the native compiler, and
//! the deterministic text rendering of that listing.
//!
//! # Modules
//!
//! - [`payload`] -- graph snapshot types and payload serialization
//! - [`listing`] -- assembly listing, instructions, and operands
//! - [`printer`] -- aligned text rendering of a listing

pub mod listing;
pub mod payload;
pub mod printer;

// Re-export commonly used types
pub use listing::{AssemblyListing, Instruction, ListingError, Operand};
pub use payload::{EdgeSnapshot, GraphPayload, GraphSnapshot, NodeSnapshot, PayloadNode};
pub use printer::{column_width, render_instruction, render_listing};
