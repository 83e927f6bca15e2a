//! Aligned text rendering of an assembly listing.
//!
//! [`render_listing`] is the single source of truth for the textual form of
//! a listing: the live preview and the `.spvasm` export both go through it,
//! so the two are byte-identical. Rendering is a pure, deterministic
//! function of the listing.
//!
//! Layout: result ids render as `%n`, right-aligned in a gutter whose width
//! depends only on `bound`, followed by ` = ` and the opcode. Instructions
//! without a result id indent past the gutter so opcodes line up. Comment
//! lines (class `";"`) start at column 0.

use std::fmt::Write;

use crate::listing::{AssemblyListing, Instruction, Operand};

/// Gutter width for the result-id column.
///
/// Width 5 covers single-digit bounds; one extra column per additional
/// decimal digit of `bound`.
pub fn column_width(bound: u32) -> usize {
    let mut width = 5;
    let mut bound = bound;
    while bound >= 10 {
        width += 1;
        bound /= 10;
    }
    width
}

fn render_operand(operand: &Operand) -> String {
    match operand {
        Operand::Id(id) | Operand::Type(id) => format!("%{}", id),
        Operand::String(text) => format!("\"{}\"", text),
        Operand::Int(value) => value.to_string(),
        Operand::Float(value) => value.to_string(),
        Operand::Double(value) => value.to_string(),
        Operand::ExtInst(name) => name.clone(),
        Operand::Other(text) => text.clone(),
    }
}

/// Renders one instruction line at the given gutter width.
pub fn render_instruction(instruction: &Instruction, width: usize) -> String {
    let mut line = String::new();

    if instruction.is_comment() {
        // comments are unpadded
    } else if let Some(id) = instruction.result_id {
        let tag = format!("%{}", id);
        // write! into a String cannot fail
        let _ = write!(line, "{:>width$} = ", tag, width = width);
    } else {
        for _ in 0..width + 3 {
            line.push(' ');
        }
    }

    line.push_str(&instruction.class);
    for operand in &instruction.operands {
        line.push(' ');
        line.push_str(&render_operand(operand));
    }
    line
}

/// Renders the whole listing, one line per instruction, newline-joined.
pub fn render_listing(listing: &AssemblyListing) -> String {
    let width = column_width(listing.bound);
    listing
        .instructions
        .iter()
        .map(|instruction| render_instruction(instruction, width))
        .collect::<Vec<_>>()
        .join("\n")
}
