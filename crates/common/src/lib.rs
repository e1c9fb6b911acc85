//! JNVM common types and instruction encoding.
//!
//! This crate provides the foundational data structures for the JNVM
//! register machine:
//!
//! - [`value`]: the tagged-word scheme that lets a `u32` register hold
//!   either a number or a string-table reference
//! - [`Opcode`]: the 22 defined opcodes plus a total fallback for
//!   unknown bytes
//! - [`Instruction`]: the 64-bit instruction with encode/decode
//! - [`Program`]: an instruction stream plus string table, and its
//!   `.jnb` image codec
//! - [`DecodeError`]: errors from decoding program images
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod value;

// Re-export commonly used types at the crate root.
pub use error::DecodeError;
pub use instruction::{CallTarget, Instruction};
pub use opcode::Opcode;
pub use program::Program;
pub use value::Value;
