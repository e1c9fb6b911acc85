//! JNVM assembler: bidirectional text ↔ binary translation.
//!
//! The assembler is a mechanical 1:1 translation: one line, one
//! instruction slot. No labels, no macros.
//!
//! # Usage
//!
//! ```
//! use jnvm_assembler::{assemble, disassemble};
//!
//! let text = ".string \"hello\"\nLOADS r0 0\nCALL @0 r0 1\nHALT\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(program.strings, vec!["hello".to_string()]);
//! assert_eq!(disassemble(&program), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(program)) == program` holds for every program.
//! The disassembler outputs canonical text; the assembler accepts both
//! canonical and non-canonical input (hex immediates, lowercase
//! mnemonics, `.string` lines anywhere in the file).

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use jnvm_common::Program;
use lexer::tokenize_line;
use parser::{parse_line, Line};

/// Assemble text into a binary program.
///
/// `.string` entries are appended to the string table in the order they
/// appear. Returns the first error encountered.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();
    let mut strings = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        match parse_line(&tokens, line_num)? {
            Some(Line::Instruction(instr)) => instructions.push(instr),
            Some(Line::String(s)) => strings.push(s),
            None => {}
        }
    }

    Ok(Program::with_strings(instructions, strings))
}

/// Disassemble a binary program into canonical assembly text.
///
/// The output lists the string table first, then one instruction per
/// line. Slots with no exact mnemonic form are written as `.word`.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}
