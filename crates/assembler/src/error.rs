//! Error types for the JNVM assembler.

use thiserror::Error;

/// Errors produced during assembly of text to binary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// A `.`-prefixed word that names no directive.
    #[error("line {line}: unknown directive '{token}'")]
    UnknownDirective { line: usize, token: String },

    /// An opcode or directive did not have enough arguments.
    #[error("line {line}: {opcode} expects {expected} argument(s)")]
    MissingArgument {
        line: usize,
        opcode: &'static str,
        expected: usize,
    },

    /// A numeric literal could not be parsed or is out of range.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A register operand that is malformed or beyond `r255`.
    #[error("line {line}: invalid register '{token}'")]
    InvalidRegister { line: usize, token: String },

    /// A string literal with no closing quote.
    #[error("line {line}: unterminated string literal")]
    UnterminatedString { line: usize },

    /// A backslash escape the string syntax does not define.
    #[error("line {line}: invalid escape '{token}'")]
    InvalidEscape { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },
}
