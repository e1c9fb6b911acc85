//! Runtime faults for the JNVM.
//!
//! Every fault aborts the current execution. Faults raised by an
//! instruction carry its index (`at`) for debugging.

use thiserror::Error;

/// Broad category of a [`RuntimeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Malformed or incomplete program: empty, bad counter, unknown opcode, no halt.
    Program,
    /// Division by zero.
    Arithmetic,
    /// String-table lookups.
    Data,
    /// Call stack depth and native lookups.
    CallProtocol,
    /// A native function reported a failure.
    Native,
}

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `execute` was called with no bytecode loaded.
    #[error("no bytecode loaded")]
    EmptyProgram,

    /// The program counter points past the end of the program.
    #[error("program counter {pc} out of bounds (program length {len})")]
    PcOutOfBounds { pc: usize, len: usize },

    /// Execution ran off the end of the program without a HALT.
    #[error("reached end of program at instruction {at} without HALT")]
    MissingHalt { at: usize },

    /// The opcode byte names no operation.
    #[error("unknown opcode {opcode:#04x} at instruction {at}")]
    UnknownOpcode { at: usize, opcode: u8 },

    /// DIV with a zero divisor.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// LOADS named an entry past the end of the string table.
    #[error("string index {index} out of bounds (table length {len}) at instruction {at}")]
    StringIndexOutOfBounds { at: usize, index: u32, len: usize },

    /// A user CALL would exceed the call-stack depth limit.
    #[error("stack overflow: call depth limit {limit} reached at instruction {at}")]
    StackOverflow { at: usize, limit: usize },

    /// CALL named a native identifier that was never registered.
    #[error("unknown native {id} at instruction {at}")]
    UnknownNative { at: usize, id: u16 },

    /// A native function returned an error.
    #[error("native {id} failed at instruction {at}: {source}")]
    NativeFailed {
        at: usize,
        id: u16,
        #[source]
        source: NativeError,
    },
}

impl RuntimeError {
    /// The category of this fault.
    pub fn kind(&self) -> FaultKind {
        match self {
            RuntimeError::EmptyProgram
            | RuntimeError::PcOutOfBounds { .. }
            | RuntimeError::MissingHalt { .. }
            | RuntimeError::UnknownOpcode { .. } => FaultKind::Program,
            RuntimeError::DivisionByZero { .. } => FaultKind::Arithmetic,
            RuntimeError::StringIndexOutOfBounds { .. } => FaultKind::Data,
            RuntimeError::StackOverflow { .. } | RuntimeError::UnknownNative { .. } => {
                FaultKind::CallProtocol
            }
            RuntimeError::NativeFailed { .. } => FaultKind::Native,
        }
    }

    /// Instruction index the fault was raised at, if any.
    pub fn at(&self) -> Option<usize> {
        match self {
            RuntimeError::EmptyProgram => None,
            RuntimeError::PcOutOfBounds { pc, .. } => Some(*pc),
            RuntimeError::MissingHalt { at }
            | RuntimeError::UnknownOpcode { at, .. }
            | RuntimeError::DivisionByZero { at }
            | RuntimeError::StringIndexOutOfBounds { at, .. }
            | RuntimeError::StackOverflow { at, .. }
            | RuntimeError::UnknownNative { at, .. }
            | RuntimeError::NativeFailed { at, .. } => Some(*at),
        }
    }
}

/// Errors reported by native functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NativeError {
    /// An argument referenced a string past the end of the table.
    #[error("string index {index} out of bounds (table length {len})")]
    StringIndexOutOfBounds { index: u32, len: usize },

    /// Writing output failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// Any other host-defined failure.
    #[error("{0}")]
    Failed(String),
}

impl From<std::io::Error> for NativeError {
    fn from(e: std::io::Error) -> Self {
        NativeError::Io(e.to_string())
    }
}
