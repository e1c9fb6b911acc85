//! JNVM virtual machine: executes register-machine bytecode.
//!
//! The VM is a register machine with:
//! - A bank of 256 `u32` registers; register 0 holds results
//! - A bounded call stack whose frames snapshot the whole bank, so a
//!   callee can never clobber its caller's registers
//! - A table of host-supplied natives reachable from `CALL`
//!
//! # Usage
//!
//! ```
//! use jnvm_common::{Instruction, Opcode, Program};
//! use jnvm_vm::run;
//!
//! let program = Program::new(vec![
//!     Instruction::new(Opcode::Mov, 1, 40, 0),
//!     Instruction::new(Opcode::Mov, 2, 2, 0),
//!     Instruction::new(Opcode::Add, 1, 2, 0),
//!     Instruction::new(Opcode::Halt, 0, 0, 0),
//! ]);
//!
//! assert_eq!(run(&program).unwrap(), 42);
//! ```
//!
//! # Logging
//!
//! The machine reports loads, calls, returns, halts and profile intervals
//! through `tracing`. Without a subscriber installed these are no-ops.

pub mod config;
pub mod error;
pub mod execute;
pub mod machine;
pub mod native;
pub mod profiler;
pub mod registers;

pub use config::MachineConfig;
pub use error::{FaultKind, NativeError, RuntimeError};
pub use machine::{Machine, Step};
pub use native::{Native, NativeCall, NativeId, NativeTable, Print};
pub use profiler::ProfileReport;
pub use registers::REGISTER_COUNT;

use jnvm_common::Program;

/// Execute a program on a fresh machine and return register 0.
///
/// # Errors
///
/// Returns [`RuntimeError`] if execution faults.
pub fn run(program: &Program) -> Result<u32, RuntimeError> {
    let mut vm = Machine::new();
    vm.load_program(program);
    vm.execute()
}
