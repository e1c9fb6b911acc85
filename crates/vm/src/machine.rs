//! VM state management: loaded program, string table, natives, registers.

use jnvm_common::Program;
use tracing::debug;

use crate::config::MachineConfig;
use crate::native::{Native, NativeId, NativeTable};
use crate::profiler::{ProfileReport, Profiler};
use crate::registers::{Bank, RegisterFile};

/// Outcome of a single [`Machine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More instructions remain to execute.
    Running,
    /// The program halted with this value in register 0.
    Halted(u32),
}

/// The JNVM register machine.
///
/// A machine owns its bytecode and string table. Natives are registered
/// once and survive every subsequent [`load`](Machine::load).
#[derive(Debug)]
pub struct Machine {
    pub(crate) state: RegisterFile,
    pub(crate) code: Vec<u64>,
    pub(crate) strings: Vec<String>,
    pub(crate) natives: NativeTable,
    pub(crate) profiler: Profiler,
    pub(crate) config: MachineConfig,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Create a machine with the default configuration and built-in natives.
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    /// Create a machine with the given configuration and built-in natives.
    pub fn with_config(config: MachineConfig) -> Self {
        Self {
            state: RegisterFile::new(config.max_call_depth),
            code: Vec::new(),
            strings: Vec::new(),
            natives: NativeTable::with_builtins(),
            profiler: Profiler::default(),
            config,
        }
    }

    /// Replace the bytecode and reset all execution state.
    pub fn load(&mut self, bytecode: Vec<u64>) {
        debug!(instructions = bytecode.len(), "bytecode loaded");
        self.code = bytecode;
        self.reset();
    }

    /// Replace the string table.
    ///
    /// References already sitting in registers are not revalidated.
    pub fn load_strings(&mut self, strings: Vec<String>) {
        debug!(strings = strings.len(), "string table loaded");
        self.strings = strings;
    }

    /// Load a program's instructions and string table together.
    pub fn load_program(&mut self, program: &Program) {
        self.load_strings(program.strings.clone());
        self.load(program.words());
    }

    /// Insert or overwrite the native bound to `id`.
    pub fn register_native(&mut self, id: NativeId, native: impl Native) {
        debug!(%id, "native registered");
        self.natives.register(id, native);
    }

    /// Zero registers, counters and call stack without touching the program.
    pub fn reset(&mut self) {
        self.state.reset();
        self.profiler.reset();
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// The whole register bank.
    pub fn registers(&self) -> &Bank {
        &self.state.regs
    }

    pub fn register(&self, index: u8) -> u32 {
        self.state.regs[index as usize]
    }

    /// Index of the next instruction to execute.
    pub fn pc(&self) -> usize {
        self.state.pc
    }

    /// Base register of the current call's argument window.
    pub fn frame_pointer(&self) -> u8 {
        self.state.fp
    }

    /// Number of live user call frames.
    pub fn call_depth(&self) -> usize {
        self.state.depth()
    }

    /// Instructions executed since the last load or reset.
    pub fn instructions_executed(&self) -> u64 {
        self.state.executed
    }

    pub fn is_halted(&self) -> bool {
        self.state.halted
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn program_len(&self) -> usize {
        self.code.len()
    }

    /// Most recent completed PRF..PRFE interval.
    pub fn last_profile(&self) -> Option<ProfileReport> {
        self.profiler.last()
    }

    pub fn natives(&self) -> &NativeTable {
        &self.natives
    }
}
