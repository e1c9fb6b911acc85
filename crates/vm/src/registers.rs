//! Register file and call stack.
//!
//! Everything a running program can observe or mutate lives here: the
//! 256-word register bank, the program counter, the frame pointer, and
//! the stack of saved call contexts.

use crate::error::RuntimeError;

/// Number of general-purpose registers.
pub const REGISTER_COUNT: usize = 256;

/// The register bank.
pub type Bank = [u32; REGISTER_COUNT];

/// Upper bound on the frame capacity reserved up front by [`RegisterFile::reset`].
const PRERESERVE_LIMIT: usize = 1 << 16;

/// Saved caller context for one user call.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Instruction index to resume at after RET.
    pub return_addr: usize,
    /// Caller's frame pointer.
    pub caller_fp: u8,
    /// Argument count declared by the CALL.
    pub param_count: u8,
    /// Caller register that receives the callee's `reg[0]`.
    pub result_register: u8,
    /// Whole bank as it stood at the CALL.
    snapshot: Box<Bank>,
}

/// Where execution continues after a frame is popped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReturn {
    pub result_register: u8,
    pub return_addr: usize,
    pub caller_fp: u8,
}

/// Registers, counters and call stack of one machine.
#[derive(Debug, Clone)]
pub struct RegisterFile {
    pub(crate) regs: Bank,
    pub(crate) pc: usize,
    pub(crate) fp: u8,
    pub(crate) halted: bool,
    pub(crate) executed: u64,
    frames: Vec<Frame>,
    max_depth: usize,
}

impl RegisterFile {
    pub fn new(max_depth: usize) -> Self {
        let mut file = Self {
            regs: [0; REGISTER_COUNT],
            pc: 0,
            fp: 0,
            halted: false,
            executed: 0,
            frames: Vec::new(),
            max_depth,
        };
        file.reset();
        file
    }

    /// Zero every register and counter and empty the call stack.
    pub fn reset(&mut self) {
        self.regs = [0; REGISTER_COUNT];
        self.pc = 0;
        self.fp = 0;
        self.halted = false;
        self.executed = 0;
        self.frames.clear();
        self.frames.reserve(self.max_depth.min(PRERESERVE_LIMIT));
    }

    /// Snapshot the bank into a new frame.
    ///
    /// Fails with [`RuntimeError::StackOverflow`] if the stack is already
    /// at its depth limit; the stack is left unchanged in that case.
    pub fn push_frame(
        &mut self,
        return_addr: usize,
        caller_fp: u8,
        param_count: u8,
        result_register: u8,
    ) -> Result<(), RuntimeError> {
        if self.frames.len() >= self.max_depth {
            return Err(RuntimeError::StackOverflow {
                at: self.pc,
                limit: self.max_depth,
            });
        }
        self.frames.push(Frame {
            return_addr,
            caller_fp,
            param_count,
            result_register,
            snapshot: Box::new(self.regs),
        });
        Ok(())
    }

    /// Return from the innermost call.
    ///
    /// Captures `reg[0]`, restores the caller's bank from the popped
    /// frame, and writes the captured value into the frame's result
    /// register. With no frame to pop the outermost call is returning: the
    /// file is marked halted, nothing is restored, and `None` is returned.
    pub fn pop_frame(&mut self) -> Option<FrameReturn> {
        let Some(frame) = self.frames.pop() else {
            self.halted = true;
            return None;
        };
        let value = self.regs[0];
        self.regs = *frame.snapshot;
        self.regs[frame.result_register as usize] = value;
        Some(FrameReturn {
            result_register: frame.result_register,
            return_addr: frame.return_addr,
            caller_fp: frame.caller_fp,
        })
    }

    /// Number of live call frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The innermost live frame.
    pub fn top_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}
