//! Opcode definitions for the JNVM instruction set.
//!
//! Decoding an opcode byte is total: bytes that name no operation map to
//! [`Opcode::Unknown`], and the dispatch loop rejects them at run time.

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Moves
    /// `reg[op1] := op2` (immediate).
    Mov,
    /// `reg[op1] := reg[op2]`.
    Copy,
    /// `reg[op1] := tag(op2)`, a reference to string-table entry `op2`.
    LoadS,

    // Arithmetic
    /// `reg[op3] := reg[op1] + reg[op2]` (wrapping).
    Add,
    /// `reg[op3] := reg[op1] - reg[op2]` (wrapping).
    Sub,
    /// `reg[op3] := reg[op1] * reg[op2]` (wrapping).
    Mul,
    /// `reg[op3] := reg[op1] / reg[op2]`. Division by zero is a runtime fault.
    Div,
    /// `reg[op1] := reg[op1] + 1` (wrapping).
    Inc,

    // Control flow
    /// Jump to instruction `op1`.
    Jmp,
    /// Jump to `op2` if `reg[op1] != 0`.
    Jnz,
    /// Jump to `op2` if `reg[op1] == 0`.
    Jz,

    // Comparison
    /// `reg[op3] := reg[op1] == reg[op2]`.
    Eq,
    /// `reg[op3] := reg[op1] != reg[op2]`.
    Neq,
    /// `reg[op3] := reg[op1] < reg[op2]`.
    Lt,
    /// `reg[op3] := reg[op1] > reg[op2]`.
    Gt,
    /// `reg[op3] := reg[op1] <= reg[op2]`.
    Lte,
    /// `reg[op3] := reg[op1] >= reg[op2]`.
    Gte,

    // Calls
    /// Call target `op1` with argument window at `op2`, `op3` arguments.
    Call,
    /// Return `reg[0]` to the caller.
    Ret,

    // Profiling
    /// Start a profiling interval.
    Prf,
    /// End the current profiling interval and report it.
    Prfe,

    // VM control
    /// Stop execution. `reg[0]` is the program result.
    Halt,

    /// Any byte that names no operation.
    Unknown(u8),
}

/// All defined opcodes, in byte order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 22] = [
    Opcode::Mov,
    Opcode::Copy,
    Opcode::LoadS,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Inc,
    Opcode::Jmp,
    Opcode::Jnz,
    Opcode::Jz,
    Opcode::Eq,
    Opcode::Neq,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Lte,
    Opcode::Gte,
    Opcode::Call,
    Opcode::Ret,
    Opcode::Prf,
    Opcode::Prfe,
    Opcode::Halt,
];

impl From<u8> for Opcode {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Opcode::Mov,
            0x02 => Opcode::Copy,
            0x03 => Opcode::LoadS,

            0x10 => Opcode::Add,
            0x11 => Opcode::Sub,
            0x12 => Opcode::Mul,
            0x13 => Opcode::Div,
            0x14 => Opcode::Inc,

            0x20 => Opcode::Jmp,
            0x21 => Opcode::Jnz,
            0x22 => Opcode::Jz,

            0x30 => Opcode::Eq,
            0x31 => Opcode::Neq,
            0x32 => Opcode::Lt,
            0x33 => Opcode::Gt,
            0x34 => Opcode::Lte,
            0x35 => Opcode::Gte,

            0x40 => Opcode::Call,
            0x41 => Opcode::Ret,

            0x50 => Opcode::Prf,
            0x51 => Opcode::Prfe,

            0xFF => Opcode::Halt,

            other => Opcode::Unknown(other),
        }
    }
}

impl Opcode {
    /// The byte value this opcode encodes to.
    pub const fn byte(self) -> u8 {
        match self {
            Opcode::Mov => 0x01,
            Opcode::Copy => 0x02,
            Opcode::LoadS => 0x03,
            Opcode::Add => 0x10,
            Opcode::Sub => 0x11,
            Opcode::Mul => 0x12,
            Opcode::Div => 0x13,
            Opcode::Inc => 0x14,
            Opcode::Jmp => 0x20,
            Opcode::Jnz => 0x21,
            Opcode::Jz => 0x22,
            Opcode::Eq => 0x30,
            Opcode::Neq => 0x31,
            Opcode::Lt => 0x32,
            Opcode::Gt => 0x33,
            Opcode::Lte => 0x34,
            Opcode::Gte => 0x35,
            Opcode::Call => 0x40,
            Opcode::Ret => 0x41,
            Opcode::Prf => 0x50,
            Opcode::Prfe => 0x51,
            Opcode::Halt => 0xFF,
            Opcode::Unknown(byte) => byte,
        }
    }

    /// Returns the assembly mnemonic for this opcode, or `None` for
    /// [`Opcode::Unknown`].
    pub fn mnemonic(&self) -> Option<&'static str> {
        let m = match self {
            Opcode::Mov => "MOV",
            Opcode::Copy => "COPY",
            Opcode::LoadS => "LOADS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Inc => "INC",
            Opcode::Jmp => "JMP",
            Opcode::Jnz => "JNZ",
            Opcode::Jz => "JZ",
            Opcode::Eq => "EQ",
            Opcode::Neq => "NEQ",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Lte => "LTE",
            Opcode::Gte => "GTE",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Prf => "PRF",
            Opcode::Prfe => "PRFE",
            Opcode::Halt => "HALT",
            Opcode::Unknown(_) => return None,
        };
        Some(m)
    }

    /// Returns true for opcodes that set the program counter themselves.
    pub fn is_control_transfer(&self) -> bool {
        matches!(
            self,
            Opcode::Jmp | Opcode::Jnz | Opcode::Jz | Opcode::Call | Opcode::Ret
        )
    }
}
