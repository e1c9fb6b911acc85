//! Instruction encoding and decoding for the JNVM instruction set.
//!
//! Every instruction is exactly 64 bits (8 bytes), encoded little-endian:
//! ```text
//! Byte 0:    opcode (u8)
//! Bytes 1-2: op1 (u16)  register, jump target, or call target
//! Bytes 3-6: op2 (u32)  register, immediate, string index, or jump target
//! Byte 7:    op3 (u8)   register or argument count
//! ```
//!
//! Register operands are read from the low 8 bits of their field, so a
//! decoded register index is always in `0..=255`.

use crate::opcode::Opcode;

/// Size of one encoded instruction in bytes.
pub const INSTRUCTION_SIZE: usize = 8;

/// Bit in a CALL's op1 that selects a native function instead of a
/// bytecode address.
pub const NATIVE_CALL_FLAG: u16 = 0x8000;

/// Largest bytecode address a user CALL can target.
pub const MAX_CALL_ADDRESS: u16 = !NATIVE_CALL_FLAG;

/// Largest address a JMP can target; its target lives in the 16-bit op1.
pub const MAX_JMP_TARGET: u16 = u16::MAX;

/// Where a CALL instruction transfers control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallTarget {
    /// Host-supplied native function with the given identifier.
    Native(u16),
    /// Bytecode function starting at the given instruction index.
    User(usize),
}

/// A single 64-bit JNVM instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// First operand. Meaning depends on opcode.
    pub op1: u16,
    /// Second operand. Meaning depends on opcode.
    pub op2: u32,
    /// Third operand. Meaning depends on opcode.
    pub op3: u8,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, op1: u16, op2: u32, op3: u8) -> Self {
        Self {
            opcode,
            op1,
            op2,
            op3,
        }
    }

    /// Encode this instruction to 8 bytes (little-endian).
    pub fn encode(&self) -> [u8; INSTRUCTION_SIZE] {
        let mut bytes = [0u8; INSTRUCTION_SIZE];
        bytes[0] = self.opcode.byte();
        bytes[1..3].copy_from_slice(&self.op1.to_le_bytes());
        bytes[3..7].copy_from_slice(&self.op2.to_le_bytes());
        bytes[7] = self.op3;
        bytes
    }

    /// Decode 8 bytes into an instruction. Never fails.
    pub fn decode(bytes: [u8; INSTRUCTION_SIZE]) -> Self {
        Self {
            opcode: Opcode::from(bytes[0]),
            op1: u16::from_le_bytes([bytes[1], bytes[2]]),
            op2: u32::from_le_bytes([bytes[3], bytes[4], bytes[5], bytes[6]]),
            op3: bytes[7],
        }
    }

    /// The instruction as one bytecode word.
    pub fn to_word(&self) -> u64 {
        u64::from_le_bytes(self.encode())
    }

    /// Decode one bytecode word. Never fails.
    pub fn from_word(word: u64) -> Self {
        Self::decode(word.to_le_bytes())
    }

    /// op1 read as a register index.
    pub fn r1(&self) -> u8 {
        self.op1 as u8
    }

    /// op2 read as a register index.
    pub fn r2(&self) -> u8 {
        self.op2 as u8
    }

    /// op3 read as a register index.
    pub fn r3(&self) -> u8 {
        self.op3
    }

    /// Decode op1 of a CALL into its target.
    pub fn call_target(&self) -> CallTarget {
        if self.op1 & NATIVE_CALL_FLAG != 0 {
            CallTarget::Native(self.op1 & MAX_CALL_ADDRESS)
        } else {
            CallTarget::User(self.op1 as usize)
        }
    }
}

impl From<u64> for Instruction {
    fn from(word: u64) -> Self {
        Self::from_word(word)
    }
}

impl From<Instruction> for u64 {
    fn from(instr: Instruction) -> Self {
        instr.to_word()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip_all_opcodes() {
        for &opcode in &crate::opcode::ALL_OPCODES {
            let instr = Instruction::new(opcode, 3, 7, 9);
            assert_eq!(Instruction::decode(instr.encode()), instr, "{opcode:?}");
        }
    }

    #[test]
    fn encode_decode_roundtrip_max_operands() {
        let instr = Instruction::new(Opcode::Mov, u16::MAX, u32::MAX, u8::MAX);
        assert_eq!(Instruction::decode(instr.encode()), instr);
    }

    #[test]
    fn little_endian_encoding() {
        let instr = Instruction::new(Opcode::Mov, 0x1234, 0xDEAD_BEEF, 0xAB);
        let bytes = instr.encode();

        assert_eq!(bytes[0], 0x01); // MOV
        assert_eq!(bytes[1], 0x34); // op1 low byte
        assert_eq!(bytes[2], 0x12); // op1 high byte
        assert_eq!(bytes[3], 0xEF); // op2 lowest byte
        assert_eq!(bytes[4], 0xBE);
        assert_eq!(bytes[5], 0xAD);
        assert_eq!(bytes[6], 0xDE); // op2 highest byte
        assert_eq!(bytes[7], 0xAB); // op3
    }

    #[test]
    fn opcode_is_low_byte_of_word() {
        let instr = Instruction::new(Opcode::Halt, 0, 0, 0);
        assert_eq!(instr.to_word(), 0xFF);
    }

    #[test]
    fn decode_unknown_opcode_still_decodes() {
        let instr = Instruction::decode([0x00, 1, 0, 2, 0, 0, 0, 3]);
        assert_eq!(instr.opcode, Opcode::Unknown(0x00));
        assert_eq!(instr.op1, 1);
        assert_eq!(instr.op2, 2);
        assert_eq!(instr.op3, 3);
    }

    #[test]
    fn register_operands_use_low_byte() {
        let instr = Instruction::new(Opcode::Add, 0x0105, 0x0000_0206, 7);
        assert_eq!(instr.r1(), 5);
        assert_eq!(instr.r2(), 6);
        assert_eq!(instr.r3(), 7);
    }

    #[test]
    fn call_target_discrimination() {
        let user = Instruction::new(Opcode::Call, 42, 0, 0);
        assert_eq!(user.call_target(), CallTarget::User(42));

        let native = Instruction::new(Opcode::Call, NATIVE_CALL_FLAG | 3, 0, 0);
        assert_eq!(native.call_target(), CallTarget::Native(3));

        let max_user = Instruction::new(Opcode::Call, MAX_CALL_ADDRESS, 0, 0);
        assert_eq!(
            max_user.call_target(),
            CallTarget::User(MAX_CALL_ADDRESS as usize)
        );
    }

    #[test]
    fn word_conversions() {
        let instr = Instruction::new(Opcode::Jnz, 4, 100, 0);
        let word: u64 = instr.into();
        assert_eq!(Instruction::from(word), instr);
    }
}
