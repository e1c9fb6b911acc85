//! Program representation and the `.jnb` binary image format.
//!
//! A program is an instruction stream plus the string table its LOADS
//! instructions index into. On disk it is stored as:
//!
//! ```text
//! magic    b"JNVM"
//! u32 LE   instruction count
//! u32 LE   string count
//! 8 bytes  x instruction count
//! (u32 LE byte length + UTF-8 bytes) x string count
//! ```

use crate::error::DecodeError;
use crate::instruction::{Instruction, INSTRUCTION_SIZE, MAX_JMP_TARGET};
use crate::opcode::Opcode;

/// Magic bytes at the start of every program image.
pub const MAGIC: [u8; 4] = *b"JNVM";

/// A JNVM program: an instruction stream and its string table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
    /// Strings referenced by LOADS.
    pub strings: Vec<String>,
}

impl Program {
    /// Create a program with an empty string table.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            strings: Vec::new(),
        }
    }

    /// Create a program with the given string table.
    pub fn with_strings(instructions: Vec<Instruction>, strings: Vec<String>) -> Self {
        Self {
            instructions,
            strings,
        }
    }

    /// The instruction stream as bytecode words, ready for loading.
    pub fn words(&self) -> Vec<u64> {
        self.instructions.iter().map(Instruction::to_word).collect()
    }

    /// Encode only the instruction stream, 8 bytes per instruction.
    pub fn encode_instructions(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.instructions.len() * INSTRUCTION_SIZE);
        for instr in &self.instructions {
            bytes.extend_from_slice(&instr.encode());
        }
        bytes
    }

    /// Decode a raw instruction stream (no header, no strings).
    pub fn decode_instructions(bytes: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
        if bytes.len() % INSTRUCTION_SIZE != 0 {
            return Err(DecodeError::InvalidLength(bytes.len()));
        }

        let mut instructions = Vec::with_capacity(bytes.len() / INSTRUCTION_SIZE);
        for chunk in bytes.chunks_exact(INSTRUCTION_SIZE) {
            let mut arr = [0u8; INSTRUCTION_SIZE];
            arr.copy_from_slice(chunk);
            instructions.push(Instruction::decode(arr));
        }
        Ok(instructions)
    }

    /// Encode the full program image.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.extend_from_slice(&(self.instructions.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.strings.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&self.encode_instructions());
        for s in &self.strings {
            bytes.extend_from_slice(&(s.len() as u32).to_le_bytes());
            bytes.extend_from_slice(s.as_bytes());
        }
        bytes
    }

    /// Decode a full program image.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader { bytes, offset: 0 };

        if reader.take(MAGIC.len())? != MAGIC {
            return Err(DecodeError::BadMagic);
        }
        let instr_count = reader.u32()? as usize;
        let string_count = reader.u32()? as usize;

        let code = reader.take(instr_count * INSTRUCTION_SIZE)?;
        let instructions = Self::decode_instructions(code)?;

        let mut strings = Vec::with_capacity(string_count.min(1024));
        for index in 0..string_count {
            let len = reader.u32()? as usize;
            let raw = reader.take(len)?;
            let s = std::str::from_utf8(raw).map_err(|_| DecodeError::InvalidUtf8 { index })?;
            strings.push(s.to_string());
        }

        let remaining = bytes.len() - reader.offset;
        if remaining != 0 {
            return Err(DecodeError::TrailingBytes { count: remaining });
        }

        Ok(Self {
            instructions,
            strings,
        })
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Returns true if the program uses JMP but is too long for JMP to
    /// reach every instruction. JNZ and JZ carry 32-bit targets and are
    /// unaffected.
    pub fn exceeds_jmp_range(&self) -> bool {
        self.instructions.len() > MAX_JMP_TARGET as usize + 1
            && self.instructions.iter().any(|i| i.opcode == Opcode::Jmp)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.bytes.len() - self.offset;
        if n > available {
            return Err(DecodeError::Truncated {
                offset: self.offset,
                needed: n - available,
            });
        }
        let slice = &self.bytes[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}
