//! Disassembler: binary program → canonical assembly text.
//!
//! Output format is flat text: the string table as `.string` lines, then
//! one line per instruction slot. No indentation, no comments, no blank
//! lines. A slot that has no exact textual form (an unknown opcode, or
//! bits in operand fields its shape does not use) is written as `.word`.

use jnvm_common::{CallTarget, Instruction, Program};

use crate::parser::Shape;

/// Disassemble a program into canonical assembly text.
///
/// The output is guaranteed to reassemble to an identical binary
/// (`assemble(disassemble(program)) == program`).
pub fn disassemble(program: &Program) -> String {
    let mut out = String::new();

    for s in &program.strings {
        out.push_str(".string ");
        out.push_str(&quote(s));
        out.push('\n');
    }

    for instr in &program.instructions {
        match render(instr) {
            Some(line) => out.push_str(&line),
            None => out.push_str(&format!(".word 0x{:016x}", instr.to_word())),
        }
        out.push('\n');
    }

    out
}

/// Textual form of one instruction, if it has an exact one.
fn render(instr: &Instruction) -> Option<String> {
    let mnemonic = instr.opcode.mnemonic()?;
    let shape = Shape::of(instr.opcode)?;
    let (op1, op2, op3) = (instr.op1, instr.op2, instr.op3);
    let reg1 = u8::try_from(op1).ok();
    let reg2 = u8::try_from(op2).ok();

    let line = match shape {
        Shape::Bare if op1 == 0 && op2 == 0 && op3 == 0 => mnemonic.to_string(),
        Shape::Reg if op2 == 0 && op3 == 0 => format!("{mnemonic} r{}", reg1?),
        Shape::RegImm if op3 == 0 => format!("{mnemonic} r{} {op2}", reg1?),
        Shape::RegReg if op3 == 0 => format!("{mnemonic} r{} r{}", reg1?, reg2?),
        Shape::RegRegReg => format!("{mnemonic} r{} r{} r{op3}", reg1?, reg2?),
        Shape::Target if op2 == 0 && op3 == 0 => format!("{mnemonic} {op1}"),
        Shape::RegTarget if op3 == 0 => format!("{mnemonic} r{} {op2}", reg1?),
        Shape::Call => match instr.call_target() {
            CallTarget::Native(id) => format!("{mnemonic} @{id} r{} {op3}", reg2?),
            CallTarget::User(addr) => format!("{mnemonic} {addr} r{} {op3}", reg2?),
        },
        _ => return None,
    };
    Some(line)
}

/// Quote a string-table entry so the lexer reads it back unchanged.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
