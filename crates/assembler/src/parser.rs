//! Parser for JNVM assembly tokens → instructions and directives.
//!
//! Every opcode takes exactly one operand [`Shape`]. The disassembler
//! reads the same table, so text it emits always parses back.

use crate::error::AsmError;
use crate::lexer::Token;
use jnvm_common::instruction::{MAX_CALL_ADDRESS, NATIVE_CALL_FLAG};
use jnvm_common::opcode::ALL_OPCODES;
use jnvm_common::{Instruction, Opcode};

/// Operand layout of an opcode's assembly form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// No operands.
    Bare,
    /// `rA` → op1.
    Reg,
    /// `rA imm` → op1, op2.
    RegImm,
    /// `rA rB` → op1, op2.
    RegReg,
    /// `rA rB rD` → op1, op2, op3.
    RegRegReg,
    /// `target` → op1.
    Target,
    /// `rA target` → op1, op2.
    RegTarget,
    /// `target|@id rBase argc` → op1, op2, op3.
    Call,
}

impl Shape {
    /// Shape of a defined opcode; `None` for [`Opcode::Unknown`].
    pub(crate) fn of(opcode: Opcode) -> Option<Shape> {
        let shape = match opcode {
            Opcode::Ret | Opcode::Prf | Opcode::Prfe | Opcode::Halt => Shape::Bare,
            Opcode::Inc => Shape::Reg,
            Opcode::Mov | Opcode::LoadS => Shape::RegImm,
            Opcode::Copy => Shape::RegReg,
            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Eq
            | Opcode::Neq
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Lte
            | Opcode::Gte => Shape::RegRegReg,
            Opcode::Jmp => Shape::Target,
            Opcode::Jnz | Opcode::Jz => Shape::RegTarget,
            Opcode::Call => Shape::Call,
            Opcode::Unknown(_) => return None,
        };
        Some(shape)
    }

    fn arity(self) -> usize {
        match self {
            Shape::Bare => 0,
            Shape::Reg | Shape::Target => 1,
            Shape::RegImm | Shape::RegReg | Shape::RegTarget => 2,
            Shape::RegRegReg | Shape::Call => 3,
        }
    }
}

/// Result of parsing a single assembly line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Line {
    /// One instruction slot.
    Instruction(Instruction),
    /// A string-table entry from `.string`.
    String(String),
}

fn lookup_opcode(mnemonic: &str) -> Option<(Opcode, &'static str)> {
    ALL_OPCODES.iter().find_map(|op| {
        op.mnemonic()
            .filter(|m| *m == mnemonic)
            .map(|m| (*op, m))
    })
}

/// Parse a sequence of tokens from a single line.
///
/// Returns `Ok(None)` for blank lines (empty token list).
pub(crate) fn parse_line(tokens: &[Token], line_num: usize) -> Result<Option<Line>, AsmError> {
    let Some((first, args)) = tokens.split_first() else {
        return Ok(None);
    };

    match first {
        Token::Directive(name) => parse_directive(name, args, line_num).map(Some),
        Token::Ident(mnemonic) => {
            let (opcode, name) =
                lookup_opcode(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
                    line: line_num,
                    token: mnemonic.clone(),
                })?;
            // Every entry in ALL_OPCODES has a shape.
            let shape = Shape::of(opcode).unwrap_or(Shape::Bare);
            let instr = parse_operands(opcode, shape, name, args, line_num)?;
            Ok(Some(Line::Instruction(instr)))
        }
        other => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: other.to_string(),
        }),
    }
}

fn parse_directive(name: &str, args: &[Token], line: usize) -> Result<Line, AsmError> {
    match name {
        ".STRING" => {
            let text = expect_string(args, 0, line, ".string", 1)?;
            expect_end(&args[1..], line)?;
            Ok(Line::String(text))
        }
        ".WORD" => {
            let word = expect_number(args, 0, line, ".word", 1)?;
            expect_end(&args[1..], line)?;
            Ok(Line::Instruction(Instruction::from_word(word)))
        }
        _ => Err(AsmError::UnknownDirective {
            line,
            token: name.to_string(),
        }),
    }
}

fn parse_operands(
    opcode: Opcode,
    shape: Shape,
    name: &'static str,
    args: &[Token],
    line: usize,
) -> Result<Instruction, AsmError> {
    let n = shape.arity();
    let reg = |idx| expect_register(args, idx, line, name, n);

    let instr = match shape {
        Shape::Bare => Instruction::new(opcode, 0, 0, 0),
        Shape::Reg => Instruction::new(opcode, reg(0)? as u16, 0, 0),
        Shape::RegImm => {
            let dst = reg(0)?;
            let imm = expect_u32(args, 1, line, name, n)?;
            Instruction::new(opcode, dst as u16, imm, 0)
        }
        Shape::RegReg => Instruction::new(opcode, reg(0)? as u16, reg(1)? as u32, 0),
        Shape::RegRegReg => Instruction::new(opcode, reg(0)? as u16, reg(1)? as u32, reg(2)?),
        Shape::Target => Instruction::new(opcode, expect_u16(args, 0, line, name, n)?, 0, 0),
        Shape::RegTarget => {
            let cond = reg(0)?;
            let target = expect_u32(args, 1, line, name, n)?;
            Instruction::new(opcode, cond as u16, target, 0)
        }
        Shape::Call => {
            let target = expect_call_target(args, 0, line, name, n)?;
            let base = reg(1)?;
            let argc = expect_u8(args, 2, line, name, n)?;
            Instruction::new(opcode, target, base as u32, argc)
        }
    };

    expect_end(&args[n..], line)?;
    Ok(instr)
}

fn missing(line: usize, opcode: &'static str, expected: usize) -> AsmError {
    AsmError::MissingArgument {
        line,
        opcode,
        expected,
    }
}

fn unexpected(line: usize, token: &Token) -> AsmError {
    AsmError::UnexpectedToken {
        line,
        token: token.to_string(),
    }
}

/// Extract a u64 number from the token at position `idx`.
fn expect_number(
    args: &[Token],
    idx: usize,
    line: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<u64, AsmError> {
    match args.get(idx) {
        Some(Token::Number(n)) => Ok(*n),
        Some(other) => Err(unexpected(line, other)),
        None => Err(missing(line, opcode, expected)),
    }
}

/// Extract a number and narrow it to `T`, rejecting out-of-range values.
fn expect_narrow<T: TryFrom<u64>>(
    args: &[Token],
    idx: usize,
    line: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<T, AsmError> {
    let n = expect_number(args, idx, line, opcode, expected)?;
    T::try_from(n).map_err(|_| AsmError::InvalidNumber {
        line,
        token: n.to_string(),
    })
}

fn expect_u8(
    args: &[Token],
    idx: usize,
    line: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<u8, AsmError> {
    expect_narrow(args, idx, line, opcode, expected)
}

fn expect_u16(
    args: &[Token],
    idx: usize,
    line: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<u16, AsmError> {
    expect_narrow(args, idx, line, opcode, expected)
}

fn expect_u32(
    args: &[Token],
    idx: usize,
    line: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<u32, AsmError> {
    expect_narrow(args, idx, line, opcode, expected)
}

fn expect_register(
    args: &[Token],
    idx: usize,
    line: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<u8, AsmError> {
    match args.get(idx) {
        Some(Token::Register(r)) => Ok(*r),
        Some(other) => Err(unexpected(line, other)),
        None => Err(missing(line, opcode, expected)),
    }
}

fn expect_string(
    args: &[Token],
    idx: usize,
    line: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<String, AsmError> {
    match args.get(idx) {
        Some(Token::Str(s)) => Ok(s.clone()),
        Some(other) => Err(unexpected(line, other)),
        None => Err(missing(line, opcode, expected)),
    }
}

/// A user address (`6`) or a native id (`@0`), encoded into op1.
fn expect_call_target(
    args: &[Token],
    idx: usize,
    line: usize,
    opcode: &'static str,
    expected: usize,
) -> Result<u16, AsmError> {
    let out_of_range = |token: String| AsmError::InvalidNumber { line, token };
    match args.get(idx) {
        Some(Token::Number(n)) if *n <= MAX_CALL_ADDRESS as u64 => Ok(*n as u16),
        Some(Token::Number(n)) => Err(out_of_range(n.to_string())),
        Some(Token::Native(id)) if *id <= MAX_CALL_ADDRESS as u64 => {
            Ok(NATIVE_CALL_FLAG | *id as u16)
        }
        Some(Token::Native(id)) => Err(out_of_range(format!("@{id}"))),
        Some(other) => Err(unexpected(line, other)),
        None => Err(missing(line, opcode, expected)),
    }
}

/// Ensure no extra tokens remain.
fn expect_end(remaining: &[Token], line: usize) -> Result<(), AsmError> {
    match remaining.first() {
        Some(token) => Err(unexpected(line, token)),
        None => Ok(()),
    }
}
