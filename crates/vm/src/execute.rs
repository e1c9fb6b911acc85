//! Main execution loop and opcode dispatch for the JNVM.

use jnvm_common::value::tag;
use jnvm_common::{CallTarget, Instruction, Opcode};
use tracing::{debug, info, trace};

use crate::error::RuntimeError;
use crate::machine::{Machine, Step};
use crate::native::{NativeCall, NativeId};

impl Machine {
    /// Run until HALT (or a return from the outermost call) and return
    /// register 0.
    ///
    /// A machine that has already halted returns its result again without
    /// executing anything.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] if no bytecode is loaded, execution runs
    /// off the end of the program, or any instruction faults. Registers
    /// are left as they were at the fault.
    pub fn execute(&mut self) -> Result<u32, RuntimeError> {
        loop {
            if let Step::Halted(result) = self.step()? {
                return Ok(result);
            }
        }
    }

    /// Execute exactly one instruction.
    pub fn step(&mut self) -> Result<Step, RuntimeError> {
        if self.code.is_empty() {
            return Err(RuntimeError::EmptyProgram);
        }
        if self.state.halted {
            return Ok(Step::Halted(self.state.regs[0]));
        }

        let instr = self.fetch()?;
        self.state.executed += 1;
        trace!(pc = self.state.pc, opcode = ?instr.opcode, "step");

        match instr.opcode {
            // Moves
            Opcode::Mov => self.set(instr.r1(), instr.op2),
            Opcode::Copy => self.set(instr.r1(), self.get(instr.r2())),
            Opcode::LoadS => self.exec_loads(&instr)?,

            // Arithmetic
            Opcode::Add => self.exec_binary_arith(&instr, u32::wrapping_add),
            Opcode::Sub => self.exec_binary_arith(&instr, u32::wrapping_sub),
            Opcode::Mul => self.exec_binary_arith(&instr, u32::wrapping_mul),
            Opcode::Div => self.exec_div(&instr)?,
            Opcode::Inc => self.set(instr.r1(), self.get(instr.r1()).wrapping_add(1)),

            // Control flow
            Opcode::Jmp => self.state.pc = instr.op1 as usize,
            Opcode::Jnz => self.branch_if(&instr, |v| v != 0),
            Opcode::Jz => self.branch_if(&instr, |v| v == 0),

            // Comparison
            Opcode::Eq => self.exec_comparison(&instr, |a, b| a == b),
            Opcode::Neq => self.exec_comparison(&instr, |a, b| a != b),
            Opcode::Lt => self.exec_comparison(&instr, |a, b| a < b),
            Opcode::Gt => self.exec_comparison(&instr, |a, b| a > b),
            Opcode::Lte => self.exec_comparison(&instr, |a, b| a <= b),
            Opcode::Gte => self.exec_comparison(&instr, |a, b| a >= b),

            // Calls
            Opcode::Call => self.exec_call(&instr)?,
            Opcode::Ret => return Ok(self.exec_ret()),

            // Profiling
            Opcode::Prf => self.exec_profile_start(),
            Opcode::Prfe => self.exec_profile_end(),

            // VM Control
            Opcode::Halt => return Ok(self.exec_halt()),

            Opcode::Unknown(opcode) => {
                return Err(RuntimeError::UnknownOpcode {
                    at: self.state.pc,
                    opcode,
                })
            }
        }

        if !instr.opcode.is_control_transfer() {
            self.state.pc += 1;
        }
        Ok(Step::Running)
    }

    /// Decode the instruction at the program counter.
    ///
    /// A counter exactly at the end of the program means execution fell
    /// through without a HALT; anything further out is a bad jump target.
    fn fetch(&self) -> Result<Instruction, RuntimeError> {
        let pc = self.state.pc;
        match self.code.get(pc) {
            Some(&word) => Ok(Instruction::from_word(word)),
            None if pc == self.code.len() => Err(RuntimeError::MissingHalt { at: pc }),
            None => Err(RuntimeError::PcOutOfBounds {
                pc,
                len: self.code.len(),
            }),
        }
    }

    fn get(&self, reg: u8) -> u32 {
        self.state.regs[reg as usize]
    }

    fn set(&mut self, reg: u8, value: u32) {
        self.state.regs[reg as usize] = value;
    }

    fn exec_loads(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let index = instr.op2;
        if index as usize >= self.strings.len() {
            return Err(RuntimeError::StringIndexOutOfBounds {
                at: self.state.pc,
                index,
                len: self.strings.len(),
            });
        }
        self.set(instr.r1(), tag(index));
        Ok(())
    }

    /// `reg[op3] := op(reg[op1], reg[op2])`.
    fn exec_binary_arith(&mut self, instr: &Instruction, op: fn(u32, u32) -> u32) {
        let result = op(self.get(instr.r1()), self.get(instr.r2()));
        self.set(instr.r3(), result);
    }

    fn exec_div(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let divisor = self.get(instr.r2());
        if divisor == 0 {
            return Err(RuntimeError::DivisionByZero { at: self.state.pc });
        }
        self.set(instr.r3(), self.get(instr.r1()) / divisor);
        Ok(())
    }

    /// `reg[op3] := op(reg[op1], reg[op2])` as 0 or 1.
    fn exec_comparison(&mut self, instr: &Instruction, op: fn(u32, u32) -> bool) {
        let result = op(self.get(instr.r1()), self.get(instr.r2()));
        self.set(instr.r3(), u32::from(result));
    }

    fn branch_if(&mut self, instr: &Instruction, cond: fn(u32) -> bool) {
        self.state.pc = if cond(self.get(instr.r1())) {
            instr.op2 as usize
        } else {
            self.state.pc + 1
        };
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let at = self.state.pc;
        let base = instr.r2();
        let argc = instr.op3;

        match instr.call_target() {
            CallTarget::Native(id) => {
                let native = self
                    .natives
                    .get_mut(NativeId(id))
                    .ok_or(RuntimeError::UnknownNative { at, id })?;
                trace!(id, base, argc, "native call");
                native
                    .call(NativeCall {
                        registers: &mut self.state.regs,
                        base,
                        argc,
                        strings: &self.strings,
                    })
                    .map_err(|source| RuntimeError::NativeFailed { at, id, source })?;
                self.state.pc += 1;
            }
            CallTarget::User(addr) => {
                let caller_fp = self.state.fp;
                self.state.push_frame(at + 1, caller_fp, argc, base)?;
                self.state.fp = base;
                self.state.pc = addr;
                debug!(
                    from = at,
                    to = addr,
                    base,
                    argc,
                    depth = self.state.depth(),
                    "call"
                );
            }
        }
        Ok(())
    }

    fn exec_ret(&mut self) -> Step {
        match self.state.pop_frame() {
            Some(ret) => {
                self.state.pc = ret.return_addr;
                self.state.fp = ret.caller_fp;
                debug!(
                    to = ret.return_addr,
                    result_register = ret.result_register,
                    depth = self.state.depth(),
                    "return"
                );
                Step::Running
            }
            None => {
                debug!("return from outermost call");
                self.finish_halt()
            }
        }
    }

    fn exec_profile_start(&mut self) {
        self.profiler.start(self.state.executed);
        if self.config.debug {
            info!(pc = self.state.pc, "profiling started");
        }
    }

    fn exec_profile_end(&mut self) {
        match self.profiler.finish(self.state.executed) {
            Some(report) => info!(
                elapsed_ms = report.elapsed.as_millis() as u64,
                elapsed_us = report.elapsed.as_micros() as u64,
                instructions = report.instructions,
                "profile"
            ),
            None => debug!(pc = self.state.pc, "PRFE without matching PRF ignored"),
        }
    }

    fn exec_halt(&mut self) -> Step {
        self.state.halted = true;
        self.finish_halt()
    }

    fn finish_halt(&self) -> Step {
        let result = self.state.regs[0];
        debug!(
            pc = self.state.pc,
            instructions = self.state.executed,
            result,
            "halted"
        );
        if self.config.debug {
            let live: Vec<(usize, u32)> = self
                .state
                .regs
                .iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(|(i, &v)| (i, v))
                .collect();
            info!(registers = ?live, "final register state");
        }
        Step::Halted(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(instrs: &[Instruction]) -> Machine {
        let mut vm = Machine::new();
        vm.load(instrs.iter().map(Instruction::to_word).collect());
        vm
    }

    #[test]
    fn step_advances_one_instruction() {
        let mut vm = machine(&[
            Instruction::new(Opcode::Mov, 1, 5, 0),
            Instruction::new(Opcode::Halt, 0, 0, 0),
        ]);
        assert_eq!(vm.step(), Ok(Step::Running));
        assert_eq!(vm.pc(), 1);
        assert_eq!(vm.register(1), 5);
        assert_eq!(vm.step(), Ok(Step::Halted(0)));
        assert!(vm.is_halted());
        assert_eq!(vm.instructions_executed(), 2);
    }

    #[test]
    fn halted_machine_does_not_execute_further() {
        let mut vm = machine(&[Instruction::new(Opcode::Halt, 0, 0, 0)]);
        assert_eq!(vm.execute(), Ok(0));
        assert_eq!(vm.step(), Ok(Step::Halted(0)));
        assert_eq!(vm.instructions_executed(), 1);
    }

    #[test]
    fn fetch_distinguishes_fallthrough_from_bad_jump() {
        let mut vm = machine(&[Instruction::new(Opcode::Mov, 1, 1, 0)]);
        vm.step().unwrap();
        assert_eq!(vm.fetch(), Err(RuntimeError::MissingHalt { at: 1 }));
        vm.state.pc = 5;
        assert_eq!(
            vm.fetch(),
            Err(RuntimeError::PcOutOfBounds { pc: 5, len: 1 })
        );
    }

    #[test]
    fn control_transfers_set_the_counter_exactly() {
        let mut vm = machine(&[
            Instruction::new(Opcode::Jnz, 1, 0, 0),
            Instruction::new(Opcode::Jmp, 1, 0, 0),
        ]);
        // Not taken: falls through by one, not two.
        vm.step().unwrap();
        assert_eq!(vm.pc(), 1);
        // Jump to itself: the counter stays put.
        vm.step().unwrap();
        vm.step().unwrap();
        assert_eq!(vm.pc(), 1);
        assert_eq!(vm.instructions_executed(), 3);
    }

    #[test]
    fn step_on_empty_program_faults() {
        let mut vm = Machine::new();
        assert_eq!(vm.step(), Err(RuntimeError::EmptyProgram));
    }
}
