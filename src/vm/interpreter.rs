/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use tracing::trace;

use super::{Instruction, Opcode, Program, VmError};

/// The state of a single program execution.
///
/// A [`Vm`] is created for every call to [`Vm::execute`] and dropped when it returns,
/// so no two executions ever share a stack, memory, or output.
#[derive(Debug)]
pub struct Vm {
    stack: Vec<i64>,
    memory: Vec<i64>,
    ip: usize,
    output: Vec<String>,
}

impl Vm {
    /// Creates a fresh machine with `memory_size` zeroed cells.
    fn new(memory_size: usize) -> Self {
        Self {
            stack: Vec::with_capacity(16),
            memory: vec![0; memory_size],
            ip: 0,
            output: Vec::new(),
        }
    }

    /// Runs `program` to completion and returns everything it printed.
    ///
    /// Execution stops at `HALT` or upon running off of the end of the program.
    /// Any malformed instruction aborts the whole execution.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{Program, Vm};
    /// let program: Program = "PUSH 2\nPUSH 3\nADD\nPRINT".parse().unwrap();
    /// assert_eq!(Vm::execute(&program).unwrap(), ["5"]);
    /// ```
    pub fn execute(program: &Program) -> Result<Vec<String>, VmError> {
        let mut vm = Self::new(program.memory_size());
        vm.run(program.instructions())?;
        trace!(
            instructions = program.len(),
            output = ?vm.output,
            "executed program"
        );
        Ok(vm.output)
    }

    fn run(&mut self, instructions: &[Instruction]) -> Result<(), VmError> {
        while let Some(&inst) = instructions.get(self.ip) {
            let ip = self.ip;
            self.ip += 1;

            match inst.opcode {
                Opcode::Push => {
                    let value = self.operand(inst, ip)?;
                    self.stack.push(value);
                }

                Opcode::Add => self.arithmetic(inst.opcode, ip, i64::checked_add)?,
                Opcode::Mul => self.arithmetic(inst.opcode, ip, i64::checked_mul)?,

                Opcode::Eq => self.compare(inst.opcode, ip, |a, b| a == b)?,
                Opcode::Lt => self.compare(inst.opcode, ip, |a, b| a < b)?,
                Opcode::Gt => self.compare(inst.opcode, ip, |a, b| a > b)?,
                Opcode::Neq => self.compare(inst.opcode, ip, |a, b| a != b)?,
                Opcode::And => self.compare(inst.opcode, ip, |a, b| a != 0 && b != 0)?,
                Opcode::Or => self.compare(inst.opcode, ip, |a, b| a != 0 || b != 0)?,

                Opcode::Load => {
                    let address = match inst.operand {
                        Some(address) => address,
                        None => self.pop(inst.opcode, ip)?,
                    };
                    let cell = self.cell(address, ip)?;
                    self.stack.push(self.memory[cell]);
                }

                Opcode::Store => {
                    let address = self.operand(inst, ip)?;
                    let value = self.pop(inst.opcode, ip)?;
                    let cell = self.cell(address, ip)?;
                    self.memory[cell] = value;
                }

                Opcode::Jmp => {
                    self.ip = self.target(inst, ip, instructions.len())?;
                }

                Opcode::Jif => {
                    let target = self.target(inst, ip, instructions.len())?;
                    if self.pop(inst.opcode, ip)? == 0 {
                        self.ip = target;
                    }
                }

                Opcode::Print => {
                    let value = self.pop(inst.opcode, ip)?;
                    let token = if inst.operand.is_some_and(|mode| mode != 0) {
                        u32::try_from(value)
                            .ok()
                            .and_then(char::from_u32)
                            .ok_or(VmError::InvalidChar { ip, value })?
                            .to_string()
                    } else {
                        value.to_string()
                    };
                    self.output.push(token);
                }

                Opcode::Halt => break,
            }
        }

        Ok(())
    }

    #[inline(always)]
    fn pop(&mut self, opcode: Opcode, ip: usize) -> Result<i64, VmError> {
        self.stack.pop().ok_or(VmError::StackUnderflow { ip, opcode })
    }

    #[inline(always)]
    fn operand(&self, inst: Instruction, ip: usize) -> Result<i64, VmError> {
        inst.operand.ok_or(VmError::MissingOperand {
            ip,
            opcode: inst.opcode,
        })
    }

    /// Validates `address` against the size of memory.
    #[inline(always)]
    fn cell(&self, address: i64, ip: usize) -> Result<usize, VmError> {
        usize::try_from(address)
            .ok()
            .filter(|&cell| cell < self.memory.len())
            .ok_or(VmError::AddressOutOfRange {
                ip,
                address,
                size: self.memory.len(),
            })
    }

    /// Validates a jump target. Jumping to `len` is allowed and halts the program.
    #[inline(always)]
    fn target(&self, inst: Instruction, ip: usize, len: usize) -> Result<usize, VmError> {
        let target = self.operand(inst, ip)?;
        usize::try_from(target)
            .ok()
            .filter(|&t| t <= len)
            .ok_or(VmError::InvalidJump { ip, target, len })
    }

    /// Pops `b` then `a` and pushes `op(a, b)`, failing on overflow.
    #[inline(always)]
    fn arithmetic(
        &mut self,
        opcode: Opcode,
        ip: usize,
        op: fn(i64, i64) -> Option<i64>,
    ) -> Result<(), VmError> {
        let b = self.pop(opcode, ip)?;
        let a = self.pop(opcode, ip)?;
        let result = op(a, b).ok_or(VmError::Overflow { ip, opcode })?;
        self.stack.push(result);
        Ok(())
    }

    /// Pops `b` then `a` and pushes `1` if `op(a, b)` holds, else `0`.
    #[inline(always)]
    fn compare(&mut self, opcode: Opcode, ip: usize, op: fn(i64, i64) -> bool) -> Result<(), VmError> {
        let b = self.pop(opcode, ip)?;
        let a = self.pop(opcode, ip)?;
        self.stack.push(op(a, b) as i64);
        Ok(())
    }
}
