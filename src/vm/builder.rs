/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Instruction, Opcode, Program, VmError, BOARD};
use crate::{Position, Square};

/// A forward jump whose target has not been emitted yet.
///
/// Resolve it with [`ProgramBuilder::patch_here`] once the target is known.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a forward jump must be patched before the program is built"]
pub struct Patch(usize);

impl Patch {
    /// Index of the jump instruction awaiting a target.
    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// The upper bound of a [`ProgramBuilder::counting_loop`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Limit {
    /// Loop a fixed number of times.
    Literal(i64),
    /// Loop as many times as the value stored in this cell when the loop header runs.
    Cell(usize),
}

/// Incrementally assembles a [`Program`], resolving forward jumps as their targets are emitted.
///
/// # Example
/// ```
/// # use tadpole::{ProgramBuilder, Vm};
/// let mut builder = ProgramBuilder::new();
/// builder.push(0);
/// let skip = builder.jif_forward();
/// builder.push(1).print().halt();
/// builder.patch_here(skip);
/// builder.push(2).print();
///
/// let program = builder.build().unwrap();
/// assert_eq!(Vm::execute(&program).unwrap(), ["2"]);
/// ```
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    instructions: Vec<Instruction>,

    /// Indices of jumps that still hold a placeholder target.
    pending: Vec<usize>,
}

impl ProgramBuilder {
    /// Creates an empty builder.
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the next instruction to be emitted.
    #[inline(always)]
    pub fn here(&self) -> usize {
        self.instructions.len()
    }

    /// Appends `inst`, returning its index.
    #[inline(always)]
    pub fn emit(&mut self, inst: Instruction) -> usize {
        self.instructions.push(inst);
        self.instructions.len() - 1
    }

    #[inline(always)]
    fn op(&mut self, opcode: Opcode) -> &mut Self {
        self.emit(Instruction::new(opcode));
        self
    }

    #[inline(always)]
    fn op_with(&mut self, opcode: Opcode, operand: i64) -> &mut Self {
        self.emit(Instruction::with_operand(opcode, operand));
        self
    }

    pub fn push(&mut self, value: i64) -> &mut Self {
        self.op_with(Opcode::Push, value)
    }

    pub fn add(&mut self) -> &mut Self {
        self.op(Opcode::Add)
    }

    pub fn mul(&mut self) -> &mut Self {
        self.op(Opcode::Mul)
    }

    pub fn eq(&mut self) -> &mut Self {
        self.op(Opcode::Eq)
    }

    pub fn lt(&mut self) -> &mut Self {
        self.op(Opcode::Lt)
    }

    pub fn gt(&mut self) -> &mut Self {
        self.op(Opcode::Gt)
    }

    pub fn neq(&mut self) -> &mut Self {
        self.op(Opcode::Neq)
    }

    pub fn and(&mut self) -> &mut Self {
        self.op(Opcode::And)
    }

    pub fn or(&mut self) -> &mut Self {
        self.op(Opcode::Or)
    }

    /// Push the value stored at `address`.
    pub fn load(&mut self, address: usize) -> &mut Self {
        self.op_with(Opcode::Load, address as i64)
    }

    /// Pop an address and push the value stored there.
    pub fn load_indirect(&mut self) -> &mut Self {
        self.op(Opcode::Load)
    }

    /// Pop a value into `address`.
    pub fn store(&mut self, address: usize) -> &mut Self {
        self.op_with(Opcode::Store, address as i64)
    }

    /// Jump backwards (or forwards) to an already-known instruction index.
    pub fn jmp(&mut self, target: usize) -> &mut Self {
        self.op_with(Opcode::Jmp, target as i64)
    }

    /// Jump-if-false to an already-known instruction index.
    pub fn jif(&mut self, target: usize) -> &mut Self {
        self.op_with(Opcode::Jif, target as i64)
    }

    /// Pop a value and print it as a decimal number.
    pub fn print(&mut self) -> &mut Self {
        self.op(Opcode::Print)
    }

    /// Pop a code point and print it as a character.
    pub fn print_char(&mut self) -> &mut Self {
        self.op_with(Opcode::Print, 1)
    }

    pub fn halt(&mut self) -> &mut Self {
        self.op(Opcode::Halt)
    }

    /// `memory[address] += 1`
    pub fn increment(&mut self, address: usize) -> &mut Self {
        self.load(address).push(1).add().store(address)
    }

    /// Emits a forward jump with a placeholder target.
    fn forward(&mut self, opcode: Opcode) -> Patch {
        let index = self.emit(Instruction::with_operand(opcode, 0));
        self.pending.push(index);
        Patch(index)
    }

    /// Emits an unconditional jump to a target that will be patched later.
    pub fn jmp_forward(&mut self) -> Patch {
        self.forward(Opcode::Jmp)
    }

    /// Emits a jump-if-false to a target that will be patched later.
    pub fn jif_forward(&mut self) -> Patch {
        self.forward(Opcode::Jif)
    }

    /// Points `patch` at the next instruction to be emitted.
    pub fn patch_here(&mut self, patch: Patch) {
        let target = self.here();
        self.patch_to(patch, target);
    }

    /// Points `patch` at `target`.
    pub fn patch_to(&mut self, patch: Patch, target: usize) {
        self.pending.retain(|&index| index != patch.0);
        if let Some(inst) = self.instructions.get_mut(patch.0) {
            inst.operand = Some(target as i64);
        }
    }

    /// Emits a loop that runs `body` while `memory[counter] < limit`, counting up from zero.
    ///
    /// ```text
    ///         PUSH 0; STORE counter
    /// header: LOAD counter; <limit>; LT; JIF exit
    ///         <body>
    ///         LOAD counter; PUSH 1; ADD; STORE counter
    ///         JMP header
    /// exit:
    /// ```
    pub fn counting_loop(
        &mut self,
        counter: usize,
        limit: Limit,
        body: impl FnOnce(&mut Self),
    ) -> &mut Self {
        self.push(0).store(counter);

        let header = self.here();
        self.load(counter);
        match limit {
            Limit::Literal(value) => self.push(value),
            Limit::Cell(address) => self.load(address),
        };
        self.lt();
        let exit = self.jif_forward();

        body(self);

        self.increment(counter).jmp(header);
        self.patch_here(exit);
        self
    }

    /// Emits `cond`, then `body` guarded so that it only runs when `cond` left a nonzero value.
    pub fn guarded(
        &mut self,
        cond: impl FnOnce(&mut Self),
        body: impl FnOnce(&mut Self),
    ) -> &mut Self {
        cond(self);
        let skip = self.jif_forward();
        body(self);
        self.patch_here(skip);
        self
    }

    /// Stores the code of every square of `pos` at its square index, a1 through h8.
    pub fn load_board(&mut self, pos: &Position) -> &mut Self {
        for square in Square::iter() {
            let code = pos.piece_at(square).map_or(0, |piece| piece.code());
            self.push(code).store(BOARD + square.index());
        }
        self
    }

    /// Finishes the program, failing if any forward jump was never patched.
    pub fn build(self) -> Result<Program, VmError> {
        if let Some(&index) = self.pending.iter().min() {
            return Err(VmError::UnresolvedJump { index });
        }

        Ok(Program::new(self.instructions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{vm::Vm, Piece};

    #[test]
    fn test_backpatched_branch() {
        let mut builder = ProgramBuilder::new();
        builder.push(0);
        let skip = builder.jif_forward();
        builder.push(1).print().halt();
        builder.patch_here(skip);
        builder.push(2).print();

        let program = builder.build().unwrap();
        assert_eq!(program.instructions()[1].operand, Some(5));
        assert_eq!(Vm::execute(&program).unwrap(), ["2"]);
    }

    #[test]
    fn test_backward_jump_to_known_target() {
        // Count down from 3, printing each value, until the counter reaches zero
        let mut builder = ProgramBuilder::new();
        builder.push(3).store(100);
        let top = builder.here();
        builder.load(100).print();
        builder.load(100).push(-1).add().store(100);
        builder.load(100).push(0).neq();
        let end = builder.here() + 2;
        builder.jif(end).jmp(top);

        assert_eq!(Vm::execute(&builder.build().unwrap()).unwrap(), ["3", "2", "1"]);
    }

    #[test]
    fn test_unpatched_jump_fails_to_build() {
        let mut builder = ProgramBuilder::new();
        builder.push(1);
        let _dangling = builder.jmp_forward();
        builder.halt();

        assert_eq!(builder.build(), Err(VmError::UnresolvedJump { index: 1 }));
    }

    #[test]
    fn test_counting_loop_shape() {
        let mut builder = ProgramBuilder::new();
        builder.counting_loop(100, Limit::Literal(3), |b| {
            b.load(100).print();
        });
        let program = builder.build().unwrap();

        let expected = "
            PUSH 0
            STORE 100
            LOAD 100
            PUSH 3
            LT
            JIF 13
            LOAD 100
            PRINT
            LOAD 100
            PUSH 1
            ADD
            STORE 100
            JMP 2
        ";
        let expected: Program = expected.parse().unwrap();
        assert_eq!(program, expected);
        assert_eq!(Vm::execute(&program).unwrap(), ["0", "1", "2"]);
    }

    #[test]
    fn test_loop_limit_from_memory() {
        let mut builder = ProgramBuilder::new();
        builder.push(4).store(50);
        builder.counting_loop(100, Limit::Cell(50), |b| {
            b.increment(101);
        });
        builder.load(101).print();

        assert_eq!(Vm::execute(&builder.build().unwrap()).unwrap(), ["4"]);
    }

    #[test]
    fn test_guarded_body() {
        let mut builder = ProgramBuilder::new();
        for value in [0, 3, 0, 7] {
            builder.guarded(
                |b| {
                    b.push(value).push(0).neq();
                },
                |b| {
                    b.increment(101);
                },
            );
        }
        builder.load(101).print();

        assert_eq!(Vm::execute(&builder.build().unwrap()).unwrap(), ["2"]);
    }

    #[test]
    fn test_board_snapshot() {
        let mut builder = ProgramBuilder::new();
        builder.load_board(&Position::default());
        builder.load(Square::E1.index()).print();
        builder.load(Square::D8.index()).print();
        builder.load(Square::E4.index()).print();
        let program = builder.build().unwrap();

        assert_eq!(program.instructions()[0], Instruction::with_operand(Opcode::Push, 4));
        assert_eq!(program.instructions()[1], Instruction::with_operand(Opcode::Store, 0));

        let out = Vm::execute(&program).unwrap();
        assert_eq!(
            out,
            [
                Piece::WHITE_KING.code().to_string(),
                Piece::BLACK_QUEEN.code().to_string(),
                String::from("0")
            ]
        );
    }
}
