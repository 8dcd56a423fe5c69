/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use super::{VmError, MAX_MEMORY, MIN_MEMORY};

/// Every operation the VM understands.
///
/// Binary operations pop `b` then `a` and push `a OP b`.
/// Comparisons and logical operations push `1` for true and `0` for false.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Opcode {
    /// Push the operand.
    Push,
    Add,
    Mul,
    Eq,
    Lt,
    Gt,
    Neq,
    /// `1` if both values are nonzero.
    And,
    /// `1` if either value is nonzero.
    Or,
    /// With an operand, push `memory[operand]`.
    /// Without one, pop an address and push the value stored there.
    Load,
    /// Pop a value into `memory[operand]`.
    Store,
    /// Continue execution at the operand.
    Jmp,
    /// Pop a condition and continue execution at the operand if it is zero.
    Jif,
    /// Pop a value and append it to the output.
    ///
    /// A nonzero operand prints the value as a character instead of a decimal number.
    Print,
    /// Stop execution.
    Halt,
}

impl Opcode {
    /// Every opcode, in declaration order.
    pub const ALL: [Self; 15] = [
        Self::Push,
        Self::Add,
        Self::Mul,
        Self::Eq,
        Self::Lt,
        Self::Gt,
        Self::Neq,
        Self::And,
        Self::Or,
        Self::Load,
        Self::Store,
        Self::Jmp,
        Self::Jif,
        Self::Print,
        Self::Halt,
    ];

    /// The assembly mnemonic of this opcode.
    pub const fn mnemonic(&self) -> &'static str {
        match self {
            Self::Push => "PUSH",
            Self::Add => "ADD",
            Self::Mul => "MUL",
            Self::Eq => "EQ",
            Self::Lt => "LT",
            Self::Gt => "GT",
            Self::Neq => "NEQ",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Jmp => "JMP",
            Self::Jif => "JIF",
            Self::Print => "PRINT",
            Self::Halt => "HALT",
        }
    }

    /// Looks up an opcode by its mnemonic, ignoring case.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(mnemonic))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A single VM instruction: an [`Opcode`] and its optional operand.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Option<i64>,
}

impl Instruction {
    /// An instruction without an operand.
    #[inline(always)]
    pub const fn new(opcode: Opcode) -> Self {
        Self {
            opcode,
            operand: None,
        }
    }

    /// An instruction with an operand.
    #[inline(always)]
    pub const fn with_operand(opcode: Opcode, operand: i64) -> Self {
        Self {
            opcode,
            operand: Some(operand),
        }
    }

    /// Parses a single line of assembly, such as `PUSH 3` or `0004: JIF 9`.
    ///
    /// Returns `Ok(None)` for blank lines and comments.
    fn parse_line(line: &str, line_number: usize) -> Result<Option<Self>, VmError> {
        let code = line.split(';').next().unwrap_or_default();
        let mut tokens = code.split_ascii_whitespace().peekable();

        // Skip the index prefix emitted by the disassembler
        tokens.next_if(|token| token.ends_with(':'));

        let Some(mnemonic) = tokens.next() else {
            return Ok(None);
        };

        let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| VmError::UnknownOpcode {
            line: line_number,
            mnemonic: mnemonic.to_string(),
        })?;

        let invalid = |operand: &str| VmError::InvalidOperand {
            line: line_number,
            operand: operand.to_string(),
        };

        let operand = match tokens.next() {
            Some(operand) => Some(operand.parse().map_err(|_| invalid(operand))?),
            None => None,
        };

        if let Some(extra) = tokens.next() {
            return Err(invalid(extra));
        }

        Ok(Some(Self { opcode, operand }))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Some(operand) => write!(f, "{} {operand}", self.opcode),
            None => write!(f, "{}", self.opcode),
        }
    }
}

/// An immutable, linear sequence of [`Instruction`]s and the amount of memory they need.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Program {
    instructions: Vec<Instruction>,
    memory_size: usize,
}

impl Program {
    /// Wraps `instructions` into a [`Program`], sizing memory to cover every direct address used.
    ///
    /// Memory is never smaller than [`MIN_MEMORY`] cells nor larger than [`MAX_MEMORY`] cells.
    /// Addresses beyond that are reported when they are accessed.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        let highest = instructions
            .iter()
            .filter(|inst| matches!(inst.opcode, Opcode::Load | Opcode::Store))
            .filter_map(|inst| inst.operand)
            .filter_map(|addr| usize::try_from(addr).ok())
            .max()
            .unwrap_or_default();

        Self {
            instructions,
            memory_size: highest.saturating_add(1).clamp(MIN_MEMORY, MAX_MEMORY),
        }
    }

    /// The instructions of this program.
    #[inline(always)]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of memory cells this program executes with.
    #[inline(always)]
    pub const fn memory_size(&self) -> usize {
        self.memory_size
    }

    /// Number of instructions in this program.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns `true` if this program has no instructions.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl FromStr for Program {
    type Err = VmError;
    /// Assembles a program from one instruction per line.
    ///
    /// Everything after a `;` is a comment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut instructions = Vec::new();

        for (i, line) in s.lines().enumerate() {
            if let Some(inst) = Instruction::parse_line(line, i + 1)? {
                instructions.push(inst);
            }
        }

        Ok(Self::new(instructions))
    }
}

impl fmt::Display for Program {
    /// Disassembles this program, one numbered instruction per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, inst) in self.instructions.iter().enumerate() {
            writeln!(f, "{i:04}: {inst}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_and_disassemble() {
        let source = "
            ; adds two numbers
            PUSH 2
            push 3   ; lowercase is accepted
            ADD
            PRINT
        ";
        let program: Program = source.parse().unwrap();
        assert_eq!(program.len(), 4);
        assert_eq!(
            program.instructions()[1],
            Instruction::with_operand(Opcode::Push, 3)
        );

        let disassembly = program.to_string();
        assert_eq!(disassembly, "0000: PUSH 2\n0001: PUSH 3\n0002: ADD\n0003: PRINT\n");
        assert_eq!(disassembly.parse::<Program>().unwrap(), program);
    }

    #[test]
    fn test_assembler_errors() {
        assert_eq!(
            "PUSH 1\nFROB".parse::<Program>(),
            Err(VmError::UnknownOpcode {
                line: 2,
                mnemonic: String::from("FROB")
            })
        );
        assert!(matches!(
            "PUSH x".parse::<Program>(),
            Err(VmError::InvalidOperand { line: 1, .. })
        ));
        assert!(matches!(
            "PUSH 1 2".parse::<Program>(),
            Err(VmError::InvalidOperand { line: 1, .. })
        ));
    }

    #[test]
    fn test_memory_is_sized_from_addresses() {
        let small: Program = "LOAD 3\nSTORE 7".parse().unwrap();
        assert_eq!(small.memory_size(), MIN_MEMORY);

        let large: Program = "PUSH 1\nSTORE 300".parse().unwrap();
        assert_eq!(large.memory_size(), 301);

        let huge: Program = "PUSH 1\nSTORE 9223372036854775807".parse().unwrap();
        assert_eq!(huge.memory_size(), MAX_MEMORY);
    }
}
