/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use thiserror::Error;

use super::Opcode;

/// Fatal errors raised while assembling, building, or executing a [`super::Program`].
///
/// None of these are recoverable: the program that produced one is malformed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    /// An instruction needed more values than the stack held.
    #[error("Stack underflow: {opcode} at instruction {ip}")]
    StackUnderflow { ip: usize, opcode: Opcode },

    /// A load or store referenced a cell outside of memory.
    #[error("Address {address} is out of range at instruction {ip} (memory has {size} cells)")]
    AddressOutOfRange { ip: usize, address: i64, size: usize },

    /// A jump targeted something other than an instruction or the end of the program.
    #[error("Jump target {target} at instruction {ip} is outside of the program ({len} instructions)")]
    InvalidJump { ip: usize, target: i64, len: usize },

    /// An instruction that needs an operand had none.
    #[error("{opcode} at instruction {ip} requires an operand")]
    MissingOperand { ip: usize, opcode: Opcode },

    /// Integer arithmetic overflowed.
    #[error("Arithmetic overflow: {opcode} at instruction {ip}")]
    Overflow { ip: usize, opcode: Opcode },

    /// A value printed in character mode was not a valid code point.
    #[error("Cannot print {value} as a character at instruction {ip}")]
    InvalidChar { ip: usize, value: i64 },

    /// The assembler did not recognize a mnemonic.
    #[error("Unknown opcode {mnemonic:?} on line {line}")]
    UnknownOpcode { line: usize, mnemonic: String },

    /// The assembler could not parse an operand.
    #[error("Invalid operand {operand:?} on line {line}")]
    InvalidOperand { line: usize, operand: String },

    /// A forward jump was emitted but never given a target.
    #[error("Jump at instruction {index} was never patched")]
    UnresolvedJump { index: usize },

    /// A position has more legal moves than a move list, or the character buffer streaming it, can hold.
    #[error("Position has more than {capacity} legal moves")]
    MoveListFull { capacity: usize },

    /// A program's output could not be decoded into the expected result.
    #[error("Unexpected program output: {output:?}")]
    MalformedOutput { output: Vec<String> },
}
