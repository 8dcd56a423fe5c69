/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Incremental program assembly with backpatched jumps.
mod builder;

/// Fatal VM errors.
mod error;

/// The interpreter loop.
mod interpreter;

/// Streaming move lists through the VM's output channel.
mod movelist;

/// Opcodes, instructions, and programs.
mod opcode;

pub use builder::*;
pub use error::*;
pub use interpreter::*;
pub use movelist::*;
pub use opcode::*;

/// Smallest memory any program executes with.
pub const MIN_MEMORY: usize = 256;

/// Largest memory any program executes with.
///
/// Room for a character buffer of [`crate::MAX_NUM_MOVES`] moves,
/// each up to five characters and a separating space.
pub const MAX_MEMORY: usize = CHAR_BUFFER + 6 * crate::MAX_NUM_MOVES;

/// First of the 64 cells holding the board snapshot.
pub const BOARD: usize = 0;

/// Loop counter.
pub const COUNTER: usize = 100;

/// Scratch cell: a mobility count, or whether a ray is still open.
pub const SCRATCH: usize = 101;

/// The running total of an evaluation.
pub const TOTAL: usize = 102;

/// Number of opponent pieces next to the King.
pub const KING_SAFETY: usize = 103;

/// Number of moves written to the character buffer.
pub const CHAR_COUNT: usize = 199;

/// First cell of the character buffer.
pub const CHAR_BUFFER: usize = 200;
