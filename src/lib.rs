/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Squares, pieces, moves, positions, and move generation.
mod board;

/// Check detection, compiled to a VM program.
mod check;

/// Commands accepted by the engine.
mod cli;

/// Code related to the engine's functionality, such as user input handling.
mod engine;

/// Evaluation of chess positions.
mod eval;

/// Piece-Square Tables.
mod psqt;

/// Centipawn scores.
mod score;

/// Main engine logic; all search related code.
mod search;

/// Adjusting evaluation weights from finished games.
mod train;

/// The bytecode VM that runs check detection and evaluation.
pub mod vm;

pub use board::*;
pub use check::*;
pub use cli::*;
pub use engine::*;
pub use eval::*;
pub use psqt::*;
pub use score::*;
pub use search::*;
pub use train::*;
pub use vm::{
    compile_move_list, decode_move_list, stream_moves, Instruction, Opcode, Program,
    ProgramBuilder, Vm, VmError,
};
