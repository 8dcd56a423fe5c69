/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{path::PathBuf, str::FromStr};

use clap::{Parser, ValueEnum};

/// A command to be sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(multicall = true, about, override_usage("<ENGINE COMMAND>"))]
pub enum EngineCommand {
    /// Compute a move by looking a single ply ahead.
    Best,

    /// Print the bytecode of a compiled program for the current position.
    #[command(alias = "disassemble")]
    Disasm {
        /// Which program to compile.
        program: CompiledProgram,
    },

    /// Print a visual representation of the current board state.
    #[command(alias = "d")]
    Display,

    /// Print an evaluation of the current position.
    Eval {
        /// If set, the contribution of every piece will be printed as well.
        #[arg(short, long, default_value = "false")]
        pretty: bool,
    },

    /// Quit the engine.
    #[command(alias = "quit")]
    Exit,

    /// Generate and print a FEN string for the current position.
    Fen,

    /// Search the current position to a fixed depth.
    Go {
        /// Depth to search. Defaults to the engine's configured depth.
        depth: Option<usize>,
    },

    /// Apply the provided move to the position.
    ///
    /// No enforcement of legality, so you can move a White piece twice in a row, if you want.
    #[command(alias = "move")]
    MakeMove { mv_string: String },

    /// Shows all legal moves in the current position.
    Moves,

    /// Performs a perft on the current position at the supplied depth, printing total node count.
    Perft { depth: usize },

    /// Set the position: `startpos` or a FEN string, optionally followed by `moves` and a list of moves.
    Position {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Performs a split perft on the current position at the supplied depth.
    #[command(alias = "sperft")]
    Splitperft { depth: usize },

    /// Adjust the evaluation weights from a file of finished games.
    ///
    /// Each line holds `<fen> ; <uci moves> ; <result>`.
    Train { path: PathBuf },
}

/// Programs that can be compiled from a position and printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CompiledProgram {
    /// Whether the side to move is in check.
    Check,
    /// The evaluation of the position.
    Eval,
    /// The list of legal moves, streamed through the output channel.
    Moves,
}

impl FromStr for EngineCommand {
    type Err = clap::Error;
    /// Attempt to parse an [`EngineCommand`] from a string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse_from(s.split_ascii_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("go 4".parse::<EngineCommand>().unwrap(), EngineCommand::Go { depth: Some(4) });
        assert_eq!("go".parse::<EngineCommand>().unwrap(), EngineCommand::Go { depth: None });
        assert_eq!(
            "disasm check".parse::<EngineCommand>().unwrap(),
            EngineCommand::Disasm {
                program: CompiledProgram::Check
            }
        );
        assert_eq!(
            "move e2e4".parse::<EngineCommand>().unwrap(),
            EngineCommand::MakeMove {
                mv_string: String::from("e2e4")
            }
        );
        assert!("frobnicate".parse::<EngineCommand>().is_err());
    }

    #[test]
    fn test_parse_position_with_hyphens() {
        let cmd: EngineCommand = "position 8/8/8/8/8/8/8/4K3 w - - 0 1".parse().unwrap();
        let EngineCommand::Position { args } = cmd else {
            panic!("expected a position command");
        };
        assert_eq!(args, ["8/8/8/8/8/8/8/4K3", "w", "-", "-", "0", "1"]);
    }
}
