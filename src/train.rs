/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{io::BufRead, str::FromStr};

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info, warn};

use crate::{Move, Position, Weights};

/// How far a single move nudges the weights.
pub const LEARNING_RATE: f64 = 0.01;

/// The outcome of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    BlackWin,
    Draw,
    WhiteWin,
}

impl GameResult {
    /// `+1` for a White win, `-1` for a Black win, and nothing for a draw.
    #[inline(always)]
    pub const fn sign(&self) -> Option<f64> {
        match self {
            Self::BlackWin => Some(-1.0),
            Self::Draw => None,
            Self::WhiteWin => Some(1.0),
        }
    }
}

impl FromStr for GameResult {
    type Err = anyhow::Error;
    fn from_str(mut s: &str) -> std::result::Result<Self, Self::Err> {
        // Remove leading/trailing brackets, if present
        s = s.trim().trim_start_matches('[');
        s = s.trim_end_matches(']');

        match s {
            "0.0" | "0-1" => Ok(Self::BlackWin),
            "0.5" | "1/2-1/2" => Ok(Self::Draw),
            "1.0" | "1-0" => Ok(Self::WhiteWin),
            _ => bail!("Could not parse {s:?} into GameResult"),
        }
    }
}

/// A game to learn from: where it started, what was played, and who won.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingGame {
    pub initial: Position,
    pub moves: Vec<Move>,
    pub result: GameResult,
}

impl FromStr for TrainingGame {
    type Err = anyhow::Error;
    /// Parses a line of the form `<fen> ; <uci moves> ; <result>`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut fields = s.split(';');
        let (Some(fen), Some(moves), Some(result), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            bail!("Expected 3 fields separated by ';'. Got {s:?}");
        };

        let initial = Position::from_fen(fen.trim()).context("Invalid FEN")?;
        let moves = moves
            .split_ascii_whitespace()
            .map(Move::from_uci)
            .collect::<Result<Vec<_>>>()
            .context("Invalid move list")?;
        let result = result.parse()?;

        Ok(Self {
            initial,
            moves,
            result,
        })
    }
}

/// Reads one [`TrainingGame`] per line.
///
/// Blank lines and lines starting with `#` are ignored.
/// Malformed lines are skipped with a warning rather than failing the whole dataset.
pub fn load_dataset(reader: impl BufRead) -> Result<Vec<TrainingGame>> {
    let mut games = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| anyhow!("Failed to read line {}: {e}", i + 1))?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.parse() {
            Ok(game) => games.push(game),
            Err(e) => warn!(line = i + 1, "skipping training game: {e:#}"),
        }
    }

    debug!(games = games.len(), "loaded dataset");
    Ok(games)
}

/// Nudges `weights` toward the moves played by the winners of `games`.
///
/// For every move of a decisive game, the moving piece's material value and its
/// Piece-Square Table entry at the destination grow by `LEARNING_RATE * result * color`,
/// and its entry at the origin shrinks by the same amount. Drawn games are skipped.
///
/// Returns the number of games that were learned from.
pub fn train(weights: &mut Weights, games: &[TrainingGame]) -> usize {
    let mut trained = 0;

    for game in games {
        let Some(sign) = game.result.sign() else {
            continue;
        };

        let mut pos = game.initial;
        for &mv in &game.moves {
            if let Some(piece) = pos.piece_at(mv.from()) {
                let (color, kind) = piece.parts();
                let modifier = LEARNING_RATE * sign * color.negation_multiplier() as f64;

                weights.material[kind] += modifier;
                weights.psqt[kind][mv.from().oriented_for(color)] -= modifier;
                weights.psqt[kind][mv.to().oriented_for(color)] += modifier;
            }

            pos.make_move(mv);
        }

        trained += 1;
    }

    info!(trained, total = games.len(), "training finished");
    trained
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PieceKind, Square, FEN_STARTPOS};

    const EPSILON: f64 = 1e-9;

    fn game(moves: &str, result: GameResult) -> TrainingGame {
        TrainingGame {
            initial: Position::default(),
            moves: moves
                .split_whitespace()
                .map(|mv| mv.parse().unwrap())
                .collect(),
            result,
        }
    }

    #[test]
    fn test_parse_results() {
        assert_eq!("1-0".parse::<GameResult>().unwrap(), GameResult::WhiteWin);
        assert_eq!("[0.0]".parse::<GameResult>().unwrap(), GameResult::BlackWin);
        assert_eq!("1/2-1/2".parse::<GameResult>().unwrap(), GameResult::Draw);
        assert!("2-0".parse::<GameResult>().is_err());
    }

    #[test]
    fn test_white_win_rewards_white_and_punishes_black() {
        let defaults = Weights::default();
        let mut weights = defaults.clone();
        let trained = train(&mut weights, &[game("e2e4 e7e5", GameResult::WhiteWin)]);
        assert_eq!(trained, 1);

        let pawn = PieceKind::Pawn;
        // +0.01 for White's move, -0.01 for Black's
        assert!((weights.material[pawn] - defaults.material[pawn]).abs() < EPSILON);

        // White: e2 loses, e4 gains
        let e2 = weights.psqt[pawn][Square::E2] - defaults.psqt[pawn][Square::E2];
        let e4 = weights.psqt[pawn][Square::E4] - defaults.psqt[pawn][Square::E4];
        assert!((e2 + LEARNING_RATE).abs() < EPSILON);
        assert!((e4 - LEARNING_RATE).abs() < EPSILON);

        // Black's e7 and e5 are rotated to d2 and d4, with the opposite sign
        let d2 = weights.psqt[pawn][Square::D2] - defaults.psqt[pawn][Square::D2];
        let d4 = weights.psqt[pawn][Square::D4] - defaults.psqt[pawn][Square::D4];
        assert!((d2 - LEARNING_RATE).abs() < EPSILON);
        assert!((d4 + LEARNING_RATE).abs() < EPSILON);
    }

    #[test]
    fn test_black_win_and_material() {
        let defaults = Weights::default();
        let mut weights = defaults.clone();
        train(&mut weights, &[game("g1f3", GameResult::BlackWin)]);

        let knight = PieceKind::Knight;
        let delta = weights.material[knight] - defaults.material[knight];
        assert!((delta + LEARNING_RATE).abs() < EPSILON);
    }

    #[test]
    fn test_draws_and_empty_origins_are_skipped() {
        let defaults = Weights::default();
        let mut weights = defaults.clone();

        assert_eq!(train(&mut weights, &[game("e2e4", GameResult::Draw)]), 0);
        assert_eq!(weights, defaults);

        assert_eq!(train(&mut weights, &[game("e4e5", GameResult::WhiteWin)]), 1);
        assert_eq!(weights, defaults);
    }

    #[test]
    fn test_load_dataset_skips_bad_lines() {
        let data = format!(
            "# comment\n\
             {FEN_STARTPOS} ; e2e4 e7e5 ; 1-0\n\
             \n\
             {FEN_STARTPOS} ; e2e4 ; maybe\n\
             not a fen ; e2e4 ; 0-1\n\
             {FEN_STARTPOS} ; ; [0.5]\n"
        );
        let games = load_dataset(data.as_bytes()).unwrap();

        assert_eq!(games.len(), 2);
        assert_eq!(games[0].moves.len(), 2);
        assert_eq!(games[0].result, GameResult::WhiteWin);
        assert!(games[1].moves.is_empty());
        assert_eq!(games[1].result, GameResult::Draw);
    }
}
