/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::time::Instant;

use tracing::{debug, info};

use crate::{in_check, legal_moves, vm::VmError, Evaluator, Move, Position, Score, Weights};

/// Depth searched when none is requested.
pub const DEFAULT_DEPTH: usize = 3;

/// The result of a search, containing the best move found, score, and total nodes searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchResult {
    /// Number of nodes searched.
    pub nodes: u64,

    /// Best move found during the search.
    pub bestmove: Option<Move>,

    /// Minimax value of the root position. Positive scores favor White.
    pub score: Score,
}

impl Default for SearchResult {
    #[inline(always)]
    fn default() -> Self {
        Self {
            nodes: 0,
            bestmove: None,
            score: Score::DRAW,
        }
    }
}

/// Configuration variables for executing a [`Search`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum depth to execute the search.
    ///
    /// A depth of 0 is searched as depth 1, since the root must choose a move.
    /// [`crate::Engine::search`] answers depth 0 with the static evaluation instead.
    pub max_depth: usize,
}

impl Default for SearchConfig {
    #[inline(always)]
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DEPTH,
        }
    }
}

/// Executes a minimax search with alpha-beta pruning on the provided position at a fixed depth.
///
/// White maximizes and Black minimizes. Moves are searched in generation order,
/// and a later move only replaces the best move if it is strictly better,
/// so the same position and depth always yield the same result.
pub struct Search<'a> {
    /// The position to search on.
    ///
    /// This position will be copied when moves are applied to it.
    pos: &'a Position,

    evaluator: Evaluator<'a>,

    /// The result of the search, updated as-needed during search.
    result: SearchResult,

    /// Configuration variables for this instance of the search.
    config: SearchConfig,
}

impl<'a> Search<'a> {
    /// Construct a new [`Search`] instance to execute on the provided [`Position`].
    #[inline(always)]
    pub fn new(pos: &'a Position, weights: &'a Weights, config: SearchConfig) -> Self {
        Self {
            pos,
            evaluator: Evaluator::new(weights),
            result: SearchResult::default(),
            config,
        }
    }

    /// Start the search, returning its results.
    ///
    /// If the side to move has no King or no legal moves, there is no best move.
    pub fn start(mut self) -> Result<SearchResult, VmError> {
        let depth = self.config.max_depth.max(1);
        let starttime = Instant::now();
        debug!(fen = %self.pos, depth, "starting search");

        if self.pos.king_square(self.pos.side_to_move()).is_none() {
            self.result.score = self.evaluator.evaluate(self.pos)?;
            return Ok(self.result);
        }

        // Initialize `bestmove` to the first move available
        self.result.bestmove = legal_moves(self.pos)?.first().copied();

        self.result.score = self.alpha_beta(self.pos, depth, 0, -Score::INF, Score::INF)?;

        info!(
            depth,
            nodes = self.result.nodes,
            score = %self.result.score,
            bestmove = ?self.result.bestmove,
            elapsed_ms = starttime.elapsed().as_millis() as u64,
            "search finished"
        );

        Ok(self.result)
    }

    /// Primary location of search logic.
    ///
    /// Uses [minimax](https://www.chessprogramming.org/Minimax) with [alpha-beta pruning](https://www.chessprogramming.org/Alpha-Beta).
    fn alpha_beta(
        &mut self,
        pos: &Position,
        depth: usize,
        ply: usize,
        mut alpha: Score,
        mut beta: Score,
    ) -> Result<Score, VmError> {
        self.result.nodes += 1;
        let stm = pos.side_to_move();

        // A missing King is scored by the evaluator
        if pos.king_square(stm).is_none() {
            return self.evaluator.evaluate(pos);
        }

        let moves = legal_moves(pos)?;

        // If there are no legal moves, it's either mate or a draw.
        if moves.is_empty() {
            return Ok(if in_check(pos, stm)? {
                // The side to move has lost
                -Score::INF * stm.negation_multiplier() as i32
            } else {
                Score::DRAW
            });
        }

        // If we've reached a terminal node, evaluate the position
        if depth == 0 {
            return self.evaluator.evaluate(pos);
        }

        let maximizing = stm.is_white();
        let mut best = if maximizing { -Score::INF } else { Score::INF };

        for mv in moves {
            // Copy-make the new position
            let score = self.alpha_beta(&pos.with_move_made(mv), depth - 1, ply + 1, alpha, beta)?;

            let improved = if maximizing { score > best } else { score < best };
            if improved {
                best = score;
                if ply == 0 {
                    self.result.bestmove = Some(mv);
                }
            }

            if maximizing {
                alpha = alpha.max(best);
            } else {
                beta = beta.min(best);
            }

            if beta <= alpha {
                break;
            }
        }

        Ok(best)
    }
}

/// Picks the move whose resulting position evaluates best for the side to move, looking only one ply ahead.
///
/// Ties go to the earliest move generated.
pub fn compute_move(pos: &Position, weights: &Weights) -> Result<Option<Move>, VmError> {
    let evaluator = Evaluator::new(weights);
    let maximizing = pos.side_to_move().is_white();
    let mut best: Option<(Move, Score)> = None;

    for mv in legal_moves(pos)? {
        let score = evaluator.evaluate(&pos.with_move_made(mv))?;

        let improved = match best {
            None => true,
            Some((_, best_score)) if maximizing => score > best_score,
            Some((_, best_score)) => score < best_score,
        };

        if improved {
            best = Some((mv, score));
        }
    }

    Ok(best.map(|(mv, _)| mv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, FEN_KIWIPETE};

    fn search(fen: &str, max_depth: usize) -> SearchResult {
        let pos = fen.parse().unwrap();
        let weights = Weights::default();
        Search::new(&pos, &weights, SearchConfig { max_depth })
            .start()
            .unwrap()
    }

    #[test]
    fn test_white_mate_in_1() {
        let fen = "k7/8/KQ6/8/8/8/8/8 w - - 0 1";
        let res = search(fen, 2);
        assert_eq!(res.score, Score::INF);

        let pos: Position = fen.parse().unwrap();
        let after = pos.with_move_made(res.bestmove.unwrap());
        assert!(legal_moves(&after).unwrap().is_empty());
        assert!(in_check(&after, Color::Black).unwrap());
    }

    #[test]
    fn test_black_mates_in_1() {
        let fen = "8/8/8/8/8/kq6/8/K7 b - - 0 1";
        let res = search(fen, 2);
        assert_eq!(res.score, -Score::INF);

        let pos: Position = fen.parse().unwrap();
        let after = pos.with_move_made(res.bestmove.unwrap());
        assert!(legal_moves(&after).unwrap().is_empty());
        assert!(in_check(&after, Color::White).unwrap());
    }

    #[test]
    fn test_checkmated_root_has_no_move() {
        let res = search(
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
            3,
        );
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, -Score::INF);
    }

    #[test]
    fn test_stalemate() {
        let res = search("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 3);
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Score::DRAW);
    }

    #[test]
    fn test_missing_king_has_no_move() {
        let res = search("8/8/8/8/8/8/8/4K3 b - - 0 1", 2);
        assert!(res.bestmove.is_none());
        assert_eq!(res.score, Score::INF);
    }

    #[test]
    fn test_search_is_deterministic() {
        let first = search(FEN_KIWIPETE, 2);
        let second = search(FEN_KIWIPETE, 2);
        assert!(first.bestmove.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_depth_zero_still_picks_a_move() {
        let res = search(crate::FEN_STARTPOS, 0);
        assert!(res.bestmove.is_some());
    }

    #[test]
    fn test_compute_move_grabs_material() {
        let weights = Weights::default();

        // The hanging Queen on d5 is worth more than anything else White can do
        let pos: Position = "4k3/8/8/3q4/8/8/8/3RK3 w - - 0 1".parse().unwrap();
        let mv = compute_move(&pos, &weights).unwrap();
        assert_eq!(mv, Some("d1d5".parse().unwrap()));

        let pos: Position = "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1".parse().unwrap();
        assert_eq!(compute_move(&pos, &weights).unwrap(), None);
    }
}
