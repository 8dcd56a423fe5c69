/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

use crate::{
    vm::{
        Limit, Program, ProgramBuilder, Vm, VmError, BOARD, COUNTER, KING_SAFETY, SCRATCH, TOTAL,
    },
    Color, File, Piece, PieceKind, Position, Psqt, Rank, Score, Square, QUEEN_DELTAS,
};

/// Points added per occupied square by the mobility term.
pub const MOBILITY_WEIGHT: i64 = 2;

/// Points lost by the side to move per enemy piece touching its King.
pub const KING_SAFETY_WEIGHT: i64 = 20;

/// Returns the default value of the provided `PieceKind`.
///
/// Values are obtained from here: <https://www.chessprogramming.org/Simplified_Evaluation_Function>
#[inline(always)]
pub const fn value_of(kind: PieceKind) -> i32 {
    match kind {
        PieceKind::Pawn => 100,
        PieceKind::Knight => 320,
        PieceKind::Bishop => 330,
        PieceKind::Rook => 500,
        PieceKind::Queen => 900,
        PieceKind::King => 0, // King is invaluable, but 0 is easier to work with in computations
    }
}

/// Material values and Piece-Square Tables used when compiling evaluations.
///
/// These are only ever modified by [`crate::train`].
#[derive(Clone, PartialEq, Debug)]
pub struct Weights {
    /// Material value of each [`PieceKind`].
    pub material: [f64; PieceKind::COUNT],

    /// Positional value of each [`PieceKind`] on each square, from White's perspective.
    pub psqt: [Psqt; PieceKind::COUNT],
}

impl Weights {
    /// Material plus positional value of `piece` on `square`, before rounding.
    ///
    /// Black pieces read their table at the rotated square.
    #[inline(always)]
    pub fn value_of(&self, piece: Piece, square: Square) -> f64 {
        let (color, kind) = piece.parts();
        self.material[kind] + self.psqt[kind][square.oriented_for(color)]
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            material: PieceKind::all().map(|kind| value_of(kind) as f64),
            psqt: Psqt::defaults(),
        }
    }
}

/// Encapsulates the logic of scoring a chess position.
///
/// A high score is good for White, and a low score is good for Black.
/// Scoring happens by compiling the position into a VM program and running it.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    weights: &'a Weights,
}

impl<'a> Evaluator<'a> {
    /// Construct a new [`Evaluator`] that scores with `weights`.
    #[inline(always)]
    pub fn new(weights: &'a Weights) -> Self {
        Self { weights }
    }

    /// Evaluate `pos`. Positive scores favor White.
    ///
    /// If the side to move has no King, it is scored as having been mated.
    pub fn evaluate(&self, pos: &Position) -> Result<Score, VmError> {
        let program = self.compile(pos)?;
        let output = Vm::execute(&program)?;

        match output.as_slice() {
            [token] => token
                .parse::<i64>()
                .map(Score::clamped)
                .map_err(|_| VmError::MalformedOutput { output }),
            _ => Err(VmError::MalformedOutput { output }),
        }
    }

    /// Compiles the evaluation program for `pos`.
    ///
    /// The program computes, in order:
    /// 1. material and Piece-Square values of every piece, negated for Black
    /// 2. a snapshot of the board
    /// 3. a mobility term, counting every occupied cell of the snapshot in a loop
    /// 4. a king safety term, counting enemy pieces next to the side to move's King
    ///
    /// and prints the total.
    pub fn compile(&self, pos: &Position) -> Result<Program, VmError> {
        let mut builder = ProgramBuilder::new();
        let stm = pos.side_to_move();

        let Some(king) = pos.king_square(stm) else {
            let sentinel = -Score::INF.0 as i64 * stm.negation_multiplier() as i64;
            builder.push(sentinel).print();
            return builder.build();
        };

        // Material and position
        builder.push(0);
        for (square, piece) in pos.iter() {
            let value = self.weights.value_of(piece, square).round() as i64;
            builder
                .push(value)
                .push(piece.color().negation_multiplier() as i64)
                .mul()
                .add();
        }
        builder.store(TOTAL);

        builder.load_board(pos);

        // Mobility
        builder.push(0).store(SCRATCH);
        builder.counting_loop(COUNTER, Limit::Literal(Square::COUNT as i64), |b| {
            b.guarded(
                |b| {
                    b.load(COUNTER)
                        .push(BOARD as i64)
                        .add()
                        .load_indirect()
                        .push(0)
                        .neq();
                },
                |b| {
                    b.increment(SCRATCH);
                },
            );
        });
        builder
            .load(TOTAL)
            .load(SCRATCH)
            .push(MOBILITY_WEIGHT)
            .mul()
            .add()
            .store(TOTAL);

        // King safety
        let (lowest, highest) = code_range(stm.opponent());
        builder.push(0).store(KING_SAFETY);
        for (df, dr) in QUEEN_DELTAS {
            let Some(square) = king.offset(df, dr) else {
                continue;
            };

            builder.guarded(
                |b| {
                    b.load(square.index())
                        .push(lowest - 1)
                        .gt()
                        .load(square.index())
                        .push(highest + 1)
                        .lt()
                        .and();
                },
                |b| {
                    b.increment(KING_SAFETY);
                },
            );
        }
        builder
            .load(TOTAL)
            .load(KING_SAFETY)
            .push(-KING_SAFETY_WEIGHT * stm.negation_multiplier() as i64)
            .mul()
            .add()
            .store(TOTAL);

        builder.load(TOTAL).print().halt();
        builder.build()
    }
}

/// The lowest and highest VM codes of `color`'s pieces.
#[inline(always)]
fn code_range(color: Color) -> (i64, i64) {
    (
        Piece::new(color, PieceKind::Pawn).code(),
        Piece::new(color, PieceKind::King).code(),
    )
}

/// Displays the contribution of every piece on the board, from White's perspective.
pub struct EvalTable<'a> {
    weights: &'a Weights,
    pos: &'a Position,
}

impl<'a> EvalTable<'a> {
    pub fn new(weights: &'a Weights, pos: &'a Position) -> Self {
        Self { weights, pos }
    }

    /// Fetches the signed value for the piece on the specified square, if one exists.
    #[inline(always)]
    fn value_at(&self, square: Square) -> Option<i64> {
        self.pos.piece_at(square).map(|piece| {
            self.weights.value_of(piece, square).round() as i64
                * piece.color().negation_multiplier() as i64
        })
    }
}

impl fmt::Display for EvalTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  +")?;
        for _ in File::iter() {
            write!(f, "-----+")?;
        }
        writeln!(f)?;
        for rank in Rank::iter().rev() {
            write!(f, "{rank} |")?;

            // Step 1: Write the piece char
            for file in File::iter() {
                let piece = self.pos.piece_at(Square::new(file, rank));
                let piece_char = piece.map(|p| p.to_uci()).unwrap_or(' ');
                write!(f, "  {piece_char}  |")?;
            }
            writeln!(f)?;
            write!(f, "  |")?;

            // Step 2: Write the contribution of that piece
            for file in File::iter() {
                let score = match self.value_at(Square::new(file, rank)) {
                    Some(val) if val > 0 => format!("{:^5}", format!("+{val}")),
                    Some(val) => format!("{val:^5}"),
                    None => String::from("     "),
                };
                write!(f, "{score}|")?;
            }
            writeln!(f)?;

            write!(f, "  +")?;
            for _ in File::iter() {
                write!(f, "-----+")?;
            }
            writeln!(f)?;
        }
        for file in File::iter() {
            write!(f, "     {file}")?;
        }

        Ok(())
    }
}
