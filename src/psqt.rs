/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{Index, IndexMut},
};

use crate::{File, PieceKind, Rank, Square};

/// Piece-Square tables from the [Simplified Evaluation Function](https://www.chessprogramming.org/Simplified_Evaluation_Function)
#[rustfmt::skip]
const PAWN: [i32; Square::COUNT] = [
     0,  0,   0,   0,   0,   0,  0,  0,
    50, 50,  50,  50,  50,  50, 50, 50,
    10, 10,  20,  30,  30,  20, 10, 10,
     5,  5,  10,  25,  25,  10,  5,  5,
     0,  0,   0,  20,  20,   0,  0,  0,
     5, -5, -10,   0,   0, -10, -5,  5,
     5, 10,  10, -20, -20,  10, 10,  5,
     0,  0,   0,   0,   0,   0,  0,  0,
];

#[rustfmt::skip]
const KNIGHT: [i32; Square::COUNT] = [
    -50, -40, -30, -30, -30, -30, -40, -50,
    -40, -20,   0,   0,   0,   0, -20, -40,
    -30,   0,  10,  15,  15,  10,   0, -30,
    -30,   5,  15,  20,  20,  15,   5, -30,
    -30,   0,  15,  20,  20,  15,   0, -30,
    -30,   5,  10,  15,  15,  10,   5, -30,
    -40, -20,   0,   5,   5,   0, -20, -40,
    -50, -40, -30, -30, -30, -30, -40, -50,
];

#[rustfmt::skip]
const BISHOP: [i32; Square::COUNT] = [
    -20, -10, -10, -10, -10, -10, -10, -20,
    -10,   0,   0,   0,   0,   0,   0, -10,
    -10,   0,   5,  10,  10,   5,   0, -10,
    -10,   5,   5,  10,  10,   5,   5, -10,
    -10,   0,  10,  10,  10,  10,   0, -10,
    -10,  10,  10,  10,  10,  10,  10, -10,
    -10,   5,   0,   0,   0,   0,   5, -10,
    -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const ROOK: [i32; Square::COUNT] = [
     0,  0,  0,  0,  0,  0,  0,  0,
     5, 10, 10, 10, 10, 10, 10,  5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
    -5,  0,  0,  0,  0,  0,  0, -5,
     0,  0,  0,  5,  5,  0,  0,  0,
];

#[rustfmt::skip]
const QUEEN: [i32; Square::COUNT] = [
    -20, -10, -10, -5, -5, -10, -10, -20,
    -10,   0,   0,  0,  0,   0,   0, -10,
    -10,   0,   5,  5,  5,   5,   0, -10,
     -5,   0,   5,  5,  5,   5,   0,  -5,
      0,   0,   5,  5,  5,   5,   0,  -5,
    -10,   5,   5,  5,  5,   5,   0, -10,
    -10,   0,   5,  0,  0,   0,   0, -10,
    -20, -10, -10, -5, -5, -10, -10, -20,
];

#[rustfmt::skip]
const KING: [i32; Square::COUNT] = [
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -30, -40, -40, -50, -50, -40, -40, -30,
    -20, -30, -30, -40, -40, -30, -30, -20,
    -10, -20, -20, -20, -20, -20, -20, -10,
     20,  20,   0,   0,   0,   0,  20,  20,
     20,  30,  10,   0,   0,  10,  30,  20,
];

/// A [Piece-Square Table](https://www.chessprogramming.org/Piece-Square_Tables) for use in evaluation.
///
/// Values are stored from White's perspective, indexed by [`Square::index`].
/// Black pieces read the table at [`Square::rotated`].
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Psqt(pub [f64; Square::COUNT]);

impl Psqt {
    /// The default tables of every [`PieceKind`], in [`PieceKind::all`] order.
    pub fn defaults() -> [Self; PieceKind::COUNT] {
        [PAWN, KNIGHT, BISHOP, ROOK, QUEEN, KING].map(Self::new)
    }

    /// Creates a new [`Psqt`] from a table written as it appears on the board (rank 8 first).
    fn new(psqt: [i32; Square::COUNT]) -> Self {
        // Flip the rank, not the file, so that a1 is at index 0
        Self(std::array::from_fn(|i| psqt[i ^ 56] as f64))
    }
}

impl Index<Square> for Psqt {
    type Output = f64;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self.0[index]
    }
}

impl IndexMut<Square> for Psqt {
    #[inline(always)]
    fn index_mut(&mut self, index: Square) -> &mut Self::Output {
        &mut self.0[index]
    }
}

impl fmt::Display for Psqt {
    /// Printing a [`Psqt`] will display it in the same way it is written in the code (White's perspective).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}| ")?;
            for file in File::iter() {
                let value = self[Square::new(file, rank)];
                write!(f, "{value:6.2} ")?;
            }
            writeln!(f)?;
        }
        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "-------")?;
        }
        write!(f, "\n   ")?;
        for file in File::iter() {
            write!(f, "{file:>6} ")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tables_are_stored_from_a1() {
        let pawn = Psqt::defaults()[PieceKind::Pawn];
        assert_eq!(pawn[Square::A7], 50.0);
        assert_eq!(pawn[Square::D2], -20.0);
        assert_eq!(pawn[Square::A1], 0.0);

        let king = Psqt::defaults()[PieceKind::King];
        assert_eq!(king[Square::G1], 30.0);
        assert_eq!(king[Square::D8], -50.0);
    }

    #[test]
    fn test_rotation_mirrors_for_black() {
        let knight = Psqt::defaults()[PieceKind::Knight];
        // A Black Knight on b8 reads the table at g1
        assert_eq!(Square::B8.rotated(), Square::G1);
        assert_eq!(knight[Square::B1], knight[Square::B8.rotated()]);
    }
}
