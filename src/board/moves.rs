/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{fmt, str::FromStr};

use anyhow::{bail, Result};

use super::{PieceKind, Square};

/// Maximum possible number of moves in a given chess position.
///
/// Found [here](<https://www.chessprogramming.org/Chess_Position#cite_note-4>)
pub const MAX_NUM_MOVES: usize = 218;

/// An alias for an [`arrayvec::ArrayVec`] containing at most [`MAX_NUM_MOVES`] moves.
pub type MoveList = arrayvec::ArrayVec<Move, MAX_NUM_MOVES>;

/// A move from one square to another, optionally promoting a pawn.
///
/// A [`Move`] carries no knowledge of what kind of move it is (capture, castle, en passant).
/// That is worked out from the [`crate::Position`] it is applied to.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a new [`Move`] without a promotion.
    #[inline(always)]
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Creates a new [`Move`] that promotes to `promotion` upon reaching `to`.
    #[inline(always)]
    pub const fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// The square this move starts on.
    #[inline(always)]
    pub const fn from(&self) -> Square {
        self.from
    }

    /// The square this move ends on.
    #[inline(always)]
    pub const fn to(&self) -> Square {
        self.to
    }

    /// The kind this move promotes to, if any.
    #[inline(always)]
    pub const fn promotion(&self) -> Option<PieceKind> {
        self.promotion
    }

    /// Parses a move in [UCI](https://en.wikipedia.org//wiki/Universal_Chess_Interface) notation, such as `e2e4` or `e7e8q`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{Move, PieceKind, Square};
    /// let mv = Move::from_uci("e7e8q").unwrap();
    /// assert_eq!(mv.from(), Square::E7);
    /// assert_eq!(mv.to(), Square::E8);
    /// assert_eq!(mv.promotion(), Some(PieceKind::Queen));
    ///
    /// assert!(Move::from_uci("e2").is_err());
    /// assert!(Move::from_uci("e7e8k").is_err());
    /// ```
    pub fn from_uci(uci: &str) -> Result<Self> {
        if !uci.is_ascii() || !(4..=5).contains(&uci.len()) {
            bail!("Move strings must be 4 or 5 ASCII characters. Got {uci:?}");
        }

        let from = uci[0..2].parse()?;
        let to = uci[2..4].parse()?;

        let Some(promotion) = uci[4..].chars().next() else {
            return Ok(Self::new(from, to));
        };

        let kind = PieceKind::from_uci(promotion)?;
        if !PieceKind::promotions().contains(&kind) {
            bail!("Cannot promote to a {}. Got {uci:?}", kind.name());
        }

        Ok(Self::with_promotion(from, to, kind))
    }

    /// Converts this move to [UCI](https://en.wikipedia.org//wiki/Universal_Chess_Interface) notation.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{Move, PieceKind, Square};
    /// assert_eq!(Move::new(Square::G1, Square::F3).to_uci(), "g1f3");
    /// assert_eq!(Move::with_promotion(Square::A2, Square::A1, PieceKind::Knight).to_uci(), "a2a1n");
    /// ```
    pub fn to_uci(&self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.to_uci()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl FromStr for Move {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_uci(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}
