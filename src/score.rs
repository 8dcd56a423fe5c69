/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt;

/// A numerical representation of the evaluation of a position, in units of ["centipawns"](https://www.chessprogramming.org/Score).
///
/// Positive scores favor White. This value is internally capped at [`Self::INF`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Score(pub i32);

impl Score {
    /// Largest possible score ever achievable.
    ///
    /// Checkmate is scored as `INF` for the winning side.
    pub const INF: Self = Self(i16::MAX as i32);

    /// Score of a draw.
    pub const DRAW: Self = Self(0);

    /// Creates a [`Score`] from a raw evaluation, clamping it to `[-INF, INF]`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::Score;
    /// assert_eq!(Score::clamped(123), Score(123));
    /// assert_eq!(Score::clamped(i64::MAX), Score::INF);
    /// assert_eq!(Score::clamped(-1_000_000), -Score::INF);
    /// ```
    #[inline(always)]
    pub const fn clamped(value: i64) -> Self {
        let inf = Self::INF.0 as i64;
        let value = if value > inf {
            inf
        } else if value < -inf {
            -inf
        } else {
            value
        };
        Self(value as i32)
    }

    /// Returns `true` if the score is a checkmate for either side.
    #[inline(always)]
    pub const fn is_mate(&self) -> bool {
        self.0.abs() >= Self::INF.0
    }
}

macro_rules! impl_binary_op {
    ($trait:tt, $fn:ident) => {
        impl std::ops::$trait for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: Self) -> Self::Output {
                Self(self.0.$fn(rhs.0))
            }
        }

        impl std::ops::$trait<i32> for Score {
            type Output = Self;

            #[inline(always)]
            fn $fn(self, rhs: i32) -> Self::Output {
                Self(self.0.$fn(rhs))
            }
        }
    };
}

impl_binary_op!(Add, add);
impl_binary_op!(Sub, sub);
impl_binary_op!(Mul, mul);

impl std::ops::Neg for Score {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self(self.0.neg())
    }
}

impl PartialEq<i32> for Score {
    fn eq(&self, other: &i32) -> bool {
        self.0.eq(other)
    }
}

impl PartialOrd<i32> for Score {
    fn partial_cmp(&self, other: &i32) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl fmt::Display for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Score {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mate() {
            let winner = if self.0 > 0 { "White" } else { "Black" };
            write!(f, "{} (mate for {winner})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_scores() {
        assert!(Score::INF.is_mate());
        assert!((-Score::INF).is_mate());
        assert!(!Score(900).is_mate());
        assert_eq!(format!("{:?}", -Score::INF), "-32767 (mate for Black)");
    }

    #[test]
    fn test_ordering_against_raw_values() {
        assert!(Score(5) > 4);
        assert!(Score::DRAW == 0);
        assert!(-Score::INF < Score::DRAW);
        assert_eq!(Score(40) - Score(50), Score(-10));
        assert_eq!(Score(40) + 2, Score(42));
        assert_eq!(-Score::INF * -1, Score::INF);
    }
}
