/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::{
    fmt,
    ops::{BitOr, Index},
    str::FromStr,
};

use anyhow::{anyhow, bail, Result};

use super::{Color, File, Move, Piece, PieceKind, Rank, Square, FEN_STARTPOS};

/// The set of castling rights still held by both players.
///
/// Each right is a single bit, so any subset of the four rights can be represented.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CastlingRights(u8);

impl CastlingRights {
    pub const NONE: Self = Self(0);
    pub const WHITE_SHORT: Self = Self(1 << 0);
    pub const WHITE_LONG: Self = Self(1 << 1);
    pub const BLACK_SHORT: Self = Self(1 << 2);
    pub const BLACK_LONG: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    /// The kingside ("short") right of `color`.
    #[inline(always)]
    pub const fn short(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_SHORT,
            Color::Black => Self::BLACK_SHORT,
        }
    }

    /// The queenside ("long") right of `color`.
    #[inline(always)]
    pub const fn long(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE_LONG,
            Color::Black => Self::BLACK_LONG,
        }
    }

    /// Both rights of `color`.
    #[inline(always)]
    pub const fn both(color: Color) -> Self {
        Self(Self::short(color).0 | Self::long(color).0)
    }

    /// Returns `true` if every right in `other` is also held in `self`.
    #[inline(always)]
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if no rights are held.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Revokes every right in `other`.
    #[inline(always)]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// The rights lost when a piece leaves or lands on `square`.
    ///
    /// Only the king's and rooks' home squares affect castling.
    #[inline(always)]
    const fn revoked_by(square: Square) -> Self {
        match square.0 {
            0 => Self::WHITE_LONG,          // a1
            4 => Self::both(Color::White),  // e1
            7 => Self::WHITE_SHORT,         // h1
            56 => Self::BLACK_LONG,         // a8
            60 => Self::both(Color::Black), // e8
            63 => Self::BLACK_SHORT,        // h8
            _ => Self::NONE,
        }
    }

    /// Parses the castling field of a FEN string, such as `KQkq` or `-`.
    ///
    /// # Example
    /// ```
    /// # use tadpole::CastlingRights;
    /// let rights = CastlingRights::from_uci("Kq").unwrap();
    /// assert!(rights.contains(CastlingRights::WHITE_SHORT));
    /// assert!(rights.contains(CastlingRights::BLACK_LONG));
    /// assert!(!rights.contains(CastlingRights::WHITE_LONG));
    /// assert!(CastlingRights::from_uci("X").is_err());
    /// ```
    pub fn from_uci(castling: &str) -> Result<Self> {
        if castling == "-" {
            return Ok(Self::NONE);
        }

        let mut rights = Self::NONE;
        for c in castling.chars() {
            rights = rights
                | match c {
                    'K' => Self::WHITE_SHORT,
                    'Q' => Self::WHITE_LONG,
                    'k' => Self::BLACK_SHORT,
                    'q' => Self::BLACK_LONG,
                    _ => bail!("Invalid castling rights {castling:?}: unexpected char {c:?}"),
                };
        }

        Ok(rights)
    }

    /// Converts these rights to their FEN representation, in `KQkq` order.
    pub fn to_uci(&self) -> String {
        let mut castling = String::with_capacity(4);

        for (right, c) in [
            (Self::WHITE_SHORT, 'K'),
            (Self::WHITE_LONG, 'Q'),
            (Self::BLACK_SHORT, 'k'),
            (Self::BLACK_LONG, 'q'),
        ] {
            if self.contains(right) {
                castling.push(c);
            }
        }

        // If no side can castle, use a hyphen
        if castling.is_empty() {
            castling.push('-');
        }
        castling
    }
}

impl BitOr for CastlingRights {
    type Output = Self;
    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uci())
    }
}

impl fmt::Debug for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:04b})", self.to_uci(), self.0)
    }
}

/// Represents the current state of the game: piece placements, side to move, castling rights, en passant, and move counters.
///
/// This is analogous to a FEN string.
/// A [`Position`] is a plain value, so copying it yields a fully independent board.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Every square on the board, indexed by [`Square::index`].
    mailbox: [Option<Piece>; Square::COUNT],

    /// The [`Color`] of the current player.
    side_to_move: Color,

    /// Castling rights for both players.
    castling_rights: CastlingRights,

    /// Square a pawn may move to when capturing en passant.
    ep_square: Option<Square>,

    /// Used to enforce the fifty-move rule.
    ///
    /// - Incremented after each move.
    /// - Reset after a capture, a pawn move, or a double push.
    halfmove: usize,

    /// Number of moves since the beginning of the game.
    ///
    /// A fullmove is a complete turn by white and then by black.
    fullmove: usize,
}

impl Position {
    /// Creates a new, empty [`Position`] with the following properties:
    /// * No pieces on the board
    /// * White moves first
    /// * No castling rights
    /// * No en passant square available
    /// * Halfmove counter set to 0
    /// * Fullmove counter set to 1
    ///
    /// # Example
    /// ```
    /// # use tadpole::Position;
    /// let state = Position::new();
    /// assert_eq!(state.to_fen(), "8/8/8/8/8/8/8/8 w - - 0 1");
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            mailbox: [None; Square::COUNT],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            ep_square: None,
            halfmove: 0,
            fullmove: 1,
        }
    }

    /// Creates a new [`Position`] from the provided FEN string.
    ///
    /// Trailing fields may be omitted, in which case they take the same defaults as [`Position::new`].
    pub fn from_fen(fen: &str) -> Result<Self> {
        let mut pos = Self::new();
        let mut split = fen.split_ascii_whitespace();

        let placements = split
            .next()
            .ok_or(anyhow!("FEN string must have piece placements."))?;
        pos.parse_placements(placements)?;

        let active_color = split.next().unwrap_or("w");
        pos.side_to_move = match active_color {
            "w" => Color::White,
            "b" => Color::Black,
            _ => bail!("FEN active color must be 'w' or 'b'. Got {active_color:?}"),
        };

        pos.castling_rights = CastlingRights::from_uci(split.next().unwrap_or("-"))?;

        let en_passant_target = split.next().unwrap_or("-");
        pos.ep_square = match en_passant_target {
            "-" => None,
            square => Some(Square::from_uci(square)?),
        };

        let halfmove = split.next().unwrap_or("0");
        pos.halfmove = halfmove.parse().or(Err(anyhow!(
            "FEN string must have valid halfmove counter. Got {halfmove:?}"
        )))?;

        let fullmove = split.next().unwrap_or("1");
        pos.fullmove = fullmove.parse().or(Err(anyhow!(
            "FEN string must have valid fullmove counter. Got {fullmove:?}"
        )))?;

        if let Some(extra) = split.next() {
            bail!("FEN string has unexpected trailing field {extra:?}");
        }

        Ok(pos)
    }

    /// Fills the mailbox from the placement field of a FEN string.
    fn parse_placements(&mut self, placements: &str) -> Result<()> {
        if placements.matches('/').count() != 7 {
            bail!("FEN must have piece placements for all 8 ranks");
        }

        // Reversed so that White pieces are at the "bottom" of the board
        for (rank, row) in placements.split('/').rev().enumerate() {
            let rank = Rank(rank as u8);
            let mut file = 0u8;

            for piece_char in row.chars() {
                if let Some(empty) = piece_char.to_digit(10) {
                    file = file.saturating_add(empty as u8);
                    if file as usize > File::COUNT {
                        bail!("FEN rank {rank} has more than 8 files: {row:?}");
                    }
                } else {
                    let piece = Piece::from_uci(piece_char)?;
                    if file > File::MAX {
                        bail!("FEN rank {rank} has more than 8 files: {row:?}");
                    }
                    self.place(piece, Square::new(File(file), rank));
                    file += 1;
                }
            }

            if file != File::COUNT as u8 {
                bail!("FEN rank {rank} must describe exactly 8 files. Got {row:?}");
            }
        }

        Ok(())
    }

    /// Generates a FEN string of this [`Position`].
    ///
    /// # Example
    /// ```
    /// # use tadpole::Position;
    /// let state = Position::default();
    /// assert_eq!(state.to_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    /// ```
    pub fn to_fen(&self) -> String {
        format!("{self}")
    }

    /// Generates the placement field of a FEN string.
    fn placements(&self) -> String {
        let mut ranks = Vec::with_capacity(Rank::COUNT);

        for rank in Rank::iter().rev() {
            let mut row = String::with_capacity(File::COUNT);
            let mut empty_spaces = 0;

            for file in File::iter() {
                if let Some(piece) = self.piece_at(Square::new(file, rank)) {
                    if empty_spaces != 0 {
                        row += &empty_spaces.to_string();
                        empty_spaces = 0;
                    }
                    row.push(piece.to_uci());
                } else {
                    empty_spaces += 1;
                }
            }

            if empty_spaces != 0 {
                row += &empty_spaces.to_string();
            }
            ranks.push(row);
        }

        ranks.join("/")
    }

    /// Returns the current player as a [`Color`].
    #[inline(always)]
    pub const fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    /// If en passant can be performed, returns the square a capturing pawn would land on.
    #[inline(always)]
    pub const fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    /// Returns the [`CastlingRights`] of the current position.
    #[inline(always)]
    pub const fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    /// Returns the half-move counter of the current position.
    #[inline(always)]
    pub const fn halfmove(&self) -> usize {
        self.halfmove
    }

    /// Returns the full-move counter of the current position.
    #[inline(always)]
    pub const fn fullmove(&self) -> usize {
        self.fullmove
    }

    /// Flips the side to move without making a move.
    #[inline(always)]
    pub fn toggle_side_to_move(&mut self) {
        self.side_to_move = self.side_to_move.opponent();
    }

    /// Returns the piece on `square`, if there is one.
    #[inline(always)]
    pub const fn piece_at(&self, square: Square) -> Option<Piece> {
        self.mailbox[square.index()]
    }

    /// Returns `true` if `square` is occupied.
    #[inline(always)]
    pub const fn has(&self, square: Square) -> bool {
        self.piece_at(square).is_some()
    }

    /// Returns the [`Color`] of the piece on `square`, if there is one.
    #[inline(always)]
    pub fn color_at(&self, square: Square) -> Option<Color> {
        self.piece_at(square).map(|piece| piece.color())
    }

    /// Places `piece` on `square`, replacing whatever was there.
    #[inline(always)]
    pub fn place(&mut self, piece: Piece, square: Square) {
        self.mailbox[square] = Some(piece);
    }

    /// Removes and returns the piece on `square`, if there is one.
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.mailbox[square].take()
    }

    /// Iterates over every occupied square, in rank-major, file-minor order.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::iter().filter_map(|square| self.piece_at(square).map(|piece| (square, piece)))
    }

    /// Finds the square of `color`'s King, if it is on the board.
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        Square::iter().find(|&square| self.piece_at(square) == Some(king))
    }

    /// Copies `self` and returns a [`Position`] after having applied the provided [`Move`].
    #[inline(always)]
    pub fn with_move_made(&self, mv: Move) -> Self {
        let mut copied = *self;
        copied.make_move(mv);
        copied
    }

    /// Apply the provided `moves` to the board. No enforcement of legality.
    #[inline(always)]
    pub fn make_moves(&mut self, moves: impl IntoIterator<Item = Move>) {
        for mv in moves {
            self.make_move(mv);
        }
    }

    /// Applies the move. No enforcement of legality.
    ///
    /// If there is no piece on the move's origin, nothing happens.
    ///
    /// # Example
    /// ```
    /// # use tadpole::{Move, Position};
    /// let mut pos = Position::default();
    /// pos.make_move("e2e4".parse().unwrap());
    /// assert_eq!(pos.to_fen(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
    /// ```
    pub fn make_move(&mut self, mv: Move) {
        let (from, to) = (mv.from(), mv.to());

        // Remove the piece from it's previous location, exiting early if there is no piece there
        let Some(mut piece) = self.take(from) else {
            return;
        };
        let (color, kind) = piece.parts();

        let mut is_capture = self.has(to);

        match kind {
            // If this move was en passant, the victim isn't at `to`, it's one square behind
            PieceKind::Pawn if Some(to) == self.ep_square && from.file() != to.file() => {
                if let Some(victim_square) = to.backward_by(color, 1) {
                    is_capture |= self.take(victim_square).is_some();
                }
            }

            // The King travelled two files, so bring the Rook along
            PieceKind::King if from.file().0.abs_diff(to.file().0) == 2 => {
                let rank = from.rank();
                let (rook_from, rook_to) = if to.file() > from.file() {
                    (Square::new(File::H, rank), Square::new(File::F, rank))
                } else {
                    (Square::new(File::A, rank), Square::new(File::D, rank))
                };

                if let Some(rook) = self.take(rook_from) {
                    self.place(rook, rook_to);
                }
            }

            _ => {}
        }

        // Now check for promotions, since all special cases for Pawns have been dealt with
        if let Some(promotion) = mv.promotion() {
            piece = piece.promoted(promotion);
        }
        self.place(piece, to);

        // Moving off of, or capturing on, a home square costs the relevant rights
        self.castling_rights.remove(CastlingRights::revoked_by(from));
        self.castling_rights.remove(CastlingRights::revoked_by(to));
        if kind == PieceKind::King {
            self.castling_rights.remove(CastlingRights::both(color));
        }

        // Only a double push creates an en passant target
        self.ep_square = if kind == PieceKind::Pawn && from.rank().0.abs_diff(to.rank().0) == 2 {
            from.forward_by(color, 1)
        } else {
            None
        };

        if kind == PieceKind::Pawn || is_capture || self.ep_square.is_some() {
            self.halfmove = 0;
        } else {
            self.halfmove += 1;
        }

        self.fullmove += self.side_to_move.index();
        self.toggle_side_to_move();
    }
}

impl FromStr for Position {
    type Err = anyhow::Error;
    #[inline(always)]
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

impl Index<Square> for Position {
    type Output = Option<Piece>;
    #[inline(always)]
    fn index(&self, index: Square) -> &Self::Output {
        &self.mailbox[index]
    }
}

impl Default for Position {
    /// The standard starting position.
    #[inline(always)]
    fn default() -> Self {
        // The FEN for startpos is always valid
        Self::from_fen(FEN_STARTPOS).unwrap_or_else(|_| Self::new())
    }
}

impl fmt::Display for Position {
    /// Display this position's FEN string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let placements = self.placements();
        let active_color = self.side_to_move();
        let castling = self.castling_rights();

        let en_passant_target = if let Some(square) = self.ep_square {
            square.to_string()
        } else {
            String::from("-")
        };

        let halfmove = self.halfmove;
        let fullmove = self.fullmove;

        write!(
            f,
            "{placements} {active_color} {castling} {en_passant_target} {halfmove} {fullmove}"
        )
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::iter().rev() {
            write!(f, "{rank}|")?;
            for file in File::iter() {
                let piece = self.piece_at(Square::new(file, rank));
                let piece_char = piece.map(|p| p.to_uci()).unwrap_or('.');
                write!(f, " {piece_char}")?;
            }

            if rank == Rank::SEVEN {
                write!(f, "           FEN: {}", self.to_fen())?;
            } else if rank == Rank::SIX {
                write!(f, "          Side: {}", self.side_to_move())?;
            } else if rank == Rank::FIVE {
                write!(f, "      Castling: {}", self.castling_rights())?;
            } else if rank == Rank::FOUR {
                let ep = self
                    .ep_square()
                    .map(|t| t.to_uci())
                    .unwrap_or(String::from("-"));
                write!(f, "            EP: {ep}")?;
            } else if rank == Rank::THREE {
                write!(f, "     Half-move: {}", self.halfmove())?;
            } else if rank == Rank::TWO {
                write!(f, "     Full-move: {}", self.fullmove())?;
            }
            writeln!(f)?;
        }
        write!(f, " +")?;
        for _ in File::iter() {
            write!(f, "--")?;
        }
        write!(f, "\n   ")?;
        for file in File::iter() {
            write!(f, "{file} ")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(fen: &str, moves: &[&str]) -> Position {
        let mut pos = Position::from_fen(fen).unwrap();
        for mv in moves {
            pos.make_move(mv.parse().unwrap());
        }
        pos
    }

    #[test]
    fn test_fen_round_trip() {
        let fens = [
            FEN_STARTPOS,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 b - - 13 42",
            "7k/5Q2/6K1/8/8/8/8/8 b - - 0 1",
            "r3k3/8/8/8/8/8/8/4K2R w Kq - 0 1",
        ];

        for fen in fens {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn test_invalid_fens() {
        assert!(Position::from_fen("").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(Position::from_fen("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/7 w - - 0 1").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 x - - 0 1").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w Z - 0 1").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - e9 0 1").is_err());
        assert!(Position::from_fen("8/8/8/8/8/8/8/8 w - - x 1").is_err());
    }

    #[test]
    fn test_en_passant_removes_pawn_behind_target() {
        let pos = play(FEN_STARTPOS, &["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(pos.ep_square(), Some(Square::D6));
        assert_eq!(pos.halfmove(), 0);

        let pos = pos.with_move_made("e5d6".parse().unwrap());
        assert_eq!(pos.piece_at(Square::D6), Some(Piece::WHITE_PAWN));
        assert_eq!(pos.piece_at(Square::D5), None);
        assert_eq!(pos.piece_at(Square::E5), None);
        assert_eq!(pos.ep_square(), None);
    }

    #[test]
    fn test_castling_relocates_rook() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 3 10";

        let short = play(fen, &["e1g1"]);
        assert_eq!(short.piece_at(Square::G1), Some(Piece::WHITE_KING));
        assert_eq!(short.piece_at(Square::F1), Some(Piece::WHITE_ROOK));
        assert_eq!(short.piece_at(Square::H1), None);
        assert_eq!(short.castling_rights().to_uci(), "kq");
        assert_eq!(short.halfmove(), 4);

        let long = play(fen, &["e1g1", "e8c8"]);
        assert_eq!(long.piece_at(Square::C8), Some(Piece::BLACK_KING));
        assert_eq!(long.piece_at(Square::D8), Some(Piece::BLACK_ROOK));
        assert_eq!(long.piece_at(Square::A8), None);
        assert!(long.castling_rights().is_empty());
        assert_eq!(long.fullmove(), 11);
    }

    #[test]
    fn test_rook_moves_and_captures_revoke_rights() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";

        assert_eq!(play(fen, &["h1h5"]).castling_rights().to_uci(), "Qkq");
        assert_eq!(play(fen, &["a1a8"]).castling_rights().to_uci(), "Kk");
        assert_eq!(play(fen, &["e1e2"]).castling_rights().to_uci(), "kq");
    }

    #[test]
    fn test_promotion_and_counters() {
        let pos = play("8/P6k/8/8/8/8/8/K7 w - - 7 30", &["a7a8n"]);
        assert_eq!(pos.piece_at(Square::A8), Some(Piece::WHITE_KNIGHT));
        assert_eq!(pos.halfmove(), 0);
        assert_eq!(pos.fullmove(), 30);
        assert_eq!(pos.side_to_move(), Color::Black);

        let pos = pos.with_move_made("h7h6".parse().unwrap());
        assert_eq!(pos.halfmove(), 1);
        assert_eq!(pos.fullmove(), 31);
    }

    #[test]
    fn test_empty_origin_is_noop() {
        let pos = Position::default();
        assert_eq!(pos.with_move_made("e4e5".parse().unwrap()), pos);
    }
}
