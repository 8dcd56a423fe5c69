/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{
    CastlingRights, Color, File, Move, MoveList, Piece, PieceKind, Position, Rank, Square,
    MAX_NUM_MOVES,
};
use crate::{check::in_check, vm::VmError};

/// Knight jumps as `(file, rank)` deltas.
pub const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Orthogonal ray directions (north, east, south, west).
pub const ROOK_DELTAS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Diagonal ray directions (northeast, southeast, southwest, northwest).
pub const BISHOP_DELTAS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

/// Every direction a Queen or King can travel in.
pub const QUEEN_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

/// Generates every pseudo-legal move for the side to move.
///
/// Moves are produced square by square from a1 to h8, so the output order is stable.
/// Pseudo-legal moves obey piece movement rules but may leave the mover's King in check.
/// Positions built from FEN strings can hold far more of them than any legal game, so they are not bounded.
///
/// # Example
/// ```
/// # use tadpole::{pseudo_legal_moves, Position};
/// let moves = pseudo_legal_moves(&Position::default());
/// assert_eq!(moves.len(), 20);
/// assert_eq!(moves[0].to_string(), "b1c3");
/// ```
pub fn pseudo_legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(MAX_NUM_MOVES);
    let color = pos.side_to_move();

    for (from, piece) in pos.iter() {
        if piece.color() != color {
            continue;
        }

        match piece.kind() {
            PieceKind::Pawn => pawn_moves(pos, from, color, &mut moves),
            PieceKind::Knight => jump_moves(pos, from, color, &KNIGHT_DELTAS, &mut moves),
            PieceKind::Bishop => ray_moves(pos, from, color, &BISHOP_DELTAS, &mut moves),
            PieceKind::Rook => ray_moves(pos, from, color, &ROOK_DELTAS, &mut moves),
            PieceKind::Queen => ray_moves(pos, from, color, &QUEEN_DELTAS, &mut moves),
            PieceKind::King => {
                jump_moves(pos, from, color, &QUEEN_DELTAS, &mut moves);
                castling_moves(pos, from, color, &mut moves);
            }
        }
    }

    moves
}

/// Generates every legal move for the side to move, in the same order as [`pseudo_legal_moves`].
///
/// A move is legal if the mover's King is not attacked after it is made.
/// Castling additionally requires that the King is not in check beforehand and does not pass through an attacked square.
///
/// Fails with [`VmError::MoveListFull`] if there are more than [`MAX_NUM_MOVES`] legal moves.
pub fn legal_moves(pos: &Position) -> Result<MoveList, VmError> {
    let color = pos.side_to_move();
    let mut legal = MoveList::new();

    for mv in pseudo_legal_moves(pos) {
        if is_castle(pos, mv) && !castle_path_is_safe(pos, mv, color)? {
            continue;
        }

        if !in_check(&pos.with_move_made(mv), color)? {
            legal.try_push(mv).map_err(|_| VmError::MoveListFull {
                capacity: MAX_NUM_MOVES,
            })?;
        }
    }

    Ok(legal)
}

/// Returns `true` if `mv` is a King travelling two files.
#[inline(always)]
fn is_castle(pos: &Position, mv: Move) -> bool {
    pos.piece_at(mv.from()).is_some_and(|piece| piece.is_king())
        && mv.from().file().0.abs_diff(mv.to().file().0) == 2
}

/// Checks that the King is not in check, and that the square it crosses while castling is not attacked.
fn castle_path_is_safe(pos: &Position, mv: Move, color: Color) -> Result<bool, VmError> {
    if in_check(pos, color)? {
        return Ok(false);
    }

    let step = if mv.to().file() > mv.from().file() { 1 } else { -1 };
    let Some(transit) = mv.from().offset(step, 0) else {
        return Ok(false);
    };

    let mut advanced = *pos;
    if let Some(king) = advanced.take(mv.from()) {
        advanced.place(king, transit);
    }

    Ok(!in_check(&advanced, color)?)
}

/// Single and double pushes, diagonal captures (including en passant), and their promotions.
fn pawn_moves(pos: &Position, from: Square, color: Color, moves: &mut Vec<Move>) {
    let mut add = |to: Square| {
        if to.rank() == Rank::eighth(color) {
            for promotion in PieceKind::promotions() {
                moves.push(Move::with_promotion(from, to, promotion));
            }
        } else {
            moves.push(Move::new(from, to));
        }
    };

    if let Some(single) = from.forward_by(color, 1).filter(|&sq| !pos.has(sq)) {
        add(single);

        if from.rank() == Rank::second(color) {
            if let Some(double) = from.forward_by(color, 2).filter(|&sq| !pos.has(sq)) {
                add(double);
            }
        }
    }

    for file_delta in [-1, 1] {
        let Some(to) = from.offset(file_delta, color.negation_multiplier()) else {
            continue;
        };

        let captures_enemy = pos.color_at(to) == Some(color.opponent());
        let captures_ep = pos.ep_square() == Some(to) && !pos.has(to);
        if captures_enemy || captures_ep {
            add(to);
        }
    }
}

/// Single-step moves along `deltas`, landing on empty or enemy-occupied squares.
fn jump_moves(
    pos: &Position,
    from: Square,
    color: Color,
    deltas: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in deltas {
        if let Some(to) = from.offset(df, dr) {
            if pos.color_at(to) != Some(color) {
                moves.push(Move::new(from, to));
            }
        }
    }
}

/// Sliding moves along `deltas`, stopping at the first occupied square (inclusive if it is an enemy).
fn ray_moves(
    pos: &Position,
    from: Square,
    color: Color,
    deltas: &[(i8, i8)],
    moves: &mut Vec<Move>,
) {
    for &(df, dr) in deltas {
        let mut current = from;
        while let Some(to) = current.offset(df, dr) {
            match pos.color_at(to) {
                None => moves.push(Move::new(from, to)),
                Some(occupant) => {
                    if occupant != color {
                        moves.push(Move::new(from, to));
                    }
                    break;
                }
            }
            current = to;
        }
    }
}

/// Castling moves whose right is still held and whose path between King and Rook is empty.
///
/// Whether the King is attacked is not considered here.
fn castling_moves(pos: &Position, from: Square, color: Color, moves: &mut Vec<Move>) {
    let rank = Rank::first(color);
    if from != Square::new(File::E, rank) {
        return;
    }

    let rook = Piece::new(color, PieceKind::Rook);
    let empty = |files: &[File]| files.iter().all(|&file| !pos.has(Square::new(file, rank)));
    let rights = pos.castling_rights();

    if rights.contains(CastlingRights::short(color))
        && pos.piece_at(Square::new(File::H, rank)) == Some(rook)
        && empty(&[File::F, File::G])
    {
        moves.push(Move::new(from, Square::new(File::G, rank)));
    }

    if rights.contains(CastlingRights::long(color))
        && pos.piece_at(Square::new(File::A, rank)) == Some(rook)
        && empty(&[File::B, File::C, File::D])
    {
        moves.push(Move::new(from, Square::new(File::C, rank)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::FEN_STARTPOS;

    fn legal(fen: &str) -> Vec<String> {
        let pos = Position::from_fen(fen).unwrap();
        legal_moves(&pos)
            .unwrap()
            .into_iter()
            .map(|mv| mv.to_uci())
            .collect()
    }

    #[test]
    fn test_startpos_has_twenty_moves() {
        let moves = legal(FEN_STARTPOS);
        assert_eq!(moves.len(), 20);
        assert_eq!(&moves[..4], ["b1c3", "b1a3", "g1h3", "g1f3"]);
    }

    #[test]
    fn test_checkmate_has_no_moves() {
        let fen = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
        let pos = Position::from_fen(fen).unwrap();
        assert!(legal_moves(&pos).unwrap().is_empty());
        assert!(in_check(&pos, Color::White).unwrap());
    }

    #[test]
    fn test_check_with_escapes() {
        // Both g2 and g4 hold pawns and e2 is empty, so White is checked but not mated
        let fen = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPP2PP/RNBQKBNR w KQkq - 1 3";
        assert_eq!(legal(fen), ["e1e2", "g2g3"]);
        assert!(in_check(&Position::from_fen(fen).unwrap(), Color::White).unwrap());
    }

    #[test]
    fn test_crowded_positions_do_not_overflow() {
        let most = "R6R/3Q4/1Q4Q1/4Q3/2Q4Q/Q4Q2/pp1Q4/kBNN1KB1 w - - 0 1";
        let most = Position::from_fen(most).unwrap();
        assert_eq!(legal_moves(&most).unwrap().len(), MAX_NUM_MOVES);

        // Queens in place of the Rooks make more moves than any reachable position has
        let crowded = "Q6Q/3Q4/1Q4Q1/4Q3/2Q4Q/Q4Q2/pp1Q4/kBNN1KB1 w - - 0 1";
        let crowded = Position::from_fen(crowded).unwrap();
        assert_eq!(pseudo_legal_moves(&crowded).len(), 224);
        assert_eq!(
            legal_moves(&crowded),
            Err(VmError::MoveListFull {
                capacity: MAX_NUM_MOVES
            })
        );
    }

    #[test]
    fn test_stalemate_has_no_moves() {
        let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(legal_moves(&pos).unwrap().is_empty());
        assert!(!in_check(&pos, Color::Black).unwrap());
    }

    #[test]
    fn test_promotions_in_fixed_order() {
        let moves = legal("7k/P7/8/8/8/8/8/K7 w - - 0 1");
        assert_eq!(&moves[3..7], ["a7a8q", "a7a8r", "a7a8b", "a7a8n"]);
    }

    #[test]
    fn test_en_passant_is_generated() {
        let moves = legal("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        assert!(moves.contains(&String::from("e5d6")));
        assert!(moves.contains(&String::from("e5e6")));
    }

    #[test]
    fn test_castling_requires_safe_path() {
        let both = legal("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        assert!(both.contains(&String::from("e1g1")));
        assert!(both.contains(&String::from("e1c1")));

        // f1 is attacked, so the King cannot cross it
        let transit = legal("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!transit.contains(&String::from("e1g1")));
        assert!(transit.contains(&String::from("e1c1")));

        // Cannot castle out of check
        let checked = legal("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        assert!(!checked.iter().any(|mv| mv == "e1g1" || mv == "e1c1"));

        // b1 must be empty for queenside castling, even though the King never crosses it
        let blocked = legal("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1");
        assert!(!blocked.contains(&String::from("e1c1")));
        assert!(blocked.contains(&String::from("e1g1")));
    }

    #[test]
    fn test_pinned_piece_cannot_leave_line() {
        let moves = legal("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert!(!moves.iter().any(|mv| mv.starts_with("e2")));
    }
}
