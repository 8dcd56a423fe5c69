/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    vm::{Program, ProgramBuilder, Vm, VmError, COUNTER},
    Color, Piece, PieceKind, Position, Square, BISHOP_DELTAS, KNIGHT_DELTAS, QUEEN_DELTAS,
    ROOK_DELTAS,
};

/// Cell accumulating whether any attacker has been found.
const ATTACKED: usize = COUNTER;

/// Returns `true` if the King of `color` is attacked in `pos`.
///
/// The test runs as a compiled VM program. If `color` has no King, it is never in check.
///
/// # Example
/// ```
/// # use tadpole::{in_check, Color, Position};
/// let pos = Position::from_fen("4r3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
/// assert!(in_check(&pos, Color::White).unwrap());
/// assert!(!in_check(&pos, Color::Black).unwrap());
/// ```
pub fn in_check(pos: &Position, color: Color) -> Result<bool, VmError> {
    let program = compile_check_program(pos, color)?;
    let output = Vm::execute(&program)?;

    match output.as_slice() {
        [token] if token == "1" => Ok(true),
        [token] if token == "0" => Ok(false),
        _ => Err(VmError::MalformedOutput { output }),
    }
}

/// Compiles the program used by [`in_check`].
///
/// The King is located while compiling, so every square the program inspects is a constant address.
/// Offsets that would leave the board are never emitted.
pub fn compile_check_program(pos: &Position, color: Color) -> Result<Program, VmError> {
    let mut builder = ProgramBuilder::new();

    let Some(king) = pos.king_square(color) else {
        builder.push(0).print();
        return builder.build();
    };

    let enemy = |kind| Piece::new(color.opponent(), kind);

    builder.load_board(pos);
    builder.push(0).store(ATTACKED);

    // Enemy pawns attack the King from the two squares diagonally in front of it
    for file_delta in [-1, 1] {
        if let Some(square) = king.offset(file_delta, color.negation_multiplier()) {
            test_square(&mut builder, square, &[enemy(PieceKind::Pawn)]);
        }
    }

    for (df, dr) in KNIGHT_DELTAS {
        if let Some(square) = king.offset(df, dr) {
            test_square(&mut builder, square, &[enemy(PieceKind::Knight)]);
        }
    }

    for (df, dr) in QUEEN_DELTAS {
        if let Some(square) = king.offset(df, dr) {
            test_square(&mut builder, square, &[enemy(PieceKind::King)]);
        }
    }

    let straight = [enemy(PieceKind::Rook), enemy(PieceKind::Queen)];
    for delta in ROOK_DELTAS {
        scan_ray(&mut builder, king, delta, &straight);
    }

    let diagonal = [enemy(PieceKind::Bishop), enemy(PieceKind::Queen)];
    for delta in BISHOP_DELTAS {
        scan_ray(&mut builder, king, delta, &diagonal);
    }

    builder.load(ATTACKED).print().halt();
    builder.build()
}

/// `ATTACKED |= memory[square] == attacker` for every attacker.
fn test_square(builder: &mut ProgramBuilder, square: Square, attackers: &[Piece]) {
    for attacker in attackers {
        builder
            .load(square.index())
            .push(attacker.code())
            .eq()
            .load(ATTACKED)
            .or()
            .store(ATTACKED);
    }
}

/// Tests each square along a ray from `origin`, stopping after the first occupied one.
fn scan_ray(
    builder: &mut ProgramBuilder,
    origin: Square,
    (df, dr): (i8, i8),
    attackers: &[Piece],
) {
    let mut exits = Vec::new();
    let mut current = origin;

    for _ in 0..7 {
        let Some(square) = current.offset(df, dr) else {
            break;
        };
        test_square(builder, square, attackers);

        // Nothing lies beyond the edge, so the last square needs no exit
        if square.offset(df, dr).is_some() {
            builder.load(square.index()).push(0).eq();
            exits.push(builder.jif_forward());
        }

        current = square;
    }

    for exit in exits {
        builder.patch_here(exit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checked(fen: &str, color: Color) -> bool {
        in_check(&Position::from_fen(fen).unwrap(), color).unwrap()
    }

    #[test]
    fn test_open_file_and_blocker() {
        assert!(checked("4r3/8/8/8/8/8/8/4K3 w - - 0 1", Color::White));
        assert!(!checked("4r3/8/8/8/4P3/8/8/4K3 w - - 0 1", Color::White));
        assert!(!checked("4r3/8/8/8/4p3/8/8/4K3 w - - 0 1", Color::White));
    }

    #[test]
    fn test_pawn_attacks_depend_on_color() {
        assert!(checked("8/8/8/3p4/4K3/8/8/8 w - - 0 1", Color::White));
        assert!(!checked("8/8/8/8/4K3/3p4/8/8 w - - 0 1", Color::White));
        assert!(checked("8/8/8/4k3/3P4/8/8/8 b - - 0 1", Color::Black));
        assert!(!checked("8/8/3P4/4k3/8/8/8/8 b - - 0 1", Color::Black));
    }

    #[test]
    fn test_knights_kings_and_diagonals() {
        assert!(checked("8/8/8/8/8/5n2/8/4K3 w - - 0 1", Color::White));
        assert!(checked("8/8/8/8/8/8/4k3/4K3 w - - 0 1", Color::White));
        assert!(checked("8/8/8/b7/8/8/8/4K3 w - - 0 1", Color::White));
        assert!(!checked("8/8/8/b7/8/2N5/8/4K3 w - - 0 1", Color::White));
        assert!(checked("7q/8/8/8/8/8/8/K7 w - - 0 1", Color::White));
    }

    #[test]
    fn test_rays_do_not_wrap_around_edges() {
        // A Rook on a2 is on the next rank, not "past" h1
        assert!(!checked("8/8/8/8/8/8/r7/7K w - - 0 1", Color::White));
        // Friendly pieces never attack
        assert!(!checked("4R3/8/8/8/8/8/8/4K3 w - - 0 1", Color::White));
    }

    #[test]
    fn test_missing_king_is_not_in_check() {
        let pos = Position::from_fen("4r3/8/8/8/8/8/8/8 w - - 0 1").unwrap();
        let program = compile_check_program(&pos, Color::White).unwrap();
        assert_eq!(program.len(), 2);
        assert!(!in_check(&pos, Color::White).unwrap());
    }
}
