/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{Limit, Program, ProgramBuilder, Vm, VmError, CHAR_BUFFER, CHAR_COUNT, COUNTER};
use crate::Move;

/// Compiles a program that prints `moves` as space-separated UCI text, one character at a time.
///
/// The text is written to memory starting at [`CHAR_BUFFER`] and the number of moves to [`CHAR_COUNT`],
/// then a loop bounded by the length of the text streams each cell through an indirect `LOAD` and a character `PRINT`.
pub fn compile_move_list(moves: &[Move]) -> Result<Program, VmError> {
    let text = moves
        .iter()
        .map(|mv| mv.to_uci())
        .collect::<Vec<_>>()
        .join(" ");

    let mut builder = ProgramBuilder::new();
    let mut len = 0;
    for (i, c) in text.chars().enumerate() {
        builder.push(c as i64).store(CHAR_BUFFER + i);
        len += 1;
    }
    builder.push(moves.len() as i64).store(CHAR_COUNT);

    builder.counting_loop(COUNTER, Limit::Literal(len), |b| {
        b.load(COUNTER)
            .push(CHAR_BUFFER as i64)
            .add()
            .load_indirect()
            .print_char();
    });
    builder.halt();

    builder.build()
}

/// Parses the output of a [`compile_move_list`] program back into moves.
pub fn decode_move_list(output: &[String]) -> Result<Vec<Move>, VmError> {
    let text = output.concat();
    text.split_whitespace()
        .map(|token| {
            Move::from_uci(token).map_err(|_| VmError::MalformedOutput {
                output: output.to_vec(),
            })
        })
        .collect()
}

/// Sends `moves` through the VM and reads them back out.
pub fn stream_moves(moves: &[Move]) -> Result<Vec<Move>, VmError> {
    let program = compile_move_list(moves)?;
    decode_move_list(&Vm::execute(&program)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        legal_moves,
        vm::{Instruction, Opcode},
        Position,
    };

    #[test]
    fn test_moves_survive_the_vm() {
        let pos = Position::from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let moves = legal_moves(&pos).unwrap().to_vec();

        let program = compile_move_list(&moves).unwrap();
        let output = Vm::execute(&program).unwrap();
        assert!(output.iter().all(|token| token.chars().count() == 1));
        assert_eq!(output.concat(), "a1a2 a1b1 a1b2 a7a8q a7a8r a7a8b a7a8n");

        assert_eq!(decode_move_list(&output).unwrap(), moves);
    }

    #[test]
    fn test_move_count_is_stored() {
        let moves = legal_moves(&Position::default()).unwrap();
        let program = compile_move_list(&moves).unwrap();

        // Replace the final HALT with a read of the count cell
        let mut instructions = program.instructions().to_vec();
        assert_eq!(instructions.pop(), Some(Instruction::new(Opcode::Halt)));
        instructions.push(Instruction::with_operand(Opcode::Load, CHAR_COUNT as i64));
        instructions.push(Instruction::new(Opcode::Print));

        let output = Vm::execute(&Program::new(instructions)).unwrap();
        assert_eq!(output.last().map(String::as_str), Some("20"));
        assert_eq!(decode_move_list(&output[..output.len() - 1]).unwrap(), moves.to_vec());
    }

    #[test]
    fn test_empty_move_list() {
        assert_eq!(stream_moves(&[]).unwrap(), Vec::<Move>::new());
    }

    #[test]
    fn test_malformed_output() {
        let output = vec![String::from("e2e4 zz")];
        assert!(matches!(
            decode_move_list(&output),
            Err(VmError::MalformedOutput { .. })
        ));
    }
}
