/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use super::{legal_moves, Position};
use crate::vm::VmError;

/// Perform a perft at the specified depth, collecting only data about the number of possible positions (nodes).
///
/// This performs bulk counting, meaning that, at depth 1, it returns the number of available moves,
/// rather than making them, recursing again, and returning 1 for each terminal case.
/// If you do *not* want to use bulk counting, use [`perft_generic`].
#[inline(always)]
pub fn perft(pos: &Position, depth: usize) -> Result<u64, VmError> {
    perft_generic::<true, false>(pos, depth)
}

/// Perform a splitperft at the specified depth, printing the number of nodes reachable after each move available at the root node.
#[inline(always)]
pub fn splitperft(pos: &Position, depth: usize) -> Result<u64, VmError> {
    perft_generic::<true, true>(pos, depth)
}

/// Generic version of `perft` that allows you to specify whether to perform bulk counting and splitperft.
///
/// If `BULK` is set to `true`, this will perform bulk counting.
/// If `SPLIT` is set to `true`, this will perform a splitperft.
pub fn perft_generic<const BULK: bool, const SPLIT: bool>(
    pos: &Position,
    depth: usize,
) -> Result<u64, VmError> {
    // Bulk counting; no need to recurse again just to apply a singular move and return 1.
    if BULK && !SPLIT && depth == 1 {
        return Ok(legal_moves(pos)?.len() as u64);
    }
    // Recursion limit; return 1, since we're fathoming this node.
    else if depth == 0 {
        return Ok(1);
    }

    let mut nodes = 0;
    for mv in legal_moves(pos)? {
        let new_nodes = perft_generic::<BULK, false>(&pos.with_move_made(mv), depth - 1)?;

        if SPLIT {
            println!("{mv}\t{new_nodes}");
        }

        nodes += new_nodes;
    }

    Ok(nodes)
}
