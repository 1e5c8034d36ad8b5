//! Validation module - pure placement predicates
//!
//! Stateless checks over `(board, piece, position)`. The bound predicates
//! scan only the bounding-box columns (or rows) that actually stick out, so a
//! piece may legally overhang board edges with the empty part of its box -
//! a vertical I whose occupied column is in bounds is not "out" just because
//! its box is.
//!
//! `collides_with_board` assumes bounds were checked first and treats any
//! coordinate outside the grid as non-colliding; in every reachable state
//! those coordinates only ever line up with zero mask cells.

use crate::core::board::Board;
use crate::core::pieces::Piece;
use crate::types::Position;

/// True if any occupied piece cell falls at a board column < 0
pub fn is_left_out_of_bounds(piece: &Piece, position: Position) -> bool {
    if position.col >= 0 {
        return false;
    }

    let overhang = (-position.col) as usize;
    for col in 0..overhang.min(piece.cols()) {
        for row in 0..piece.rows() {
            if piece.cell(row, col) != 0 {
                return true;
            }
        }
    }
    false
}

/// True if any occupied piece cell falls at a board column >= `board.cols()`
pub fn is_right_out_of_bounds(board: &Board, piece: &Piece, position: Position) -> bool {
    let overhang = position.col + piece.cols() as i32 - board.cols() as i32;
    if overhang <= 0 {
        return false;
    }

    let overhang = (overhang as usize).min(piece.cols());
    for col in piece.cols() - overhang..piece.cols() {
        for row in 0..piece.rows() {
            if piece.cell(row, col) != 0 {
                return true;
            }
        }
    }
    false
}

/// True if any occupied piece cell falls at a board row >= `board.rows()`
pub fn is_bottom_out_of_bounds(board: &Board, piece: &Piece, position: Position) -> bool {
    let overhang = position.row + piece.rows() as i32 - board.rows() as i32;
    if overhang <= 0 {
        return false;
    }

    let overhang = (overhang as usize).min(piece.rows());
    for row in piece.rows() - overhang..piece.rows() {
        for col in 0..piece.cols() {
            if piece.cell(row, col) != 0 {
                return true;
            }
        }
    }
    false
}

/// True if any occupied piece cell overlaps an occupied board cell
pub fn collides_with_board(board: &Board, piece: &Piece, position: Position) -> bool {
    for piece_row in 0..piece.rows() {
        for piece_col in 0..piece.cols() {
            if piece.cell(piece_row, piece_col) == 0 {
                continue;
            }
            let board_row = position.row + piece_row as i32;
            let board_col = position.col + piece_col as i32;
            if board_row < 0
                || board_row >= board.rows() as i32
                || board_col < 0
                || board_col >= board.cols() as i32
            {
                continue;
            }
            if board.value_at(board_row as usize, board_col as usize) != 0 {
                return true;
            }
        }
    }
    false
}

/// Nudge a just-rotated piece back inside the board: right while it hangs out
/// left, left while it hangs out right, up while it hangs out the bottom.
///
/// For the fixed catalogue this settles within a handful of steps; the nudge
/// budget caps the loop anyway and exhaustion rejects the correction.
pub fn keep_inside_bounds(board: &Board, piece: &Piece, position: Position) -> Option<Position> {
    let mut corrected = position;
    let mut budget = board.rows() + board.cols();

    while is_left_out_of_bounds(piece, corrected) {
        if budget == 0 {
            return None;
        }
        budget -= 1;
        corrected.col += 1;
    }
    while is_right_out_of_bounds(board, piece, corrected) {
        if budget == 0 {
            return None;
        }
        budget -= 1;
        corrected.col -= 1;
    }
    while is_bottom_out_of_bounds(board, piece, corrected) {
        if budget == 0 {
            return None;
        }
        budget -= 1;
        corrected.row -= 1;
    }
    Some(corrected)
}
