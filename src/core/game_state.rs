//! Game state module - the simulation aggregate and its tick pipeline
//!
//! One `GameState` per room, exclusively owned by the room's event loop.
//! The host drives it with two kinds of external events: a periodic gravity
//! tick and discrete player commands. Each call runs to completion
//! synchronously; invalid commands are silent no-ops.

use arrayvec::ArrayVec;

use crate::core::board::Board;
use crate::core::pieces::{random_piece, Piece};
use crate::core::rng::SimpleRng;
use crate::core::scoring::{drop_interval, level_for_cleared_lines, ScoreTable};
use crate::core::snapshot::GameSnapshot;
use crate::core::validation::{
    collides_with_board, is_bottom_out_of_bounds, is_left_out_of_bounds, is_right_out_of_bounds,
    keep_inside_bounds,
};
use crate::types::Position;

/// What one gravity tick did, for the host to react to.
///
/// `level_changed` means the gravity scheduler must be restarted with the new
/// period; `game_over` means it must be stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub locked: bool,
    pub lines_cleared: u32,
    pub level_changed: bool,
    pub game_over: bool,
}

/// Complete simulation state for one game
#[derive(Debug, Clone)]
pub struct GameState {
    board: Board,
    current_block: Piece,
    current_position: Position,
    next_block: Piece,
    cleared_lines: u32,
    level: u32,
    total_points: u32,
    game_over: bool,
    rng: SimpleRng,
    score_table: ScoreTable,
}

impl GameState {
    /// Create a game with a fresh random current/next pair and the piece at
    /// the spawn coordinate (top row, centered column)
    pub fn new(rows: usize, cols: usize, initial_level: u32, seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let current_block = random_piece(&mut rng);
        let next_block = random_piece(&mut rng);

        Self {
            board: Board::new(rows, cols),
            current_block,
            current_position: spawn_position(cols),
            next_block,
            cleared_lines: 0,
            level: initial_level,
            total_points: 0,
            game_over: false,
            rng,
            score_table: ScoreTable::default(),
        }
    }

    /// Replace the scoring policy (host configuration hook)
    pub fn with_score_table(mut self, score_table: ScoreTable) -> Self {
        self.score_table = score_table;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_block(&self) -> Piece {
        self.current_block
    }

    pub fn current_position(&self) -> Position {
        self.current_position
    }

    pub fn next_block(&self) -> Piece {
        self.next_block
    }

    pub fn cleared_lines(&self) -> u32 {
        self.cleared_lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    /// Gravity period for the current level
    pub fn drop_interval(&self) -> std::time::Duration {
        drop_interval(self.level)
    }

    /// One gravity step.
    ///
    /// Either the piece falls one row, or it has landed: freeze it, promote
    /// the preview, check for game over at the spawn coordinate, then run the
    /// line-clear/scoring/level pass. A tick after game over is a no-op.
    pub fn tick(&mut self) -> TickOutcome {
        if self.game_over {
            return TickOutcome {
                game_over: true,
                ..TickOutcome::default()
            };
        }

        let next_position = self.current_position.translated(1, 0);
        if !is_bottom_out_of_bounds(&self.board, &self.current_block, next_position)
            && !collides_with_board(&self.board, &self.current_block, next_position)
        {
            self.current_position = next_position;
            return TickOutcome::default();
        }

        // Landed: freeze in place and bring in the next piece
        self.board
            .freeze_piece(&self.current_block, self.current_position);
        self.spawn_next_block();

        if collides_with_board(&self.board, &self.current_block, self.current_position) {
            self.game_over = true;
        }

        let completed = self.completed_lines();
        let lines_cleared = completed.len() as u32;
        self.cleared_lines += lines_cleared;
        // Points use the level in effect when the lines were cleared
        self.total_points += self
            .score_table
            .score_for_cleared_lines(lines_cleared, self.level);
        self.remove_completed_lines(&completed);
        let level_changed = self.advance_level();

        TickOutcome {
            locked: true,
            lines_cleared,
            level_changed,
            game_over: self.game_over,
        }
    }

    /// Try to shift the current piece by a (row, col) delta.
    ///
    /// Commits only if the candidate position passes every bound check and
    /// the collision scan; bound checks run first since they are cheaper.
    pub fn try_move(&mut self, d_row: i32, d_col: i32) -> bool {
        if self.game_over {
            return false;
        }

        let candidate = self.current_position.translated(d_row, d_col);
        if is_left_out_of_bounds(&self.current_block, candidate)
            || is_right_out_of_bounds(&self.board, &self.current_block, candidate)
            || is_bottom_out_of_bounds(&self.board, &self.current_block, candidate)
            || collides_with_board(&self.board, &self.current_block, candidate)
        {
            return false;
        }

        self.current_position = candidate;
        true
    }

    /// Try to rotate the current piece one orientation step.
    ///
    /// The rotated piece is first nudged back inside the board, then the
    /// corrected placement is collision-checked; piece and position commit
    /// atomically or not at all.
    pub fn try_rotate(&mut self) -> bool {
        if self.game_over {
            return false;
        }

        let rotated = self.current_block.rotated();
        let Some(corrected) = keep_inside_bounds(&self.board, &rotated, self.current_position)
        else {
            return false;
        };
        if collides_with_board(&self.board, &rotated, corrected) {
            return false;
        }

        self.current_block = rotated;
        self.current_position = corrected;
        true
    }

    /// Plain-data copy of the full state for host synchronization
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }

    fn spawn_next_block(&mut self) {
        self.current_block = self.next_block;
        self.next_block = random_piece(&mut self.rng);
        self.current_position = spawn_position(self.board.cols());
    }

    /// Scan rows bottom to top, stopping at the first empty row: in normal
    /// play nothing above a gap can be complete. Indices come out in
    /// descending order.
    fn completed_lines(&self) -> ArrayVec<usize, 4> {
        let mut completed = ArrayVec::new();
        for row in (0..self.board.rows()).rev() {
            if self.board.is_row_empty(row) {
                break;
            }
            if self.board.is_row_completed(row) {
                completed.push(row);
                if completed.is_full() {
                    break;
                }
            }
        }
        completed
    }

    /// Remove each completed row and prepend an empty one, keeping the cell
    /// count constant. Each earlier removal shifts the remaining rows down,
    /// so the Nth removal (collection order) lands at `original index + N`.
    fn remove_completed_lines(&mut self, completed: &[usize]) {
        for (already_removed, &row) in completed.iter().enumerate() {
            self.board.remove_rows(row + already_removed, 1);
            self.board.insert_empty_row_at_top();
        }
    }

    fn advance_level(&mut self) -> bool {
        let next_level = level_for_cleared_lines(self.cleared_lines);
        if next_level > self.level {
            self.level = next_level;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub(crate) fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Pin the active and preview pieces for deterministic scenarios
    #[cfg(test)]
    pub(crate) fn force_blocks(&mut self, current: Piece, next: Piece) {
        self.current_block = current;
        self.next_block = next;
        self.current_position = spawn_position(self.board.cols());
    }

    #[cfg(test)]
    pub(crate) fn force_position(&mut self, position: Position) {
        self.current_position = position;
    }
}

/// Canonical spawn coordinate: top row, centered column
fn spawn_position(cols: usize) -> Position {
    Position::new(0, (cols / 2) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PieceKind;

    fn o_piece() -> Piece {
        Piece::spawn(PieceKind::O)
    }

    fn new_game() -> GameState {
        GameState::new(20, 10, 0, 12345)
    }

    #[test]
    fn test_new_game_state() {
        let state = new_game();

        assert!(!state.game_over());
        assert_eq!(state.cleared_lines(), 0);
        assert_eq!(state.level(), 0);
        assert_eq!(state.total_points(), 0);
        assert_eq!(state.current_position(), Position::new(0, 5));
        assert_eq!(state.board().cells().len(), 200);
    }

    #[test]
    fn test_new_game_respects_initial_level() {
        let state = GameState::new(20, 10, 3, 1);
        assert_eq!(state.level(), 3);
        assert_eq!(state.drop_interval(), std::time::Duration::from_millis(250));
    }

    #[test]
    fn test_tick_moves_piece_down() {
        let mut state = new_game();
        let before = state.current_position();

        let outcome = state.tick();

        assert!(!outcome.locked);
        assert_eq!(outcome.lines_cleared, 0);
        assert_eq!(state.current_position(), before.translated(1, 0));
    }

    #[test]
    fn test_o_piece_falls_freely_then_freezes() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());

        // An O at (0, 5) on an empty 10x20 board falls 18 rows uncontested
        for expected_row in 1..=18 {
            let outcome = state.tick();
            assert!(!outcome.locked);
            assert_eq!(state.current_position().row, expected_row);
        }

        // The next tick cannot descend: freeze at row 18, spawn the preview
        let outcome = state.tick();
        assert!(outcome.locked);
        assert_eq!(outcome.lines_cleared, 0);
        assert_eq!(state.current_position(), Position::new(0, 5));
        assert_eq!(state.total_points(), 0);
        assert_eq!(state.cleared_lines(), 0);

        let color = o_piece().color();
        for (row, col) in [(18, 5), (18, 6), (19, 5), (19, 6)] {
            assert_eq!(state.board().value_at(row, col), color);
        }
    }

    #[test]
    fn test_freeze_promotes_preview_without_aliasing() {
        let mut state = new_game();
        let t_piece = Piece::spawn(PieceKind::T);
        state.force_blocks(o_piece(), t_piece);
        state.force_position(Position::new(18, 5));

        state.tick();

        assert_eq!(state.current_block(), t_piece);
        // Rotating the active piece must not touch the new preview
        assert!(state.try_rotate());
        assert_eq!(state.current_block().orientation(), 1);
        assert_eq!(state.next_block().orientation(), 0);
    }

    #[test]
    fn test_landed_piece_completes_rows() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());

        // Bottom two rows complete except the two columns the O will fill
        for row in [18, 19] {
            for col in 0..10 {
                if col != 5 && col != 6 {
                    state.board_mut().set_value_at(row, col, 1);
                }
            }
        }
        state.force_position(Position::new(18, 5));

        let outcome = state.tick();

        assert!(outcome.locked);
        assert_eq!(outcome.lines_cleared, 2);
        assert_eq!(state.cleared_lines(), 2);
        assert_eq!(state.total_points(), 100);
        assert_eq!(state.board().cells().len(), 200);
        assert!(state.board().is_row_empty(0));
        assert!(state.board().is_row_empty(19));
    }

    #[test]
    fn test_clear_keeps_rows_above_intact() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());

        // Row 19 will complete; markers above it must shift down by one
        for col in 0..10 {
            if col != 5 && col != 6 {
                state.board_mut().set_value_at(19, col, 1);
            }
        }
        state.board_mut().set_value_at(18, 0, 7);
        state.board_mut().set_value_at(17, 3, 9);
        state.force_position(Position::new(18, 5));

        let outcome = state.tick();

        assert_eq!(outcome.lines_cleared, 1);
        // Marker from row 17 is now on row 18
        assert_eq!(state.board().value_at(18, 3), 9);
        // Marker from row 18 is now on row 19
        assert_eq!(state.board().value_at(19, 0), 7);
        // The O's surviving row dropped to the bottom
        assert_eq!(state.board().value_at(19, 5), o_piece().color());
    }

    #[test]
    fn test_clear_of_a_high_row_above_a_ragged_stack() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());

        // Row 5 is full; every row below it is partially filled, so the
        // bottom-up scan reaches it without hitting an empty row
        for col in 0..10 {
            state.board_mut().set_value_at(5, col, 3);
        }
        for row in 6..20 {
            state.board_mut().set_value_at(row, 0, 1);
        }
        state.force_position(Position::new(18, 5));

        let outcome = state.tick();

        assert!(outcome.locked);
        assert_eq!(outcome.lines_cleared, 1);
        assert_eq!(state.total_points(), 40);
        assert_eq!(state.board().cells().len(), 200);
        // Row 5's content is gone; the ragged stack below did not move
        assert!(state.board().is_row_empty(0));
        assert!(!state.board().is_row_completed(5));
        assert_eq!(state.board().value_at(6, 0), 1);
        assert_eq!(state.board().value_at(19, 0), 1);
    }

    #[test]
    fn test_multi_line_clear_offsets() {
        let mut state = new_game();
        let vertical_i = Piece::spawn(PieceKind::I).rotated();
        state.force_blocks(vertical_i, o_piece());

        // Rows 16-19 complete except column 7; vertical I fills them all
        for row in 16..20 {
            for col in 0..10 {
                if col != 7 {
                    state.board_mut().set_value_at(row, col, 1);
                }
            }
        }
        // Occupied box column is 2, so box col 0 sits at board col 5
        state.force_position(Position::new(16, 5));

        let outcome = state.tick();

        assert!(outcome.locked);
        assert_eq!(outcome.lines_cleared, 4);
        assert_eq!(state.cleared_lines(), 4);
        assert_eq!(state.total_points(), 1200);
        assert_eq!(state.board().cells().len(), 200);
        for row in 0..20 {
            assert!(state.board().is_row_empty(row), "row {} not empty", row);
        }
    }

    #[test]
    fn test_scoring_uses_level_before_level_up() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());
        state.cleared_lines = 9;

        for col in 0..10 {
            if col != 5 && col != 6 {
                state.board_mut().set_value_at(19, col, 1);
            }
        }
        state.force_position(Position::new(18, 5));

        let outcome = state.tick();

        assert_eq!(outcome.lines_cleared, 1);
        assert!(outcome.level_changed);
        assert_eq!(state.level(), 1);
        // Single at level 0, not level 1
        assert_eq!(state.total_points(), 40);
        assert_eq!(state.drop_interval(), std::time::Duration::from_millis(500));
    }

    #[test]
    fn test_level_up_at_ten_lines_halves_period() {
        let mut state = new_game();
        assert_eq!(state.drop_interval(), std::time::Duration::from_millis(1000));

        state.cleared_lines = 9;
        state.force_blocks(o_piece(), o_piece());
        for col in 0..10 {
            if col != 5 && col != 6 {
                state.board_mut().set_value_at(19, col, 1);
            }
        }
        state.force_position(Position::new(18, 5));

        // Only row 19 completes: 9 + 1 = 10 lines, level 1
        let outcome = state.tick();
        assert_eq!(outcome.lines_cleared, 1);
        assert_eq!(state.cleared_lines(), 10);
        assert_eq!(state.level(), 1);
        assert_eq!(state.drop_interval(), std::time::Duration::from_millis(500));
    }

    #[test]
    fn test_game_over_on_spawn_collision() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());

        // Block the spawn area below the top row so the frozen stack reaches
        // the spawn coordinate
        for row in 1..20 {
            for col in [5, 6] {
                state.board_mut().set_value_at(row, col, 1);
            }
        }

        // The piece cannot descend from row 0: it freezes, and the fresh
        // spawn collides immediately
        let outcome = state.tick();

        assert!(outcome.locked);
        assert!(outcome.game_over);
        assert!(state.game_over());
    }

    #[test]
    fn test_tick_after_game_over_is_noop() {
        let mut state = new_game();
        state.game_over = true;
        let board_before = state.board().cells().to_vec();
        let position_before = state.current_position();

        let outcome = state.tick();

        assert!(outcome.game_over);
        assert!(!outcome.locked);
        assert_eq!(state.board().cells(), &board_before[..]);
        assert_eq!(state.current_position(), position_before);
    }

    #[test]
    fn test_commands_rejected_after_game_over() {
        let mut state = new_game();
        state.game_over = true;

        assert!(!state.try_move(0, -1));
        assert!(!state.try_move(1, 0));
        assert!(!state.try_rotate());
    }

    #[test]
    fn test_move_left_right_and_down() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());

        assert!(state.try_move(0, -1));
        assert_eq!(state.current_position(), Position::new(0, 4));
        assert!(state.try_move(0, 1));
        assert_eq!(state.current_position(), Position::new(0, 5));
        assert!(state.try_move(1, 0));
        assert_eq!(state.current_position(), Position::new(1, 5));
    }

    #[test]
    fn test_move_rejected_at_left_wall() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());
        state.force_position(Position::new(0, 0));

        assert!(!state.try_move(0, -1));
        assert_eq!(state.current_position(), Position::new(0, 0));
    }

    #[test]
    fn test_move_rejected_at_right_wall() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());
        state.force_position(Position::new(0, 8));

        assert!(!state.try_move(0, 1));
        assert_eq!(state.current_position(), Position::new(0, 8));
    }

    #[test]
    fn test_move_rejected_on_collision() {
        let mut state = new_game();
        state.force_blocks(o_piece(), o_piece());
        state.board_mut().set_value_at(3, 5, 1);
        state.force_position(Position::new(0, 5));

        assert!(state.try_move(1, 0));
        assert!(!state.try_move(1, 0));
        assert_eq!(state.current_position(), Position::new(1, 5));
    }

    #[test]
    fn test_rotate_cycles_through_orientations() {
        let mut state = new_game();
        let t_piece = Piece::spawn(PieceKind::T);
        state.force_blocks(t_piece, o_piece());
        state.force_position(Position::new(5, 4));

        for expected in [1, 2, 3, 0] {
            assert!(state.try_rotate());
            assert_eq!(state.current_block().orientation(), expected);
        }
        assert_eq!(state.current_block(), t_piece);
    }

    #[test]
    fn test_rotate_recovers_at_right_wall() {
        let mut state = new_game();
        let vertical_i = Piece::spawn(PieceKind::I).rotated();
        state.force_blocks(vertical_i, o_piece());
        // Occupied column rests on board column 9
        state.force_position(Position::new(5, 7));

        assert!(state.try_rotate());
        // Back to horizontal, shifted left until inside
        assert_eq!(state.current_block().orientation(), 0);
        assert_eq!(state.current_position(), Position::new(5, 6));
    }

    #[test]
    fn test_rotate_rejected_when_corrected_placement_collides() {
        let mut state = new_game();
        let vertical_i = Piece::spawn(PieceKind::I).rotated();
        state.force_blocks(vertical_i, o_piece());
        state.force_position(Position::new(5, 7));

        // The corrected horizontal bar would cover (5, 6)..(5, 9)
        state.board_mut().set_value_at(5, 6, 1);

        assert!(!state.try_rotate());
        assert_eq!(state.current_block().orientation(), 1);
        assert_eq!(state.current_position(), Position::new(5, 7));
    }

    #[test]
    fn test_cell_count_invariant_across_random_play() {
        let mut state = GameState::new(20, 10, 0, 777);
        for step in 0..2000 {
            match step % 5 {
                0 => {
                    state.try_move(0, -1);
                }
                1 => {
                    state.try_rotate();
                }
                2 => {
                    state.try_move(0, 1);
                }
                _ => {
                    state.tick();
                }
            }
            assert_eq!(state.board().cells().len(), 200);
            if state.game_over() {
                break;
            }
        }
    }

    #[test]
    fn test_custom_score_table() {
        let table = ScoreTable::new([0, 1, 2, 3, 4]);
        let mut state = GameState::new(20, 10, 0, 1).with_score_table(table);
        state.force_blocks(o_piece(), o_piece());
        for col in 0..10 {
            if col != 5 && col != 6 {
                state.board_mut().set_value_at(19, col, 1);
            }
        }
        state.force_position(Position::new(18, 5));

        state.tick();
        assert_eq!(state.total_points(), 1);
    }
}
