//! Scoring module - line-clear rewards, level progression, gravity pacing
//!
//! Classic per-line-count table: base points for 1/2/3/4+ simultaneous lines,
//! multiplied by `level + 1`. The table is a policy value carried by the game
//! state so a host can substitute its own, as long as it keeps the ordering
//! single < double < triple < tetris and rewards growing with level.

use std::time::Duration;

use crate::types::{BASE_DROP_MS, LINES_PER_LEVEL};

/// Base points by simultaneous line count (index = count, 4 covers 4+)
const CLASSIC_BASE_POINTS: [u32; 5] = [0, 40, 100, 300, 1200];

/// Per-line-count score policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTable {
    base_points: [u32; 5],
}

impl ScoreTable {
    pub const fn new(base_points: [u32; 5]) -> Self {
        Self { base_points }
    }

    /// Points awarded for clearing `lines` rows at once on `level`
    pub fn score_for_cleared_lines(&self, lines: u32, level: u32) -> u32 {
        if lines == 0 {
            return 0;
        }
        let index = (lines as usize).min(4);
        self.base_points[index] * (level + 1)
    }
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self::new(CLASSIC_BASE_POINTS)
    }
}

/// Level reached after clearing `cleared_lines` total rows
pub fn level_for_cleared_lines(cleared_lines: u32) -> u32 {
    cleared_lines / LINES_PER_LEVEL
}

/// Gravity period for a level: 1000ms at level 0, 500ms at level 1, ...
pub fn drop_interval(level: u32) -> Duration {
    Duration::from_millis(BASE_DROP_MS / (level as u64 + 1))
}
