//! Scoring: n² per removed cluster plus a bonus for nearly cleared boards.

/// Remaining-tile count below which the clearing bonus kicks in.
pub const BONUS_THRESHOLD: usize = 50;
/// Bonus points per tile below [`BONUS_THRESHOLD`].
pub const BONUS_PER_TILE: u64 = 100;

/// Read-only score view handed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub score: u64,
    pub score_left: u64,
    pub score_total: u64,
}

/// The bonus is only derived after a move, so a fresh tracker reports zero
/// even on boards smaller than [`BONUS_THRESHOLD`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreTracker {
    score: u64,
    score_left: u64,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points for removing a cluster of `size` tiles.
    #[inline]
    pub fn removal_points(size: usize) -> u64 {
        let n = size as u64;
        n * n
    }

    /// Clearing bonus for `cells_remaining` tiles left on the board.
    pub fn bonus_for(cells_remaining: usize) -> u64 {
        BONUS_THRESHOLD.saturating_sub(cells_remaining) as u64 * BONUS_PER_TILE
    }

    /// Record a removal; the bonus is recomputed, not accumulated.
    pub fn record_removal(&mut self, size: usize, cells_remaining: usize) -> u64 {
        let points = Self::removal_points(size);
        self.score += points;
        self.score_left = Self::bonus_for(cells_remaining);
        points
    }

    pub fn score(&self) -> Score {
        Score {
            score: self.score,
            score_left: self.score_left,
            score_total: self.score + self.score_left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removal_points_are_squared() {
        assert_eq!(ScoreTracker::removal_points(2), 4);
        assert_eq!(ScoreTracker::removal_points(10), 100);
    }

    #[test]
    fn test_bonus_only_below_threshold() {
        assert_eq!(ScoreTracker::bonus_for(100), 0);
        assert_eq!(ScoreTracker::bonus_for(50), 0);
        assert_eq!(ScoreTracker::bonus_for(49), 100);
        assert_eq!(ScoreTracker::bonus_for(0), 5000);
    }

    #[test]
    fn test_bonus_is_recomputed() {
        let mut t = ScoreTracker::new();
        assert_eq!(t.score(), Score::default());
        t.record_removal(10, 40);
        assert_eq!(t.score().score_left, 1000);
        t.record_removal(5, 35);
        let s = t.score();
        assert_eq!(s.score, 125);
        assert_eq!(s.score_left, 1500);
        assert_eq!(s.score_total, 1625);
    }

    #[test]
    fn test_bonus_waits_for_first_move() {
        let mut t = ScoreTracker::new();
        assert_eq!(t.score().score_left, 0);
        t.record_removal(2, 0);
        assert_eq!(t.score(), Score { score: 4, score_left: 5000, score_total: 5004 });
    }
}
