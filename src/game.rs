//! Game session: board, cluster map, score and the previewed cluster.

use crate::board::{Board, Position};
use crate::cluster::ClusterMap;
use crate::collapse;
use crate::error::GameError;
use crate::score::{Score, ScoreTracker};
use log::{debug, info};
use rand::Rng;

/// Options that shape a new board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    /// Number of tile colours in play.
    pub colors: u8,
    /// Number of distinct colours the palette can show.
    pub palette_len: usize,
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if self.width == 0 || self.height == 0 {
            return Err(GameError::InvalidConfiguration(format!(
                "board size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.colors == 0 {
            return Err(GameError::InvalidConfiguration(
                "at least one colour is required".to_string(),
            ));
        }
        if usize::from(self.colors) > self.palette_len {
            return Err(GameError::InvalidConfiguration(format!(
                "{} colours requested but the palette only has {}",
                self.colors, self.palette_len
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    /// No cluster of two or more tiles is left.
    Terminal,
}

#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    /// Always matches `board`; rebuilt after every removal.
    clusters: ClusterMap,
    tracker: ScoreTracker,
    cells_remaining: usize,
    preview: Vec<Position>,
    state: SessionState,
    moves: u32,
}

impl GameSession {
    /// New session on a randomly filled board.
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self, GameError> {
        config.validate()?;
        let board = Board::random(config.width, config.height, config.colors, rng)?;
        info!(
            "new game: {}x{} board, {} colours",
            config.width, config.height, config.colors
        );
        Ok(Self::from_board(board))
    }

    /// Session over an existing layout.
    pub fn from_board(board: Board) -> Self {
        let clusters = ClusterMap::compute(&board);
        let cells_remaining = board.non_empty_count();
        let state = if clusters.has_removable() {
            SessionState::Playing
        } else {
            SessionState::Terminal
        };
        Self {
            board,
            clusters,
            tracker: ScoreTracker::new(),
            cells_remaining,
            preview: Vec::new(),
            state,
            moves: 0,
        }
    }

    /// Highlight the removable cluster at (x, y). Returns its size, or 0 when
    /// the cell is empty, a singleton, or outside the board.
    pub fn preview_at(&mut self, x: usize, y: usize) -> usize {
        self.preview.clear();
        if let Some(cluster) = self.clusters.removable_at(x, y) {
            self.preview.extend_from_slice(cluster);
        }
        self.preview.len()
    }

    pub fn clear_preview(&mut self) {
        self.preview.clear();
    }

    /// Remove the cluster at (x, y) if it has at least two tiles.
    ///
    /// Returns the number of tiles removed; 0 means nothing happened.
    /// `InvalidCluster` can only come from an engine bug and should not be
    /// recovered from.
    pub fn select_at(&mut self, x: usize, y: usize) -> Result<usize, GameError> {
        let cluster = match self.clusters.removable_at(x, y) {
            Some(c) => c.to_vec(),
            None => return Ok(0),
        };

        collapse::remove_cluster(&mut self.board, &cluster)?;
        self.clusters = ClusterMap::compute(&self.board);

        let removed = cluster.len();
        self.cells_remaining = self.cells_remaining.saturating_sub(removed);
        let points = self.tracker.record_removal(removed, self.cells_remaining);
        self.moves += 1;
        debug!(
            "removed {} tiles at ({}, {}) for {} points, {} left",
            removed, x, y, points, self.cells_remaining
        );

        self.preview_at(x, y);

        if !self.clusters.has_removable() {
            self.state = SessionState::Terminal;
            info!(
                "no moves left after {} moves: {} tiles remaining, total score {}",
                self.moves,
                self.cells_remaining,
                self.tracker.score().score_total
            );
        }
        Ok(removed)
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.state == SessionState::Terminal
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current board, for rendering.
    #[inline]
    pub fn snapshot(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn score(&self) -> Score {
        self.tracker.score()
    }

    #[inline]
    pub fn cells_remaining(&self) -> usize {
        self.cells_remaining
    }

    #[inline]
    pub fn previewed_cluster(&self) -> &[Position] {
        &self.preview
    }

    /// Points the current preview would earn if selected.
    pub fn preview_points(&self) -> u64 {
        if self.preview.is_empty() {
            0
        } else {
            ScoreTracker::removal_points(self.preview.len())
        }
    }

    #[inline]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Removable clusters currently on the board.
    pub fn moves_available(&self) -> usize {
        self.clusters.removable_count()
    }
}
