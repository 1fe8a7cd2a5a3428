//! Clumptui engine: board, cluster detection, collapse, scoring and the game session.
//!
//! The terminal front end in `main.rs` only talks to [`GameSession`].

pub mod board;
pub mod cluster;
pub mod collapse;
pub mod error;
pub mod game;
pub mod score;

pub use board::{Board, Cell, Position};
pub use cluster::ClusterMap;
pub use error::GameError;
pub use game::{GameConfig, GameSession, SessionState};
pub use score::{Score, ScoreTracker};
