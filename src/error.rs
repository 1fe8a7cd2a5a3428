//! Engine errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Coordinate outside the grid. Callers treat this as a no-op.
    #[error("({x}, {y}) is outside the {width}x{height} board")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
    /// A removal was requested for cells that do not form a valid cluster.
    /// Only the cluster analyzer produces clusters, so this is a bug.
    #[error("invalid cluster: {0}")]
    InvalidCluster(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}
