use crate::entities::TraitKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BearHuntError>;

#[derive(Debug, Error)]
pub enum BearHuntError {
    #[error("board size must be positive and its square must fit in memory, got {size}")]
    InvalidBoardSize { size: usize },
    #[error("{kind} must be within [0, 1], got {value}")]
    InvalidTrait { kind: TraitKind, value: f64 },
    #[error("{required} entities cannot fit on a board of {cells} cells")]
    CapacityExceeded { required: usize, cells: usize },
    #[error("world has already been generated with {bears} bears")]
    WorldAlreadyGenerated { bears: usize },
    #[error("no empty cell found after {attempts} attempts")]
    PlacementExhausted { attempts: usize },
    #[error("malformed board layout: {0}")]
    MalformedLayout(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
