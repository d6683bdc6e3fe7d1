//! # bear_hunt
//!
//! A turn-based simulation of bears roaming a wrapping board.
//! Each bear has its own randomly drawn traits that decide how often it moves, eats honey and
//! runs away from fights. The survivors of a game can be bred into a new generation.

pub mod config;
pub mod entities;
pub mod error;
pub mod game;
pub mod generation;
pub mod location;
pub mod map;
pub mod replay;

pub use config::GameConfig;
pub use entities::{
    Bear, EatOutcome, Entity, FightOutcome, Food, FoodKind, TraitKind, Traits, Winner,
};
pub use error::{BearHuntError, Result};
pub use game::{FinishedReason, Game};
pub use location::{Direction, Location};
pub use map::Board;
