#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session layer for Life Defence.
//!
//! A [`GameSession`] drives one [`life_defence_world::World`] through the
//! spawning, collision and escape systems. The [`SessionManager`] keeps many
//! sessions side by side and serialises the operations applied to each one.

mod config;
mod game;
mod manager;
mod seed;

use std::{fmt, str::FromStr};

use life_defence_core::PlacementError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use config::{ConfigError, EngineConfig, DEFAULT_SEED};
pub use game::{GameSession, GameState, RestartOptions, StateStats, StepOutcome, TickReport};
pub use manager::{SessionHandle, SessionManager};

/// Opaque identifier of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    /// Allocates a fresh random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for GameId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Failures reported by [`SessionManager`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No session is registered under the identifier.
    #[error("game {0} not found")]
    NotFound(GameId),
    /// The placement request was rejected by the world.
    #[error(transparent)]
    Placement(#[from] PlacementError),
}
