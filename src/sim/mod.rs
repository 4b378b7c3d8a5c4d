//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per tick
//! - Seeded RNG only
//! - Stable iteration order (obstacles keep their grid order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Bounded, Rect};
pub use state::{Ball, EntityKind, Obstacle, Paddle, RngState, Steer, obstacle_grid};
pub use tick::{Controller, Observation, Session, SessionStats, TickOutcome};
