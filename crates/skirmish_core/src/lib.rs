//! # Skirmish Core
//!
//! Simulation core for a 2D top-down team-combat game.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No audio playback (sound cues are handed to a caller-supplied sink)
//! - No wall-clock reads (the host passes a frame scale each tick)
//! - No global randomness (one seeded generator per simulation)
//!
//! This separation enables:
//! - Headless batch runs
//! - Replay recording and verification
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`agent`] - Agent state and per-agent helpers
//! - [`behavior`] - The per-tick agent decision routine
//! - [`projectile`] - Bullet and grenade motion
//! - [`combat`] - Hit, overlap, pickup and death resolution
//! - [`objective`] - Bomb ownership and the plant/pickup policy
//! - [`round`] - Round and match state machine
//! - [`simulation`] - The world container and tick driver
//! - [`replay`] - Input recording and playback

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod agent;
pub mod behavior;
pub mod combat;
pub mod config;
pub mod error;
pub mod events;
pub mod geometry;
pub mod map;
pub mod math;
pub mod objective;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod replay;
pub mod rng;
pub mod role;
pub mod round;
pub mod simulation;
pub mod team;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::agent::{Agent, AgentId, Appearance, Expression, ResourceKey, SpeechLine};
    pub use crate::config::{SimConfig, Tuning};
    pub use crate::error::{GameError, Result};
    pub use crate::events::{DamageCause, Effect, EffectKind, SimEvent, SoundCue, TickEvents};
    pub use crate::geometry::{Obstacle, Rect, Terrain, WorldBounds};
    pub use crate::map::CoverLayout;
    pub use crate::math::{FrameScale, Vec2};
    pub use crate::objective::{BombState, Objective};
    pub use crate::pickup::{Pickup, PickupKind};
    pub use crate::player::PlayerInput;
    pub use crate::projectile::{Bullet, Grenade};
    pub use crate::replay::{Recorder, Replay, ReplayFrame, ReplayPlayer};
    pub use crate::role::Role;
    pub use crate::round::{RoundPhase, RoundState, Score};
    pub use crate::simulation::{Simulation, TeamAppearance, WorldSnapshot};
    pub use crate::team::{Side, TeamColor};
}
