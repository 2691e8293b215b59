//! Simulation configuration.
//!
//! A [`SimConfig`] is created once per match and handed to
//! [`Simulation::new`](crate::simulation::Simulation::new). Every gameplay
//! constant lives in [`Tuning`] so balance passes never touch code. Both
//! structs use `#[serde(default)]`, so RON files only need the fields they
//! override.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::geometry::WorldBounds;
use crate::map::CoverLayout;
use crate::role::Role;

/// Gameplay constants. Durations are in nominal ticks, distances in world units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Bullet travel per nominal tick.
    pub bullet_speed: f32,
    /// Bullet collision radius.
    pub bullet_radius: f32,
    /// Distance in front of the shooter where bullets appear.
    pub muzzle_offset: f32,

    /// Grenade launch speed.
    pub grenade_speed: f32,
    /// Grenade collision radius (used for wall bounces).
    pub grenade_radius: f32,
    /// Ticks until a thrown grenade explodes.
    pub grenade_fuse: f32,
    /// Fraction of velocity kept when bouncing off the world edge.
    pub grenade_bounce: f32,
    /// Velocity multiplier per nominal tick.
    pub grenade_decay: f32,
    /// Blast radius.
    pub explosion_radius: f32,
    /// Damage applied to every agent inside the blast radius.
    pub explosion_damage: i32,
    /// Chance a grenadier throws instead of shooting on an eligible tick.
    pub grenade_chance: f64,

    /// Projectiles closer than this trigger a dodge.
    pub dodge_radius: f32,
    /// Ticks between dodges.
    pub dodge_cooldown: f32,

    /// Per-tick chance that an agent without living allies starts retreating.
    pub retreat_chance: f64,
    /// A pinned retreating agent turns to fight enemies closer than this.
    pub retreat_cancel_distance: f32,
    /// Speed multiplier while retreating.
    pub retreat_speed_factor: f32,
    /// Distance of the back line from the owning team's world edge.
    pub back_line_margin: f32,
    /// Slack past the engage distance before an agent advances.
    pub engage_slack: f32,
    /// Minimum distance an agent tolerates before backing off.
    pub min_keep_distance: f32,
    /// Fraction of the engage distance below which an agent backs off.
    pub keep_distance_factor: f32,
    /// Fraction of the engage distance a backing-off agent aims for.
    pub back_off_factor: f32,
    /// Ticks a back-off point stays active.
    pub back_off_ticks: f32,

    /// Distance at which an agent consumes a pickup.
    pub pickup_radius: f32,
    /// Agents walk to pickups closer than this (scaled by frame scale).
    pub pickup_seek_radius: f32,
    /// Maximum simultaneous pickups.
    pub pickup_cap: usize,
    /// Ticks before an untouched pickup expires.
    pub pickup_lifetime: f32,
    /// Per-tick spawn chance while below the cap.
    pub pickup_spawn_chance: f64,
    /// Hit points restored by a heal pickup.
    pub pickup_heal: i32,
    /// Cadence multiplier applied by a fast-reload pickup.
    pub fast_reload_factor: f32,
    /// Cadence never drops below this.
    pub min_cadence: f32,

    /// Damage dealt by a melee strike.
    pub melee_damage: i32,
    /// Ticks between melee strikes.
    pub melee_cooldown: f32,

    /// Hit points a medic restores per action.
    pub medic_heal: i32,
    /// Maximum distance to a healed ally.
    pub medic_range: f32,
    /// Allies must be missing at least this much hp to be healed.
    pub medic_threshold: i32,

    /// Lower bound of the post-shot cadence jitter.
    pub cadence_jitter_min: f32,
    /// Upper bound of the post-shot cadence jitter.
    pub cadence_jitter_max: f32,
    /// Sampling step for line-of-sight tests.
    pub sight_step: f32,

    /// Movement below this counts as standing still.
    pub stuck_epsilon: f32,
    /// Ticks of standing still before a jitter is applied.
    pub stuck_threshold: f32,
    /// Maximum jitter per axis.
    pub stuck_jitter: f32,

    /// Attackers pick up a free bomb within this distance.
    pub bomb_pickup_radius: f32,
    /// Attackers walk toward a free bomb within this distance.
    pub bomb_seek_radius: f32,
    /// Edge length of the square bomb site.
    pub site_size: f32,
    /// Gap between the site and the world edge.
    pub site_margin: f32,

    /// Delay after an elimination round ends.
    pub round_over_delay: f32,
    /// Delay after a plant ends the round.
    pub plant_delay: f32,

    /// Rounds per magazine.
    pub mag_capacity: u32,
    /// Starting reserve ammunition.
    pub reserve_ammo: u32,
    /// Ticks an AI reload takes.
    pub reload_duration: f32,
    /// Ticks a player reload takes.
    pub player_reload_duration: f32,
    /// Player firing cadence.
    pub player_cadence: f32,
    /// Player speed multiplier.
    pub player_speed_factor: f32,
    /// Ticks a speech bubble stays up.
    pub speech_ticks: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            bullet_speed: 7.0,
            bullet_radius: 3.0,
            muzzle_offset: 15.0,
            grenade_speed: 3.0,
            grenade_radius: 6.0,
            grenade_fuse: 90.0,
            grenade_bounce: 0.6,
            grenade_decay: 0.995,
            explosion_radius: 80.0,
            explosion_damage: 30,
            grenade_chance: 0.25,
            dodge_radius: 40.0,
            dodge_cooldown: 30.0,
            retreat_chance: 0.02,
            retreat_cancel_distance: 220.0,
            retreat_speed_factor: 1.5,
            back_line_margin: 50.0,
            engage_slack: 20.0,
            min_keep_distance: 12.0,
            keep_distance_factor: 0.5,
            back_off_factor: 0.8,
            back_off_ticks: 30.0,
            pickup_radius: 20.0,
            pickup_seek_radius: 140.0,
            pickup_cap: 3,
            pickup_lifetime: 600.0,
            pickup_spawn_chance: 0.002,
            pickup_heal: 40,
            fast_reload_factor: 0.6,
            min_cadence: 4.0,
            melee_damage: 20,
            melee_cooldown: 180.0,
            medic_heal: 25,
            medic_range: 100.0,
            medic_threshold: 10,
            cadence_jitter_min: 0.85,
            cadence_jitter_max: 1.35,
            sight_step: 4.0,
            stuck_epsilon: 0.5,
            stuck_threshold: 10.0,
            stuck_jitter: 8.0,
            bomb_pickup_radius: 26.0,
            bomb_seek_radius: 300.0,
            site_size: 96.0,
            site_margin: 20.0,
            round_over_delay: 90.0,
            plant_delay: 180.0,
            mag_capacity: 30,
            reserve_ammo: 90,
            reload_duration: 90.0,
            player_reload_duration: 180.0,
            player_cadence: 6.0,
            player_speed_factor: 1.8,
            speech_ticks: 30.0,
        }
    }
}

/// Top-level match configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World width in units.
    pub world_width: f32,
    /// World height in units.
    pub world_height: f32,
    /// Agents per team at every round start.
    pub team_size: usize,
    /// Length of the series; the first team to a majority wins the match.
    pub best_of: u32,
    /// Enables the bomb objective (red attacks, blue defends).
    pub objective_mode: bool,
    /// Replaces the first red agent with an input-driven pawn.
    pub player_controlled: bool,
    /// Cover generated at match start.
    pub cover: CoverLayout,
    /// Roles drawn uniformly at random when spawning agents.
    pub role_pool: Vec<Role>,
    /// Gameplay constants.
    pub tuning: Tuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 600.0,
            team_size: 5,
            best_of: 5,
            objective_mode: false,
            player_controlled: false,
            cover: CoverLayout::Scattered,
            role_pool: Role::DEFAULT_POOL.to_vec(),
            tuning: Tuning::default(),
        }
    }
}

impl SimConfig {
    /// Load a configuration from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        ron::from_str(&contents).map_err(|e| GameError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Parse a configuration from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        ron::from_str(ron).map_err(|e| GameError::ConfigParse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize config: {e}")))
    }

    /// Set the world size.
    #[must_use]
    pub fn with_world(mut self, width: f32, height: f32) -> Self {
        self.world_width = width;
        self.world_height = height;
        self
    }

    /// Set the team size.
    #[must_use]
    pub fn with_team_size(mut self, team_size: usize) -> Self {
        self.team_size = team_size;
        self
    }

    /// Set the series length.
    #[must_use]
    pub fn with_best_of(mut self, best_of: u32) -> Self {
        self.best_of = best_of;
        self
    }

    /// Enable or disable the bomb objective.
    #[must_use]
    pub fn with_objective_mode(mut self, enabled: bool) -> Self {
        self.objective_mode = enabled;
        self
    }

    /// Enable or disable the player pawn.
    #[must_use]
    pub fn with_player(mut self, enabled: bool) -> Self {
        self.player_controlled = enabled;
        self
    }

    /// Set the cover layout.
    #[must_use]
    pub fn with_cover(mut self, cover: CoverLayout) -> Self {
        self.cover = cover;
        self
    }

    /// World bounds described by this config.
    #[must_use]
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::new(self.world_width, self.world_height)
    }

    /// Round wins needed to take the series.
    #[must_use]
    pub fn rounds_to_win(&self) -> u32 {
        (self.best_of + 1) / 2
    }

    /// Reject configurations the simulation cannot run.
    pub fn validate(&self) -> Result<()> {
        if !(self.world_width.is_finite() && self.world_width > 0.0)
            || !(self.world_height.is_finite() && self.world_height > 0.0)
        {
            return Err(GameError::InvalidConfig(format!(
                "world size must be positive, got {}x{}",
                self.world_width, self.world_height
            )));
        }
        if self.team_size == 0 {
            return Err(GameError::InvalidConfig(
                "team_size must be at least 1".to_string(),
            ));
        }
        if self.best_of == 0 || self.best_of % 2 == 0 {
            return Err(GameError::InvalidConfig(format!(
                "best_of must be odd and positive, got {}",
                self.best_of
            )));
        }
        if self.role_pool.is_empty() {
            return Err(GameError::InvalidConfig(
                "role_pool must not be empty".to_string(),
            ));
        }

        let t = &self.tuning;
        for (name, p) in [
            ("grenade_chance", t.grenade_chance),
            ("retreat_chance", t.retreat_chance),
            ("pickup_spawn_chance", t.pickup_spawn_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(GameError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        if t.cadence_jitter_min <= 0.0 || t.cadence_jitter_max < t.cadence_jitter_min {
            return Err(GameError::InvalidConfig(format!(
                "cadence jitter range {}..{} is invalid",
                t.cadence_jitter_min, t.cadence_jitter_max
            )));
        }
        if t.sight_step <= 0.0 {
            return Err(GameError::InvalidConfig(
                "sight_step must be positive".to_string(),
            ));
        }
        if t.mag_capacity == 0 {
            return Err(GameError::InvalidConfig(
                "mag_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
