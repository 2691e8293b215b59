//! Agent archetypes and their fixed baseline stats.

use serde::{Deserialize, Serialize};

/// Base firing/action cadence shared by every role, in nominal ticks.
pub const BASE_CADENCE: f32 = 45.0;

/// Agent archetype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Mid-range all-rounder.
    Rifle,
    /// Long-range, high damage per shot.
    Sniper,
    /// Slow, tough, fights up close and never backs off.
    Heavy,
    /// Heals allies instead of shooting.
    Medic,
    /// Occasionally lobs grenades instead of firing.
    Grenadier,
}

/// Baseline numbers for a role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleProfile {
    /// Damage per bullet.
    pub damage: i32,
    /// Preferred distance to the current target.
    pub engage_distance: f32,
    /// Movement speed in units per nominal tick.
    pub speed: f32,
    /// Maximum (and starting) hit points.
    pub max_hp: i32,
    /// Collision radius.
    pub radius: f32,
    /// Ticks between action attempts before jitter.
    pub cadence: f32,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Rifle,
        Self::Sniper,
        Self::Heavy,
        Self::Medic,
        Self::Grenadier,
    ];

    /// Pool roles are drawn from when a team spawns.
    pub const DEFAULT_POOL: [Self; 5] = [
        Self::Rifle,
        Self::Rifle,
        Self::Grenadier,
        Self::Medic,
        Self::Heavy,
    ];

    /// Baseline stats for this role.
    #[must_use]
    pub const fn profile(self) -> RoleProfile {
        match self {
            Self::Rifle => RoleProfile {
                damage: 12,
                engage_distance: 220.0,
                speed: 1.5,
                max_hp: 100,
                radius: 10.0,
                cadence: BASE_CADENCE,
            },
            Self::Sniper => RoleProfile {
                damage: 40,
                engage_distance: 420.0,
                speed: 1.5,
                max_hp: 100,
                radius: 10.0,
                cadence: BASE_CADENCE,
            },
            Self::Heavy => RoleProfile {
                damage: 6,
                engage_distance: 60.0,
                speed: 1.0,
                max_hp: 150,
                radius: 12.0,
                cadence: BASE_CADENCE,
            },
            Self::Medic => RoleProfile {
                damage: 0,
                engage_distance: 140.0,
                speed: 1.6,
                max_hp: 100,
                radius: 10.0,
                cadence: BASE_CADENCE,
            },
            Self::Grenadier => RoleProfile {
                damage: 8,
                engage_distance: 260.0,
                speed: 1.5,
                max_hp: 100,
                radius: 10.0,
                cadence: BASE_CADENCE,
            },
        }
    }

    /// Whether this role backs away from targets that get too close.
    #[must_use]
    pub const fn keeps_distance(self) -> bool {
        !matches!(self, Self::Heavy)
    }

    /// Short lowercase label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rifle => "rifle",
            Self::Sniper => "sniper",
            Self::Heavy => "heavy",
            Self::Medic => "medic",
            Self::Grenadier => "grenadier",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
