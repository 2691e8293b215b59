//! Supply crates.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::config::Tuning;
use crate::geometry::WorldBounds;
use crate::math::{FrameScale, Vec2};
use crate::rng::{self, SimRng};

/// What a crate grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    /// Restores hit points.
    Heal,
    /// Permanently shortens the action cadence.
    FastReload,
    /// Adds one shield charge.
    Shield,
}

impl PickupKind {
    /// Every kind, in spawn-table order.
    pub const ALL: [Self; 3] = [Self::Heal, Self::FastReload, Self::Shield];
}

/// A crate lying in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    /// Where the crate sits.
    pub position: Vec2,
    /// Effect.
    pub kind: PickupKind,
    /// Ticks until it disappears.
    pub remaining: f32,
}

impl Pickup {
    /// Place a crate.
    #[must_use]
    pub const fn new(position: Vec2, kind: PickupKind, lifetime: f32) -> Self {
        Self {
            position,
            kind,
            remaining: lifetime,
        }
    }

    /// Count down the expiry timer.
    pub fn tick(&mut self, frame_scale: FrameScale) {
        self.remaining -= frame_scale.get();
    }

    /// Whether the crate has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Apply the effect to `agent`.
    pub fn apply(&self, agent: &mut Agent, tuning: &Tuning) {
        match self.kind {
            PickupKind::Heal => {
                agent.heal(tuning.pickup_heal);
            }
            PickupKind::FastReload => {
                agent.base_cadence =
                    (agent.base_cadence * tuning.fast_reload_factor).max(tuning.min_cadence);
                agent.cadence = (agent.cadence * tuning.fast_reload_factor).max(tuning.min_cadence);
            }
            PickupKind::Shield => agent.shield += 1,
        }
    }
}

/// Roll for a new crate. The chance scales with the frame scale and no
/// crate spawns while `existing` is at the cap. The crate always lands
/// inside `bounds`, however small the world.
pub fn roll_spawn(
    existing: usize,
    bounds: &WorldBounds,
    frame_scale: FrameScale,
    tuning: &Tuning,
    rng: &mut SimRng,
) -> Option<Pickup> {
    let roll = rng::chance(rng, tuning.pickup_spawn_chance * f64::from(frame_scale.get()));
    if !roll || existing >= tuning.pickup_cap {
        return None;
    }
    let kind = PickupKind::ALL
        .choose(rng)
        .copied()
        .unwrap_or(PickupKind::Heal);
    let position = bounds.clamp(
        Vec2::new(
            rng::uniform(rng, 100.0, bounds.width - 100.0),
            rng::uniform(rng, 50.0, bounds.height - 50.0),
        ),
        0.0,
    );
    Some(Pickup::new(position, kind, tuning.pickup_lifetime))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentId;
    use crate::rng::seeded;
    use crate::role::Role;
    use crate::team::TeamColor;

    fn agent() -> Agent {
        Agent::new(
            AgentId(1),
            TeamColor::Red,
            Role::Rifle,
            Vec2::new(100.0, 100.0),
            &Tuning::default(),
        )
    }

    #[test]
    fn test_heal_is_capped() {
        let tuning = Tuning::default();
        let mut a = agent();
        a.take_damage(10);
        Pickup::new(Vec2::ZERO, PickupKind::Heal, 600.0).apply(&mut a, &tuning);
        assert_eq!(a.hp, 100);
    }

    #[test]
    fn test_fast_reload_floors_cadence() {
        let tuning = Tuning::default();
        let mut a = agent();
        let crate_ = Pickup::new(Vec2::ZERO, PickupKind::FastReload, 600.0);
        crate_.apply(&mut a, &tuning);
        assert!((a.base_cadence - 27.0).abs() < 1e-4);
        for _ in 0..20 {
            crate_.apply(&mut a, &tuning);
        }
        assert_eq!(a.base_cadence, 4.0);
        assert_eq!(a.cadence, 4.0);
    }

    #[test]
    fn test_shield_stacks() {
        let tuning = Tuning::default();
        let mut a = agent();
        let crate_ = Pickup::new(Vec2::ZERO, PickupKind::Shield, 600.0);
        crate_.apply(&mut a, &tuning);
        crate_.apply(&mut a, &tuning);
        assert_eq!(a.shield, 2);
    }

    #[test]
    fn test_expiry() {
        let mut p = Pickup::new(Vec2::ZERO, PickupKind::Heal, 2.0);
        p.tick(FrameScale::NOMINAL);
        assert!(!p.is_expired());
        p.tick(FrameScale::NOMINAL);
        assert!(p.is_expired());
    }

    #[test]
    fn test_spawn_respects_cap() {
        let mut tuning = Tuning::default();
        tuning.pickup_spawn_chance = 1.0;
        let bounds = WorldBounds::new(800.0, 600.0);
        let mut rng = seeded(2);
        assert!(roll_spawn(3, &bounds, FrameScale::NOMINAL, &tuning, &mut rng).is_none());
        let p = roll_spawn(0, &bounds, FrameScale::NOMINAL, &tuning, &mut rng).unwrap();
        assert!(p.position.x >= 100.0 && p.position.x < 700.0);
        assert!(p.position.y >= 50.0 && p.position.y < 550.0);
        assert_eq!(p.remaining, 600.0);
    }

    #[test]
    fn test_spawn_stays_inside_tiny_world() {
        let mut tuning = Tuning::default();
        tuning.pickup_spawn_chance = 1.0;
        let bounds = WorldBounds::new(150.0, 80.0);
        let mut rng = seeded(5);
        for _ in 0..20 {
            let p = roll_spawn(0, &bounds, FrameScale::NOMINAL, &tuning, &mut rng).unwrap();
            assert!(bounds.contains(p.position), "{:?} outside world", p.position);
        }
    }
}
