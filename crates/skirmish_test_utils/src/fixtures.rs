//! Test fixtures and helpers.
//!
//! Pre-built simulations and hand-placed scenarios for consistent testing.
//! Fixtures disable random crate spawns so a scenario only contains what
//! the test placed.

use skirmish_core::agent::AgentId;
use skirmish_core::config::SimConfig;
use skirmish_core::events::TickEvents;
use skirmish_core::map::CoverLayout;
use skirmish_core::math::{FrameScale, Vec2};
use skirmish_core::role::Role;
use skirmish_core::simulation::Simulation;
use skirmish_core::team::TeamColor;

/// Default seed for fixtures that do not care about the seed.
pub const FIXTURE_SEED: u64 = 0x5EED;

/// An open 800x600 arena config with no cover and no random crates.
#[must_use]
pub fn arena_config() -> SimConfig {
    let mut config = SimConfig::default()
        .with_cover(CoverLayout::None)
        .with_team_size(1);
    config.tuning.pickup_spawn_chance = 0.0;
    config
}

/// A simulation built from `config` with every spawned agent removed.
///
/// # Panics
///
/// Panics if `config` fails validation.
#[must_use]
pub fn empty_arena(config: SimConfig, seed: u64) -> Simulation {
    let mut sim = Simulation::new(config, seed).expect("fixture config must validate");
    let ids: Vec<AgentId> = sim.agents().iter().map(|a| a.id).collect();
    for id in ids {
        let _ = sim.despawn_agent(id);
    }
    sim.clear_projectiles();
    sim
}

/// Two riflemen facing each other across the middle of an open arena.
///
/// Returns the simulation with the red and blue ids.
#[must_use]
pub fn duel(seed: u64) -> (Simulation, AgentId, AgentId) {
    let mut sim = empty_arena(arena_config(), seed);
    let red = sim.spawn_pawn(TeamColor::Red, Role::Rifle, Vec2::new(200.0, 300.0));
    let blue = sim.spawn_pawn(TeamColor::Blue, Role::Rifle, Vec2::new(600.0, 300.0));
    (sim, red, blue)
}

/// A default match with `team_size` agents per side.
///
/// # Panics
///
/// Panics if `team_size` is zero.
#[must_use]
pub fn skirmish(team_size: usize, seed: u64) -> Simulation {
    Simulation::new(SimConfig::default().with_team_size(team_size), seed)
        .expect("fixture config must validate")
}

/// A default match with the bomb objective enabled.
///
/// # Panics
///
/// Panics if the default configuration fails validation.
#[must_use]
pub fn objective_match(seed: u64) -> Simulation {
    Simulation::new(SimConfig::default().with_objective_mode(true), seed)
        .expect("fixture config must validate")
}

/// Advance `sim` by `ticks` nominal ticks without player input.
pub fn run_ticks(sim: &mut Simulation, ticks: u64) -> Vec<TickEvents> {
    (0..ticks)
        .map(|_| sim.tick(FrameScale::NOMINAL, None))
        .collect()
}

/// Advance until the match is decided or `max_ticks` have run.
///
/// Returns the number of ticks advanced.
pub fn run_until_match_over(sim: &mut Simulation, max_ticks: u64) -> u64 {
    let mut ticks = 0;
    while ticks < max_ticks && !sim.is_match_over() {
        sim.tick(FrameScale::NOMINAL, None);
        ticks += 1;
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_arena_has_no_agents() {
        let sim = empty_arena(arena_config(), FIXTURE_SEED);
        assert!(sim.agents().is_empty());
        assert!(sim.obstacles().is_empty());
    }

    #[test]
    fn test_duel_places_two_agents() {
        let (sim, red, blue) = duel(FIXTURE_SEED);
        assert_eq!(sim.agents().len(), 2);
        assert_eq!(sim.agent(red).map(|a| a.team), Some(TeamColor::Red));
        assert_eq!(sim.agent(blue).map(|a| a.position), Some(Vec2::new(600.0, 300.0)));
    }

    #[test]
    fn test_run_until_match_over_stops() {
        let mut sim = Simulation::new(
            arena_config().with_best_of(1).with_team_size(2),
            FIXTURE_SEED,
        )
        .unwrap();
        let ticks = run_until_match_over(&mut sim, 20_000);
        assert!(ticks <= 20_000);
        if sim.is_match_over() {
            assert!(sim.round().match_winner().is_some());
        }
    }
}
