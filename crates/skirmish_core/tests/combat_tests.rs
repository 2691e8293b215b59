//! Combat resolution tests: overlaps, melee and bomb drops.

use skirmish_core::agent::{Agent, AgentId};
use skirmish_core::combat;
use skirmish_core::config::Tuning;
use skirmish_core::events::{DamageCause, Outbox, SimEvent, SoundCue};
use skirmish_core::geometry::{Rect, Terrain, WorldBounds};
use skirmish_core::math::{FrameScale, Vec2};
use skirmish_core::objective::{BombState, Objective};
use skirmish_core::projectile::Bullet;
use skirmish_core::role::Role;
use skirmish_core::team::TeamColor;
use skirmish_test_utils::fixtures::{arena_config, empty_arena, FIXTURE_SEED};

const BOUNDS: WorldBounds = WorldBounds::new(800.0, 600.0);

fn rifle(id: u32, team: TeamColor, at: Vec2) -> Agent {
    Agent::new(AgentId(id), team, Role::Rifle, at, &Tuning::default())
}

#[test]
fn coincident_enemies_are_pushed_apart_without_nan() {
    let tuning = Tuning::default();
    let at = Vec2::new(400.0, 300.0);
    let mut agents = vec![rifle(1, TeamColor::Red, at), rifle(2, TeamColor::Blue, at)];
    let mut sink = |_c: SoundCue| {};
    let mut out = Outbox::new(&mut sink);

    combat::resolve_overlaps(&mut agents, &BOUNDS, &tuning, &mut out);

    assert!(agents.iter().all(|a| a.position.is_finite()));
    assert_eq!(agents[0].position, Vec2::new(410.0, 300.0));
    assert_eq!(agents[1].position, Vec2::new(390.0, 300.0));
    let melee_hits = out
        .events()
        .iter()
        .filter(|e| matches!(e, SimEvent::Damaged { cause: DamageCause::Melee, .. }))
        .count();
    assert_eq!(melee_hits, 2);
    assert_eq!(agents[0].hp, agents[0].max_hp - tuning.melee_damage);
    assert_eq!(agents[1].hp, agents[1].max_hp - tuning.melee_damage);
}

#[test]
fn melee_respects_cooldown() {
    let tuning = Tuning::default();
    let mut agents = vec![
        rifle(1, TeamColor::Red, Vec2::new(400.0, 300.0)),
        rifle(2, TeamColor::Blue, Vec2::new(405.0, 300.0)),
    ];
    let mut sink = |_c: SoundCue| {};
    let mut out = Outbox::new(&mut sink);
    combat::resolve_overlaps(&mut agents, &BOUNDS, &tuning, &mut out);
    agents[1].position = agents[0].position;
    combat::resolve_overlaps(&mut agents, &BOUNDS, &tuning, &mut out);

    let hp_after_one_exchange = agents[0].max_hp - tuning.melee_damage;
    assert_eq!(agents[0].hp, hp_after_one_exchange);
    assert_eq!(agents[0].melee_timer, tuning.melee_cooldown);
}

#[test]
fn teammates_separate_without_melee() {
    let tuning = Tuning::default();
    let mut agents = vec![
        rifle(1, TeamColor::Red, Vec2::new(400.0, 300.0)),
        rifle(2, TeamColor::Red, Vec2::new(410.0, 300.0)),
    ];
    let mut sink = |_c: SoundCue| {};
    let mut out = Outbox::new(&mut sink);
    combat::resolve_overlaps(&mut agents, &BOUNDS, &tuning, &mut out);

    assert!(out.events().is_empty());
    assert!(agents[0].position.distance(agents[1].position) >= 20.0 - 1e-4);
}

#[test]
fn carrier_killed_by_bullet_drops_bomb_before_removal() {
    let tuning = Tuning::default();
    let carrier_at = Vec2::new(300.0, 300.0);
    let mut carrier = rifle(1, TeamColor::Red, carrier_at);
    carrier.hp = 5;
    let mut agents = vec![carrier, rifle(2, TeamColor::Blue, Vec2::new(600.0, 300.0))];
    let mut objective = Objective {
        state: BombState::Carried(AgentId(1)),
        site: Rect::new(684.0, 252.0, 96.0, 96.0),
    };
    let mut bullets = vec![Bullet::spawn(
        Vec2::new(305.0, 300.0),
        Vec2::new(0.0, 300.0),
        TeamColor::Blue,
        12,
        AgentId(2),
        &tuning,
    )];
    let terrain = Terrain::new(&[], BOUNDS);
    let mut sink = |_c: SoundCue| {};
    let mut out = Outbox::new(&mut sink);

    combat::resolve_bullets(
        &mut bullets,
        &mut agents,
        &mut objective,
        &terrain,
        &tuning,
        None,
        &mut out,
    );

    assert_eq!(objective.state, BombState::Dropped(carrier_at));
    assert_eq!(agents.len(), 2, "carrier is still on the roster");
    assert!(!agents[0].is_alive());

    let removed = combat::cull_dead(&mut agents, &mut objective, &mut out);
    assert_eq!(removed, 1);
    let drops = out
        .events()
        .iter()
        .filter(|e| matches!(e, SimEvent::ObjectiveDropped { .. }))
        .count();
    assert_eq!(drops, 1);
    assert!(out.events().iter().any(|e| matches!(
        e,
        SimEvent::Killed { victim: AgentId(1), killer: Some(AgentId(2)), .. }
    )));
}

#[test]
fn attacker_recovers_dropped_bomb_in_simulation() {
    let mut config = arena_config().with_objective_mode(true);
    config.tuning.retreat_chance = 0.0;
    let mut sim = empty_arena(config, FIXTURE_SEED);
    let carrier = sim.spawn_objective_carrier(Vec2::new(200.0, 300.0), TeamColor::Red);
    let runner = sim.spawn_pawn(TeamColor::Red, Role::Heavy, Vec2::new(150.0, 300.0));
    sim.spawn_pawn(TeamColor::Blue, Role::Heavy, Vec2::new(780.0, 300.0));

    sim.despawn_agent(carrier).unwrap();
    assert!(matches!(sim.objective().state, BombState::Dropped(_)));

    let mut recovered = false;
    for _ in 0..200 {
        sim.tick(FrameScale::NOMINAL, None);
        if sim.objective().carrier() == Some(runner) {
            recovered = true;
            break;
        }
    }
    assert!(recovered);
}
