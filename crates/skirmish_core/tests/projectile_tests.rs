//! Projectile motion and resolution tests.

use skirmish_core::agent::{Agent, AgentId};
use skirmish_core::combat;
use skirmish_core::config::Tuning;
use skirmish_core::events::{EffectKind, Outbox, SimEvent, SoundCue};
use skirmish_core::geometry::{Rect, Terrain, WorldBounds};
use skirmish_core::math::{FrameScale, Vec2};
use skirmish_core::objective::Objective;
use skirmish_core::projectile::{self, Bullet, Grenade};
use skirmish_core::role::Role;
use skirmish_core::team::TeamColor;

const BOUNDS: WorldBounds = WorldBounds::new(800.0, 600.0);

#[test]
fn bullet_travels_and_stops_in_cover() {
    let tuning = Tuning::default();
    let wall = [Rect::new(5.0, -5.0, 10.0, 10.0)];
    let terrain = Terrain::new(&wall, BOUNDS);
    let mut bullets = vec![Bullet::spawn(
        Vec2::ZERO,
        Vec2::new(10.0, 0.0),
        TeamColor::Red,
        12,
        AgentId(1),
        &tuning,
    )];
    let mut grenades: Vec<Grenade> = Vec::new();
    let mut agents: Vec<Agent> = Vec::new();
    let mut objective = Objective::default();

    projectile::integrate(&mut bullets, &mut grenades, FrameScale::NOMINAL, &BOUNDS);
    assert!((bullets[0].position.x - 7.0).abs() < 1e-5);
    assert!(bullets[0].position.y.abs() < 1e-5);

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
    assert!(bullets.is_empty());
    assert!(out
        .effects()
        .iter()
        .any(|e| e.kind == EffectKind::BulletImpact));
}

#[test]
fn bullet_leaving_world_is_removed() {
    let tuning = Tuning::default();
    let terrain = Terrain::new(&[], BOUNDS);
    let mut bullets = vec![Bullet::spawn(
        Vec2::new(796.0, 300.0),
        Vec2::new(900.0, 300.0),
        TeamColor::Blue,
        12,
        AgentId(2),
        &tuning,
    )];
    let mut agents: Vec<Agent> = Vec::new();
    let mut objective = Objective::default();

    projectile::integrate(&mut bullets, &mut [], FrameScale::NOMINAL, &BOUNDS);
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
    assert!(bullets.is_empty());
}

#[test]
fn grenade_explodes_once_after_fuse() {
    let tuning = Tuning::default();
    let mut grenades = vec![Grenade::spawn(
        Vec2::new(400.0, 300.0),
        Vec2::new(500.0, 300.0),
        TeamColor::Red,
        AgentId(1),
        &tuning,
    )];
    let mut agents = vec![Agent::new(
        AgentId(2),
        TeamColor::Blue,
        Role::Rifle,
        Vec2::new(50.0, 50.0),
        &tuning,
    )];

    let mut explosions = 0;
    for tick in 1..=120 {
        projectile::integrate(&mut [], &mut grenades, FrameScale::NOMINAL, &BOUNDS);
        let mut sounds = Vec::new();
        let mut sink = |c: SoundCue| sounds.push(c);
        let mut out = Outbox::new(&mut sink);
        combat::resolve_grenades(&mut grenades, &mut agents, &tuning, &mut out);
        let damaged = out
            .events()
            .iter()
            .any(|e| matches!(e, SimEvent::Damaged { .. }));
        let exploded = out
            .effects()
            .iter()
            .any(|e| e.kind == EffectKind::Explosion);
        drop(out);

        assert!(!damaged);
        if exploded {
            explosions += 1;
            assert_eq!(tick, 90);
            assert_eq!(sounds, vec![SoundCue::Explosion]);
        }
        if tick < 90 {
            assert_eq!(grenades.len(), 1);
        }
    }
    assert_eq!(explosions, 1);
    assert!(grenades.is_empty());
    assert_eq!(agents[0].hp, agents[0].max_hp);
}

#[test]
fn grenade_bounces_off_world_edge() {
    let tuning = Tuning::default();
    let mut grenade = Grenade::spawn(
        Vec2::new(793.0, 300.0),
        Vec2::new(900.0, 300.0),
        TeamColor::Red,
        AgentId(1),
        &tuning,
    );
    grenade.tick(FrameScale::NOMINAL, &BOUNDS);
    assert!(grenade.velocity.x < 0.0);
    assert!(grenade.position.x <= BOUNDS.width - grenade.radius);
}

#[test]
fn frame_scale_scales_bullet_step() {
    let tuning = Tuning::default();
    let mut bullet = Bullet::spawn(
        Vec2::new(100.0, 100.0),
        Vec2::new(100.0, 500.0),
        TeamColor::Red,
        12,
        AgentId(1),
        &tuning,
    );
    bullet.tick(FrameScale::new(2.5));
    assert!((bullet.position.y - 117.5).abs() < 1e-4);
}
