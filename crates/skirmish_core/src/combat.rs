//! Combat resolution.
//!
//! Runs once per tick after every agent has acted and every projectile has
//! moved. Each pass mutates the shared rosters sequentially; none of this is
//! safe to split across threads.

use crate::agent::{Agent, AgentId, Expression, SpeechLine};
use crate::config::Tuning;
use crate::events::{DamageCause, EffectKind, Outbox, SimEvent, SoundCue};
use crate::geometry::{Terrain, WorldBounds};
use crate::math::{FrameScale, Vec2};
use crate::objective::Objective;
use crate::pickup::Pickup;
use crate::projectile::{Bullet, Grenade};

/// Centres closer than this are treated as coincident.
const OVERLAP_EPSILON: f32 = 1e-4;

/// Push overlapping agents apart and let opposing pairs trade melee strikes.
pub fn resolve_overlaps(
    agents: &mut [Agent],
    bounds: &WorldBounds,
    tuning: &Tuning,
    out: &mut Outbox<'_>,
) {
    for i in 0..agents.len() {
        let (head, tail) = agents.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if !a.is_alive() || !b.is_alive() {
                continue;
            }
            let offset = a.position - b.position;
            let distance = offset.length();
            let min_distance = a.radius + b.radius;
            if distance >= min_distance {
                continue;
            }

            let normal = if distance > OVERLAP_EPSILON {
                offset / distance
            } else {
                Vec2::UNIT_X
            };
            let push = normal * ((min_distance - distance) / 2.0);
            a.position += push;
            b.position -= push;
            a.clamp_to(bounds);
            b.clamp_to(bounds);

            if a.team != b.team {
                strike(a, b, tuning, out);
                strike(b, a, tuning, out);
            }
        }
    }
}

fn strike(attacker: &mut Agent, victim: &mut Agent, tuning: &Tuning, out: &mut Outbox<'_>) {
    if attacker.melee_timer > 0.0 {
        return;
    }
    victim.take_damage(tuning.melee_damage);
    victim.show_hit(tuning.speech_ticks);
    victim.last_attacker = Some(attacker.id);
    attacker.melee_timer = tuning.melee_cooldown;
    attacker.expression = Expression::Hit;
    attacker.say(SpeechLine::Slash, tuning.speech_ticks);
    out.emit(SimEvent::Damaged {
        victim: victim.id,
        attacker: attacker.id,
        attacker_team: attacker.team,
        amount: tuning.melee_damage,
        cause: DamageCause::Melee,
    });
}

/// Resolve bullets against the world edge, cover and agents.
///
/// A bullet is removed when it leaves the world, is inside any cover, or
/// touches a living agent of the other team. A hit on
/// a covered agent or a shield charge does no hp damage but still consumes
/// the bullet. A lethal hit on the bomb carrier drops the bomb on the spot.
#[allow(clippy::too_many_arguments)]
pub fn resolve_bullets(
    bullets: &mut Vec<Bullet>,
    agents: &mut [Agent],
    objective: &mut Objective,
    terrain: &Terrain<'_>,
    tuning: &Tuning,
    player: Option<AgentId>,
    out: &mut Outbox<'_>,
) {
    bullets.retain(|bullet| {
        if bullet.is_out_of_bounds(&terrain.bounds) {
            return false;
        }
        if terrain.in_cover(bullet.position) {
            out.effect(bullet.position, EffectKind::BulletImpact);
            return false;
        }

        let victim = agents.iter_mut().find(|a| {
            a.team != bullet.team
                && a.is_alive()
                && a.position.distance(bullet.position) < a.radius + bullet.radius
        });
        let Some(victim) = victim else {
            return true;
        };

        if terrain.in_cover(victim.position) {
            out.emit(SimEvent::CoverAbsorbed { victim: victim.id });
            return false;
        }
        if victim.shield > 0 {
            victim.shield -= 1;
            out.emit(SimEvent::ShieldAbsorbed { victim: victim.id });
            return false;
        }

        victim.take_damage(bullet.damage);
        victim.show_hit(tuning.speech_ticks);
        victim.last_attacker = Some(bullet.owner);
        out.emit(SimEvent::Damaged {
            victim: victim.id,
            attacker: bullet.owner,
            attacker_team: bullet.team,
            amount: bullet.damage,
            cause: DamageCause::Bullet,
        });
        out.sound(SoundCue::Damage);
        out.effect(victim.position, EffectKind::HitSpark);
        if player.is_some_and(|p| p == bullet.owner) {
            out.effect(bullet.position, EffectKind::HitMark);
        }

        if !victim.is_alive() && objective.carrier() == Some(victim.id) {
            objective.drop_at(victim.position);
            out.emit(SimEvent::ObjectiveDropped {
                position: victim.position,
            });
        }
        false
    });
}

/// Detonate expired grenades.
pub fn resolve_grenades(
    grenades: &mut Vec<Grenade>,
    agents: &mut [Agent],
    tuning: &Tuning,
    out: &mut Outbox<'_>,
) {
    grenades.retain(|grenade| {
        if !grenade.is_expired() {
            return true;
        }
        let hit = grenade.explode(agents, tuning);
        out.effect(grenade.position, EffectKind::Explosion);
        out.sound(SoundCue::Explosion);
        for victim in hit {
            out.emit(SimEvent::Damaged {
                victim,
                attacker: grenade.owner,
                attacker_team: grenade.team,
                amount: tuning.explosion_damage,
                cause: DamageCause::Explosion,
            });
        }
        false
    });
}

/// Let agents consume crates they stand on, then age the rest.
pub fn resolve_pickups(
    pickups: &mut Vec<Pickup>,
    agents: &mut [Agent],
    frame_scale: FrameScale,
    tuning: &Tuning,
    out: &mut Outbox<'_>,
) {
    pickups.retain_mut(|pickup| {
        let consumer = agents.iter_mut().find(|a| {
            a.is_alive() && a.position.distance(pickup.position) < tuning.pickup_radius
        });
        if let Some(agent) = consumer {
            pickup.apply(agent, tuning);
            out.emit(SimEvent::PickupConsumed {
                agent: agent.id,
                team: agent.team,
                kind: pickup.kind,
            });
            return false;
        }
        pickup.tick(frame_scale);
        if pickup.is_expired() {
            out.emit(SimEvent::PickupExpired { kind: pickup.kind });
            return false;
        }
        true
    });
}

/// Remove agents at zero hp, recording kills and dropping the bomb if its
/// carrier died. Returns the number of agents removed.
pub fn cull_dead(agents: &mut Vec<Agent>, objective: &mut Objective, out: &mut Outbox<'_>) -> usize {
    for dead in agents.iter().filter(|a| !a.is_alive()) {
        if objective.carrier() == Some(dead.id) {
            objective.drop_at(dead.position);
            out.emit(SimEvent::ObjectiveDropped {
                position: dead.position,
            });
        }
        let killer = dead
            .last_attacker
            .filter(|id| agents.iter().any(|a| a.id == *id));
        out.emit(SimEvent::Killed {
            victim: dead.id,
            victim_team: dead.team,
            killer,
        });
    }
    let before = agents.len();
    agents.retain(Agent::is_alive);
    before - agents.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::objective::BombState;
    use crate::pickup::PickupKind;
    use crate::role::Role;
    use crate::team::TeamColor;

    const BOUNDS: WorldBounds = WorldBounds::new(800.0, 600.0);

    fn agent(id: u32, team: TeamColor, x: f32, y: f32) -> Agent {
        Agent::new(
            AgentId(id),
            team,
            Role::Rifle,
            Vec2::new(x, y),
            &Tuning::default(),
        )
    }

    fn bullet_at(position: Vec2, team: TeamColor, owner: u32) -> Bullet {
        let mut b = Bullet::spawn(
            position,
            position + Vec2::UNIT_X,
            team,
            12,
            AgentId(owner),
            &Tuning::default(),
        );
        b.velocity = Vec2::ZERO;
        b
    }

    #[test]
    fn test_teammates_are_separated_without_melee() {
        let tuning = Tuning::default();
        let mut sink = |_c: SoundCue| {};
        let mut out = Outbox::new(&mut sink);
        let mut agents = vec![
            agent(1, TeamColor::Red, 400.0, 300.0),
            agent(2, TeamColor::Red, 410.0, 300.0),
        ];
        resolve_overlaps(&mut agents, &BOUNDS, &tuning, &mut out);
        assert!((agents[0].position.x - 395.0).abs() < 1e-4);
        assert!((agents[1].position.x - 415.0).abs() < 1e-4);
        assert_eq!(agents[0].hp, 100);
        assert!(out.events().is_empty());
    }

    #[test]
    fn test_opponents_trade_melee_once_per_cooldown() {
        let tuning = Tuning::default();
        let mut sink = |_c: SoundCue| {};
        let mut out = Outbox::new(&mut sink);
        let mut agents = vec![
            agent(1, TeamColor::Red, 400.0, 300.0),
            agent(2, TeamColor::Blue, 405.0, 300.0),
        ];
        resolve_overlaps(&mut agents, &BOUNDS, &tuning, &mut out);
        assert_eq!(agents[0].hp, 80);
        assert_eq!(agents[1].hp, 80);
        assert_eq!(agents[0].melee_timer, 180.0);
        assert_eq!(agents[1].last_attacker, Some(AgentId(1)));

        agents[1].position = agents[0].position;
        resolve_overlaps(&mut agents, &BOUNDS, &tuning, &mut out);
        assert_eq!(agents[0].hp, 80);
        assert_eq!(out.events().len(), 2);
    }

    #[test]
    fn test_bullet_outside_world_is_dropped() {
        let tuning = Tuning::default();
        let mut sink = |_c: SoundCue| {};
        let mut out = Outbox::new(&mut sink);
        let mut bullets = vec![bullet_at(Vec2::new(-5.0, 300.0), TeamColor::Red, 1)];
        let mut agents: Vec<Agent> = Vec::new();
        let mut objective = Objective::default();
        resolve_bullets(
            &mut bullets,
            &mut agents,
            &mut objective,
            &Terrain::new(&[], BOUNDS),
            &tuning,
            None,
            &mut out,
        );
        assert!(bullets.is_empty());
    }

    #[test]
    fn test_bullet_inside_cover_is_destroyed_before_agent_checks() {
        let tuning = Tuning::default();
        let mut sink = |_c: SoundCue| {};
        let mut out = Outbox::new(&mut sink);
        let cover = [Rect::new(100.0, 100.0, 50.0, 50.0)];
        let mut bullets = vec![Bullet::spawn(
            Vec2::new(103.0, 120.0),
            Vec2::new(200.0, 120.0),
            TeamColor::Red,
            12,
            AgentId(1),
            &tuning,
        )];
        bullets[0].tick(FrameScale::NOMINAL);
        assert_eq!(bullets[0].position, Vec2::new(110.0, 120.0));
        let mut agents = vec![agent(2, TeamColor::Blue, 115.0, 120.0)];
        let mut objective = Objective::default();
        resolve_bullets(
            &mut bullets,
            &mut agents,
            &mut objective,
            &Terrain::new(&cover, BOUNDS),
            &tuning,
            None,
            &mut out,
        );
        assert!(bullets.is_empty());
        assert_eq!(agents[0].hp, 100);
        assert!(out.events().is_empty());
        assert_eq!(out.effects()[0].kind, EffectKind::BulletImpact);
    }

    #[test]
    fn test_bullet_damages_opponent_and_marks_player_hits() {
        let tuning = Tuning::default();
        let mut cues = Vec::new();
        let mut sink = |c: SoundCue| cues.push(c);
        let mut out = Outbox::new(&mut sink);
        let mut agents = vec![
            agent(1, TeamColor::Red, 300.0, 300.0),
            agent(2, TeamColor::Blue, 400.0, 300.0),
        ];
        let mut bullets = vec![
            bullet_at(Vec2::new(305.0, 300.0), TeamColor::Red, 1),
            bullet_at(Vec2::new(395.0, 300.0), TeamColor::Red, 1),
        ];
        let mut objective = Objective::default();
        resolve_bullets(
            &mut bullets,
            &mut agents,
            &mut objective,
            &Terrain::new(&[], BOUNDS),
            &tuning,
            Some(AgentId(1)),
            &mut out,
        );
        assert_eq!(bullets.len(), 1, "friendly bullet must not hit its own team");
        assert_eq!(agents[0].hp, 100);
        assert_eq!(agents[1].hp, 88);
        assert_eq!(agents[1].last_attacker, Some(AgentId(1)));
        assert_eq!(agents[1].expression, Expression::Hit);
        let kinds: Vec<_> = out.effects().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EffectKind::HitSpark, EffectKind::HitMark]);
        drop(out);
        assert_eq!(cues, vec![SoundCue::Damage]);
    }

    #[test]
    fn test_shield_and_cover_absorb_hits() {
        let tuning = Tuning::default();
        let mut sink = |_c: SoundCue| {};
        let mut out = Outbox::new(&mut sink);
        let cover = [Rect::new(480.0, 280.0, 40.0, 40.0)];
        let mut shielded = agent(2, TeamColor::Blue, 400.0, 300.0);
        shielded.shield = 1;
        let mut agents = vec![shielded, agent(3, TeamColor::Blue, 482.0, 300.0)];
        let mut bullets = vec![
            bullet_at(Vec2::new(400.0, 300.0), TeamColor::Red, 1),
            bullet_at(Vec2::new(472.0, 300.0), TeamColor::Red, 1),
        ];
        let mut objective = Objective::default();
        resolve_bullets(
            &mut bullets,
            &mut agents,
            &mut objective,
            &Terrain::new(&cover, BOUNDS),
            &tuning,
            None,
            &mut out,
        );
        assert!(bullets.is_empty());
        assert_eq!(agents[0].hp, 100);
        assert_eq!(agents[0].shield, 0);
        assert_eq!(agents[1].hp, 100);
        assert!(matches!(out.events()[0], SimEvent::ShieldAbsorbed { .. }));
        assert!(matches!(out.events()[1], SimEvent::CoverAbsorbed { .. }));
    }

    #[test]
    fn test_grenade_explodes_once_and_hurts_everyone() {
        let tuning = Tuning::default();
        let mut sink = |_c: SoundCue| {};
        let mut out = Outbox::new(&mut sink);
        let mut agents = vec![
            agent(1, TeamColor::Red, 400.0, 300.0),
            agent(2, TeamColor::Blue, 450.0, 300.0),
            agent(3, TeamColor::Blue, 600.0, 300.0),
        ];
        let mut g = Grenade::spawn(
            Vec2::new(420.0, 300.0),
            Vec2::new(500.0, 300.0),
            TeamColor::Red,
            AgentId(1),
            &tuning,
        );
        g.fuse = 0.0;
        let mut grenades = vec![g];
        resolve_grenades(&mut grenades, &mut agents, &tuning, &mut out);
        assert!(grenades.is_empty());
        assert_eq!(agents[0].hp, 70);
        assert_eq!(agents[1].hp, 70);
        assert_eq!(agents[2].hp, 100);
        assert_eq!(agents[1].speech, Some(SpeechLine::Argh));
        assert_eq!(out.events().len(), 2);
        assert_eq!(out.effects()[0].kind, EffectKind::Explosion);
    }

    #[test]
    fn test_pickup_consumed_or_expired() {
        let tuning = Tuning::default();
        let mut sink = |_c: SoundCue| {};
        let mut out = Outbox::new(&mut sink);
        let mut agents = vec![agent(1, TeamColor::Red, 400.0, 300.0)];
        let mut pickups = vec![
            Pickup::new(Vec2::new(410.0, 300.0), PickupKind::Shield, 600.0),
            Pickup::new(Vec2::new(100.0, 100.0), PickupKind::Heal, 1.0),
            Pickup::new(Vec2::new(200.0, 100.0), PickupKind::Heal, 600.0),
        ];
        resolve_pickups(
            &mut pickups,
            &mut agents,
            FrameScale::NOMINAL,
            &tuning,
            &mut out,
        );
        assert_eq!(pickups.len(), 1);
        assert_eq!(pickups[0].remaining, 599.0);
        assert_eq!(agents[0].shield, 1);
        assert!(matches!(out.events()[0], SimEvent::PickupConsumed { .. }));
        assert!(matches!(out.events()[1], SimEvent::PickupExpired { .. }));
    }

    #[test]
    fn test_cull_reports_killer_only_if_present() {
        let mut sink = |_c: SoundCue| {};
        let mut out = Outbox::new(&mut sink);
        let mut a = agent(1, TeamColor::Red, 100.0, 100.0);
        a.take_damage(200);
        a.last_attacker = Some(AgentId(2));
        let mut b = agent(3, TeamColor::Red, 200.0, 100.0);
        b.take_damage(200);
        b.last_attacker = Some(AgentId(99));
        let mut agents = vec![a, agent(2, TeamColor::Blue, 300.0, 100.0), b];
        let mut objective = Objective::default();
        assert_eq!(cull_dead(&mut agents, &mut objective, &mut out), 2);
        assert_eq!(agents.len(), 1);
        assert_eq!(
            out.events()[0],
            SimEvent::Killed {
                victim: AgentId(1),
                victim_team: TeamColor::Red,
                killer: Some(AgentId(2))
            }
        );
        assert!(matches!(out.events()[1], SimEvent::Killed { killer: None, .. }));
    }

    #[test]
    fn test_cull_drops_bomb_of_dead_carrier() {
        let mut sink = |_c: SoundCue| {};
        let mut out = Outbox::new(&mut sink);
        let mut carrier = agent(1, TeamColor::Red, 150.0, 120.0);
        carrier.take_damage(500);
        let mut agents = vec![carrier];
        let mut objective = Objective {
            state: BombState::Carried(AgentId(1)),
            ..Objective::default()
        };
        cull_dead(&mut agents, &mut objective, &mut out);
        assert_eq!(objective.dropped_at(), Some(Vec2::new(150.0, 120.0)));
    }
}
