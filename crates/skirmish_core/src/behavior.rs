//! Per-tick agent decision step.
//!
//! [`Agent::think`] runs once per AI agent per tick in a fixed order:
//!
//! 1. Retreat check (alone on the field)
//! 2. Dodge the nearest bullet
//! 3. Target the nearest enemy and face it
//! 4. Walk to a nearby crate
//! 5. Engagement positioning (advance, back off, close to melee, seek cover)
//! 6. Cadence and reload bookkeeping
//! 7. Role action (fire, throw, heal, reload or sidestep)
//! 8. Timer decay
//! 9. Obstacle containment correction
//! 10. Stuck-break jitter
//!
//! The bomb objective is deliberately absent here; the driver composes
//! [`crate::objective::BombPolicy`] on top in objective mode.
//!
//! Every distance travelled and every countdown is multiplied by the frame
//! scale, so the same wall-clock time yields the same behaviour at any tick rate.

use crate::agent::{Agent, AgentId, BackOff, Expression, SpeechLine, StuckTracker};
use crate::config::Tuning;
use crate::events::{Outbox, SimEvent, SoundCue};
use crate::geometry::Terrain;
use crate::math::{FrameScale, Vec2};
use crate::pickup::{Pickup, PickupKind};
use crate::projectile::{Bullet, Grenade};
use crate::rng::{self, SimRng};
use crate::role::Role;
use crate::team::TeamColor;

/// Cosmetic recoil duration after a shot.
const RECOIL_TICKS: f32 = 3.0;

/// Non-owning view of every agent except the one thinking.
///
/// Built from the two halves of a `split_at_mut` around the thinking agent,
/// so no roster is ever copied.
#[derive(Debug, Clone, Copy)]
pub struct Others<'a> {
    head: &'a [Agent],
    tail: &'a [Agent],
}

impl<'a> Others<'a> {
    /// Create a view from the agents before and after the thinking one.
    #[must_use]
    pub const fn new(head: &'a [Agent], tail: &'a [Agent]) -> Self {
        Self { head, tail }
    }

    /// Every other agent.
    pub fn iter(self) -> impl Iterator<Item = &'a Agent> {
        self.head.iter().chain(self.tail.iter())
    }

    /// Living agents not on `team`.
    pub fn enemies_of(self, team: TeamColor) -> impl Iterator<Item = &'a Agent> {
        self.iter().filter(move |a| a.team != team && a.is_alive())
    }

    /// Living agents on `team`.
    pub fn allies_of(self, team: TeamColor) -> impl Iterator<Item = &'a Agent> {
        self.iter().filter(move |a| a.team == team && a.is_alive())
    }
}

/// Read-only world state an agent reasons about.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    /// All other agents.
    pub others: Others<'a>,
    /// Live bullets.
    pub bullets: &'a [Bullet],
    /// Crates on the ground.
    pub pickups: &'a [Pickup],
    /// Cover and world bounds.
    pub terrain: Terrain<'a>,
}

/// Mutable per-tick context shared by every agent step.
pub struct ThinkContext<'a, 'o> {
    /// Current frame scale.
    pub frame_scale: FrameScale,
    /// Gameplay constants.
    pub tuning: &'a Tuning,
    /// Simulation random source.
    pub rng: &'a mut SimRng,
    /// Event, effect and sound sink.
    pub out: &'a mut Outbox<'o>,
}

/// Projectiles created during an agent step, appended to the world afterwards.
#[derive(Debug, Clone, Default)]
pub struct Spawned {
    /// Fired bullets.
    pub bullets: Vec<Bullet>,
    /// Thrown grenades.
    pub grenades: Vec<Grenade>,
}

impl Spawned {
    /// Whether nothing was spawned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty() && self.grenades.is_empty()
    }
}

/// A medic's request to heal an ally, applied by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealIntent {
    /// Patient.
    pub target: AgentId,
    /// Hit points to restore.
    pub amount: i32,
}

/// Side effects of a decision step that touch other agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepOutcome {
    /// Heal to apply to an ally.
    pub heal: Option<HealIntent>,
}

fn nearest_agent<'a>(
    agents: impl Iterator<Item = &'a Agent>,
    from: Vec2,
) -> Option<&'a Agent> {
    agents.min_by(|a, b| {
        from.distance_squared(a.position)
            .total_cmp(&from.distance_squared(b.position))
    })
}

fn nearest_pickup<'a>(
    pickups: impl Iterator<Item = &'a Pickup>,
    from: Vec2,
) -> Option<&'a Pickup> {
    pickups.min_by(|a, b| {
        from.distance_squared(a.position)
            .total_cmp(&from.distance_squared(b.position))
    })
}

impl Agent {
    /// Run one AI decision step.
    ///
    /// Projectiles this agent fires are pushed into `spawned`; a medic heal
    /// is returned for the driver to apply to the chosen ally.
    pub fn think(
        &mut self,
        world: &Surroundings<'_>,
        ctx: &mut ThinkContext<'_, '_>,
        spawned: &mut Spawned,
    ) -> StepOutcome {
        let fs = ctx.frame_scale.get();

        self.update_retreat(world, ctx);
        self.dodge(world, ctx);

        let target = nearest_agent(world.others.enemies_of(self.team), self.position);
        if let Some(target) = target {
            self.facing_right = target.position.x > self.position.x;
        }

        self.seek_pickup(world, ctx);

        if let Some(target) = target {
            if !world.terrain.in_cover(self.position) {
                self.engage(target, world, ctx);
            }
        }

        self.cadence_counter += fs;
        self.advance_reload(fs);

        let outcome = match target {
            Some(target) if self.cadence_counter >= self.cadence => {
                self.act(target, world, ctx, spawned)
            }
            _ => StepOutcome::default(),
        };

        self.decay_timers(fs);
        self.position = world.terrain.push_outside(self.position);
        self.clamp_to(&world.terrain.bounds);
        self.break_stalemate(&world.terrain, ctx);

        outcome
    }

    fn update_retreat(&mut self, world: &Surroundings<'_>, ctx: &mut ThinkContext<'_, '_>) {
        let t = ctx.tuning;
        let fs = ctx.frame_scale.get();

        if !self.retreating
            && world.others.allies_of(self.team).next().is_none()
            && rng::chance(ctx.rng, t.retreat_chance * f64::from(fs))
        {
            self.retreating = true;
        }
        if !self.retreating {
            return;
        }

        let bounds = world.terrain.bounds;
        let back_x = match self.team {
            TeamColor::Red => t.back_line_margin,
            TeamColor::Blue => bounds.width - t.back_line_margin,
        };
        let before = self.position;
        let dx = back_x - self.position.x;
        if dx.abs() > 5.0 {
            let step = (self.speed * t.retreat_speed_factor * fs).min(dx.abs()) * dx.signum();
            self.position = world
                .terrain
                .try_move(self.position, Vec2::new(step, 0.0), self.radius);
        }

        // Pinned: at the back line or unable to make progress toward it.
        let pinned = (back_x - self.position.x).abs() <= 5.0
            || self.position.distance_squared(before) < 1e-6;
        if pinned {
            let threat = nearest_agent(world.others.enemies_of(self.team), self.position);
            if threat.is_some_and(|e| e.position.distance(self.position) < t.retreat_cancel_distance)
            {
                self.retreating = false;
            }
        }
    }

    fn dodge(&mut self, world: &Surroundings<'_>, ctx: &mut ThinkContext<'_, '_>) {
        let fs = ctx.frame_scale.get();
        if self.dodge_timer > 0.0 {
            self.dodge_timer = (self.dodge_timer - fs).max(0.0);
            return;
        }

        let me = self.position;
        let threat = world.bullets.iter().min_by(|a, b| {
                me.distance_squared(a.position)
                    .total_cmp(&me.distance_squared(b.position))
            });
        let Some(bullet) = threat else {
            return;
        };
        if bullet.position.distance(me) >= ctx.tuning.dodge_radius {
            return;
        }

        let sideways = bullet.velocity.perpendicular().normalize_or(Vec2::UNIT_X);
        let away = (me - bullet.position).normalize_or(sideways);
        self.position = world
            .terrain
            .try_move(me, away * (self.speed * fs), self.radius);
        self.dodge_timer = ctx.tuning.dodge_cooldown;
    }

    fn seek_pickup(&mut self, world: &Surroundings<'_>, ctx: &mut ThinkContext<'_, '_>) {
        let fs = ctx.frame_scale.get();
        let Some(pickup) = nearest_pickup(world.pickups.iter(), self.position) else {
            return;
        };
        if pickup.position.distance(self.position) < ctx.tuning.pickup_seek_radius * fs {
            self.position =
                world
                    .terrain
                    .step_toward(self.position, pickup.position, self.speed * fs, self.radius);
        }
    }

    fn engage(&mut self, target: &Agent, world: &Surroundings<'_>, ctx: &mut ThinkContext<'_, '_>) {
        let t = ctx.tuning;
        let fs = ctx.frame_scale.get();
        let terrain = &world.terrain;
        let step = self.speed * fs;
        let desired = self.role.profile().engage_distance;
        let distance = self.position.distance(target.position);

        if self.is_out_of_ammo() {
            // Head for a fast-reload crate, otherwise close in for melee.
            let supply = nearest_pickup(
                world
                    .pickups
                    .iter()
                    .filter(|p| p.kind == PickupKind::FastReload),
                self.position,
            );
            let goal = supply.map_or(target.position, |p| p.position);
            self.position = terrain.step_toward(self.position, goal, step, self.radius);
            return;
        }

        if distance > desired + t.engage_slack {
            self.back_off = None;
            self.position = terrain.step_toward(self.position, target.position, step, self.radius);
        } else if distance < (desired * t.keep_distance_factor).max(t.min_keep_distance)
            && self.role.keeps_distance()
            && !self.controlled
        {
            let back_off = match self.back_off {
                Some(active) if active.remaining > 0.0 => active,
                _ => {
                    let fallback = match self.team {
                        TeamColor::Red => -Vec2::UNIT_X,
                        TeamColor::Blue => Vec2::UNIT_X,
                    };
                    let away = (self.position - target.position).normalize_or(fallback);
                    BackOff {
                        target: terrain.bounds.clamp(
                            target.position + away * (desired * t.back_off_factor),
                            self.radius,
                        ),
                        remaining: t.back_off_ticks,
                    }
                }
            };
            self.position = terrain.step_toward(
                self.position,
                back_off.target,
                step * t.retreat_speed_factor,
                self.radius,
            );
            let remaining = back_off.remaining - fs;
            self.back_off = (remaining > 0.0).then_some(BackOff {
                remaining,
                ..back_off
            });
        }

        if self.reloading {
            if let Some(cover) = terrain.nearest_obstacle(self.position) {
                self.position = terrain.step_toward(self.position, cover.center(), step, self.radius);
            }
        }
    }

    fn act(
        &mut self,
        target: &Agent,
        world: &Surroundings<'_>,
        ctx: &mut ThinkContext<'_, '_>,
        spawned: &mut Spawned,
    ) -> StepOutcome {
        let t = ctx.tuning;

        if self.role == Role::Medic {
            let me = self.position;
            let patient = nearest_agent(
                world.others.allies_of(self.team).filter(|a| {
                    a.hp <= a.max_hp - t.medic_threshold && a.position.distance(me) < t.medic_range
                }),
                me,
            );
            let Some(patient) = patient else {
                return StepOutcome::default();
            };
            self.cadence_counter = 0.0;
            self.expression = Expression::Shooting;
            self.say(SpeechLine::Medic, t.speech_ticks);
            return StepOutcome {
                heal: Some(HealIntent {
                    target: patient.id,
                    amount: t.medic_heal,
                }),
            };
        }

        if self.mag == 0 {
            if self.start_reload() {
                self.say(SpeechLine::Reloading, t.speech_ticks * 2.0);
            }
            return StepOutcome::default();
        }
        if self.reloading {
            return StepOutcome::default();
        }

        let throw = self.role == Role::Grenadier && rng::chance(ctx.rng, t.grenade_chance);
        if !world
            .terrain
            .line_of_sight(self.position, target.position, t.sight_step)
        {
            self.sidestep(target.position, &world.terrain, ctx);
            return StepOutcome::default();
        }

        if throw {
            spawned.grenades.push(Grenade::spawn(
                self.position,
                target.position,
                self.team,
                self.id,
                t,
            ));
            ctx.out.emit(SimEvent::GrenadeThrown {
                thrower: self.id,
                team: self.team,
            });
            ctx.out.sound(SoundCue::GrenadeThrow);
        } else {
            spawned.bullets.push(Bullet::spawn(
                self.muzzle(t.muzzle_offset),
                target.position,
                self.team,
                self.damage,
                self.id,
                t,
            ));
            ctx.out.emit(SimEvent::Shot {
                shooter: self.id,
                team: self.team,
            });
            ctx.out.sound(SoundCue::Shot {
                shooter: self.id,
                weapon_sound: self.appearance.weapon_sound.clone(),
            });
        }

        self.mag -= 1;
        self.cadence_counter = 0.0;
        self.cadence = (self.base_cadence
            * rng::uniform(ctx.rng, t.cadence_jitter_min, t.cadence_jitter_max))
        .max(t.min_cadence);
        self.expression = Expression::Shooting;
        self.say(SpeechLine::Bang, t.speech_ticks);
        self.recoil_timer = RECOIL_TICKS;
        StepOutcome::default()
    }

    fn sidestep(&mut self, toward: Vec2, terrain: &Terrain<'_>, ctx: &mut ThinkContext<'_, '_>) {
        let lateral = self.position.direction_to(toward).perpendicular() * rng::sign(ctx.rng);
        let delta = lateral * (self.speed * ctx.frame_scale.get());
        self.position = terrain.try_move(self.position, delta, self.radius);
    }

    /// Count down cosmetic and cooldown timers, floored at zero.
    pub(crate) fn decay_timers(&mut self, fs: f32) {
        if self.speech_timer > 0.0 {
            self.speech_timer = (self.speech_timer - fs).max(0.0);
            if self.speech_timer == 0.0 {
                self.speech = None;
                self.expression = Expression::Neutral;
            }
        }
        self.recoil_timer = (self.recoil_timer - fs).max(0.0);
        self.melee_timer = (self.melee_timer - fs).max(0.0);
    }

    fn break_stalemate(&mut self, terrain: &Terrain<'_>, ctx: &mut ThinkContext<'_, '_>) {
        let t = ctx.tuning;
        if self.position.distance(self.stuck.anchor) > t.stuck_epsilon {
            self.stuck = StuckTracker {
                anchor: self.position,
                still_for: 0.0,
            };
            return;
        }
        self.stuck.still_for += ctx.frame_scale.get();
        if self.stuck.still_for > t.stuck_threshold {
            let jitter = Vec2::new(
                rng::symmetric(ctx.rng, t.stuck_jitter),
                rng::symmetric(ctx.rng, t.stuck_jitter),
            );
            self.position = terrain.try_move(self.position, jitter, self.radius);
            self.stuck = StuckTracker {
                anchor: self.position,
                still_for: 0.0,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, WorldBounds};
    use crate::rng::seeded;

    const BOUNDS: WorldBounds = WorldBounds::new(800.0, 600.0);

    fn agent(id: u32, team: TeamColor, role: Role, x: f32, y: f32) -> Agent {
        Agent::new(AgentId(id), team, role, Vec2::new(x, y), &Tuning::default())
    }

    struct Harness {
        tuning: Tuning,
        rng: SimRng,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                tuning: Tuning::default(),
                rng: seeded(99),
            }
        }

        fn think(
            &mut self,
            me: &mut Agent,
            others: &[Agent],
            bullets: &[Bullet],
            pickups: &[Pickup],
            obstacles: &[Rect],
        ) -> (StepOutcome, Spawned, Vec<SimEvent>) {
            let mut sink = |_cue: SoundCue| {};
            let mut out = Outbox::new(&mut sink);
            let mut spawned = Spawned::default();
            let world = Surroundings {
                others: Others::new(others, &[]),
                bullets,
                pickups,
                terrain: Terrain::new(obstacles, BOUNDS),
            };
            let mut ctx = ThinkContext {
                frame_scale: FrameScale::NOMINAL,
                tuning: &self.tuning,
                rng: &mut self.rng,
                out: &mut out,
            };
            let outcome = me.think(&world, &mut ctx, &mut spawned);
            let events = out.finish().events;
            (outcome, spawned, events)
        }
    }

    #[test]
    fn test_faces_nearest_enemy() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Rifle, 400.0, 300.0);
        let others = [
            agent(2, TeamColor::Red, Role::Rifle, 420.0, 100.0),
            agent(3, TeamColor::Blue, Role::Rifle, 200.0, 300.0),
            agent(4, TeamColor::Blue, Role::Rifle, 700.0, 300.0),
        ];
        h.think(&mut me, &others, &[], &[], &[]);
        assert!(!me.facing_right);
    }

    #[test]
    fn test_advances_when_out_of_range() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Rifle, 100.0, 300.0);
        let others = [
            agent(2, TeamColor::Red, Role::Rifle, 60.0, 100.0),
            agent(3, TeamColor::Blue, Role::Rifle, 700.0, 300.0),
        ];
        h.think(&mut me, &others, &[], &[], &[]);
        assert!((me.position.x - 101.5).abs() < 1e-4);
    }

    #[test]
    fn test_fires_when_cadence_ready() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Sniper, 100.0, 300.0);
        me.cadence_counter = 100.0;
        let others = [
            agent(2, TeamColor::Red, Role::Rifle, 60.0, 100.0),
            agent(3, TeamColor::Blue, Role::Rifle, 400.0, 300.0),
        ];
        let (_, spawned, events) = h.think(&mut me, &others, &[], &[], &[]);
        assert_eq!(spawned.bullets.len(), 1);
        assert_eq!(me.mag, 29);
        assert_eq!(me.cadence_counter, 0.0);
        assert!(me.cadence >= 45.0 * 0.85 && me.cadence <= 45.0 * 1.35);
        assert_eq!(spawned.bullets[0].damage, 40);
        assert_eq!(spawned.bullets[0].position, Vec2::new(115.0, 300.0));
        assert!(matches!(events[0], SimEvent::Shot { .. }));
    }

    #[test]
    fn test_blocked_sight_line_sidesteps_instead_of_firing() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Sniper, 100.0, 300.0);
        me.cadence_counter = 100.0;
        let others = [
            agent(2, TeamColor::Red, Role::Rifle, 60.0, 100.0),
            agent(3, TeamColor::Blue, Role::Rifle, 400.0, 300.0),
        ];
        let wall = [Rect::new(250.0, 200.0, 20.0, 200.0)];
        let (_, spawned, _) = h.think(&mut me, &others, &[], &[], &wall);
        assert!(spawned.is_empty());
        assert_eq!(me.mag, 30);
        assert!((me.position.y - 300.0).abs() > 1.0);
    }

    #[test]
    fn test_empty_magazine_starts_reload() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Rifle, 100.0, 300.0);
        me.mag = 0;
        me.cadence_counter = 100.0;
        let others = [
            agent(2, TeamColor::Red, Role::Rifle, 60.0, 100.0),
            agent(3, TeamColor::Blue, Role::Rifle, 320.0, 300.0),
        ];
        let (_, spawned, _) = h.think(&mut me, &others, &[], &[], &[]);
        assert!(spawned.is_empty());
        assert!(me.reloading);
        assert_eq!(me.speech, Some(SpeechLine::Reloading));
    }

    #[test]
    fn test_medic_requests_heal_for_damaged_ally() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Blue, Role::Medic, 500.0, 300.0);
        me.cadence_counter = 100.0;
        let mut hurt = agent(2, TeamColor::Blue, Role::Rifle, 560.0, 300.0);
        hurt.take_damage(50);
        let others = [hurt, agent(3, TeamColor::Red, Role::Rifle, 100.0, 300.0)];
        let (outcome, spawned, _) = h.think(&mut me, &others, &[], &[], &[]);
        assert_eq!(
            outcome.heal,
            Some(HealIntent {
                target: AgentId(2),
                amount: 25
            })
        );
        assert!(spawned.is_empty());
        assert_eq!(me.cadence_counter, 0.0);
    }

    #[test]
    fn test_medic_keeps_cadence_without_patient() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Blue, Role::Medic, 500.0, 300.0);
        me.cadence_counter = 100.0;
        let others = [
            agent(2, TeamColor::Blue, Role::Rifle, 560.0, 300.0),
            agent(3, TeamColor::Red, Role::Rifle, 100.0, 300.0),
        ];
        let (outcome, _, _) = h.think(&mut me, &others, &[], &[], &[]);
        assert!(outcome.heal.is_none());
        assert!(me.cadence_counter > 100.0);
    }

    #[test]
    fn test_dodges_friendly_bullet_too() {
        let mut h = Harness::new();
        let tuning = Tuning::default();
        let mut me = agent(1, TeamColor::Red, Role::Heavy, 400.0, 300.0);
        let others = [agent(2, TeamColor::Red, Role::Rifle, 400.0, 100.0)];

        let own = [Bullet::spawn(
            Vec2::new(400.0, 320.0),
            Vec2::new(400.0, 330.0),
            TeamColor::Red,
            5,
            AgentId(1),
            &tuning,
        )];
        let before = me.position;
        h.think(&mut me, &others, &own, &[], &[]);
        assert_eq!(me.dodge_timer, 30.0);
        assert!(me.position.y < before.y);

        // Cooling down: the next tick only counts the timer down.
        h.think(&mut me, &others, &own, &[], &[]);
        assert_eq!(me.dodge_timer, 29.0);
    }

    #[test]
    fn test_ignores_bullets_beyond_dodge_radius() {
        let mut h = Harness::new();
        let tuning = Tuning::default();
        let mut me = agent(1, TeamColor::Red, Role::Heavy, 400.0, 300.0);
        let others = [agent(2, TeamColor::Blue, Role::Rifle, 400.0, 100.0)];

        let distant = [Bullet::spawn(
            Vec2::new(400.0, 345.0),
            Vec2::new(400.0, 360.0),
            TeamColor::Blue,
            5,
            AgentId(2),
            &tuning,
        )];
        h.think(&mut me, &others, &distant, &[], &[]);
        assert_eq!(me.dodge_timer, 0.0);
    }

    #[test]
    fn test_backs_off_when_too_close() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Sniper, 400.0, 300.0);
        let others = [
            agent(2, TeamColor::Red, Role::Rifle, 100.0, 100.0),
            agent(3, TeamColor::Blue, Role::Rifle, 500.0, 300.0),
        ];
        h.think(&mut me, &others, &[], &[], &[]);
        assert!(me.position.x < 400.0);
        assert!(me.back_off.is_some());
    }

    #[test]
    fn test_heavy_holds_ground_when_close() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Heavy, 400.0, 300.0);
        let others = [
            agent(2, TeamColor::Red, Role::Rifle, 100.0, 100.0),
            agent(3, TeamColor::Blue, Role::Rifle, 425.0, 300.0),
        ];
        h.think(&mut me, &others, &[], &[], &[]);
        assert!(me.back_off.is_none());
        assert_eq!(me.position, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_seeks_nearby_pickup() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Rifle, 300.0, 300.0);
        let others = [agent(2, TeamColor::Red, Role::Rifle, 100.0, 100.0)];
        let pickups = [Pickup::new(
            Vec2::new(300.0, 400.0),
            PickupKind::Shield,
            600.0,
        )];
        h.think(&mut me, &others, &[], &pickups, &[]);
        assert!((me.position.y - 301.5).abs() < 1e-4);
    }

    #[test]
    fn test_containment_pushes_out_of_cover() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Rifle, 305.0, 300.0);
        let others = [agent(2, TeamColor::Red, Role::Rifle, 100.0, 100.0)];
        let cover = [Rect::new(300.0, 250.0, 50.0, 100.0)];
        h.think(&mut me, &others, &[], &[], &cover);
        assert_eq!(me.position, Vec2::new(299.5, 300.0));
    }

    #[test]
    fn test_stuck_agent_is_jittered() {
        let mut h = Harness::new();
        let mut me = agent(1, TeamColor::Red, Role::Rifle, 400.0, 300.0);
        let others = [agent(2, TeamColor::Red, Role::Rifle, 100.0, 100.0)];
        for _ in 0..10 {
            h.think(&mut me, &others, &[], &[], &[]);
            assert_eq!(me.position, Vec2::new(400.0, 300.0));
        }
        h.think(&mut me, &others, &[], &[], &[]);
        assert_ne!(me.position, Vec2::new(400.0, 300.0));
        assert_eq!(me.stuck.still_for, 0.0);
    }

    #[test]
    fn test_lone_agent_may_retreat_to_back_line() {
        let mut h = Harness::new();
        h.tuning.retreat_chance = 1.0;
        let mut me = agent(1, TeamColor::Blue, Role::Rifle, 400.0, 300.0);
        h.think(&mut me, &[], &[], &[], &[]);
        assert!(me.retreating);
        assert!((me.position.x - 402.25).abs() < 1e-4);
    }
}
