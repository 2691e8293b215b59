//! Bullet and grenade ballistics.
//!
//! Projectiles only mutate their own state while integrating, so the
//! integration pass may run across worker threads (`parallel` feature).
//! Collisions are resolved afterwards by [`crate::combat`].

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId, Expression, SpeechLine};
use crate::config::Tuning;
use crate::geometry::WorldBounds;
use crate::math::{clamp_range, FrameScale, Vec2};
use crate::team::TeamColor;

/// A straight-flying bullet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Current position.
    pub position: Vec2,
    /// Velocity per nominal tick.
    pub velocity: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Damage on hit.
    pub damage: i32,
    /// Shooter. May no longer exist.
    pub owner: AgentId,
    /// Team of the shooter; bullets never hit their own team.
    pub team: TeamColor,
}

impl Bullet {
    /// Fire a bullet from `origin` toward `aim`.
    ///
    /// If `aim` coincides with `origin` the bullet has zero velocity and
    /// simply sits there until something consumes it.
    #[must_use]
    pub fn spawn(
        origin: Vec2,
        aim: Vec2,
        team: TeamColor,
        damage: i32,
        owner: AgentId,
        tuning: &Tuning,
    ) -> Self {
        Self {
            position: origin,
            velocity: origin.direction_to(aim) * tuning.bullet_speed,
            radius: tuning.bullet_radius,
            damage,
            owner,
            team,
        }
    }

    /// Advance by one tick.
    pub fn tick(&mut self, frame_scale: FrameScale) {
        self.position += self.velocity * frame_scale.get();
    }

    /// Whether the bullet has left the world.
    #[must_use]
    pub fn is_out_of_bounds(&self, bounds: &WorldBounds) -> bool {
        !bounds.contains(self.position)
    }
}

/// A thrown grenade: slows down, bounces off the world edge, then explodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grenade {
    /// Current position.
    pub position: Vec2,
    /// Velocity per nominal tick.
    pub velocity: Vec2,
    /// Collision radius used for edge bounces.
    pub radius: f32,
    /// Ticks until detonation.
    pub fuse: f32,
    /// Fraction of velocity kept on a bounce.
    pub bounce: f32,
    /// Velocity multiplier per nominal tick.
    pub decay: f32,
    /// Thrower. May no longer exist.
    pub owner: AgentId,
    /// Team of the thrower (explosions still hurt everyone).
    pub team: TeamColor,
}

impl Grenade {
    /// Throw a grenade from `origin` toward `aim`.
    #[must_use]
    pub fn spawn(
        origin: Vec2,
        aim: Vec2,
        team: TeamColor,
        owner: AgentId,
        tuning: &Tuning,
    ) -> Self {
        Self {
            position: origin,
            velocity: origin.direction_to(aim) * tuning.grenade_speed,
            radius: tuning.grenade_radius,
            fuse: tuning.grenade_fuse,
            bounce: tuning.grenade_bounce,
            decay: tuning.grenade_decay,
            owner,
            team,
        }
    }

    /// Advance by one tick.
    pub fn tick(&mut self, frame_scale: FrameScale, bounds: &WorldBounds) {
        let fs = frame_scale.get();
        self.position += self.velocity * fs;
        self.velocity *= self.decay.powf(fs);

        let r = self.radius;
        if self.position.x < r || self.position.x > bounds.width - r {
            self.velocity.x *= -self.bounce;
            self.position.x = clamp_range(self.position.x, r, bounds.width - r);
        }
        if self.position.y < r || self.position.y > bounds.height - r {
            self.velocity.y *= -self.bounce;
            self.position.y = clamp_range(self.position.y, r, bounds.height - r);
        }
        self.fuse -= fs;
    }

    /// Whether the fuse has run out.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.fuse <= 0.0
    }

    /// Damage every agent within the blast radius, ignoring cover and team.
    ///
    /// Returns the ids of the agents that were hit.
    pub fn explode(&self, agents: &mut [Agent], tuning: &Tuning) -> Vec<AgentId> {
        let mut hit = Vec::new();
        for agent in agents.iter_mut() {
            if agent.is_alive() && agent.position.distance(self.position) < tuning.explosion_radius {
                agent.take_damage(tuning.explosion_damage);
                agent.expression = Expression::Hit;
                agent.say(SpeechLine::Argh, tuning.speech_ticks);
                agent.last_attacker = Some(self.owner);
                hit.push(agent.id);
            }
        }
        hit
    }
}

/// Integrate every live projectile by one tick.
pub fn integrate(
    bullets: &mut [Bullet],
    grenades: &mut [Grenade],
    frame_scale: FrameScale,
    bounds: &WorldBounds,
) {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        bullets.par_iter_mut().for_each(|b| b.tick(frame_scale));
        grenades
            .par_iter_mut()
            .for_each(|g| g.tick(frame_scale, bounds));
    }
    #[cfg(not(feature = "parallel"))]
    {
        bullets.iter_mut().for_each(|b| b.tick(frame_scale));
        grenades
            .iter_mut()
            .for_each(|g| g.tick(frame_scale, bounds));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> Tuning {
        Tuning::default()
    }

    #[test]
    fn test_bullet_starts_at_origin() {
        let b = Bullet::spawn(
            Vec2::new(5.0, 5.0),
            Vec2::new(50.0, 5.0),
            TeamColor::Red,
            12,
            AgentId(1),
            &tuning(),
        );
        assert_eq!(b.position, Vec2::new(5.0, 5.0));
        assert_eq!(b.velocity, Vec2::new(7.0, 0.0));
    }

    #[test]
    fn test_bullet_moves_linearly() {
        let mut b = Bullet::spawn(
            Vec2::ZERO,
            Vec2::new(0.0, 10.0),
            TeamColor::Blue,
            12,
            AgentId(1),
            &tuning(),
        );
        let fs = FrameScale::new(0.5);
        for _ in 0..4 {
            b.tick(fs);
        }
        assert!((b.position.y - 14.0).abs() < 1e-5);
    }

    #[test]
    fn test_bullet_degenerate_aim() {
        let b = Bullet::spawn(
            Vec2::new(1.0, 1.0),
            Vec2::new(1.0, 1.0),
            TeamColor::Red,
            12,
            AgentId(1),
            &tuning(),
        );
        assert_eq!(b.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_grenade_decays() {
        let mut g = Grenade::spawn(
            Vec2::new(400.0, 300.0),
            Vec2::new(500.0, 300.0),
            TeamColor::Red,
            AgentId(1),
            &tuning(),
        );
        g.tick(FrameScale::NOMINAL, &WorldBounds::new(800.0, 600.0));
        assert!((g.velocity.x - 3.0 * 0.995).abs() < 1e-5);
        assert_eq!(g.fuse, 89.0);
    }

    #[test]
    fn test_grenade_bounces_off_edge() {
        let bounds = WorldBounds::new(800.0, 600.0);
        let mut g = Grenade::spawn(
            Vec2::new(792.0, 300.0),
            Vec2::new(900.0, 300.0),
            TeamColor::Red,
            AgentId(1),
            &tuning(),
        );
        g.tick(FrameScale::NOMINAL, &bounds);
        assert_eq!(g.position.x, 794.0);
        assert!(g.velocity.x < 0.0);
        assert!((g.velocity.x + 3.0 * 0.995 * 0.6).abs() < 1e-5);
    }

    #[test]
    fn test_integrate_moves_everything() {
        let t = tuning();
        let mut bullets = vec![Bullet::spawn(
            Vec2::new(10.0, 10.0),
            Vec2::new(20.0, 10.0),
            TeamColor::Red,
            1,
            AgentId(1),
            &t,
        )];
        let mut grenades = vec![Grenade::spawn(
            Vec2::new(100.0, 100.0),
            Vec2::new(100.0, 200.0),
            TeamColor::Blue,
            AgentId(2),
            &t,
        )];
        integrate(
            &mut bullets,
            &mut grenades,
            FrameScale::NOMINAL,
            &WorldBounds::new(800.0, 600.0),
        );
        assert_eq!(bullets[0].position, Vec2::new(17.0, 10.0));
        assert_eq!(grenades[0].position, Vec2::new(100.0, 103.0));
    }
}
