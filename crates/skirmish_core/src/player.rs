//! Player-controlled pawn.
//!
//! The pawn is an ordinary [`Agent`] with `controlled` set. Instead of
//! [`Agent::think`] it is driven by a [`PlayerInput`] sampled once per tick
//! by whatever front end hosts the simulation.

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId, Expression, SpeechLine};
use crate::behavior::{Spawned, ThinkContext};
use crate::config::Tuning;
use crate::events::{SimEvent, SoundCue};
use crate::geometry::Terrain;
use crate::math::Vec2;
use crate::projectile::Bullet;
use crate::role::Role;
use crate::team::TeamColor;

/// One tick of player intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInput {
    /// Desired movement; each axis is clamped to `-1..=1`.
    pub move_axis: Vec2,
    /// World-space aim point.
    pub aim: Vec2,
    /// Trigger held.
    pub fire: bool,
    /// Reload requested.
    pub reload: bool,
    /// Plant requested (objective mode).
    pub plant: bool,
}

fn unit_axis(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

impl Agent {
    /// Create the player pawn: a red rifle with a faster trigger and a slower reload.
    #[must_use]
    pub fn player(id: AgentId, position: Vec2, tuning: &Tuning) -> Self {
        let mut pawn = Self::new(id, TeamColor::Red, Role::Rifle, position, tuning).with_name("You");
        pawn.controlled = true;
        pawn.cadence = tuning.player_cadence;
        pawn.base_cadence = tuning.player_cadence;
        pawn.reload_duration = tuning.player_reload_duration;
        pawn
    }

    /// Apply one tick of player input.
    pub fn drive(
        &mut self,
        input: &PlayerInput,
        terrain: &Terrain<'_>,
        ctx: &mut ThinkContext<'_, '_>,
        spawned: &mut Spawned,
    ) {
        let t = ctx.tuning;
        let fs = ctx.frame_scale.get();

        let axis = Vec2::new(unit_axis(input.move_axis.x), unit_axis(input.move_axis.y));
        if axis != Vec2::ZERO {
            let delta = axis * (self.speed * t.player_speed_factor * fs);
            self.position = terrain.try_move(self.position, delta, self.radius);
        }

        let aim_valid = input.aim.is_finite();
        if aim_valid && input.aim.x != self.position.x {
            self.facing_right = input.aim.x > self.position.x;
        }

        if (input.reload || self.mag == 0) && self.start_reload() {
            self.say(SpeechLine::Reloading, t.speech_ticks * 2.0);
        }

        self.cadence_counter += fs;
        if input.fire
            && aim_valid
            && !self.reloading
            && self.mag > 0
            && self.cadence_counter >= self.cadence
        {
            spawned.bullets.push(Bullet::spawn(
                self.muzzle(t.muzzle_offset),
                input.aim,
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
            self.mag -= 1;
            self.cadence_counter = 0.0;
            self.recoil_timer = 3.0;
            self.expression = Expression::Shooting;
        }

        self.advance_reload(fs);
        self.decay_timers(fs);
        self.position = terrain.push_outside(self.position);
        self.clamp_to(&terrain.bounds);
    }
}
