//! Agent (soldier) state.
//!
//! An [`Agent`] bundles identity, vitals, ammunition, movement and the
//! transient behaviour timers driven by [`crate::behavior`]. Cross-entity
//! references (bullet owners, the bomb carrier, the last attacker) use the
//! stable [`AgentId`] handle, never a direct reference, so removing an agent
//! can never leave anything dangling.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::Tuning;
use crate::geometry::WorldBounds;
use crate::math::Vec2;
use crate::role::Role;
use crate::team::{Side, TeamColor};

/// Stable agent handle, unique for the lifetime of a simulation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic [`AgentId`] allocator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdGen {
    next: u32,
}

impl IdGen {
    /// Allocate the next id.
    pub fn next_id(&mut self) -> AgentId {
        self.next += 1;
        AgentId(self.next)
    }
}

/// Opaque handle to a presentation resource (sprite, sound).
///
/// The core passes these through untouched and never resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey(pub String);

impl ResourceKey {
    /// Create a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

/// Optional presentation handles attached to an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    /// Body sprite.
    pub sprite: Option<ResourceKey>,
    /// Sound played when this agent fires.
    pub weapon_sound: Option<ResourceKey>,
}

/// Cosmetic face state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Expression {
    /// Idle.
    #[default]
    Neutral,
    /// Just fired or healed.
    Shooting,
    /// Just took damage or struck in melee.
    Hit,
}

/// Cosmetic speech bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeechLine {
    /// After firing.
    Bang,
    /// After being shot.
    Ouch,
    /// Caught in an explosion.
    Argh,
    /// After healing an ally.
    Medic,
    /// Started a reload.
    Reloading,
    /// After a melee strike.
    Slash,
}

impl SpeechLine {
    /// Display text.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Bang => "Bang!",
            Self::Ouch => "Ouch!",
            Self::Argh => "Argh!",
            Self::Medic => "Medic!",
            Self::Reloading => "RELOADING",
            Self::Slash => "Slash!",
        }
    }
}

/// Short-lived back-off point used when a target gets too close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackOff {
    /// Point being moved toward.
    pub target: Vec2,
    /// Ticks left before re-evaluating.
    pub remaining: f32,
}

/// Tracks how long an agent has stood still.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StuckTracker {
    /// Position at which the agent was last seen moving.
    pub anchor: Vec2,
    /// Scaled ticks spent within the tolerance of `anchor`.
    pub still_for: f32,
}

/// A combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    /// Stable handle.
    pub id: AgentId,
    /// Cosmetic name.
    pub name: String,
    /// Team membership.
    pub team: TeamColor,
    /// Objective side, set only in objective mode.
    pub side: Option<Side>,
    /// Archetype.
    pub role: Role,

    /// Current hit points, `0..=max_hp`.
    pub hp: i32,
    /// Maximum hit points.
    pub max_hp: i32,
    /// Hits absorbed before hp is touched.
    pub shield: u32,

    /// Rounds in the magazine, `0..=mag_capacity`.
    pub mag: u32,
    /// Magazine size.
    pub mag_capacity: u32,
    /// Spare rounds.
    pub reserve: u32,
    /// Whether a reload is in progress.
    pub reloading: bool,
    /// Ticks left on the current reload.
    pub reload_timer: f32,
    /// Ticks a reload takes.
    pub reload_duration: f32,

    /// Ticks since the last action.
    pub cadence_counter: f32,
    /// Ticks required between actions (jittered after each shot).
    pub cadence: f32,
    /// Unjittered cadence; lowered permanently by fast-reload pickups.
    pub base_cadence: f32,
    /// Damage per bullet.
    pub damage: i32,

    /// Centre position.
    pub position: Vec2,
    /// Collision radius.
    pub radius: f32,
    /// Units per nominal tick.
    pub speed: f32,
    /// Facing direction (sprite mirroring and muzzle side).
    pub facing_right: bool,

    /// Heading for the back line after losing all allies.
    pub retreating: bool,
    /// Active back-off point, if any.
    pub back_off: Option<BackOff>,
    /// Ticks until the next dodge is allowed.
    pub dodge_timer: f32,
    /// Ticks until the next melee strike is allowed.
    pub melee_timer: f32,
    /// Ticks of weapon recoil left (cosmetic).
    pub recoil_timer: f32,
    /// Current face.
    pub expression: Expression,
    /// Current speech bubble.
    pub speech: Option<SpeechLine>,
    /// Ticks the speech bubble stays up.
    pub speech_timer: f32,
    /// Stand-still detection.
    pub stuck: StuckTracker,

    /// Driven by player input instead of AI.
    pub controlled: bool,
    /// Most recent agent to damage this one (kill feed).
    pub last_attacker: Option<AgentId>,
    /// Presentation handles.
    pub appearance: Appearance,
}

impl Agent {
    /// Create a fresh agent with full health and ammunition.
    #[must_use]
    pub fn new(id: AgentId, team: TeamColor, role: Role, position: Vec2, tuning: &Tuning) -> Self {
        let profile = role.profile();
        Self {
            id,
            name: String::new(),
            team,
            side: None,
            role,
            hp: profile.max_hp,
            max_hp: profile.max_hp,
            shield: 0,
            mag: tuning.mag_capacity,
            mag_capacity: tuning.mag_capacity,
            reserve: tuning.reserve_ammo,
            reloading: false,
            reload_timer: 0.0,
            reload_duration: tuning.reload_duration,
            cadence_counter: 0.0,
            cadence: profile.cadence,
            base_cadence: profile.cadence,
            damage: profile.damage,
            position,
            radius: profile.radius,
            speed: profile.speed,
            facing_right: team == TeamColor::Red,
            retreating: false,
            back_off: None,
            dodge_timer: 0.0,
            melee_timer: 0.0,
            recoil_timer: 0.0,
            expression: Expression::Neutral,
            speech: None,
            speech_timer: 0.0,
            stuck: StuckTracker {
                anchor: position,
                still_for: 0.0,
            },
            controlled: false,
            last_attacker: None,
            appearance: Appearance::default(),
        }
    }

    /// Set the cosmetic name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the objective side.
    #[must_use]
    pub fn with_side(mut self, side: Option<Side>) -> Self {
        self.side = side;
        self
    }

    /// Attach presentation handles.
    #[must_use]
    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = appearance;
        self
    }

    /// Whether the agent is still in play.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Whether the agent has no rounds left anywhere.
    #[must_use]
    pub const fn is_out_of_ammo(&self) -> bool {
        self.mag == 0 && self.reserve == 0
    }

    /// Reduce hp, saturating at zero.
    pub fn take_damage(&mut self, amount: i32) {
        self.hp = (self.hp - amount.max(0)).max(0);
    }

    /// Restore hp up to `max_hp`. Returns the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0)).min(self.max_hp);
        self.hp - before
    }

    /// Show the hit face and a pain line.
    pub fn show_hit(&mut self, ticks: f32) {
        self.expression = Expression::Hit;
        self.say(SpeechLine::Ouch, ticks);
    }

    /// Display a speech bubble for `ticks`.
    pub fn say(&mut self, line: SpeechLine, ticks: f32) {
        self.speech = Some(line);
        self.speech_timer = ticks;
    }

    /// Begin reloading if there is anything to load. Returns whether a reload started.
    pub fn start_reload(&mut self) -> bool {
        if self.reloading || self.reserve == 0 || self.mag >= self.mag_capacity {
            return false;
        }
        self.reloading = true;
        self.reload_timer = self.reload_duration;
        true
    }

    /// Count down an active reload and move ammunition when it completes.
    pub fn advance_reload(&mut self, frame_scale: f32) {
        if !self.reloading {
            return;
        }
        self.reload_timer -= frame_scale;
        if self.reload_timer <= 0.0 {
            let needed = self.mag_capacity.saturating_sub(self.mag);
            let loaded = needed.min(self.reserve);
            self.reserve -= loaded;
            self.mag += loaded;
            self.reloading = false;
            self.reload_timer = 0.0;
        }
    }

    /// Where bullets leave the weapon.
    #[must_use]
    pub fn muzzle(&self, offset: f32) -> Vec2 {
        let dx = if self.facing_right { offset } else { -offset };
        Vec2::new(self.position.x + dx, self.position.y)
    }

    /// Clamp the position into the world.
    pub fn clamp_to(&mut self, bounds: &WorldBounds) {
        self.position = bounds.clamp(self.position, self.radius);
    }

    /// Hit points missing from full health.
    #[must_use]
    pub const fn missing_hp(&self) -> i32 {
        self.max_hp - self.hp
    }

    /// Restore full health and ammunition, clearing transient state.
    pub fn refit(&mut self, tuning: &Tuning) {
        self.hp = self.max_hp;
        self.mag_capacity = tuning.mag_capacity;
        self.mag = tuning.mag_capacity;
        self.reserve = tuning.reserve_ammo;
        self.reloading = false;
        self.reload_timer = 0.0;
        self.retreating = false;
        self.back_off = None;
    }
}
