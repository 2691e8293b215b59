//! Events emitted by a simulation tick.
//!
//! The core never renders or plays audio. Instead each tick returns
//! [`TickEvents`] holding gameplay records, presentation effects
//! (position + kind) and sound cues for the presentation layer to act on.

use serde::{Deserialize, Serialize};

use crate::agent::{AgentId, ResourceKey};
use crate::math::Vec2;
use crate::pickup::PickupKind;
use crate::round::{RoundEndReason, Score};
use crate::team::TeamColor;

/// Something the presentation layer should announce audibly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// A shot was fired; carries the shooter's weapon sound if one is attached.
    Shot {
        /// Who fired.
        shooter: AgentId,
        /// Weapon sound handle.
        weapon_sound: Option<ResourceKey>,
    },
    /// A grenade left someone's hand.
    GrenadeThrow,
    /// A grenade went off.
    Explosion,
    /// An agent took bullet damage.
    Damage,
}

/// Kind of visual effect to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Bullet stopped by cover.
    BulletImpact,
    /// Bullet struck an agent.
    HitSpark,
    /// Grenade detonation.
    Explosion,
    /// Player-fired bullet connected.
    HitMark,
}

/// A visual effect request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Where to draw it.
    pub position: Vec2,
    /// What to draw.
    pub kind: EffectKind,
}

/// How damage was dealt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageCause {
    /// Bullet hit.
    Bullet,
    /// Grenade blast.
    Explosion,
    /// Melee strike from overlapping.
    Melee,
}

/// Gameplay record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// A bullet was fired.
    Shot {
        /// Shooter.
        shooter: AgentId,
        /// Shooter's team.
        team: TeamColor,
    },
    /// A grenade was thrown.
    GrenadeThrown {
        /// Thrower.
        thrower: AgentId,
        /// Thrower's team.
        team: TeamColor,
    },
    /// An agent lost hit points.
    Damaged {
        /// Who was hurt.
        victim: AgentId,
        /// Source agent; may since have been removed.
        attacker: AgentId,
        /// Team credited with the damage.
        attacker_team: TeamColor,
        /// Hit points removed (before saturation).
        amount: i32,
        /// Source of the damage.
        cause: DamageCause,
    },
    /// A shield charge absorbed a bullet.
    ShieldAbsorbed {
        /// Shield owner.
        victim: AgentId,
    },
    /// The victim stood in cover and the bullet did nothing.
    CoverAbsorbed {
        /// Covered agent.
        victim: AgentId,
    },
    /// A medic restored hit points.
    Healed {
        /// Medic.
        medic: AgentId,
        /// Patient.
        target: AgentId,
        /// Hit points restored.
        amount: i32,
    },
    /// An agent was removed at zero hit points.
    Killed {
        /// Dead agent.
        victim: AgentId,
        /// Dead agent's team.
        victim_team: TeamColor,
        /// Last attacker, if it still exists.
        killer: Option<AgentId>,
    },
    /// A crate appeared.
    PickupSpawned {
        /// Crate kind.
        kind: PickupKind,
        /// Crate position.
        position: Vec2,
    },
    /// A crate was consumed.
    PickupConsumed {
        /// Consumer.
        agent: AgentId,
        /// Consumer's team.
        team: TeamColor,
        /// Crate kind.
        kind: PickupKind,
    },
    /// A crate expired untouched.
    PickupExpired {
        /// Crate kind.
        kind: PickupKind,
    },
    /// The bomb was handed to or picked up by an agent.
    ObjectiveTaken {
        /// New carrier.
        agent: AgentId,
    },
    /// The bomb fell to the ground.
    ObjectiveDropped {
        /// Where it lies.
        position: Vec2,
    },
    /// The bomb was planted.
    ObjectivePlanted {
        /// Planter.
        agent: AgentId,
        /// Planter's team.
        team: TeamColor,
    },
    /// A round ended and a team was credited.
    RoundEnded {
        /// Team credited.
        winner: TeamColor,
        /// Why the round ended.
        reason: RoundEndReason,
        /// Score after crediting.
        score: Score,
    },
    /// Rosters were regenerated for a new round.
    RoundStarted {
        /// One-based round number.
        round: u32,
    },
    /// A team reached the majority of the series.
    MatchEnded {
        /// Series winner.
        winner: TeamColor,
        /// Final score.
        score: Score,
    },
}

/// Everything that happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickEvents {
    /// Gameplay records, in the order they happened.
    pub events: Vec<SimEvent>,
    /// Visual effects.
    pub effects: Vec<Effect>,
    /// Sound cues (empty when a caller-supplied sound callback was used).
    pub sounds: Vec<SoundCue>,
}

impl TickEvents {
    /// Kill records from this tick.
    pub fn kills(&self) -> impl Iterator<Item = &SimEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, SimEvent::Killed { .. }))
    }
}

/// Sink the simulation phases write into during one tick.
pub struct Outbox<'a> {
    events: Vec<SimEvent>,
    effects: Vec<Effect>,
    sounds: &'a mut dyn FnMut(SoundCue),
}

impl<'a> Outbox<'a> {
    /// Create an outbox forwarding sound cues to `sounds`.
    pub fn new(sounds: &'a mut dyn FnMut(SoundCue)) -> Self {
        Self {
            events: Vec::new(),
            effects: Vec::new(),
            sounds,
        }
    }

    /// Record a gameplay event.
    pub fn emit(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    /// Request a visual effect.
    pub fn effect(&mut self, position: Vec2, kind: EffectKind) {
        self.effects.push(Effect { position, kind });
    }

    /// Announce a sound.
    pub fn sound(&mut self, cue: SoundCue) {
        (self.sounds)(cue);
    }

    /// Events recorded so far.
    #[must_use]
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Effects recorded so far.
    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Finish the tick.
    #[must_use]
    pub fn finish(self) -> TickEvents {
        TickEvents {
            events: self.events,
            effects: self.effects,
            sounds: Vec::new(),
        }
    }
}

impl std::fmt::Debug for Outbox<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outbox")
            .field("events", &self.events)
            .field("effects", &self.effects)
            .finish_non_exhaustive()
    }
}
