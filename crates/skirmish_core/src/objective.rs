//! Bomb objective.
//!
//! The bomb is always in exactly one [`BombState`], so "carried and dropped"
//! or "planted and carried" cannot be represented. Agents never hold a carry
//! flag of their own; [`Objective::carrier`] is the single source of truth.
//!
//! [`BombPolicy`] is the attacker sub-behaviour (pick up, seek, plant). The
//! driver runs it after each agent's decision step, and only in objective mode.

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId};
use crate::config::Tuning;
use crate::events::{Outbox, SimEvent};
use crate::geometry::{Rect, Terrain, WorldBounds};
use crate::math::{FrameScale, Vec2};
use crate::rng::SimRng;
use crate::team::{Side, TeamColor};

/// Where the bomb is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BombState {
    /// No attacker was available to receive it this round.
    Unassigned,
    /// Held by an agent.
    Carried(AgentId),
    /// Lying on the ground.
    Dropped(Vec2),
    /// Planted inside the site.
    Planted {
        /// Planter.
        by: AgentId,
        /// Planter's team.
        team: TeamColor,
        /// Plant position.
        at: Vec2,
    },
}

/// Bomb state plus the site it must be planted in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Current state.
    pub state: BombState,
    /// Plant zone.
    pub site: Rect,
}

impl Default for Objective {
    fn default() -> Self {
        Self {
            state: BombState::Unassigned,
            site: Rect::new(0.0, 0.0, 0.0, 0.0),
        }
    }
}

impl Objective {
    /// Site rectangle on the defenders' edge of the world.
    #[must_use]
    pub fn site_for(defenders: TeamColor, bounds: &WorldBounds, tuning: &Tuning) -> Rect {
        let size = tuning.site_size;
        let x = match defenders {
            TeamColor::Red => tuning.site_margin,
            TeamColor::Blue => bounds.width - tuning.site_margin - size,
        };
        Rect::new(x, bounds.height / 2.0 - size / 2.0, size, size)
    }

    /// Place the site and hand the bomb to a random attacker.
    pub fn reset_round(
        &mut self,
        agents: &[Agent],
        bounds: &WorldBounds,
        tuning: &Tuning,
        rng: &mut SimRng,
    ) {
        let defenders = agents
            .iter()
            .find(|a| a.side == Some(Side::Defender))
            .map_or(TeamColor::Blue, |a| a.team);
        self.site = Self::site_for(defenders, bounds, tuning);

        let attackers: Vec<AgentId> = agents
            .iter()
            .filter(|a| a.side == Some(Side::Attacker) && a.is_alive())
            .map(|a| a.id)
            .collect();
        self.state = attackers
            .choose(rng)
            .map_or(BombState::Unassigned, |&id| BombState::Carried(id));
    }

    /// Current carrier, if the bomb is held.
    #[must_use]
    pub const fn carrier(&self) -> Option<AgentId> {
        match self.state {
            BombState::Carried(id) => Some(id),
            _ => None,
        }
    }

    /// Ground position, if the bomb is lying free.
    #[must_use]
    pub const fn dropped_at(&self) -> Option<Vec2> {
        match self.state {
            BombState::Dropped(at) => Some(at),
            _ => None,
        }
    }

    /// Whether the bomb has been planted.
    #[must_use]
    pub const fn is_planted(&self) -> bool {
        matches!(self.state, BombState::Planted { .. })
    }

    /// Team that planted the bomb.
    #[must_use]
    pub const fn planted_team(&self) -> Option<TeamColor> {
        match self.state {
            BombState::Planted { team, .. } => Some(team),
            _ => None,
        }
    }

    /// Hand the bomb to `id`. Ignored once planted.
    pub fn give_to(&mut self, id: AgentId) {
        if !self.is_planted() {
            self.state = BombState::Carried(id);
        }
    }

    /// Drop the bomb at `at`. Ignored once planted.
    pub fn drop_at(&mut self, at: Vec2) {
        if !self.is_planted() {
            self.state = BombState::Dropped(at);
        }
    }

    /// Pick up a free bomb if `agent` is an attacker standing close enough.
    pub fn try_pickup(&mut self, agent: &Agent, tuning: &Tuning) -> bool {
        let Some(at) = self.dropped_at() else {
            return false;
        };
        if agent.side != Some(Side::Attacker)
            || !agent.is_alive()
            || agent.position.distance(at) >= tuning.bomb_pickup_radius
        {
            return false;
        }
        self.state = BombState::Carried(agent.id);
        true
    }

    /// Plant if `agent` carries the bomb and stands inside the site.
    ///
    /// Anything else is a silent no-op.
    pub fn try_plant(&mut self, agent: &Agent) -> bool {
        if self.carrier() != Some(agent.id) || !self.site.contains(agent.position) {
            return false;
        }
        self.state = BombState::Planted {
            by: agent.id,
            team: agent.team,
            at: agent.position,
        };
        true
    }
}

/// Attacker objective sub-behaviour.
#[derive(Debug, Clone, Copy, Default)]
pub struct BombPolicy;

impl BombPolicy {
    /// Run the objective step for one agent after its decision step.
    ///
    /// Attackers pick up a nearby free bomb or walk toward one within the
    /// seek radius. An AI carrier walks to the site and plants on arrival.
    /// Player-controlled agents only pick up; they plant through input.
    pub fn step(
        agent: &mut Agent,
        objective: &mut Objective,
        terrain: &Terrain<'_>,
        frame_scale: FrameScale,
        tuning: &Tuning,
        out: &mut Outbox<'_>,
    ) {
        if agent.side != Some(Side::Attacker) || !agent.is_alive() {
            return;
        }
        let step = agent.speed * frame_scale.get();

        if let Some(at) = objective.dropped_at() {
            if objective.try_pickup(agent, tuning) {
                out.emit(SimEvent::ObjectiveTaken { agent: agent.id });
            } else if !agent.controlled && agent.position.distance(at) < tuning.bomb_seek_radius {
                agent.position = terrain.step_toward(agent.position, at, step, agent.radius);
            }
            return;
        }

        if objective.carrier() != Some(agent.id) || agent.controlled {
            return;
        }
        if objective.try_plant(agent) {
            tracing::debug!(agent = %agent.id, team = %agent.team, "Bomb planted");
            out.emit(SimEvent::ObjectivePlanted {
                agent: agent.id,
                team: agent.team,
            });
        } else {
            agent.position =
                terrain.step_toward(agent.position, objective.site.center(), step, agent.radius);
        }
    }
}
