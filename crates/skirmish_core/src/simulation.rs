//! Simulation driver.
//!
//! [`Simulation`] owns every piece of mutable world state for the duration
//! of a tick: rosters, projectiles, crates, the bomb and round bookkeeping.
//! Nothing is global; two simulations built from the same config and seed
//! and fed the same frame scales and inputs stay bit-identical.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentId, Appearance, IdGen};
use crate::behavior::{Others, Spawned, Surroundings, ThinkContext};
use crate::combat;
use crate::config::SimConfig;
use crate::error::{GameError, Result};
use crate::events::{Outbox, SimEvent, SoundCue, TickEvents};
use crate::geometry::{Obstacle, Terrain, WorldBounds};
use crate::math::{FrameScale, Vec2};
use crate::objective::{BombPolicy, BombState, Objective};
use crate::pickup::{self, Pickup};
use crate::player::PlayerInput;
use crate::projectile::{self, Bullet, Grenade};
use crate::rng::{self, SimRng};
use crate::role::Role;
use crate::round::{RoundPhase, RoundState, RoundTransition};
use crate::team::{spawn_team, NamePool, Side, SpawnBand, SpawnContext, TeamColor, TeamSpec};

/// Presentation handles applied to freshly spawned agents of each team.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamAppearance {
    /// Red team handles.
    pub red: Option<Appearance>,
    /// Blue team handles.
    pub blue: Option<Appearance>,
}

impl TeamAppearance {
    /// Handles for `team`.
    #[must_use]
    pub fn for_team(&self, team: TeamColor) -> Option<&Appearance> {
        match team {
            TeamColor::Red => self.red.as_ref(),
            TeamColor::Blue => self.blue.as_ref(),
        }
    }
}

/// Serializable copy of the visible world state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Tick the snapshot was taken at.
    pub tick: u64,
    /// World rectangle.
    pub bounds: WorldBounds,
    /// Living agents.
    pub agents: Vec<Agent>,
    /// Bullets in flight.
    pub bullets: Vec<Bullet>,
    /// Live grenades.
    pub grenades: Vec<Grenade>,
    /// Crates on the ground.
    pub pickups: Vec<Pickup>,
    /// Cover.
    pub obstacles: Vec<Obstacle>,
    /// Bomb state.
    pub objective: Objective,
    /// Round bookkeeping.
    pub round: RoundState,
    /// Player pawn id, if any.
    pub player: Option<AgentId>,
}

/// The team-combat simulation.
///
/// # Tick order
///
/// Every call to [`tick`](Self::tick) runs these phases strictly in order:
/// 1. **Crates** - roll for a new pickup
/// 2. **Agents** - each living agent in roster order: player input or AI
///    decision step, medic heal, then the bomb policy in objective mode.
///    Projectiles an agent fires are visible to the agents after it.
/// 3. **Projectiles** - integrate bullets and grenades
/// 4. **Combat** - overlaps and melee, bullets, grenades, crates, removal
///    of the dead
/// 5. **Round** - evaluate the round state machine and respawn if due
///
/// A simulation whose match is over no longer advances.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    seed: u64,
    tick: u64,
    bounds: WorldBounds,
    rng: SimRng,
    ids: IdGen,
    names: NamePool,
    appearance: TeamAppearance,
    agents: Vec<Agent>,
    bullets: Vec<Bullet>,
    grenades: Vec<Grenade>,
    pickups: Vec<Pickup>,
    obstacles: Vec<Obstacle>,
    objective: Objective,
    round: RoundState,
    player: Option<AgentId>,
}

impl Simulation {
    /// Create a simulation and spawn the first round.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] if the configuration fails validation.
    ///
    /// # Example
    ///
    /// ```
    /// use skirmish_core::config::SimConfig;
    /// use skirmish_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new(SimConfig::default(), 7).unwrap();
    /// assert_eq!(sim.current_tick(), 0);
    /// assert_eq!(sim.agents().len(), 10);
    /// ```
    pub fn new(config: SimConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let bounds = config.bounds();
        let mut rng = rng::seeded(seed);
        let obstacles = config.cover.generate(bounds, &mut rng);
        let round = RoundState::new(config.rounds_to_win());

        let mut sim = Self {
            config,
            seed,
            tick: 0,
            bounds,
            rng,
            ids: IdGen::default(),
            names: NamePool::default(),
            appearance: TeamAppearance::default(),
            agents: Vec::new(),
            bullets: Vec::new(),
            grenades: Vec::new(),
            pickups: Vec::new(),
            obstacles,
            objective: Objective::default(),
            round,
            player: None,
        };
        sim.respawn();

        tracing::info!(
            seed,
            team_size = sim.config.team_size,
            best_of = sim.config.best_of,
            objective_mode = sim.config.objective_mode,
            obstacles = sim.obstacles.len(),
            "Simulation created"
        );
        Ok(sim)
    }

    /// Advance by one tick, collecting sound cues into the returned events.
    pub fn tick(&mut self, frame_scale: FrameScale, input: Option<&PlayerInput>) -> TickEvents {
        let mut sounds = Vec::new();
        let mut events = {
            let mut sink = |cue: SoundCue| sounds.push(cue);
            self.tick_with_sounds(frame_scale, input, &mut sink)
        };
        events.sounds = sounds;
        events
    }

    /// Advance by one tick, forwarding sound cues to `sounds` as they happen.
    ///
    /// The returned [`TickEvents::sounds`] is empty.
    pub fn tick_with_sounds(
        &mut self,
        frame_scale: FrameScale,
        input: Option<&PlayerInput>,
        sounds: &mut dyn FnMut(SoundCue),
    ) -> TickEvents {
        if self.round.is_match_over() {
            return TickEvents::default();
        }
        let mut out = Outbox::new(sounds);

        // 1. Crates
        self.roll_pickup(frame_scale, &mut out);

        // 2. Agents
        self.run_agents(frame_scale, input, &mut out);

        // 3. Projectiles
        projectile::integrate(&mut self.bullets, &mut self.grenades, frame_scale, &self.bounds);

        // 4. Combat
        self.run_combat(frame_scale, &mut out);

        // 5. Round
        self.run_round(frame_scale, &mut out);

        self.tick += 1;

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        #[cfg(feature = "debug-validation")]
        self.check_invariants();

        out.finish()
    }

    fn roll_pickup(&mut self, frame_scale: FrameScale, out: &mut Outbox<'_>) {
        let spawned = pickup::roll_spawn(
            self.pickups.len(),
            &self.bounds,
            frame_scale,
            &self.config.tuning,
            &mut self.rng,
        );
        if let Some(crate_) = spawned {
            out.emit(SimEvent::PickupSpawned {
                kind: crate_.kind,
                position: crate_.position,
            });
            self.pickups.push(crate_);
        }
    }

    fn run_agents(
        &mut self,
        frame_scale: FrameScale,
        input: Option<&PlayerInput>,
        out: &mut Outbox<'_>,
    ) {
        let tuning = &self.config.tuning;
        let objective_mode = self.config.objective_mode;
        let terrain = Terrain::new(&self.obstacles, self.bounds);
        let input = input.copied().unwrap_or_default();
        let mut spawned = Spawned::default();

        for i in 0..self.agents.len() {
            let (head, rest) = self.agents.split_at_mut(i);
            let Some((me, tail)) = rest.split_first_mut() else {
                break;
            };
            if !me.is_alive() {
                continue;
            }

            let mut ctx = ThinkContext {
                frame_scale,
                tuning,
                rng: &mut self.rng,
                out: &mut *out,
            };
            if me.controlled {
                me.drive(&input, &terrain, &mut ctx, &mut spawned);
                if objective_mode && input.plant && self.objective.try_plant(me) {
                    out.emit(SimEvent::ObjectivePlanted {
                        agent: me.id,
                        team: me.team,
                    });
                }
            } else {
                let world = Surroundings {
                    others: Others::new(head, tail),
                    bullets: &self.bullets,
                    pickups: &self.pickups,
                    terrain,
                };
                let outcome = me.think(&world, &mut ctx, &mut spawned);
                if let Some(heal) = outcome.heal {
                    let patient = head
                        .iter_mut()
                        .chain(tail.iter_mut())
                        .find(|a| a.id == heal.target);
                    if let Some(patient) = patient {
                        let restored = patient.heal(heal.amount);
                        out.emit(SimEvent::Healed {
                            medic: me.id,
                            target: patient.id,
                            amount: restored,
                        });
                    }
                }
            }

            if objective_mode {
                BombPolicy::step(me, &mut self.objective, &terrain, frame_scale, tuning, out);
            }

            self.bullets.append(&mut spawned.bullets);
            self.grenades.append(&mut spawned.grenades);
        }
    }

    fn run_combat(&mut self, frame_scale: FrameScale, out: &mut Outbox<'_>) {
        let tuning = &self.config.tuning;
        let terrain = Terrain::new(&self.obstacles, self.bounds);

        combat::resolve_overlaps(&mut self.agents, &self.bounds, tuning, out);
        combat::resolve_bullets(
            &mut self.bullets,
            &mut self.agents,
            &mut self.objective,
            &terrain,
            tuning,
            self.player,
            out,
        );
        combat::resolve_grenades(&mut self.grenades, &mut self.agents, tuning, out);
        combat::resolve_pickups(&mut self.pickups, &mut self.agents, frame_scale, tuning, out);
        combat::cull_dead(&mut self.agents, &mut self.objective, out);
    }

    fn run_round(&mut self, frame_scale: FrameScale, out: &mut Outbox<'_>) {
        let red = self.alive_count(TeamColor::Red);
        let blue = self.alive_count(TeamColor::Blue);
        let planted_by = self.objective.planted_team();

        match self
            .round
            .evaluate(red, blue, planted_by, frame_scale, &self.config.tuning)
        {
            RoundTransition::None => {}
            RoundTransition::RoundEnded { winner, reason } => {
                out.emit(SimEvent::RoundEnded {
                    winner,
                    reason,
                    score: self.round.score,
                });
            }
            RoundTransition::Respawn => {
                self.respawn();
                out.emit(SimEvent::RoundStarted {
                    round: self.round.round,
                });
            }
            RoundTransition::MatchEnded { winner } => {
                out.emit(SimEvent::MatchEnded {
                    winner,
                    score: self.round.score,
                });
            }
        }
    }

    /// Regenerate both rosters, clear projectiles and crates, and reset the bomb.
    fn respawn(&mut self) {
        self.agents.clear();
        self.clear_projectiles();
        self.pickups.clear();
        self.player = None;

        let objective_mode = self.config.objective_mode;
        for team in TeamColor::BOTH {
            let side = objective_mode.then_some(match team {
                TeamColor::Red => Side::Attacker,
                TeamColor::Blue => Side::Defender,
            });
            let spec = TeamSpec {
                band: SpawnBand::for_team(team, &self.bounds),
                team,
                size: self.config.team_size,
                side,
                appearance: self.appearance.for_team(team),
                roles: &self.config.role_pool,
            };
            let mut ctx = SpawnContext {
                bounds: self.bounds,
                tuning: &self.config.tuning,
                rng: &mut self.rng,
                ids: &mut self.ids,
                names: &mut self.names,
            };
            let roster = spawn_team(&spec, &mut ctx);
            self.agents.extend(roster);
        }

        if self.config.player_controlled {
            self.install_player();
        }

        let terrain = Terrain::new(&self.obstacles, self.bounds);
        for agent in &mut self.agents {
            settle(agent, &terrain);
        }

        if objective_mode {
            self.objective
                .reset_round(&self.agents, &self.bounds, &self.config.tuning, &mut self.rng);
        } else {
            self.objective = Objective::default();
        }

        tracing::debug!(
            round = self.round.round,
            agents = self.agents.len(),
            carrier = ?self.objective.carrier(),
            "Teams spawned"
        );
    }

    fn install_player(&mut self) {
        let Some(slot) = self.agents.iter().position(|a| a.team == TeamColor::Red) else {
            return;
        };
        let id = self.ids.next_id();
        let position = Vec2::new(100.0, self.bounds.height / 2.0);
        let mut pawn = Agent::player(id, position, &self.config.tuning).with_side(self.agents[slot].side);
        if let Some(appearance) = self.appearance.red.clone() {
            pawn.appearance = appearance;
        }
        pawn.clamp_to(&self.bounds);
        self.agents[slot] = pawn;
        self.player = Some(id);
    }

    /// Change the world size. Agents and crates are pulled inside the new
    /// bounds and the bomb site follows the defenders' edge.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidConfig`] for non-positive or non-finite sizes.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "world size must be positive, got {width}x{height}"
            )));
        }
        self.config.world_width = width;
        self.config.world_height = height;
        self.bounds = WorldBounds::new(width, height);
        for agent in &mut self.agents {
            agent.clamp_to(&self.bounds);
        }
        for crate_ in &mut self.pickups {
            crate_.position = self.bounds.clamp(crate_.position, 0.0);
        }
        if self.config.objective_mode {
            let defenders = self
                .agents
                .iter()
                .find(|a| a.side == Some(Side::Defender))
                .map_or(TeamColor::Blue, |a| a.team);
            self.objective.site = Objective::site_for(defenders, &self.bounds, &self.config.tuning);
        }
        tracing::debug!(width, height, "World resized");
        Ok(())
    }

    /// Spawn an extra roster into `band` and return the new ids.
    pub fn spawn_team(
        &mut self,
        band: SpawnBand,
        team: TeamColor,
        size: usize,
        side: Option<Side>,
    ) -> Vec<AgentId> {
        let spec = TeamSpec {
            band,
            team,
            size,
            side,
            appearance: self.appearance.for_team(team),
            roles: &self.config.role_pool,
        };
        let mut ctx = SpawnContext {
            bounds: self.bounds,
            tuning: &self.config.tuning,
            rng: &mut self.rng,
            ids: &mut self.ids,
            names: &mut self.names,
        };
        let mut roster = spawn_team(&spec, &mut ctx);
        let terrain = Terrain::new(&self.obstacles, self.bounds);
        for agent in &mut roster {
            settle(agent, &terrain);
        }
        let ids = roster.iter().map(|a| a.id).collect();
        tracing::debug!(team = %team, size, "Roster spawned");
        self.agents.extend(roster);
        ids
    }

    /// Spawn a single agent at `position`.
    pub fn spawn_pawn(&mut self, team: TeamColor, role: Role, position: Vec2) -> AgentId {
        let id = self.ids.next_id();
        let side = self.config.objective_mode.then_some(match team {
            TeamColor::Red => Side::Attacker,
            TeamColor::Blue => Side::Defender,
        });
        let name = self.names.draw(&mut self.rng);
        let mut agent = Agent::new(id, team, role, position, &self.config.tuning)
            .with_name(name)
            .with_side(side);
        if let Some(appearance) = self.appearance.for_team(team) {
            agent.appearance = appearance.clone();
        }
        settle(&mut agent, &Terrain::new(&self.obstacles, self.bounds));
        self.agents.push(agent);
        id
    }

    /// Spawn an attacker at `position` already carrying the bomb.
    pub fn spawn_objective_carrier(&mut self, position: Vec2, team: TeamColor) -> AgentId {
        let id = self.spawn_pawn(team, Role::Rifle, position);
        if let Some(agent) = self.agent_mut(id) {
            agent.side = Some(Side::Attacker);
        }
        self.objective.give_to(id);
        tracing::debug!(agent = %id, "Bomb handed to new carrier");
        id
    }

    /// Hand the bomb to a random living member of `team`.
    pub fn give_objective_to_random(&mut self, team: TeamColor) -> Option<AgentId> {
        let candidates: Vec<AgentId> = self
            .agents
            .iter()
            .filter(|a| a.team == team && a.is_alive())
            .map(|a| a.id)
            .collect();
        let id = *candidates.choose(&mut self.rng)?;
        self.objective.give_to(id);
        Some(id)
    }

    /// Remove every bullet and grenade.
    pub fn clear_projectiles(&mut self) {
        self.bullets.clear();
        self.grenades.clear();
    }

    /// Replace the cover layout.
    pub fn set_obstacles(&mut self, obstacles: Vec<Obstacle>) {
        self.obstacles = obstacles;
    }

    /// Set the presentation handles copied onto future spawns of `team`.
    pub fn set_team_appearance(&mut self, team: TeamColor, appearance: Option<Appearance>) {
        match team {
            TeamColor::Red => self.appearance.red = appearance,
            TeamColor::Blue => self.appearance.blue = appearance,
        }
    }

    /// Remove an agent, dropping the bomb where it stood if it carried it.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::AgentNotFound`] if no agent has this id.
    pub fn despawn_agent(&mut self, id: AgentId) -> Result<Agent> {
        let index = self
            .agents
            .iter()
            .position(|a| a.id == id)
            .ok_or(GameError::AgentNotFound(id))?;
        let agent = self.agents.remove(index);
        if self.objective.carrier() == Some(id) {
            self.objective.drop_at(agent.position);
        }
        Ok(agent)
    }

    /// Look up an agent.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Look up an agent mutably.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.id == id)
    }

    /// The player pawn, while it is alive.
    #[must_use]
    pub fn player(&self) -> Option<&Agent> {
        self.player.and_then(|id| self.agent(id))
    }

    /// Id of this round's player pawn.
    #[must_use]
    pub const fn player_id(&self) -> Option<AgentId> {
        self.player
    }

    /// Living agents on `team`.
    #[must_use]
    pub fn alive_count(&self, team: TeamColor) -> usize {
        self.agents
            .iter()
            .filter(|a| a.team == team && a.is_alive())
            .count()
    }

    /// Configuration this simulation was built from (world size follows resizes).
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Seed this simulation was built from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Ticks advanced so far.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// World rectangle.
    #[must_use]
    pub const fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Every agent, in update order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Bullets in flight.
    #[must_use]
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// Live grenades.
    #[must_use]
    pub fn grenades(&self) -> &[Grenade] {
        &self.grenades
    }

    /// Crates on the ground.
    #[must_use]
    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    /// Cover.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Bomb state.
    #[must_use]
    pub const fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Round bookkeeping.
    #[must_use]
    pub const fn round(&self) -> &RoundState {
        &self.round
    }

    /// Whether the series is decided.
    #[must_use]
    pub const fn is_match_over(&self) -> bool {
        self.round.is_match_over()
    }

    /// Copy of the visible world state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            tick: self.tick,
            bounds: self.bounds,
            agents: self.agents.clone(),
            bullets: self.bullets.clone(),
            grenades: self.grenades.clone(),
            pickups: self.pickups.clone(),
            obstacles: self.obstacles.clone(),
            objective: self.objective.clone(),
            round: self.round.clone(),
            player: self.player,
        }
    }

    /// Hash of the full gameplay state.
    ///
    /// Two simulations with identical state produce identical hashes, which
    /// makes this the desync check for replays and determinism tests.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.tick.hash(&mut hasher);

        self.agents.len().hash(&mut hasher);
        for agent in &self.agents {
            agent.id.hash(&mut hasher);
            agent.team.hash(&mut hasher);
            agent.role.hash(&mut hasher);
            hash_vec(agent.position, &mut hasher);
            agent.hp.hash(&mut hasher);
            agent.shield.hash(&mut hasher);
            agent.mag.hash(&mut hasher);
            agent.reserve.hash(&mut hasher);
            agent.reloading.hash(&mut hasher);
            agent.reload_timer.to_bits().hash(&mut hasher);
            agent.cadence_counter.to_bits().hash(&mut hasher);
            agent.cadence.to_bits().hash(&mut hasher);
            agent.base_cadence.to_bits().hash(&mut hasher);
            agent.retreating.hash(&mut hasher);
            agent.melee_timer.to_bits().hash(&mut hasher);
            agent.dodge_timer.to_bits().hash(&mut hasher);
        }

        self.bullets.len().hash(&mut hasher);
        for bullet in &self.bullets {
            hash_vec(bullet.position, &mut hasher);
            hash_vec(bullet.velocity, &mut hasher);
            bullet.owner.hash(&mut hasher);
            bullet.damage.hash(&mut hasher);
        }

        self.grenades.len().hash(&mut hasher);
        for grenade in &self.grenades {
            hash_vec(grenade.position, &mut hasher);
            hash_vec(grenade.velocity, &mut hasher);
            grenade.fuse.to_bits().hash(&mut hasher);
        }

        self.pickups.len().hash(&mut hasher);
        for crate_ in &self.pickups {
            hash_vec(crate_.position, &mut hasher);
            crate_.kind.hash(&mut hasher);
            crate_.remaining.to_bits().hash(&mut hasher);
        }

        match self.objective.state {
            BombState::Unassigned => 0u8.hash(&mut hasher),
            BombState::Carried(id) => {
                1u8.hash(&mut hasher);
                id.hash(&mut hasher);
            }
            BombState::Dropped(at) => {
                2u8.hash(&mut hasher);
                hash_vec(at, &mut hasher);
            }
            BombState::Planted { by, team, at } => {
                3u8.hash(&mut hasher);
                by.hash(&mut hasher);
                team.hash(&mut hasher);
                hash_vec(at, &mut hasher);
            }
        }

        self.round.score.hash(&mut hasher);
        self.round.round.hash(&mut hasher);
        match self.round.phase {
            RoundPhase::Active => 0u8.hash(&mut hasher),
            RoundPhase::RoundOver { winner, remaining } => {
                1u8.hash(&mut hasher);
                winner.hash(&mut hasher);
                remaining.to_bits().hash(&mut hasher);
            }
            RoundPhase::MatchOver { winner } => {
                2u8.hash(&mut hasher);
                winner.hash(&mut hasher);
            }
        }

        hasher.finish()
    }

    #[cfg(feature = "debug-validation")]
    fn check_invariants(&self) {
        for agent in &self.agents {
            assert!(
                (0..=agent.max_hp).contains(&agent.hp),
                "agent {} hp {} outside 0..={}",
                agent.id,
                agent.hp,
                agent.max_hp
            );
            assert!(agent.mag <= agent.mag_capacity, "agent {} overfilled magazine", agent.id);
            assert!(agent.is_alive(), "dead agent {} survived the tick", agent.id);
            assert!(
                agent.position.x >= 0.0
                    && agent.position.x <= self.bounds.width
                    && agent.position.y >= 0.0
                    && agent.position.y <= self.bounds.height,
                "agent {} left the world at {:?}",
                agent.id,
                agent.position
            );
        }
        for crate_ in &self.pickups {
            assert!(crate_.remaining > 0.0, "expired pickup survived the tick");
        }
        assert!(self.pickups.len() <= self.config.tuning.pickup_cap);
    }
}

fn hash_vec(v: Vec2, hasher: &mut DefaultHasher) {
    v.x.to_bits().hash(hasher);
    v.y.to_bits().hash(hasher);
}

/// Move a freshly placed agent out of cover and inside the world.
fn settle(agent: &mut Agent, terrain: &Terrain<'_>) {
    agent.position = terrain.push_outside(agent.position);
    agent.clamp_to(&terrain.bounds);
    agent.stuck.anchor = agent.position;
}
