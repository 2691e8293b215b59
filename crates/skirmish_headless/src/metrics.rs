//! Match metrics collection for balance analysis.
//!
//! The collector is fed the [`TickEvents`] of every tick and folds them into
//! per-team counters; batches aggregate the resulting [`MatchMetrics`] into a
//! [`BatchSummary`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use skirmish_core::events::{SimEvent, TickEvents};
use skirmish_core::round::{RoundEndReason, Score};
use skirmish_core::team::TeamColor;

/// Complete metrics for a single match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchMetrics {
    /// Unique match identifier.
    pub match_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Random seed used.
    pub seed: u64,
    /// Ticks advanced before the match ended or the budget ran out.
    pub duration_ticks: u64,
    /// Series winner (None = undecided within the tick budget).
    pub winner: Option<TeamColor>,
    /// Final score.
    pub score: Score,
    /// One record per decided round.
    pub rounds: Vec<RoundRecord>,
    /// Red team counters.
    pub red: TeamMetrics,
    /// Blue team counters.
    pub blue: TeamMetrics,
    /// Hit points restored by medics, both teams.
    pub healing: i64,
    /// Bullets stopped by shield charges.
    pub shield_blocks: u32,
    /// Bullets stopped because the victim stood in cover.
    pub cover_blocks: u32,
    /// Crates that expired untouched.
    pub pickups_expired: u32,
    /// Final simulation state hash (for determinism validation).
    pub final_state_hash: u64,
}

impl MatchMetrics {
    /// Create an empty record.
    #[must_use]
    pub fn new(match_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            match_id: match_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// Counters of one team.
    pub fn team(&self, team: TeamColor) -> &TeamMetrics {
        match team {
            TeamColor::Red => &self.red,
            TeamColor::Blue => &self.blue,
        }
    }

    /// Mutable counters of one team.
    pub fn team_mut(&mut self, team: TeamColor) -> &mut TeamMetrics {
        match team {
            TeamColor::Red => &mut self.red,
            TeamColor::Blue => &mut self.blue,
        }
    }

    /// Whether the series was decided.
    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }
}

/// How one round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// One-based round number.
    pub round: u32,
    /// Team credited.
    pub winner: TeamColor,
    /// Why.
    pub reason: RoundEndReason,
    /// Tick the round was decided on.
    pub ended_at_tick: u64,
}

/// Per-team counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamMetrics {
    /// Enemy agents removed.
    pub kills: u32,
    /// Own agents removed.
    pub deaths: u32,
    /// Bullets fired.
    pub shots: u32,
    /// Grenades thrown.
    pub grenades: u32,
    /// Hit points removed by this team's bullets, grenades and melee.
    pub damage_dealt: i64,
    /// Crates consumed.
    pub pickups: u32,
    /// Bombs planted.
    pub plants: u32,
    /// Rounds credited.
    pub rounds_won: u32,
    /// Kills per death (kills when deathless).
    pub kd_ratio: f64,
}

impl TeamMetrics {
    /// Recompute derived ratios.
    pub fn calculate_derived_stats(&mut self) {
        self.kd_ratio = if self.deaths > 0 {
            f64::from(self.kills) / f64::from(self.deaths)
        } else {
            f64::from(self.kills)
        };
    }
}

/// Folds tick events into [`MatchMetrics`].
#[derive(Debug)]
pub struct MetricsCollector {
    metrics: MatchMetrics,
    current_tick: u64,
    round: u32,
}

impl MetricsCollector {
    /// Create a collector for one match.
    #[must_use]
    pub fn new(match_id: &str, scenario: &str, seed: u64) -> Self {
        Self {
            metrics: MatchMetrics::new(match_id, scenario, seed),
            current_tick: 0,
            round: 1,
        }
    }

    /// Set the tick that subsequent events belong to.
    pub fn set_tick(&mut self, tick: u64) {
        self.current_tick = tick;
    }

    /// Fold one tick's events.
    pub fn observe(&mut self, events: &TickEvents) {
        for event in &events.events {
            self.on_event(event);
        }
    }

    fn on_event(&mut self, event: &SimEvent) {
        let m = &mut self.metrics;
        match *event {
            SimEvent::Shot { team, .. } => m.team_mut(team).shots += 1,
            SimEvent::GrenadeThrown { team, .. } => m.team_mut(team).grenades += 1,
            SimEvent::Damaged {
                attacker_team,
                amount,
                ..
            } => m.team_mut(attacker_team).damage_dealt += i64::from(amount),
            SimEvent::ShieldAbsorbed { .. } => m.shield_blocks += 1,
            SimEvent::CoverAbsorbed { .. } => m.cover_blocks += 1,
            SimEvent::Healed { amount, .. } => m.healing += i64::from(amount),
            SimEvent::Killed { victim_team, .. } => {
                m.team_mut(victim_team).deaths += 1;
                m.team_mut(victim_team.opponent()).kills += 1;
            }
            SimEvent::PickupConsumed { team, .. } => m.team_mut(team).pickups += 1,
            SimEvent::PickupExpired { .. } => m.pickups_expired += 1,
            SimEvent::ObjectivePlanted { team, .. } => m.team_mut(team).plants += 1,
            SimEvent::RoundEnded {
                winner,
                reason,
                score,
            } => {
                m.rounds.push(RoundRecord {
                    round: self.round,
                    winner,
                    reason,
                    ended_at_tick: self.current_tick,
                });
                m.score = score;
            }
            SimEvent::RoundStarted { round } => self.round = round,
            SimEvent::MatchEnded { winner, score } => {
                m.winner = Some(winner);
                m.score = score;
            }
            SimEvent::PickupSpawned { .. }
            | SimEvent::ObjectiveTaken { .. }
            | SimEvent::ObjectiveDropped { .. } => {}
        }
    }

    /// Finish collection.
    pub fn finalize(mut self, duration_ticks: u64, final_state_hash: u64) -> MatchMetrics {
        self.metrics.duration_ticks = duration_ticks;
        self.metrics.final_state_hash = final_state_hash;
        for team in TeamColor::BOTH {
            let rounds_won = self.metrics.score.of(team);
            let stats = self.metrics.team_mut(team);
            stats.rounds_won = rounds_won;
            stats.calculate_derived_stats();
        }
        self.metrics
    }

    /// Metrics collected so far.
    pub fn current(&self) -> &MatchMetrics {
        &self.metrics
    }
}

/// Aggregate statistics over many matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Matches included.
    pub total_games: u32,
    /// Series wins keyed by team label.
    pub wins_by_team: HashMap<String, u32>,
    /// Series win rate keyed by team label.
    pub win_rates: HashMap<String, f64>,
    /// Matches still undecided at the tick budget.
    pub draws: u32,
    /// Mean match length.
    pub avg_duration_ticks: f64,
    /// Shortest match.
    pub min_duration_ticks: u64,
    /// Longest match.
    pub max_duration_ticks: u64,
    /// Mean rounds decided per match.
    pub avg_rounds: f64,
    /// Mean kills per match keyed by team label.
    pub avg_kills: HashMap<String, f64>,
    /// Mean K/D keyed by team label.
    pub avg_kd_ratio: HashMap<String, f64>,
    /// Share of decided rounds that ended with a plant.
    pub plant_round_rate: f64,
}

impl BatchSummary {
    /// Aggregate a set of match records.
    pub fn from_games(games: &[MatchMetrics]) -> Self {
        if games.is_empty() {
            return Self::default();
        }

        let n = games.len() as f64;
        let mut summary = Self {
            total_games: games.len() as u32,
            min_duration_ticks: u64::MAX,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut rounds_sum = 0usize;
        let mut plant_rounds = 0usize;

        for game in games {
            duration_sum += game.duration_ticks;
            summary.min_duration_ticks = summary.min_duration_ticks.min(game.duration_ticks);
            summary.max_duration_ticks = summary.max_duration_ticks.max(game.duration_ticks);

            match game.winner {
                Some(winner) => {
                    *summary
                        .wins_by_team
                        .entry(winner.label().to_string())
                        .or_default() += 1;
                }
                None => summary.draws += 1,
            }

            rounds_sum += game.rounds.len();
            plant_rounds += game
                .rounds
                .iter()
                .filter(|r| r.reason == RoundEndReason::ObjectivePlanted)
                .count();

            for team in TeamColor::BOTH {
                let stats = game.team(team);
                *summary
                    .avg_kills
                    .entry(team.label().to_string())
                    .or_default() += f64::from(stats.kills);
                *summary
                    .avg_kd_ratio
                    .entry(team.label().to_string())
                    .or_default() += stats.kd_ratio;
            }
        }

        summary.avg_duration_ticks = duration_sum as f64 / n;
        summary.avg_rounds = rounds_sum as f64 / n;
        summary.plant_round_rate = if rounds_sum > 0 {
            plant_rounds as f64 / rounds_sum as f64
        } else {
            0.0
        };
        for value in summary.avg_kills.values_mut() {
            *value /= n;
        }
        for value in summary.avg_kd_ratio.values_mut() {
            *value /= n;
        }
        for team in TeamColor::BOTH {
            let wins = summary.wins_by_team.get(team.label()).copied().unwrap_or(0);
            summary
                .win_rates
                .insert(team.label().to_string(), f64::from(wins) / n);
        }

        summary
    }

    /// Whether both teams' win rates sit within `threshold` of 50%.
    pub fn is_balanced(&self, threshold: f64) -> bool {
        self.win_rates
            .values()
            .all(|rate| (rate - 0.5).abs() <= threshold)
    }

    /// Team winning more than `0.5 + threshold` of matches, if any.
    pub fn dominant_team(&self, threshold: f64) -> Option<&String> {
        self.win_rates
            .iter()
            .find(|(_, rate)| **rate > 0.5 + threshold)
            .map(|(team, _)| team)
    }
}
