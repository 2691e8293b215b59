//! Match execution for headless runs.
//!
//! Runs one scenario to completion (or to its tick budget) with no player
//! input, feeding every tick's events to a [`MetricsCollector`] and
//! optionally recording a replay.

use std::time::Instant;

use tracing::{debug, info};

use skirmish_core::error::Result;
use skirmish_core::events::TickEvents;
use skirmish_core::replay::{Recorder, Replay};
use skirmish_core::simulation::Simulation;

use crate::metrics::{MatchMetrics, MetricsCollector};
use crate::scenario::Scenario;

/// Configuration for a single match run.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Scenario to play.
    pub scenario: Scenario,
    /// Random seed for determinism.
    pub seed: u64,
    /// Record every tick into a [`Replay`].
    pub record_replay: bool,
    /// Match ID for tracking.
    pub match_id: String,
}

impl MatchConfig {
    /// Configure a run of `scenario` with `seed`.
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        let match_id = format!("{}_{seed}", scenario.name);
        Self {
            scenario,
            seed,
            record_replay: false,
            match_id,
        }
    }

    /// Record a replay of the run.
    pub fn with_replay(mut self, record: bool) -> Self {
        self.record_replay = record;
        self
    }
}

/// Result of a match run.
#[derive(Debug)]
pub struct MatchResult {
    /// Collected metrics.
    pub metrics: MatchMetrics,
    /// Recorded replay, when requested.
    pub replay: Option<Replay>,
    /// The simulation in its final state.
    pub simulation: Simulation,
    /// Wall time spent, in milliseconds.
    pub wall_time_ms: u64,
}

/// Either a bare simulation or one wrapped in a recorder.
enum Driver {
    Plain(Box<Simulation>),
    Recording(Box<Recorder>),
}

impl Driver {
    fn simulation(&self) -> &Simulation {
        match self {
            Self::Plain(sim) => sim.as_ref(),
            Self::Recording(recorder) => recorder.simulation(),
        }
    }
}

/// Run a match to completion.
pub fn run_match(config: MatchConfig) -> Result<MatchResult> {
    run_match_observed(config, |_, _| {})
}

/// Run a match, calling `observer` after every tick.
pub fn run_match_observed<F>(config: MatchConfig, mut observer: F) -> Result<MatchResult>
where
    F: FnMut(&Simulation, &TickEvents),
{
    let started = Instant::now();
    info!(
        match_id = %config.match_id,
        seed = config.seed,
        max_ticks = config.scenario.max_ticks,
        scenario = %config.scenario.name,
        "Starting match"
    );

    let simulation = Simulation::new(config.scenario.config.clone(), config.seed)?;
    let mut driver = if config.record_replay {
        Driver::Recording(Box::new(Recorder::new(simulation)?))
    } else {
        Driver::Plain(Box::new(simulation))
    };

    let mut clock = config.scenario.pacing.clock(config.seed);
    let mut collector =
        MetricsCollector::new(&config.match_id, &config.scenario.name, config.seed);

    let mut ticks = 0u64;
    while ticks < config.scenario.max_ticks && !driver.simulation().is_match_over() {
        let scale = clock.next_scale();
        let events = match &mut driver {
            Driver::Plain(sim) => sim.tick(scale, None),
            Driver::Recording(recorder) => recorder.tick(scale, None)?,
        };
        ticks += 1;
        collector.set_tick(driver.simulation().current_tick());
        collector.observe(&events);
        observer(driver.simulation(), &events);

        if ticks % 6000 == 0 {
            debug!(
                match_id = %config.match_id,
                tick = ticks,
                score = %driver.simulation().round().score,
                "Match progress"
            );
        }
    }

    let (simulation, replay) = match driver {
        Driver::Plain(sim) => (*sim, None),
        Driver::Recording(recorder) => {
            let (replay, sim) = recorder.finish();
            (sim, Some(replay))
        }
    };

    let metrics = collector.finalize(ticks, simulation.state_hash());
    let wall_time_ms = started.elapsed().as_millis() as u64;
    info!(
        match_id = %config.match_id,
        ticks,
        winner = ?metrics.winner,
        score = %metrics.score,
        wall_time_ms,
        "Match finished"
    );

    Ok(MatchResult {
        metrics,
        replay,
        simulation,
        wall_time_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::FramePacing;

    fn quick_duel() -> Scenario {
        Scenario::duel_1v1().with_max_ticks(4_000)
    }

    #[test]
    fn test_run_match_is_deterministic() {
        let a = run_match(MatchConfig::new(quick_duel(), 11)).unwrap();
        let b = run_match(MatchConfig::new(quick_duel(), 11)).unwrap();
        assert_eq!(a.metrics.final_state_hash, b.metrics.final_state_hash);
        assert_eq!(a.metrics.duration_ticks, b.metrics.duration_ticks);
        assert_eq!(a.metrics.winner, b.metrics.winner);
    }

    #[test]
    fn test_run_match_respects_budget() {
        let scenario = Scenario::skirmish_5v5().with_max_ticks(50);
        let result = run_match(MatchConfig::new(scenario, 3)).unwrap();
        assert_eq!(result.metrics.duration_ticks, 50);
        assert_eq!(result.simulation.current_tick(), 50);
        assert!(result.replay.is_none());
    }

    #[test]
    fn test_recorded_replay_verifies() {
        let scenario = quick_duel().with_pacing(FramePacing::Jitter { min: 0.5, max: 2.0 });
        let result = run_match(MatchConfig::new(scenario, 5).with_replay(true)).unwrap();
        let replay = result.replay.unwrap();
        assert_eq!(replay.frame_count() as u64, result.metrics.duration_ticks);
        assert_eq!(replay.final_hash, result.metrics.final_state_hash);
        assert!(replay.verify().unwrap());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let mut scenario = quick_duel();
        scenario.config.team_size = 0;
        assert!(run_match(MatchConfig::new(scenario, 1)).is_err());
    }

    #[test]
    fn test_observer_sees_every_tick() {
        let mut seen = 0u64;
        let result = run_match_observed(
            MatchConfig::new(Scenario::duel_1v1().with_max_ticks(120), 9),
            |_, _| seen += 1,
        )
        .unwrap();
        assert_eq!(seen, result.metrics.duration_ticks);
    }
}
