//! Batch match runner for balance testing.
//!
//! Runs many matches in parallel using rayon and aggregates their metrics.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::metrics::{BatchSummary, MatchMetrics};
use crate::runner::{run_match, MatchConfig};
use crate::scenario::{Scenario, ScenarioError};

/// Configuration for a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Preset name or RON path of the scenario to run
    pub scenario: String,
    /// Number of matches to run
    pub game_count: u32,
    /// Maximum parallel matches (0 = use rayon default)
    pub parallel_games: u32,
    /// Output directory for results and replays
    pub output_dir: PathBuf,
    /// Starting seed; match `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Overrides the scenario's tick budget
    pub max_ticks: Option<u64>,
    /// Write a replay file per match under `output_dir/replays`
    pub save_replays: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "skirmish_5v5".to_string(),
            game_count: 100,
            parallel_games: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_ticks: None,
            save_replays: false,
        }
    }
}

impl BatchConfig {
    /// Create config for a specific scenario
    pub fn new(scenario: &str, game_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            game_count,
            ..Default::default()
        }
    }

    /// Set output directory
    pub fn with_output(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }

    /// Set the tick budget override
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Save one replay per match
    pub fn with_replays(mut self, save: bool) -> Self {
        self.save_replays = save;
        self
    }

    fn replay_path(&self, seed: u64) -> PathBuf {
        self.output_dir
            .join("replays")
            .join(format!("match_{seed}.replay"))
    }
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used
    pub config: BatchConfig,
    /// Individual match metrics, ordered by seed
    pub games: Vec<MatchMetrics>,
    /// Aggregate summary
    pub summary: BatchSummary,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Error during batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    /// Match index
    pub game_index: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Progress tracking for batch runs
#[derive(Debug)]
pub struct BatchProgress {
    /// Total matches
    pub total: u32,
    /// Completed matches
    pub completed: Arc<AtomicU32>,
    /// Start time
    pub start_time: Instant,
    partial_wins: Arc<Mutex<HashMap<String, u32>>>,
}

impl BatchProgress {
    /// Create new progress tracker
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: Arc::new(AtomicU32::new(0)),
            start_time: Instant::now(),
            partial_wins: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record a completed match
    pub fn record_completion(&self, winner: Option<&str>) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if let Some(w) = winner {
            if let Ok(mut wins) = self.partial_wins.lock() {
                *wins.entry(w.to_string()).or_insert(0) += 1;
            }
        }
    }

    /// Get current completion count
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Get completion percentage
    pub fn percentage(&self) -> f64 {
        f64::from(self.current()) / f64::from(self.total.max(1)) * 100.0
    }

    /// Get estimated time remaining
    pub fn eta(&self) -> Duration {
        let completed = self.current();
        if completed == 0 {
            return Duration::from_secs(0);
        }

        let elapsed = self.start_time.elapsed();
        let per_game = elapsed.as_secs_f64() / f64::from(completed);
        let remaining = self.total.saturating_sub(completed);
        Duration::from_secs_f64(per_game * f64::from(remaining))
    }

    /// Get current win rates
    pub fn current_win_rates(&self) -> HashMap<String, f64> {
        let completed = self.current();
        if completed == 0 {
            return HashMap::new();
        }

        if let Ok(wins) = self.partial_wins.lock() {
            wins.iter()
                .map(|(k, v)| (k.clone(), f64::from(*v) / f64::from(completed)))
                .collect()
        } else {
            HashMap::new()
        }
    }

    /// Display progress to stderr
    pub fn display(&self) {
        let completed = self.current();
        let eta = self.eta();
        let mut rates: Vec<_> = self.current_win_rates().into_iter().collect();
        rates.sort_by(|a, b| a.0.cmp(&b.0));

        eprintln!("╔════════════════════════════════════╗");
        eprintln!(
            "║ Batch Progress: {:>4}/{:<4} ({:>5.1}%) ║",
            completed,
            self.total,
            self.percentage()
        );
        eprintln!(
            "║ ETA: {:>28} ║",
            format!("{}m {}s", eta.as_secs() / 60, eta.as_secs() % 60)
        );
        if !rates.is_empty() {
            eprintln!("╟────────────────────────────────────╢");
            eprintln!("║ Win Rates So Far:                  ║");
            for (team, rate) in &rates {
                eprintln!("║   {:<12}: {:>5.1}%              ║", team, rate * 100.0);
            }
        }
        eprintln!("╚════════════════════════════════════╝");
    }
}

fn run_single_match(
    scenario: &Scenario,
    index: u32,
    config: &BatchConfig,
) -> Result<MatchMetrics, BatchError> {
    let seed = config.seed_start.wrapping_add(u64::from(index));
    let fail = |message: String| BatchError {
        game_index: index,
        seed,
        message,
    };

    let mut scenario = scenario.clone();
    if let Some(max_ticks) = config.max_ticks {
        scenario.max_ticks = max_ticks;
    }
    let match_config = MatchConfig::new(scenario, seed).with_replay(config.save_replays);
    let result = run_match(match_config).map_err(|e| fail(e.to_string()))?;

    if let Some(replay) = &result.replay {
        let path = config.replay_path(seed);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| fail(e.to_string()))?;
        }
        replay.save(&path).map_err(|e| fail(e.to_string()))?;
        debug!(?path, "Replay saved");
    }

    Ok(result.metrics)
}

/// Run a batch of matches
///
/// # Errors
/// Fails only if the scenario cannot be resolved; per-match failures are
/// collected in [`BatchResults::errors`].
pub fn run_batch(config: BatchConfig) -> Result<BatchResults, ScenarioError> {
    let start = Instant::now();
    let scenario = Scenario::resolve(&config.scenario)?;
    let progress = BatchProgress::new(config.game_count);

    info!(
        "Starting batch run: {} matches of '{}'",
        config.game_count, scenario.name
    );

    let run_all = || -> Vec<Result<MatchMetrics, BatchError>> {
        (0..config.game_count)
            .into_par_iter()
            .map(|i| {
                let outcome = run_single_match(&scenario, i, &config);
                match &outcome {
                    Ok(metrics) => {
                        progress.record_completion(metrics.winner.map(|w| w.label()));

                        let completed = progress.current();
                        if completed % 10 == 0 {
                            debug!("Progress: {}/{}", completed, config.game_count);
                        }
                        if completed % 100 == 0 {
                            progress.display();
                        }
                    }
                    Err(e) => warn!("Match {} failed: {}", i, e.message),
                }
                outcome
            })
            .collect()
    };

    let pool = (config.parallel_games > 0)
        .then(|| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(config.parallel_games as usize)
                .build()
                .ok()
        })
        .flatten();
    let results = match pool {
        Some(pool) => pool.install(run_all),
        None => run_all(),
    };

    let (games, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let games: Vec<MatchMetrics> = games.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let summary = BatchSummary::from_games(&games);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} matches in {:.1}s ({:.1} matches/sec)",
        games.len(),
        duration_seconds,
        games.len() as f64 / duration_seconds.max(f64::EPSILON)
    );

    Ok(BatchResults {
        config,
        games,
        summary,
        duration_seconds,
        errors,
    })
}

/// Verify determinism by running the same seed several times.
///
/// Returns `true` when every run ends on the same tick, winner, score and
/// state hash.
pub fn verify_determinism(
    scenario: &Scenario,
    seed: u64,
    runs: u32,
) -> skirmish_core::error::Result<bool> {
    let mut first: Option<MatchMetrics> = None;
    for run in 0..runs {
        let metrics = run_match(MatchConfig::new(scenario.clone(), seed))?.metrics;
        match &first {
            None => first = Some(metrics),
            Some(reference) => {
                let same = reference.final_state_hash == metrics.final_state_hash
                    && reference.duration_ticks == metrics.duration_ticks
                    && reference.winner == metrics.winner
                    && reference.score == metrics.score;
                if !same {
                    warn!(
                        run,
                        expected = reference.final_state_hash,
                        actual = metrics.final_state_hash,
                        "Determinism check diverged"
                    );
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}
