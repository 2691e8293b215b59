//! Headless skirmish runner.
//!
//! Runs matches without any presentation layer. JSON goes to stdout, logs
//! and progress go to stderr.
//!
//! # Usage
//!
//! ```bash
//! # Run a single match and print its metrics
//! cargo run -p skirmish_headless -- run --scenario bomb_5v5 --seed 7
//!
//! # Stream a world snapshot every 60 ticks
//! cargo run -p skirmish_headless -- run --snapshot-every 60
//!
//! # Run batch balance test
//! cargo run -p skirmish_headless -- batch --scenario skirmish_5v5 --count 1000 --output results/
//!
//! # Check that one seed always produces the same match
//! cargo run -p skirmish_headless -- verify --scenario duel_1v1 --seed 42 --runs 5
//!
//! # Verify a recorded replay
//! cargo run -p skirmish_headless -- replay --file results/replays/match_7.replay --verify
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skirmish_core::math::FrameScale;
use skirmish_core::replay::{Replay, ReplayPlayer};
use skirmish_core::simulation::Simulation;
use skirmish_headless::{
    batch::{run_batch, verify_determinism, BatchConfig},
    runner::{run_match, run_match_observed, MatchConfig},
    scenario::Scenario,
};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless skirmish runner for AI tuning, balance statistics and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single match and print its metrics as JSON
    Run {
        /// Preset name or RON scenario file
        #[arg(short, long, default_value = "skirmish_5v5")]
        scenario: String,

        /// Match seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Override the scenario's tick budget
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Print a JSON world snapshot every N ticks
        #[arg(long)]
        snapshot_every: Option<u64>,

        /// Record the match to this replay file
        #[arg(long)]
        replay: Option<PathBuf>,
    },

    /// Run batch of matches for balance testing
    Batch {
        /// Preset name or RON scenario file
        #[arg(short, long, default_value = "skirmish_5v5")]
        scenario: String,

        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Maximum parallel matches (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Override the scenario's tick budget
        #[arg(long)]
        max_ticks: Option<u64>,

        /// Save a replay per match under <output>/replays
        #[arg(long)]
        replays: bool,
    },

    /// Verify determinism by running same seed multiple times
    Verify {
        /// Preset name or RON scenario file
        #[arg(short, long, default_value = "duel_1v1")]
        scenario: String,

        /// Seed to verify
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of verification runs
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Play back a recorded match
    Replay {
        /// Replay file path
        #[arg(short, long)]
        file: PathBuf,

        /// Verify replay produces identical hash
        #[arg(long)]
        verify: bool,
    },

    /// Run N ticks for benchmarking
    Benchmark {
        /// Number of ticks to run
        #[arg(short, long, default_value = "36000")]
        ticks: u64,

        /// Preset name or RON scenario file
        #[arg(short, long, default_value = "skirmish_5v5")]
        scenario: String,
    },

    /// Write a preset scenario as RON, as a starting point for custom files
    Export {
        /// Preset name
        #[arg(short, long, default_value = "skirmish_5v5")]
        scenario: String,

        /// Output path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries JSON only.
    let default_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    match cli.command {
        Some(Commands::Run {
            scenario,
            seed,
            max_ticks,
            snapshot_every,
            replay,
        }) => {
            cmd_run(&scenario, seed, max_ticks, snapshot_every, replay);
        }
        Some(Commands::Batch {
            scenario,
            count,
            parallel,
            output,
            seed,
            max_ticks,
            replays,
        }) => {
            let config = BatchConfig {
                scenario,
                game_count: count,
                parallel_games: parallel,
                output_dir: output,
                seed_start: seed,
                max_ticks,
                save_replays: replays,
            };
            cmd_batch(config);
        }
        Some(Commands::Verify {
            scenario,
            seed,
            runs,
        }) => {
            cmd_verify(&scenario, seed, runs);
        }
        Some(Commands::Replay { file, verify }) => {
            cmd_replay(&file, verify);
        }
        Some(Commands::Benchmark { ticks, scenario }) => {
            cmd_benchmark(ticks, &scenario);
        }
        Some(Commands::Export { scenario, output }) => {
            cmd_export(&scenario, output);
        }
        None => {
            cmd_run("skirmish_5v5", 0, None, None, None);
        }
    }
}

fn load_scenario(name: &str) -> Scenario {
    match Scenario::resolve(name) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, scenario = name, "Failed to load scenario");
            eprintln!("Failed to load scenario: {e}");
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(json) => println!("{json}"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize output");
            std::process::exit(1);
        }
    }
}

/// Run a single match
fn cmd_run(
    scenario: &str,
    seed: u64,
    max_ticks: Option<u64>,
    snapshot_every: Option<u64>,
    replay_path: Option<PathBuf>,
) {
    let mut scenario = load_scenario(scenario);
    if let Some(max_ticks) = max_ticks {
        scenario.max_ticks = max_ticks;
    }
    let config = MatchConfig::new(scenario, seed).with_replay(replay_path.is_some());

    let result = match snapshot_every.filter(|n| *n > 0) {
        Some(every) => run_match_observed(config, |sim, _| {
            if sim.current_tick() % every == 0 {
                print_json(&sim.snapshot(), false);
            }
        }),
        None => run_match(config),
    };
    let result = match result {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Match failed");
            eprintln!("Match failed: {e}");
            std::process::exit(1);
        }
    };

    if let (Some(path), Some(replay)) = (&replay_path, &result.replay) {
        if let Err(e) = replay.save(path) {
            tracing::error!(error = %e, path = %path.display(), "Failed to save replay");
            eprintln!("Failed to save replay: {e}");
            std::process::exit(1);
        }
        eprintln!("Replay saved to: {}", path.display());
    }

    print_json(&result.metrics, true);
}

/// Run batch of matches for balance testing
fn cmd_batch(config: BatchConfig) {
    let output = config.output_dir.clone();
    let num_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    tracing::info!(
        scenario = %config.scenario,
        count = config.game_count,
        parallel = config.parallel_games,
        seed = config.seed_start,
        output = %output.display(),
        cpus_available = num_cpus,
        max_ticks = ?config.max_ticks,
        replays = config.save_replays,
        "Batch configuration"
    );

    if let Err(e) = std::fs::create_dir_all(&output) {
        tracing::error!(error = %e, path = %output.display(), "Failed to create output directory");
        eprintln!(
            "FATAL: Cannot create output directory '{}': {}",
            output.display(),
            e
        );
        std::process::exit(1);
    }

    let results = match run_batch(config) {
        Ok(r) => r,
        Err(e) => {
            tracing::error!(error = %e, "Batch could not start");
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    let results_path = output.join("batch_results.json");
    if let Err(e) = results.save(&results_path) {
        tracing::error!(error = %e, path = %results_path.display(), "Failed to save results");
        eprintln!("FATAL: Failed to save results: {e}");
        std::process::exit(1);
    }

    let summary = &results.summary;
    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played: {}", results.games.len());
    if !results.errors.is_empty() {
        eprintln!("Matches FAILED: {}", results.errors.len());
    }
    eprintln!("Duration: {:.1}s", results.duration_seconds);
    eprintln!(
        "Throughput: {:.1} matches/sec",
        results.games.len() as f64 / results.duration_seconds.max(0.001)
    );
    eprintln!("Undecided: {}", summary.draws);
    eprintln!("Average length: {:.0} ticks", summary.avg_duration_ticks);
    eprintln!("Average rounds: {:.2}", summary.avg_rounds);
    eprintln!("\nWin Rates:");
    let mut rates: Vec<_> = summary.win_rates.iter().collect();
    rates.sort_by(|a, b| a.0.cmp(b.0));
    for (team, rate) in rates {
        eprintln!("  {}: {:.1}%", team, rate * 100.0);
    }
    if let Some(team) = summary.dominant_team(0.1) {
        eprintln!("\nImbalance: {team} wins more than 60% of matches");
    }

    if !results.errors.is_empty() {
        eprintln!("\nMATCH FAILURES:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  Match {} (seed {}): {}",
                error.game_index, error.seed, error.message
            );
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more failures", results.errors.len() - 10);
        }
    }

    eprintln!("\nResults saved to: {}", results_path.display());
    print_json(summary, true);
}

/// Verify determinism
fn cmd_verify(scenario: &str, seed: u64, runs: u32) {
    let scenario = load_scenario(scenario);
    tracing::info!(
        "Verifying determinism: {} with seed {} ({} runs)",
        scenario.name,
        seed,
        runs
    );

    match verify_determinism(&scenario, seed, runs) {
        Ok(true) => eprintln!("PASS: All {runs} runs produced identical results"),
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => {
            tracing::error!(error = %e, "Verification run failed");
            eprintln!("FAIL: {e}");
            std::process::exit(1);
        }
    }
}

/// Replay a recorded match
fn cmd_replay(file: &Path, verify: bool) {
    if verify {
        tracing::info!("Verifying replay: {}", file.display());
    } else {
        tracing::info!("Playing replay: {}", file.display());
    }

    let replay = match Replay::load(file) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to load replay: {e}");
            std::process::exit(1);
        }
    };

    eprintln!("Loaded replay:");
    eprintln!("  Seed: {}", replay.seed);
    eprintln!("  Frames: {}", replay.frame_count());
    eprintln!("  Duration: {} ticks", replay.duration());
    eprintln!(
        "  World: {}x{}, {} per team, best of {}",
        replay.config.world_width,
        replay.config.world_height,
        replay.config.team_size,
        replay.config.best_of
    );

    if verify {
        eprintln!("Verifying replay...");
        match replay.verify() {
            Ok(true) => {
                eprintln!("PASS: Replay verification successful");
                eprintln!("  Hash: {:016x}", replay.final_hash);
            }
            Ok(false) => {
                eprintln!("FAIL: Replay produced different hash!");
                eprintln!("  Expected: {:016x}", replay.final_hash);
                if let Ok(sim) = replay.play() {
                    eprintln!("  Actual:   {:016x}", sim.state_hash());
                }
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("FAIL: Error during verification: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let mut player = match ReplayPlayer::new(replay) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to create replay player: {e}");
            std::process::exit(1);
        }
    };

    let mut last_decile = 0;
    let mut kills = 0usize;
    loop {
        match player.advance() {
            Ok(Some(events)) => kills += events.kills().count(),
            Ok(None) => break,
            Err(e) => {
                eprintln!("Replay failed at frame {}: {e}", player.position());
                std::process::exit(1);
            }
        }
        let decile = (player.progress_percent() / 10.0) as u32;
        if decile > last_decile {
            eprintln!("Progress: {}%", decile * 10);
            last_decile = decile;
        }
    }

    let sim = player.simulation();
    eprintln!("Replay complete at tick {}", sim.current_tick());
    eprintln!("Final state hash: {:016x}", sim.state_hash());
    eprintln!("\nFinal State:");
    eprintln!("  Score: {}", sim.round().score);
    eprintln!("  Winner: {:?}", sim.round().match_winner());
    eprintln!("  Kills: {kills}");
    print_json(&sim.snapshot(), true);
}

/// Run benchmark
fn cmd_benchmark(ticks: u64, scenario: &str) {
    let scenario = load_scenario(scenario);
    tracing::info!("Running {} tick benchmark on '{}'", ticks, scenario.name);

    // Keep the match from deciding mid-benchmark.
    let config = scenario.config.clone().with_best_of(999);
    let mut sim = match Simulation::new(config, 0) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to create simulation: {e}");
            std::process::exit(1);
        }
    };
    let mut clock = scenario.pacing.clock(0);

    eprintln!("Starting benchmark with {} agents", sim.agents().len());
    eprintln!("Running {ticks} ticks...");

    for _ in 0..100 {
        sim.tick(FrameScale::NOMINAL, None);
    }

    let start = Instant::now();
    for _ in 0..ticks {
        sim.tick(clock.next_scale(), None);
    }
    let elapsed = start.elapsed();

    let tps = ticks as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Ticks: {ticks}");
    eprintln!("Duration: {:.3}s", elapsed.as_secs_f64());
    eprintln!("Ticks/second: {tps:.1}");
    eprintln!(
        "ms/tick: {:.4}",
        elapsed.as_secs_f64() * 1000.0 / ticks.max(1) as f64
    );
    eprintln!("Rounds decided: {}", sim.round().score.total());
    eprintln!("State hash: {:016x}", sim.state_hash());
}

/// Export a preset scenario
fn cmd_export(name: &str, output: Option<PathBuf>) {
    let Some(scenario) = Scenario::preset(name) else {
        eprintln!(
            "Unknown preset '{name}' (presets: {})",
            Scenario::PRESETS.join(", ")
        );
        std::process::exit(1);
    };
    let result = match &output {
        Some(path) => scenario.save(path).map(|()| {
            eprintln!("Scenario written to: {}", path.display());
        }),
        None => scenario.to_ron_string().map(|ron| println!("{ron}")),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to export scenario");
        eprintln!("Failed to export scenario: {e}");
        std::process::exit(1);
    }
}
