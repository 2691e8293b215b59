//! Headless match runner for AI tuning, balance statistics and CI.
//!
//! Runs the skirmish simulation with no presentation layer at all. This
//! enables:
//!
//! - **Balance testing**: batches of seeded matches aggregated into win rates
//! - **CI verification**: repeated runs of one seed must hash identically
//! - **Replay verification**: recorded matches replay to the same final state
//!
//! # Output
//!
//! - **stdout**: JSON (match metrics, batch results, snapshots)
//! - **stderr**: human-readable logs and progress
//!
//! # Example
//!
//! ```bash
//! # Run one match and print its metrics
//! cargo run -p skirmish_headless -- run --scenario bomb_5v5 --seed 7
//!
//! # Run a batch of 500 matches
//! cargo run -p skirmish_headless -- batch --scenario skirmish_5v5 --count 500 --output results/
//!
//! # Check a recorded replay
//! cargo run -p skirmish_headless -- replay results/replays/match_7.replay
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod metrics;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchProgress, BatchResults};
pub use metrics::{BatchSummary, MatchMetrics, MetricsCollector, RoundRecord, TeamMetrics};
pub use runner::{run_match, run_match_observed, MatchConfig, MatchResult};
pub use scenario::{FramePacing, PacingClock, Scenario, ScenarioError};
