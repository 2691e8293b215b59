//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Replays and batch statistics rely on the simulation being reproducible
//! from its config, seed and per-tick inputs. Sources of non-determinism
//! include:
//!
//! - **Global randomness**: every random draw goes through the
//!   simulation's own seeded generator.
//!
//! - **HashMap iteration order**: the simulation keeps agents in a `Vec`
//!   and always walks it in roster order.
//!
//! - **Wall-clock time**: the host passes the frame scale explicitly, so a
//!   recorded sequence of frame scales replays exactly.
//!
//! - **Thread scheduling**: parallel projectile integration touches each
//!   projectile independently, so results do not depend on the split.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual phases are deterministic
//! 2. **Property tests**: random seeds and frame scales still reproduce
//! 3. **Integration tests**: full matches are reproducible
//! 4. **Parallel tests**: running N simulations on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use skirmish_core::math::FrameScale;
use skirmish_core::player::PlayerInput;
use skirmish_core::replay::Recorder;
use skirmish_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use skirmish_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 10, || 0u64, |n| *n += 2, |n| *n);
/// result.assert_deterministic();
/// assert_eq!(result.hashes, vec![20, 20, 20]);
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a simulation twice at nominal frame scale and compare final hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick(FrameScale::NOMINAL, None);
        },
        |sim| sim.state_hash(),
    );
    result.is_deterministic
}

/// Run two copies of a simulation through the same frame-scale sequence.
pub fn verify_variable_frame_determinism<F>(setup_fn: F, scales: &[FrameScale]) -> bool
where
    F: Fn() -> Simulation,
{
    let mut a = setup_fn();
    let mut b = setup_fn();
    for &scale in scales {
        a.tick(scale, None);
        b.tick(scale, None);
    }
    a.state_hash() == b.state_hash()
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N simulations on scoped threads and collect final hashes.
///
/// Catches non-determinism that only shows up under thread scheduling or
/// memory layout differences.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick(FrameScale::NOMINAL, None);
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("simulation thread panicked"))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick(FrameScale::NOMINAL, None);
        sim2.tick(FrameScale::NOMINAL, None);

        let (a, b) = (sim1.state_hash(), sim2.state_hash());
        if a != b {
            tracing::warn!(tick, left = a, right = b, "Simulations diverged");
            return Some(tick);
        }
    }

    None
}

/// Record a run driven by `inputs` and check that its replay reproduces it.
///
/// Each entry is one tick's frame scale and optional player input.
pub fn verify_replay_determinism(
    simulation: Simulation,
    inputs: &[(FrameScale, Option<PlayerInput>)],
) -> bool {
    let Ok(mut recorder) = Recorder::new(simulation) else {
        return false;
    };
    for (scale, input) in inputs {
        if recorder.tick(*scale, input.as_ref()).is_err() {
            return false;
        }
    }
    let (replay, _) = recorder.finish();
    replay.verify().unwrap_or(false)
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the simulation.
pub mod strategies {
    use proptest::prelude::*;
    use skirmish_core::config::SimConfig;
    use skirmish_core::map::CoverLayout;
    use skirmish_core::math::{FrameScale, Vec2};
    use skirmish_core::player::PlayerInput;

    /// Generate a simulation seed.
    pub fn arb_seed() -> impl Strategy<Value = u64> {
        any::<u64>()
    }

    /// Generate a frame scale between a 240 Hz and a 15 Hz frame.
    pub fn arb_frame_scale() -> impl Strategy<Value = FrameScale> {
        (0.25f32..4.0f32).prop_map(FrameScale::new)
    }

    /// Generate a sequence of frame scales.
    pub fn arb_frame_scales(max_len: usize) -> impl Strategy<Value = Vec<FrameScale>> {
        proptest::collection::vec(arb_frame_scale(), 1..max_len)
    }

    /// Generate a point inside an 800x600 world.
    pub fn arb_world_point() -> impl Strategy<Value = Vec2> {
        (0.0f32..800.0f32, 0.0f32..600.0f32).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// Generate one tick of player input.
    pub fn arb_player_input() -> impl Strategy<Value = PlayerInput> {
        (
            -1.0f32..=1.0f32,
            -1.0f32..=1.0f32,
            arb_world_point(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(mx, my, aim, fire, reload)| PlayerInput {
                move_axis: Vec2::new(mx, my),
                aim,
                fire,
                reload,
                plant: false,
            })
    }

    /// Generate a cover layout.
    pub fn arb_cover() -> impl Strategy<Value = CoverLayout> {
        prop_oneof![
            Just(CoverLayout::None),
            Just(CoverLayout::Scattered),
            Just(CoverLayout::Roguelike),
        ]
    }

    /// Generate a valid match configuration.
    pub fn arb_config() -> impl Strategy<Value = SimConfig> {
        (1usize..7, 0u32..3, any::<bool>(), any::<bool>(), arb_cover()).prop_map(
            |(team_size, series, objective, player, cover)| {
                SimConfig::default()
                    .with_team_size(team_size)
                    .with_best_of(series * 2 + 1)
                    .with_objective_mode(objective)
                    .with_player(player)
                    .with_cover(cover)
            },
        )
    }
}
