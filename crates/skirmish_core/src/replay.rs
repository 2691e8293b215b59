//! Replay recording and playback.
//!
//! A replay stores the configuration, seed and cover layout plus the
//! per-tick inputs (frame scale, player input, resizes). Because the
//! simulation is deterministic, re-running those inputs reproduces the
//! match exactly and the recorded final hash verifies it.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::config::SimConfig;
use crate::error::{GameError, Result};
use crate::events::TickEvents;
use crate::geometry::Obstacle;
use crate::math::FrameScale;
use crate::player::PlayerInput;
use crate::simulation::Simulation;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Inputs for one recorded tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    /// Frame scale the tick ran with.
    pub frame_scale: FrameScale,
    /// Player input, if a pawn was being driven.
    pub input: Option<PlayerInput>,
    /// World resize applied just before the tick.
    pub resize: Option<(f32, f32)>,
}

impl ReplayFrame {
    /// A frame with no input and no resize.
    #[must_use]
    pub const fn new(frame_scale: FrameScale) -> Self {
        Self {
            frame_scale,
            input: None,
            resize: None,
        }
    }
}

/// Complete replay data structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Configuration the match was created with.
    pub config: SimConfig,
    /// Random seed used for the match.
    pub seed: u64,
    /// Cover in place when recording started.
    pub obstacles: Vec<Obstacle>,
    /// Recorded ticks in order.
    pub frames: Vec<ReplayFrame>,
    /// Final tick when recording stopped.
    pub final_tick: u64,
    /// Final state hash for verification.
    pub final_hash: u64,
}

impl Replay {
    /// Start a replay from a freshly created simulation.
    ///
    /// # Errors
    /// Returns [`GameError::InvalidState`] if the simulation has already
    /// ticked or was edited after creation.
    pub fn new(simulation: &Simulation) -> Result<Self> {
        if simulation.current_tick() != 0 {
            return Err(GameError::InvalidState(format!(
                "Replay recording must start at tick 0, simulation is at tick {}",
                simulation.current_tick()
            )));
        }
        let replay = Self {
            version: REPLAY_VERSION,
            config: simulation.config().clone(),
            seed: simulation.seed(),
            obstacles: simulation.obstacles().to_vec(),
            frames: Vec::new(),
            final_tick: 0,
            final_hash: simulation.state_hash(),
        };
        // Rosters edited before the first tick cannot be rebuilt from config and seed.
        if replay.restore_initial_state()?.state_hash() != replay.final_hash {
            return Err(GameError::InvalidState(
                "Replay recording requires an unmodified simulation".to_string(),
            ));
        }
        Ok(replay)
    }

    /// Record one tick of input.
    pub fn record(&mut self, frame: ReplayFrame) {
        self.frames.push(frame);
    }

    /// Finalize the replay with end-of-recording state.
    pub fn finalize(&mut self, simulation: &Simulation) {
        self.final_tick = simulation.current_tick();
        self.final_hash = simulation.state_hash();
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if reading or decoding fails or the version differs.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        let replay: Self = bincode::deserialize(&bytes)?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::ReplayVersion {
                expected: REPLAY_VERSION,
                found: replay.version,
            });
        }

        Ok(replay)
    }

    /// Rebuild the simulation as it was when recording started.
    ///
    /// # Errors
    /// Returns an error if the stored configuration no longer validates.
    pub fn restore_initial_state(&self) -> Result<Simulation> {
        let mut simulation = Simulation::new(self.config.clone(), self.seed)?;
        simulation.set_obstacles(self.obstacles.clone());
        Ok(simulation)
    }

    /// Re-run every recorded frame and return the resulting simulation.
    ///
    /// # Errors
    /// Returns an error if the initial state cannot be restored or a
    /// recorded resize is invalid.
    pub fn play(&self) -> Result<Simulation> {
        let mut simulation = self.restore_initial_state()?;
        for frame in &self.frames {
            apply_frame(&mut simulation, frame)?;
        }
        Ok(simulation)
    }

    /// Whether re-running the replay reproduces the recorded final hash.
    ///
    /// # Errors
    /// Returns an error if playback fails.
    pub fn verify(&self) -> Result<bool> {
        let simulation = self.play()?;
        Ok(simulation.current_tick() == self.final_tick
            && simulation.state_hash() == self.final_hash)
    }

    /// Total duration in ticks.
    #[must_use]
    pub const fn duration(&self) -> u64 {
        self.final_tick
    }

    /// Number of recorded frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

fn apply_frame(simulation: &mut Simulation, frame: &ReplayFrame) -> Result<TickEvents> {
    if let Some((width, height)) = frame.resize {
        simulation.resize(width, height)?;
    }
    Ok(simulation.tick(frame.frame_scale, frame.input.as_ref()))
}

/// Drives a simulation while recording everything needed to replay it.
#[derive(Debug)]
pub struct Recorder {
    simulation: Simulation,
    replay: Replay,
    pending_resize: Option<(f32, f32)>,
}

impl Recorder {
    /// Start recording a fresh simulation.
    ///
    /// # Errors
    /// Returns an error if the simulation has already ticked.
    pub fn new(simulation: Simulation) -> Result<Self> {
        let replay = Replay::new(&simulation)?;
        Ok(Self {
            simulation,
            replay,
            pending_resize: None,
        })
    }

    /// Request a world resize, applied with the next recorded tick.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.pending_resize = Some((width, height));
    }

    /// Advance and record one tick.
    ///
    /// # Errors
    /// Returns an error if a pending resize is invalid; nothing is recorded then.
    pub fn tick(&mut self, frame_scale: FrameScale, input: Option<&PlayerInput>) -> Result<TickEvents> {
        let frame = ReplayFrame {
            frame_scale,
            input: input.copied(),
            resize: self.pending_resize.take(),
        };
        let events = apply_frame(&mut self.simulation, &frame)?;
        self.replay.record(frame);
        Ok(events)
    }

    /// The simulation being recorded.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Stop recording and return the finalized replay with the simulation.
    #[must_use]
    pub fn finish(mut self) -> (Replay, Simulation) {
        self.replay.finalize(&self.simulation);
        tracing::info!(
            frames = self.replay.frame_count(),
            final_tick = self.replay.final_tick,
            final_hash = self.replay.final_hash,
            "Replay recorded"
        );
        (self.replay, self.simulation)
    }
}

/// Replay playback controller.
#[derive(Debug)]
pub struct ReplayPlayer {
    replay: Replay,
    simulation: Simulation,
    frame_index: usize,
}

impl ReplayPlayer {
    /// Create a player positioned at the start of `replay`.
    ///
    /// # Errors
    /// Returns an error if the initial state cannot be restored.
    pub fn new(replay: Replay) -> Result<Self> {
        let simulation = replay.restore_initial_state()?;
        Ok(Self {
            replay,
            simulation,
            frame_index: 0,
        })
    }

    /// Advance the replay by one frame.
    ///
    /// Returns the tick's events, or `None` once every frame has been played.
    ///
    /// # Errors
    /// Returns an error if a recorded resize is invalid.
    pub fn advance(&mut self) -> Result<Option<TickEvents>> {
        let Some(frame) = self.replay.frames.get(self.frame_index) else {
            return Ok(None);
        };
        let events = apply_frame(&mut self.simulation, frame)?;
        self.frame_index += 1;
        Ok(Some(events))
    }

    /// Seek to a specific frame by replaying from the start.
    ///
    /// # Errors
    /// Returns an error if state restoration fails.
    pub fn seek(&mut self, target: usize) -> Result<()> {
        self.simulation = self.replay.restore_initial_state()?;
        self.frame_index = 0;
        while self.frame_index < target.min(self.replay.frames.len()) {
            self.advance()?;
        }
        Ok(())
    }

    /// Frames played so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.frame_index
    }

    /// Current simulation state.
    #[must_use]
    pub const fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// The replay being played.
    #[must_use]
    pub const fn replay(&self) -> &Replay {
        &self.replay
    }

    /// Whether every frame has been played.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.frame_index >= self.replay.frames.len()
    }

    /// Progress as a percentage (0-100).
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        if self.replay.frames.is_empty() {
            100.0
        } else {
            (self.frame_index as f64 / self.replay.frames.len() as f64) * 100.0
        }
    }
}
