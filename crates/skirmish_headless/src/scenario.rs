//! Scenario loading and configuration.
//!
//! A scenario bundles a match configuration with a tick budget and a frame
//! pacing model, so headless runs can imitate an uneven host frame rate
//! without reading the wall clock.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use skirmish_core::config::SimConfig;
use skirmish_core::map::CoverLayout;
use skirmish_core::math::FrameScale;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Failed to write RON.
    #[error("Failed to serialize scenario: {0}")]
    SerializeError(#[from] ron::Error),
    /// Neither a preset name nor an existing file.
    #[error("Unknown scenario '{0}' (presets: {presets})", presets = Scenario::PRESETS.join(", "))]
    Unknown(String),
}

/// How the frame scale handed to each tick is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FramePacing {
    /// Every tick uses the same scale.
    Fixed(f32),
    /// Each tick draws a scale uniformly from `min..=max`.
    ///
    /// The draw sequence depends only on the match seed.
    Jitter {
        /// Smallest scale.
        min: f32,
        /// Largest scale.
        max: f32,
    },
}

impl Default for FramePacing {
    fn default() -> Self {
        Self::Fixed(1.0)
    }
}

impl FramePacing {
    /// Build the per-match clock for `seed`.
    #[must_use]
    pub fn clock(self, seed: u64) -> PacingClock {
        PacingClock {
            pacing: self,
            // Decorrelated from the simulation's own stream.
            rng: Pcg32::seed_from_u64(seed ^ 0x00C0_FFEE_F00D_CAFE),
        }
    }
}

/// Deterministic source of frame scales for one match.
#[derive(Debug, Clone)]
pub struct PacingClock {
    pacing: FramePacing,
    rng: Pcg32,
}

impl PacingClock {
    /// Frame scale for the next tick.
    pub fn next_scale(&mut self) -> FrameScale {
        match self.pacing {
            FramePacing::Fixed(scale) => FrameScale::new(scale),
            FramePacing::Jitter { min, max } => {
                let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
                if !lo.is_finite() || !hi.is_finite() || lo == hi {
                    return FrameScale::new(lo);
                }
                FrameScale::new(self.rng.random_range(lo..=hi))
            }
        }
    }
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Match configuration handed to the simulation.
    pub config: SimConfig,
    /// Tick budget; a match still undecided after this many ticks is a draw.
    pub max_ticks: u64,
    /// Frame scale model.
    #[serde(default)]
    pub pacing: FramePacing,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::skirmish_5v5()
    }
}

impl Scenario {
    /// Names accepted by [`Scenario::preset`].
    pub const PRESETS: [&'static str; 3] = ["skirmish_5v5", "bomb_5v5", "duel_1v1"];

    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a scenario from a RON string.
    pub fn from_ron_str(s: &str) -> Result<Self, ScenarioError> {
        Ok(ron::from_str(s)?)
    }

    /// Serialize to pretty RON.
    pub fn to_ron_string(&self) -> Result<String, ScenarioError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Write the scenario to a RON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ScenarioError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Look up a built-in scenario by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "skirmish_5v5" => Some(Self::skirmish_5v5()),
            "bomb_5v5" => Some(Self::bomb_5v5()),
            "duel_1v1" => Some(Self::duel_1v1()),
            _ => None,
        }
    }

    /// Resolve a preset name, falling back to a RON file path.
    pub fn resolve(name_or_path: &str) -> Result<Self, ScenarioError> {
        if let Some(scenario) = Self::preset(name_or_path) {
            return Ok(scenario);
        }
        let path = Path::new(name_or_path);
        if path.exists() {
            return Self::load(path);
        }
        Err(ScenarioError::Unknown(name_or_path.to_string()))
    }

    /// Five against five, elimination only, best of five.
    pub fn skirmish_5v5() -> Self {
        Self {
            name: "skirmish_5v5".to_string(),
            description: "Five against five over scattered cover, best of five".to_string(),
            config: SimConfig::default(),
            max_ticks: 36_000,
            pacing: FramePacing::Fixed(1.0),
        }
    }

    /// Five against five with the bomb objective and an uneven frame rate.
    pub fn bomb_5v5() -> Self {
        Self {
            name: "bomb_5v5".to_string(),
            description: "Red carries the bomb to blue's site; frames jitter".to_string(),
            config: SimConfig::default()
                .with_objective_mode(true)
                .with_cover(CoverLayout::Roguelike),
            max_ticks: 36_000,
            pacing: FramePacing::Jitter { min: 0.5, max: 2.0 },
        }
    }

    /// One rifle-armed agent per side in an open arena, single round.
    pub fn duel_1v1() -> Self {
        Self {
            name: "duel_1v1".to_string(),
            description: "One agent per side, no cover, single round".to_string(),
            config: SimConfig::default()
                .with_team_size(1)
                .with_best_of(1)
                .with_cover(CoverLayout::None),
            max_ticks: 12_000,
            pacing: FramePacing::Fixed(1.0),
        }
    }

    /// Override the tick budget.
    pub fn with_max_ticks(mut self, max_ticks: u64) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    /// Override the frame pacing.
    pub fn with_pacing(mut self, pacing: FramePacing) -> Self {
        self.pacing = pacing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for name in Scenario::PRESETS {
            let scenario = Scenario::preset(name).unwrap();
            assert_eq!(scenario.name, name);
            assert!(scenario.config.validate().is_ok(), "{name}");
            assert!(scenario.max_ticks > 0);
        }
    }

    #[test]
    fn test_unknown_preset() {
        assert!(Scenario::preset("capture_the_flag").is_none());
        assert!(matches!(
            Scenario::resolve("capture_the_flag"),
            Err(ScenarioError::Unknown(_))
        ));
    }

    #[test]
    fn test_ron_round_trip() {
        let scenario = Scenario::bomb_5v5();
        let ron = scenario.to_ron_string().unwrap();
        assert_eq!(Scenario::from_ron_str(&ron).unwrap(), scenario);
    }

    #[test]
    fn test_partial_ron_uses_config_defaults() {
        let ron = r#"(
            name: "tiny",
            description: "two a side",
            config: (team_size: 2, best_of: 3),
            max_ticks: 500,
        )"#;
        let scenario = Scenario::from_ron_str(ron).unwrap();
        assert_eq!(scenario.config.team_size, 2);
        assert_eq!(scenario.config.world_width, 800.0);
        assert_eq!(scenario.pacing, FramePacing::Fixed(1.0));
    }

    #[test]
    fn test_missing_file() {
        let err = Scenario::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ScenarioError::FileNotFound(_)));
    }

    #[test]
    fn test_jitter_clock_is_seeded() {
        let pacing = FramePacing::Jitter { min: 0.5, max: 2.0 };
        let a: Vec<f32> = {
            let mut clock = pacing.clock(7);
            (0..50).map(|_| clock.next_scale().get()).collect()
        };
        let b: Vec<f32> = {
            let mut clock = pacing.clock(7);
            (0..50).map(|_| clock.next_scale().get()).collect()
        };
        assert_eq!(a, b);
        assert!(a.iter().all(|s| (0.5..=2.0).contains(s)));
        assert!(a.iter().any(|s| *s != a[0]));
    }

    #[test]
    fn test_fixed_and_degenerate_pacing() {
        let mut fixed = FramePacing::Fixed(1.5).clock(1);
        assert_eq!(fixed.next_scale().get(), 1.5);

        let mut reversed = FramePacing::Jitter { min: 2.0, max: 1.0 }.clock(1);
        let s = reversed.next_scale().get();
        assert!((1.0..=2.0).contains(&s));

        let mut flat = FramePacing::Jitter { min: 1.25, max: 1.25 }.clock(1);
        assert_eq!(flat.next_scale().get(), 1.25);
    }
}
