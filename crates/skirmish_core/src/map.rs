//! Cover layout generation.
//!
//! Layouts are generated once per match from the simulation RNG, so the same
//! seed always produces the same arena.

use serde::{Deserialize, Serialize};

use crate::geometry::{Obstacle, Rect, WorldBounds};
use crate::rng::{self, SimRng};

/// Grid cell size of the roguelike layout.
const ROGUELIKE_CELL: f32 = 96.0;
/// Probability that a roguelike grid cell holds cover.
const ROGUELIKE_FILL: f64 = 0.18;
/// Columns this close to either side edge stay open for spawning.
const SPAWN_MARGIN: f32 = 140.0;

/// Which cover generator runs at match start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoverLayout {
    /// Open arena.
    None,
    /// Three upright pillars in the middle of the map.
    #[default]
    Scattered,
    /// Sparse grid of blocks plus a few large walls.
    Roguelike,
}

impl CoverLayout {
    /// Generate obstacles for a world of the given size.
    pub fn generate(self, bounds: WorldBounds, rng: &mut SimRng) -> Vec<Obstacle> {
        match self {
            Self::None => Vec::new(),
            Self::Scattered => scattered(bounds, rng),
            Self::Roguelike => roguelike(bounds, rng),
        }
    }
}

fn scattered(bounds: WorldBounds, rng: &mut SimRng) -> Vec<Obstacle> {
    (0..3)
        .map(|_| {
            let x = rng::uniform(rng, 100.0, bounds.width - 200.0).round();
            let y = rng::uniform(rng, 50.0, bounds.height - 150.0).round();
            let h = rng::uniform(rng, 60.0, 160.0).round();
            Rect::new(x, y, 50.0, h)
        })
        .collect()
}

fn roguelike(bounds: WorldBounds, rng: &mut SimRng) -> Vec<Obstacle> {
    let cols = ((bounds.width / ROGUELIKE_CELL).floor() as u32).max(4);
    let rows = ((bounds.height / ROGUELIKE_CELL).floor() as u32).max(3);
    let cell_w = bounds.width / cols as f32;
    let cell_h = bounds.height / rows as f32;

    let mut covers = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            let cx = ((c as f32 + 0.5) * cell_w).floor();
            let cy = ((r as f32 + 0.5) * cell_h).floor();
            if cx < SPAWN_MARGIN || cx > bounds.width - SPAWN_MARGIN {
                continue;
            }
            if rng::chance(rng, ROGUELIKE_FILL) {
                let w = rng::uniform(rng, ROGUELIKE_CELL * 0.5, ROGUELIKE_CELL * 0.95).round();
                let h = rng::uniform(rng, ROGUELIKE_CELL * 0.4, ROGUELIKE_CELL * 0.9).round();
                covers.push(Rect::new(
                    cx - (w * 0.5).floor(),
                    cy - (h * 0.5).floor(),
                    w,
                    h,
                ));
            }
        }
    }

    for _ in 0..3 {
        let w = rng::uniform(rng, 80.0, 180.0).round();
        let h = rng::uniform(rng, 40.0, 140.0).round();
        let x = rng::uniform(rng, 160.0, (bounds.width - 200.0).max(160.0)).round();
        let y = rng::uniform(rng, 60.0, (bounds.height - 120.0).max(60.0)).round();
        covers.push(Rect::new(x, y, w, h));
    }
    covers
}
