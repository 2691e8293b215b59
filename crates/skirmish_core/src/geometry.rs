//! Static cover geometry and obstacle-aware movement.
//!
//! Obstacles are axis-aligned rectangles. All queries are pure; movement
//! helpers return the new position rather than mutating anything.

use serde::{Deserialize, Serialize};

use crate::math::{clamp_range, Vec2};

/// Distance an agent is placed beyond an obstacle edge when pushed out.
pub const EDGE_CLEARANCE: f32 = 0.5;

/// Step fractions tried, in order, when a full step is blocked.
const STEP_FRACTIONS: [f32; 4] = [1.0, 0.6, 0.4, 0.2];

/// Axis-aligned rectangle with half-open containment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
}

impl Rect {
    /// Create a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the point lies inside (`x <= px < x + w`, same for y).
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.x + self.w && p.y >= self.y && p.y < self.y + self.h
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    /// Whether two rectangles overlap.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }

    /// Move `p` just outside this rectangle along the axis of least
    /// displacement. Points already outside are returned unchanged.
    #[must_use]
    pub fn push_outside(&self, p: Vec2) -> Vec2 {
        if !self.contains(p) {
            return p;
        }
        let left = p.x - self.x;
        let right = self.x + self.w - p.x;
        let top = p.y - self.y;
        let bottom = self.y + self.h - p.y;

        let min = left.min(right).min(top).min(bottom);
        if min == left {
            Vec2::new(self.x - EDGE_CLEARANCE, p.y)
        } else if min == right {
            Vec2::new(self.x + self.w + EDGE_CLEARANCE, p.y)
        } else if min == top {
            Vec2::new(p.x, self.y - EDGE_CLEARANCE)
        } else {
            Vec2::new(p.x, self.y + self.h + EDGE_CLEARANCE)
        }
    }
}

/// A piece of cover. Blocks movement, sight lines and bullets.
pub type Obstacle = Rect;

/// The playable rectangle `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Width in world units.
    pub width: f32,
    /// Height in world units.
    pub height: f32,
}

impl WorldBounds {
    /// Create bounds of the given size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Clamp a circle of `radius` so it lies fully inside the world.
    #[must_use]
    pub fn clamp(&self, p: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            clamp_range(p.x, radius, self.width - radius),
            clamp_range(p.y, radius, self.height - radius),
        )
    }

    /// Whether a point lies inside the world (edges inclusive).
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Centre point.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Whether any obstacle contains `p`.
#[must_use]
pub fn point_blocked(obstacles: &[Obstacle], p: Vec2) -> bool {
    obstacles.iter().any(|o| o.contains(p))
}

/// Whether the segment `a -> b` passes through cover.
///
/// The segment is sampled every `step` units, both endpoints included, and
/// each sample is tested for containment against every obstacle.
#[must_use]
pub fn segment_blocked(obstacles: &[Obstacle], a: Vec2, b: Vec2, step: f32) -> bool {
    let length = a.distance(b);
    let samples = if step > 0.0 {
        (length / step).ceil().max(1.0) as u32
    } else {
        1
    };
    (0..=samples).any(|i| {
        let t = i as f32 / samples as f32;
        point_blocked(obstacles, a + (b - a) * t)
    })
}

/// Read-only view of the static world used by movement and sight queries.
#[derive(Debug, Clone, Copy)]
pub struct Terrain<'a> {
    /// Cover rectangles.
    pub obstacles: &'a [Obstacle],
    /// World rectangle.
    pub bounds: WorldBounds,
}

impl<'a> Terrain<'a> {
    /// Create a terrain view.
    #[must_use]
    pub const fn new(obstacles: &'a [Obstacle], bounds: WorldBounds) -> Self {
        Self { obstacles, bounds }
    }

    /// Whether `p` is outside every obstacle.
    #[must_use]
    pub fn is_free(&self, p: Vec2) -> bool {
        !point_blocked(self.obstacles, p)
    }

    /// Whether `p` is inside cover.
    #[must_use]
    pub fn in_cover(&self, p: Vec2) -> bool {
        point_blocked(self.obstacles, p)
    }

    /// Whether nothing blocks the sight line `a -> b`.
    #[must_use]
    pub fn line_of_sight(&self, a: Vec2, b: Vec2, step: f32) -> bool {
        !segment_blocked(self.obstacles, a, b, step)
    }

    /// Obstacle whose centre is nearest to `p`.
    #[must_use]
    pub fn nearest_obstacle(&self, p: Vec2) -> Option<&'a Obstacle> {
        self.obstacles.iter().min_by(|a, b| {
            p.distance_squared(a.center())
                .total_cmp(&p.distance_squared(b.center()))
        })
    }

    /// Relocate `p` out of any obstacle containing it.
    ///
    /// A no-op for points outside all obstacles. Overlapping obstacles are
    /// handled by repeating the pass, bounded by the obstacle count.
    #[must_use]
    pub fn push_outside(&self, p: Vec2) -> Vec2 {
        let mut p = p;
        for _ in 0..self.obstacles.len() {
            match self.obstacles.iter().find(|o| o.contains(p)) {
                Some(o) => p = o.push_outside(p),
                None => break,
            }
        }
        p
    }

    /// Attempt to move a circle of `radius` from `from` by `delta`.
    ///
    /// Tries the full step, then 0.6, 0.4 and 0.2 of it, then an x-only and
    /// a y-only slide. Returns the first candidate outside every obstacle, or
    /// `from` if none is. The result is always clamped to the world.
    #[must_use]
    pub fn try_move(&self, from: Vec2, delta: Vec2, radius: f32) -> Vec2 {
        let candidates = STEP_FRACTIONS
            .iter()
            .map(|&f| from + delta * f)
            .chain([from + Vec2::new(delta.x, 0.0), from + Vec2::new(0.0, delta.y)]);
        for candidate in candidates {
            let candidate = self.bounds.clamp(candidate, radius);
            if self.is_free(candidate) {
                return candidate;
            }
        }
        self.bounds.clamp(from, radius)
    }

    /// Step toward `target` by at most `step` units, sliding along cover.
    ///
    /// Points within one unit of the target do not move.
    #[must_use]
    pub fn step_toward(&self, from: Vec2, target: Vec2, step: f32, radius: f32) -> Vec2 {
        let distance = from.distance(target);
        if distance <= 1.0 {
            return self.bounds.clamp(from, radius);
        }
        let delta = from.direction_to(target) * step.min(distance);
        self.try_move(from, delta, radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> WorldBounds {
        WorldBounds::new(800.0, 600.0)
    }

    #[test]
    fn test_rect_contains_half_open() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Vec2::new(10.0, 10.0)));
        assert!(r.contains(Vec2::new(29.9, 29.9)));
        assert!(!r.contains(Vec2::new(30.0, 15.0)));
        assert!(!r.contains(Vec2::new(15.0, 30.0)));
    }

    #[test]
    fn test_segment_blocked_by_thin_wall() {
        let wall = [Rect::new(100.0, 0.0, 5.0, 600.0)];
        assert!(segment_blocked(
            &wall,
            Vec2::new(50.0, 300.0),
            Vec2::new(150.0, 300.0),
            4.0
        ));
        assert!(!segment_blocked(
            &wall,
            Vec2::new(50.0, 300.0),
            Vec2::new(90.0, 300.0),
            4.0
        ));
    }

    #[test]
    fn test_segment_with_endpoint_in_cover_is_blocked() {
        let cover = [Rect::new(40.0, 280.0, 40.0, 40.0)];
        assert!(segment_blocked(
            &cover,
            Vec2::new(60.0, 300.0),
            Vec2::new(300.0, 300.0),
            4.0
        ));
    }

    #[test]
    fn test_segment_blocked_empty_obstacles() {
        assert!(!segment_blocked(&[], Vec2::ZERO, Vec2::new(500.0, 0.0), 4.0));
    }

    #[test]
    fn test_push_outside_minimal_axis() {
        let r = Rect::new(100.0, 100.0, 50.0, 100.0);
        let pushed = r.push_outside(Vec2::new(103.0, 150.0));
        assert_eq!(pushed, Vec2::new(100.0 - EDGE_CLEARANCE, 150.0));
        let pushed = r.push_outside(Vec2::new(125.0, 198.0));
        assert_eq!(pushed, Vec2::new(125.0, 200.0 + EDGE_CLEARANCE));
    }

    #[test]
    fn test_push_outside_idempotent_when_free() {
        let obstacles = [Rect::new(100.0, 100.0, 50.0, 50.0)];
        let terrain = Terrain::new(&obstacles, bounds());
        let p = Vec2::new(10.0, 10.0);
        assert_eq!(terrain.push_outside(p), p);
        let pushed = terrain.push_outside(Vec2::new(120.0, 120.0));
        assert_eq!(terrain.push_outside(pushed), pushed);
    }

    #[test]
    fn test_try_move_full_step_when_free() {
        let terrain = Terrain::new(&[], bounds());
        let p = terrain.try_move(Vec2::new(100.0, 100.0), Vec2::new(5.0, 0.0), 10.0);
        assert_eq!(p, Vec2::new(105.0, 100.0));
    }

    #[test]
    fn test_try_move_slides_along_wall() {
        // Wall directly to the right; diagonal movement should slide vertically.
        let obstacles = [Rect::new(104.0, 0.0, 50.0, 600.0)];
        let terrain = Terrain::new(&obstacles, bounds());
        let p = terrain.try_move(Vec2::new(100.0, 100.0), Vec2::new(20.0, 20.0), 10.0);
        assert_eq!(p, Vec2::new(100.0, 120.0));
    }

    #[test]
    fn test_try_move_uses_partial_step() {
        let obstacles = [Rect::new(110.0, 0.0, 50.0, 600.0)];
        let terrain = Terrain::new(&obstacles, bounds());
        let p = terrain.try_move(Vec2::new(100.0, 300.0), Vec2::new(20.0, 0.0), 10.0);
        assert_eq!(p, Vec2::new(108.0, 300.0));
    }

    #[test]
    fn test_try_move_clamps_to_bounds() {
        let terrain = Terrain::new(&[], bounds());
        let p = terrain.try_move(Vec2::new(795.0, 5.0), Vec2::new(50.0, -50.0), 10.0);
        assert_eq!(p, Vec2::new(790.0, 10.0));
    }

    #[test]
    fn test_step_toward_does_not_overshoot() {
        let terrain = Terrain::new(&[], bounds());
        let p = terrain.step_toward(Vec2::new(100.0, 100.0), Vec2::new(103.0, 100.0), 10.0, 10.0);
        assert_eq!(p, Vec2::new(103.0, 100.0));
    }

    #[test]
    fn test_nearest_obstacle() {
        let obstacles = [
            Rect::new(0.0, 0.0, 10.0, 10.0),
            Rect::new(400.0, 400.0, 10.0, 10.0),
        ];
        let terrain = Terrain::new(&obstacles, bounds());
        let nearest = terrain.nearest_obstacle(Vec2::new(380.0, 390.0));
        assert_eq!(nearest, Some(&obstacles[1]));
        assert!(Terrain::new(&[], bounds()).nearest_obstacle(Vec2::ZERO).is_none());
    }

    #[test]
    fn test_bounds_clamp_narrow_world() {
        let narrow = WorldBounds::new(10.0, 600.0);
        let p = narrow.clamp(Vec2::new(0.0, 300.0), 10.0);
        assert_eq!(p.x, 5.0);
    }
}
