//! Vector math and frame-scale normalization.
//!
//! The simulation runs in continuous world units (pixels of the original
//! playfield). Every per-tick displacement and countdown is multiplied by a
//! [`FrameScale`] so the same wall-clock duration produces the same result
//! regardless of how often the driver ticks.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Duration of one nominal tick in milliseconds (60 ticks per second).
pub const NOMINAL_TICK_MS: f32 = 1000.0 / 60.0;

/// 2D vector in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Unit vector along +X, used as the separation normal for coincident points.
    pub const UNIT_X: Self = Self { x: 1.0, y: 0.0 };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Squared length (avoids sqrt for comparisons).
    #[must_use]
    pub fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Squared distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        (other - self).length_squared()
    }

    /// Unit direction from `self` toward `target`.
    ///
    /// A zero-length offset divides by 1 instead of 0, so coincident points
    /// yield the zero vector rather than NaN.
    #[must_use]
    pub fn direction_to(self, target: Self) -> Self {
        (target - self).normalize_or_zero()
    }

    /// Normalize, substituting a unit length for a zero-length vector.
    #[must_use]
    pub fn normalize_or_zero(self) -> Self {
        let len = self.length();
        let len = if len > 0.0 { len } else { 1.0 };
        self / len
    }

    /// Normalize, returning `fallback` when the vector has (near) zero length.
    #[must_use]
    pub fn normalize_or(self, fallback: Self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            fallback
        } else {
            self / len
        }
    }

    /// Counter-clockwise perpendicular.
    #[must_use]
    pub const fn perpendicular(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Whether both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Clamp that tolerates an inverted range by collapsing it to its midpoint.
///
/// `f32::clamp` panics when `lo > hi`, which happens when the world is
/// narrower than an agent's diameter.
#[must_use]
pub fn clamp_range(value: f32, lo: f32, hi: f32) -> f32 {
    if lo > hi {
        (lo + hi) * 0.5
    } else {
        value.max(lo).min(hi)
    }
}

/// Ratio of the actual tick duration to the nominal 60 Hz tick.
///
/// Always finite and at least [`FrameScale::MIN`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FrameScale(f32);

impl FrameScale {
    /// One nominal tick.
    pub const NOMINAL: Self = Self(1.0);

    /// Smallest representable scale.
    pub const MIN: f32 = 0.01;

    /// Create a frame scale, flooring at [`Self::MIN`].
    ///
    /// Non-finite input falls back to [`Self::NOMINAL`].
    #[must_use]
    pub fn new(scale: f32) -> Self {
        if scale.is_finite() {
            Self(scale.max(Self::MIN))
        } else {
            Self::NOMINAL
        }
    }

    /// Derive the scale from elapsed milliseconds since the previous tick.
    #[must_use]
    pub fn from_elapsed_ms(elapsed_ms: f32) -> Self {
        Self::new(elapsed_ms / NOMINAL_TICK_MS)
    }

    /// Derive the scale from an elapsed [`Duration`].
    #[must_use]
    pub fn from_duration(elapsed: Duration) -> Self {
        Self::from_elapsed_ms(elapsed.as_secs_f32() * 1000.0)
    }

    /// Raw multiplier.
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }
}

impl Default for FrameScale {
    fn default() -> Self {
        Self::NOMINAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_to_zero_length_is_zero() {
        let p = Vec2::new(3.0, 4.0);
        let dir = p.direction_to(p);
        assert_eq!(dir, Vec2::ZERO);
        assert!(dir.is_finite());
    }

    #[test]
    fn test_direction_to_is_unit() {
        let dir = Vec2::ZERO.direction_to(Vec2::new(3.0, 4.0));
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((dir.x - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_or_fallback() {
        assert_eq!(Vec2::ZERO.normalize_or(Vec2::UNIT_X), Vec2::UNIT_X);
    }

    #[test]
    fn test_clamp_range_inverted() {
        assert_eq!(clamp_range(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp_range(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp_range(3.0, 10.0, 4.0), 7.0);
    }

    #[test]
    fn test_frame_scale_from_elapsed() {
        let fs = FrameScale::from_elapsed_ms(NOMINAL_TICK_MS * 2.0);
        assert!((fs.get() - 2.0).abs() < 1e-5);
        assert_eq!(FrameScale::from_elapsed_ms(0.0).get(), FrameScale::MIN);
        assert_eq!(FrameScale::new(f32::NAN), FrameScale::NOMINAL);
    }

    #[test]
    fn test_frame_scale_from_duration() {
        let fs = FrameScale::from_duration(Duration::from_millis(33));
        assert!((fs.get() - 1.98).abs() < 1e-3);
    }
}
