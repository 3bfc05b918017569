//! Minimal 2D vector and angle helpers.
//!
//! Everything runs on `f64` with the same operation order each step, so a
//! given seed and input stream replays bit-for-bit on one platform.

use core::f64::consts::TAU;
use core::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` scaled by `length`.
    #[inline]
    pub fn from_angle(angle: f64, length: f64) -> Self {
        Self::new(angle.cos() * length, angle.sin() * length)
    }

    #[inline]
    pub fn length_sq(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length_sq().sqrt()
    }

    /// Heading of the vector, or `fallback` for the zero vector.
    #[inline]
    pub fn heading_or(self, fallback: f64) -> f64 {
        if self.x == 0.0 && self.y == 0.0 {
            fallback
        } else {
            self.y.atan2(self.x)
        }
    }

    /// Rescales to at most `max` length.
    pub fn clamp_length(self, max: f64) -> Self {
        let len_sq = self.length_sq();
        if len_sq <= max * max || len_sq == 0.0 {
            return self;
        }
        self * (max / len_sq.sqrt())
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

/// Normalizes an angle into [0, 2π).
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_angle_points_along_heading() {
        let v = Vec2::from_angle(core::f64::consts::FRAC_PI_2, 3.0);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y - 3.0).abs() < 1e-12);
    }

    #[test]
    fn clamp_length_only_shrinks() {
        let slow = Vec2::new(3.0, 4.0);
        assert_eq!(slow.clamp_length(10.0), slow);
        let fast = Vec2::new(30.0, 40.0).clamp_length(10.0);
        assert!((fast.length() - 10.0).abs() < 1e-9);
        assert_eq!(Vec2::ZERO.clamp_length(0.0), Vec2::ZERO);
    }

    #[test]
    fn zero_vector_uses_fallback_heading() {
        assert_eq!(Vec2::ZERO.heading_or(1.25), 1.25);
        assert!((Vec2::new(0.0, -2.0).heading_or(0.0) + core::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn angles_normalize_into_one_turn() {
        assert_eq!(normalize_angle(0.0), 0.0);
        assert!((normalize_angle(-0.5) - (TAU - 0.5)).abs() < 1e-12);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < 1e-12);
        let tiny = normalize_angle(-1e-18);
        assert!((0.0..TAU).contains(&tiny));
    }
}
