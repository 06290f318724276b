//! Planar coordinate type.
//!
//! `Position` is a plain `(x, y)` pair in map units (metres for every
//! scenario shipped with the workspace).  When a location graph is active,
//! positions of parked vehicles and waiting customers are snapped to the
//! coordinates of their nearest location.

use std::ops::{Add, Mul, Sub};

/// A 2-D coordinate.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance.  Cheaper than [`distance`](Self::distance)
    /// when only comparisons are needed.
    #[inline]
    pub fn sq_distance(self, other: Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Straight-line distance.
    #[inline]
    pub fn distance(self, other: Position) -> f64 {
        self.sq_distance(other).sqrt()
    }

    /// Length of `self` treated as a vector.
    #[inline]
    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector pointing from `self` to `target`.
    ///
    /// Returns `None` when the two points coincide; callers that need a
    /// direction anyway pick their own fallback.
    pub fn direction_to(self, target: Position) -> Option<Position> {
        let d = target - self;
        let n = d.norm();
        if n > 0.0 { Some(d * (1.0 / n)) } else { None }
    }

    /// Coordinate along `axis` (0 = x, anything else = y).
    #[inline]
    pub fn coord(self, axis: usize) -> f64 {
        if axis == 0 { self.x } else { self.y }
    }
}

impl Add for Position {
    type Output = Position;
    #[inline]
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;
    #[inline]
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Position {
    type Output = Position;
    #[inline]
    fn mul(self, k: f64) -> Position {
        Position::new(self.x * k, self.y * k)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
