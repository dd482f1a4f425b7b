#![warn(missing_docs)]

//! Math types for the bintree ray index.
//!
//! Thin wrappers around nalgebra providing the vocabulary shared by the
//! query engine and by tree builders: points, vectors, split axes, and
//! axis-aligned bounding ranges.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Number of spatial dimensions.
pub const N_DIMENSIONS: usize = 3;

/// One of the three coordinate axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// All axes in index order.
    pub const ALL: [Axis; N_DIMENSIONS] = [Axis::X, Axis::Y, Axis::Z];

    /// Coordinate index of this axis (0, 1 or 2).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Axis for a coordinate index, if in range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Coordinate of a point along this axis.
    #[inline]
    pub fn of(self, p: &Point3) -> f64 {
        p.coords[self.index()]
    }

    /// Component of a vector along this axis.
    #[inline]
    pub fn component(self, v: &Vec3) -> f64 {
        v[self.index()]
    }
}

/// Errors produced when a bounding range is malformed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RangeError {
    /// The minimum exceeds the maximum on an axis.
    #[error("inverted range on {axis:?}: min {min} > max {max}")]
    Inverted {
        /// Offending axis.
        axis: Axis,
        /// Lower limit.
        min: f64,
        /// Upper limit.
        max: f64,
    },

    /// A limit is NaN.
    #[error("range limit on {0:?} is not a number")]
    NotANumber(Axis),
}

/// Axis-aligned bounding range: a `(min, max)` slab per axis.
///
/// Limits are inclusive on both ends. A range built through [`Range3::new`]
/// or [`Range3::from_limits`] always satisfies `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RangeLimits", into = "RangeLimits")]
pub struct Range3 {
    limits: [[f64; 2]; N_DIMENSIONS],
}

/// Serialized form of a [`Range3`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RangeLimits {
    limits: [[f64; 2]; N_DIMENSIONS],
}

impl TryFrom<RangeLimits> for Range3 {
    type Error = RangeError;

    fn try_from(value: RangeLimits) -> Result<Self, Self::Error> {
        Range3::from_limits(value.limits)
    }
}

impl From<Range3> for RangeLimits {
    fn from(range: Range3) -> Self {
        Self {
            limits: range.limits,
        }
    }
}

impl Range3 {
    /// Create a range from its min and max corners.
    pub fn new(min: Point3, max: Point3) -> Result<Self, RangeError> {
        Self::from_limits([[min.x, max.x], [min.y, max.y], [min.z, max.z]])
    }

    /// Create a range from `[min, max]` pairs indexed by axis.
    pub fn from_limits(limits: [[f64; 2]; N_DIMENSIONS]) -> Result<Self, RangeError> {
        for axis in Axis::ALL {
            let [min, max] = limits[axis.index()];
            if min.is_nan() || max.is_nan() {
                return Err(RangeError::NotANumber(axis));
            }
            if min > max {
                return Err(RangeError::Inverted { axis, min, max });
            }
        }
        Ok(Self { limits })
    }

    /// Create an empty (inverted) range suitable for expansion.
    ///
    /// Not valid until at least one point has been included.
    pub fn empty() -> Self {
        Self {
            limits: [[f64::INFINITY, f64::NEG_INFINITY]; N_DIMENSIONS],
        }
    }

    /// Expand this range to include a point.
    pub fn include_point(&mut self, p: &Point3) {
        for axis in Axis::ALL {
            let c = axis.of(p);
            let [min, max] = &mut self.limits[axis.index()];
            *min = min.min(c);
            *max = max.max(c);
        }
    }

    /// Expand this range to include another range.
    pub fn include_range(&mut self, other: &Range3) {
        self.include_point(&other.min_corner());
        self.include_point(&other.max_corner());
    }

    /// True if `min <= max` on every axis.
    pub fn is_valid(&self) -> bool {
        self.limits.iter().all(|[min, max]| min <= max)
    }

    /// Lower limit along an axis.
    #[inline]
    pub fn min(&self, axis: Axis) -> f64 {
        self.limits[axis.index()][0]
    }

    /// Upper limit along an axis.
    #[inline]
    pub fn max(&self, axis: Axis) -> f64 {
        self.limits[axis.index()][1]
    }

    /// `[min, max]` along an axis.
    #[inline]
    pub fn limits(&self, axis: Axis) -> [f64; 2] {
        self.limits[axis.index()]
    }

    /// Minimum corner.
    pub fn min_corner(&self) -> Point3 {
        Point3::new(self.min(Axis::X), self.min(Axis::Y), self.min(Axis::Z))
    }

    /// Maximum corner.
    pub fn max_corner(&self) -> Point3 {
        Point3::new(self.max(Axis::X), self.max(Axis::Y), self.max(Axis::Z))
    }

    /// Test whether a point lies inside (faces included).
    pub fn contains(&self, p: &Point3) -> bool {
        Axis::ALL.iter().all(|&axis| {
            let c = axis.of(p);
            c >= self.min(axis) && c <= self.max(axis)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_range() -> Range3 {
        Range3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_axis_index_roundtrip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()), Some(axis));
        }
        assert_eq!(Axis::from_index(3), None);
    }

    #[test]
    fn test_axis_coordinates() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::X.of(&p), 1.0);
        assert_eq!(Axis::Y.of(&p), 2.0);
        assert_eq!(Axis::Z.of(&p), 3.0);
        let v = Vec3::new(-1.0, 0.0, 4.0);
        assert_eq!(Axis::Z.component(&v), 4.0);
    }

    #[test]
    fn test_range_rejects_inverted() {
        let err = Range3::new(Point3::new(0.0, 2.0, 0.0), Point3::new(1.0, 1.0, 1.0))
            .unwrap_err();
        assert_eq!(
            err,
            RangeError::Inverted {
                axis: Axis::Y,
                min: 2.0,
                max: 1.0
            }
        );
    }

    #[test]
    fn test_range_rejects_nan() {
        let err = Range3::from_limits([[0.0, 1.0], [0.0, 1.0], [f64::NAN, 1.0]]).unwrap_err();
        assert_eq!(err, RangeError::NotANumber(Axis::Z));
    }

    #[test]
    fn test_degenerate_range_is_valid() {
        // A flat range (min == max) is allowed.
        let r = Range3::from_limits([[0.0, 0.0], [0.0, 1.0], [0.0, 1.0]]).unwrap();
        assert!(r.is_valid());
        assert!(r.contains(&Point3::new(0.0, 0.5, 0.5)));
    }

    #[test]
    fn test_contains_is_boundary_inclusive() {
        let r = unit_range();
        assert!(r.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(r.contains(&Point3::new(1.0, 0.5, 1.0)));
        assert!(!r.contains(&Point3::new(1.0 + 1e-9, 0.5, 0.5)));
    }

    #[test]
    fn test_empty_expands() {
        let mut r = Range3::empty();
        assert!(!r.is_valid());
        r.include_point(&Point3::new(1.0, -2.0, 3.0));
        r.include_range(&unit_range());
        assert!(r.is_valid());
        assert_eq!(r.limits(Axis::X), [0.0, 1.0]);
        assert_eq!(r.limits(Axis::Y), [-2.0, 1.0]);
        assert_eq!(r.limits(Axis::Z), [0.0, 3.0]);
    }

    #[test]
    fn test_range_serde_validates() {
        let json = serde_json::to_string(&unit_range()).unwrap();
        let back: Range3 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, unit_range());

        let bad = r#"{"limits":[[1.0,0.0],[0.0,1.0],[0.0,1.0]]}"#;
        assert!(serde_json::from_str::<Range3>(bad).is_err());
    }
}
