//! Ray representation and the ray/range slab test.

use bintree_math::{Axis, Point3, Range3, Vec3};

use crate::error::{BintreeError, Result};

/// A ray in 3D space defined by origin and direction.
///
/// The direction is kept as given: parametric distances returned by queries
/// are measured in multiples of `direction`, not in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray.
    pub origin: Point3,
    /// Direction of travel (not normalized).
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray from origin and direction.
    ///
    /// A direction that is zero on every axis is a contract violation.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        debug_assert!(
            direction.iter().any(|&c| c != 0.0),
            "ray direction must be non-zero"
        );
        Self { origin, direction }
    }

    /// Create a new ray, rejecting an all-zero direction.
    pub fn try_new(origin: Point3, direction: Vec3) -> Result<Self> {
        if direction.iter().all(|&c| c == 0.0) {
            return Err(BintreeError::ZeroDirection);
        }
        Ok(Self { origin, direction })
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }

    /// Test ray/range intersection using the slab method.
    ///
    /// Returns `Some((t_min, t_max))`, the parametric interval over which the
    /// ray lies inside the range, with `t_min` clamped to zero. Returns `None`
    /// if the ray misses. Faces count as inside, so an origin lying on a face
    /// of the range is a hit.
    ///
    /// An axis with a zero direction component never tightens the interval;
    /// the ray misses if its origin is outside that slab.
    pub fn intersect_range(&self, range: &Range3) -> Option<(f64, f64)> {
        let mut t_min = f64::NEG_INFINITY;
        let mut t_max = f64::INFINITY;

        for axis in Axis::ALL {
            let x = axis.of(&self.origin);
            let delta = axis.component(&self.direction);
            let [lo, hi] = range.limits(axis);

            if delta == 0.0 {
                if x < lo || x > hi {
                    return None;
                }
                continue;
            }

            let (near, far) = if delta > 0.0 { (lo, hi) } else { (hi, lo) };

            let t = (near - x) / delta;
            if t > t_min {
                t_min = t;
            }

            let t = (far - x) / delta;
            if t < t_max {
                t_max = t;
            }
        }

        if t_min < 0.0 {
            t_min = 0.0;
        }

        if t_min <= t_max {
            Some((t_min, t_max))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_range() -> Range3 {
        Range3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)).unwrap()
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0));
        let p = ray.at(2.5);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn test_try_new_rejects_zero_direction() {
        let err = Ray::try_new(Point3::origin(), Vec3::zeros()).unwrap_err();
        assert_eq!(err, BintreeError::ZeroDirection);
        assert!(Ray::try_new(Point3::origin(), Vec3::new(0.0, 0.0, -1.0)).is_ok());
    }

    #[test]
    fn test_ray_range_hit() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_range(&unit_range()).unwrap();
        assert!((t_min - 5.0).abs() < 1e-12);
        assert!((t_max - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_ray_range_unnormalized_direction() {
        // Distances scale with the direction length.
        let ray = Ray::new(Point3::new(-4.0, 0.5, 0.5), Vec3::new(2.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_range(&unit_range()).unwrap();
        assert!((t_min - 2.0).abs() < 1e-12);
        assert!((t_max - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_ray_range_miss_parallel() {
        let ray = Ray::new(Point3::new(-5.0, 5.0, 0.5), Vec3::new(1.0, 0.0, 0.0));
        assert!(ray.intersect_range(&unit_range()).is_none());
    }

    #[test]
    fn test_ray_range_miss_oblique() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(1.0, 1.0, 0.0));
        assert!(ray.intersect_range(&unit_range()).is_none());
    }

    #[test]
    fn test_ray_inside_range() {
        let ray = Ray::new(Point3::new(0.5, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_range(&unit_range()).unwrap();
        assert_eq!(t_min, 0.0);
        assert!((t_max - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_ray_range_behind() {
        let ray = Ray::new(Point3::new(-5.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        assert!(ray.intersect_range(&unit_range()).is_none());
    }

    #[test]
    fn test_ray_range_negative_direction() {
        let ray = Ray::new(Point3::new(3.0, 0.5, 0.5), Vec3::new(-1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_range(&unit_range()).unwrap();
        assert!((t_min - 2.0).abs() < 1e-12);
        assert!((t_max - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_origin_on_face_is_inside() {
        // Parallel to the face plane, lying exactly on it.
        let ray = Ray::new(Point3::new(-1.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_range(&unit_range()).unwrap();
        assert!((t_min - 1.0).abs() < 1e-12);
        assert!((t_max - 2.0).abs() < 1e-12);

        // Starting on a face, heading outward: touches at t = 0 only.
        let ray = Ray::new(Point3::new(1.0, 0.5, 0.5), Vec3::new(1.0, 0.0, 0.0));
        let (t_min, t_max) = ray.intersect_range(&unit_range()).unwrap();
        assert_eq!(t_min, 0.0);
        assert_eq!(t_max, 0.0);
    }

    #[test]
    fn test_ray_range_diagonal() {
        let ray = Ray::new(Point3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0));
        let (t_min, t_max) = ray.intersect_range(&unit_range()).unwrap();
        assert!((t_min - 1.0).abs() < 1e-12);
        assert!((t_max - 2.0).abs() < 1e-12);
    }
}
