//! Per-object intersection, supplied by the caller.
//!
//! The tree only stores object indices. Whatever those indices refer to,
//! the caller provides an [`ObjectIntersector`] that knows how to hit one.

use bintree_math::Range3;

use crate::accumulate::HitAccumulator;
use crate::tree::ObjectIndex;
use crate::Ray;

/// Computes where a ray hits a single object.
///
/// Implementations must record only hits at `distance >= t_min` and must
/// leave `hits` untouched on a miss.
pub trait ObjectIntersector {
    /// Intersect `ray` with `object`, reporting hits into `hits`.
    fn intersect(&self, ray: &Ray, t_min: f64, object: ObjectIndex, hits: &mut dyn HitAccumulator);
}

impl<F> ObjectIntersector for F
where
    F: Fn(&Ray, f64, ObjectIndex, &mut dyn HitAccumulator),
{
    fn intersect(&self, ray: &Ray, t_min: f64, object: ObjectIndex, hits: &mut dyn HitAccumulator) {
        self(ray, t_min, object, hits)
    }
}

/// Intersector for objects that are themselves axis-aligned ranges.
///
/// Reports one hit per object: the first parameter at or after `t_min`
/// where the ray is inside the range.
#[derive(Debug, Clone, Copy)]
pub struct RangeIntersector<'a> {
    objects: &'a [Range3],
}

impl<'a> RangeIntersector<'a> {
    /// Wrap a slice of ranges indexed by object index.
    pub fn new(objects: &'a [Range3]) -> Self {
        Self { objects }
    }
}

impl ObjectIntersector for RangeIntersector<'_> {
    fn intersect(&self, ray: &Ray, t_min: f64, object: ObjectIndex, hits: &mut dyn HitAccumulator) {
        let Some(range) = self.objects.get(object) else {
            debug_assert!(false, "object index {object} out of bounds");
            return;
        };
        if let Some((t_in, t_out)) = ray.intersect_range(range) {
            if t_out >= t_min {
                hits.record_hit(object, t_in.max(t_min));
            }
        }
    }
}
