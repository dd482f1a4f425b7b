//! Recursive near-to-far traversal of a bintree.

use bintree_math::Axis;

use crate::accumulate::HitAccumulator;
use crate::intersect::ObjectIntersector;
use crate::stats::SearchStats;
use crate::tree::{Bintree, BintreeNode, NodeId};
use crate::Ray;

/// Traversal state shared by every level of one query.
struct Traversal<'a, I: ?Sized, A> {
    tree: &'a Bintree,
    ray: &'a Ray,
    intersector: &'a I,
    hits: &'a mut A,
    stats: SearchStats,
}

impl<I, A> Traversal<'_, I, A>
where
    I: ObjectIntersector + ?Sized,
    A: HitAccumulator,
{
    fn visit(&mut self, id: NodeId, t_min: f64, t_max: f64) {
        self.stats.nodes_visited += 1;

        let tree = self.tree;
        match tree.node(id) {
            BintreeNode::Leaf { objects } => {
                for &object in objects {
                    if self.hits.is_saturated() {
                        break;
                    }
                    self.stats.objects_tested += 1;
                    self.intersector.intersect(self.ray, t_min, object, &mut *self.hits);
                }
            }
            &BintreeNode::Internal {
                axis,
                left_limit,
                right_limit,
                left,
                right,
            } => self.visit_children(axis, left_limit, right_limit, left, right, t_min, t_max),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn visit_children(
        &mut self,
        axis: Axis,
        left_limit: f64,
        right_limit: f64,
        left: Option<NodeId>,
        right: Option<NodeId>,
        t_min: f64,
        t_max: f64,
    ) {
        let x = axis.of(&self.ray.origin);
        let delta = axis.component(&self.ray.direction);

        // The low side is entered first only when travelling up the axis.
        let mut searching_left = delta > 0.0;

        for _ in 0..2 {
            // Re-read the best distance: the near child may have just improved it.
            let t_max_child = match self.hits.closest_distance() {
                Some(best) if best < t_max => best,
                _ => t_max,
            };

            let (child, clipped) = if searching_left {
                (left, clip_left(left_limit, x, delta, t_min, t_max_child))
            } else {
                (right, clip_right(right_limit, x, delta, t_min, t_max_child))
            };

            if let (Some(child), Some((lo, hi))) = (child, clipped) {
                if lo <= hi && !self.hits.is_saturated() {
                    self.visit(child, lo, hi);
                }
            }

            searching_left = !searching_left;
        }
    }
}

/// Clip `[t_min, t_max]` to the part of the ray at or below `limit`.
///
/// With `delta == 0` the ray never crosses the plane; an origin exactly on
/// the plane belongs to both sides.
fn clip_left(limit: f64, x: f64, delta: f64, t_min: f64, t_max: f64) -> Option<(f64, f64)> {
    if delta == 0.0 {
        return (x <= limit).then_some((t_min, t_max));
    }

    let t = (limit - x) / delta;
    if delta < 0.0 {
        // Enters the low side at t.
        (t <= t_max).then(|| (t_min.max(t), t_max))
    } else {
        // Leaves the low side at t.
        (t >= t_min).then(|| (t_min, t_max.min(t)))
    }
}

/// Clip `[t_min, t_max]` to the part of the ray at or above `limit`.
fn clip_right(limit: f64, x: f64, delta: f64, t_min: f64, t_max: f64) -> Option<(f64, f64)> {
    if delta == 0.0 {
        return (x >= limit).then_some((t_min, t_max));
    }

    let t = (limit - x) / delta;
    if delta < 0.0 {
        // Leaves the high side at t.
        (t >= t_min).then(|| (t_min, t_max.min(t)))
    } else {
        // Enters the high side at t.
        (t <= t_max).then(|| (t_min.max(t), t_max))
    }
}

impl Bintree {
    /// Walk the tree along `ray`, reporting candidate objects to
    /// `intersector` and collecting hits in `hits`.
    ///
    /// The ray is first clipped against the tree's range; if it misses, no
    /// node is visited. Children are visited near-to-far along the ray, and
    /// an accumulator that reports a [`HitAccumulator::closest_distance`]
    /// prunes everything beyond it.
    pub fn traverse<I, A>(&self, ray: &Ray, intersector: &I, hits: &mut A) -> SearchStats
    where
        I: ObjectIntersector + ?Sized,
        A: HitAccumulator,
    {
        let Some((t_min, t_max)) = ray.intersect_range(self.range()) else {
            tracing::trace!("ray misses bintree range");
            return SearchStats::default();
        };

        let mut traversal = Traversal {
            tree: self,
            ray,
            intersector,
            hits,
            stats: SearchStats::default(),
        };
        traversal.visit(self.root(), t_min, t_max);
        traversal.stats
    }
}
