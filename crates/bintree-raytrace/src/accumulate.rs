//! Hit accumulators for closest-hit and all-hits queries.

use serde::{Deserialize, Serialize};

use crate::tree::ObjectIndex;

/// An intersection between a ray and one object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Object that was hit.
    pub object: ObjectIndex,
    /// Parameter along the ray where the hit occurs.
    pub distance: f64,
}

impl Hit {
    /// Create a new hit.
    pub fn new(object: ObjectIndex, distance: f64) -> Self {
        Self { object, distance }
    }
}

/// Collects hits reported by an object intersector during traversal.
pub trait HitAccumulator {
    /// Record a hit on `object` at parameter `distance`.
    fn record_hit(&mut self, object: ObjectIndex, distance: f64);

    /// Best distance found so far, if this accumulator only wants the nearest
    /// hit. Traversal uses it to prune subtrees beyond it.
    fn closest_distance(&self) -> Option<f64> {
        None
    }

    /// True once no further hits are wanted.
    fn is_saturated(&self) -> bool {
        false
    }
}

/// Keeps only the nearest hit.
#[derive(Debug, Clone, Default)]
pub struct ClosestHit {
    best: Option<Hit>,
    hits_recorded: usize,
}

impl ClosestHit {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// The nearest hit, if any.
    pub fn hit(&self) -> Option<Hit> {
        self.best
    }

    /// Number of hits reported, including ones that were not nearer.
    pub fn hits_recorded(&self) -> usize {
        self.hits_recorded
    }

    /// Consume and return the nearest hit.
    pub fn into_hit(self) -> Option<Hit> {
        self.best
    }
}

impl HitAccumulator for ClosestHit {
    fn record_hit(&mut self, object: ObjectIndex, distance: f64) {
        self.hits_recorded += 1;
        match self.best {
            Some(best) if distance >= best.distance => {}
            _ => self.best = Some(Hit::new(object, distance)),
        }
    }

    fn closest_distance(&self) -> Option<f64> {
        self.best.map(|h| h.distance)
    }
}

/// Keeps every hit in discovery order, optionally up to a cap.
///
/// An object referenced by several leaves may be reported more than once.
#[derive(Debug, Clone, Default)]
pub struct AllHits {
    hits: Vec<Hit>,
    max_hits: Option<usize>,
}

impl AllHits {
    /// Create an unbounded accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an accumulator that stops after `max_hits` hits.
    pub fn with_limit(max_hits: usize) -> Self {
        Self {
            hits: Vec::new(),
            max_hits: Some(max_hits),
        }
    }

    /// Hits found so far, in discovery order.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    /// Consume and return the hits.
    pub fn into_hits(self) -> Vec<Hit> {
        self.hits
    }
}

impl HitAccumulator for AllHits {
    fn record_hit(&mut self, object: ObjectIndex, distance: f64) {
        if !self.is_saturated() {
            self.hits.push(Hit::new(object, distance));
        }
    }

    fn is_saturated(&self) -> bool {
        self.max_hits.is_some_and(|max| self.hits.len() >= max)
    }
}

/// Sort hits by ascending distance, keeping discovery order among ties.
pub fn sort_by_distance(hits: &mut [Hit]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
}
