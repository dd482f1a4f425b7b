//! Top-level ray queries: modes, options and batch execution.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::accumulate::{AllHits, ClosestHit, Hit};
use crate::error::{BintreeError, Result};
use crate::intersect::ObjectIntersector;
use crate::stats::{record_global, SearchStats};
use crate::tree::Bintree;
use crate::Ray;

/// Which hits a query collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueryMode {
    /// Only the nearest hit.
    #[default]
    ClosestHit,
    /// Every hit, in discovery order.
    AllHits,
}

/// Query parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Stop an all-hits query after this many hits. Ignored for closest-hit.
    pub max_hits: Option<usize>,
    /// Add each query's cost to the process-wide counters.
    pub record_global_stats: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_hits: None,
            record_global_stats: true,
        }
    }
}

impl QueryOptions {
    /// Validate options.
    pub fn validate(&self) -> Result<()> {
        if self.max_hits == Some(0) {
            return Err(BintreeError::InvalidOptions(
                "max_hits must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Hits returned by a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryHits {
    /// Nearest hit, if any.
    Closest(Option<Hit>),
    /// All hits in discovery order (not sorted by distance).
    All(Vec<Hit>),
}

impl QueryHits {
    /// True if nothing was hit.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Closest(hit) => hit.is_none(),
            Self::All(hits) => hits.is_empty(),
        }
    }

    /// Hits as a slice.
    pub fn as_slice(&self) -> &[Hit] {
        match self {
            Self::Closest(Some(hit)) => std::slice::from_ref(hit),
            Self::Closest(None) => &[],
            Self::All(hits) => hits,
        }
    }
}

/// Result of one query: the hits plus the work it took.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// Hits found.
    pub hits: QueryHits,
    /// Nodes and objects examined.
    pub stats: SearchStats,
}

impl Bintree {
    /// Query with default options.
    pub fn query<I>(&self, ray: &Ray, intersector: &I, mode: QueryMode) -> QueryOutcome
    where
        I: ObjectIntersector + ?Sized,
    {
        self.run_query(ray, intersector, mode, &QueryOptions::default())
    }

    /// Query with explicit options.
    pub fn query_with<I>(
        &self,
        ray: &Ray,
        intersector: &I,
        mode: QueryMode,
        options: &QueryOptions,
    ) -> Result<QueryOutcome>
    where
        I: ObjectIntersector + ?Sized,
    {
        options.validate()?;
        Ok(self.run_query(ray, intersector, mode, options))
    }

    /// Nearest hit along `ray`, if any.
    pub fn closest_hit<I>(&self, ray: &Ray, intersector: &I) -> Option<Hit>
    where
        I: ObjectIntersector + ?Sized,
    {
        match self.query(ray, intersector, QueryMode::ClosestHit).hits {
            QueryHits::Closest(hit) => hit,
            QueryHits::All(_) => None,
        }
    }

    /// Every hit along `ray`, in discovery order.
    pub fn all_hits<I>(&self, ray: &Ray, intersector: &I) -> Vec<Hit>
    where
        I: ObjectIntersector + ?Sized,
    {
        match self.query(ray, intersector, QueryMode::AllHits).hits {
            QueryHits::All(hits) => hits,
            QueryHits::Closest(_) => Vec::new(),
        }
    }

    /// Run many independent queries in parallel against this tree.
    ///
    /// Results are in the same order as `rays`.
    pub fn query_batch<I>(
        &self,
        rays: &[Ray],
        intersector: &I,
        mode: QueryMode,
        options: &QueryOptions,
    ) -> Result<Vec<QueryOutcome>>
    where
        I: ObjectIntersector + Sync + ?Sized,
    {
        options.validate()?;
        debug!(rays = rays.len(), ?mode, "bintree batch query");
        Ok(rays
            .par_iter()
            .map(|ray| self.run_query(ray, intersector, mode, options))
            .collect())
    }

    fn run_query<I>(
        &self,
        ray: &Ray,
        intersector: &I,
        mode: QueryMode,
        options: &QueryOptions,
    ) -> QueryOutcome
    where
        I: ObjectIntersector + ?Sized,
    {
        let (hits, stats) = match mode {
            QueryMode::ClosestHit => {
                let mut acc = ClosestHit::new();
                let stats = self.traverse(ray, intersector, &mut acc);
                (QueryHits::Closest(acc.into_hit()), stats)
            }
            QueryMode::AllHits => {
                let mut acc = match options.max_hits {
                    Some(max) => AllHits::with_limit(max),
                    None => AllHits::new(),
                };
                let stats = self.traverse(ray, intersector, &mut acc);
                (QueryHits::All(acc.into_hits()), stats)
            }
        };

        if options.record_global_stats {
            record_global(stats);
        }

        QueryOutcome { hits, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersect::RangeIntersector;
    use crate::tree::TreeArena;
    use bintree_math::{Axis, Point3, Range3, Vec3};

    fn range(min: [f64; 3], max: [f64; 3]) -> Range3 {
        Range3::new(Point3::from(min), Point3::from(max)).unwrap()
    }

    /// Root [0,10]^3 split at x = 5; A at x in [1,2], B at x in [7,8].
    fn two_leaf_scene() -> (Bintree, Vec<Range3>) {
        let objects = vec![
            range([1.0, 0.0, 0.0], [2.0, 2.0, 2.0]),
            range([7.0, 0.0, 0.0], [8.0, 2.0, 2.0]),
        ];
        let mut arena = TreeArena::new();
        let a = arena.push_leaf([0]);
        let b = arena.push_leaf([1]);
        let root = arena.push_split(Axis::X, 5.0, a, b);
        let tree = arena.finish(root, range([0.0; 3], [10.0; 3])).unwrap();
        (tree, objects)
    }

    fn quiet() -> QueryOptions {
        QueryOptions {
            record_global_stats: false,
            ..QueryOptions::default()
        }
    }

    #[test]
    fn test_closest_hit_example() {
        let (tree, objects) = two_leaf_scene();
        let ray = Ray::new(Point3::new(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let hit = tree.closest_hit(&ray, &RangeIntersector::new(&objects)).unwrap();
        assert_eq!(hit.object, 0);
        assert!((hit.distance - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_all_hits_example() {
        let (tree, objects) = two_leaf_scene();
        let ray = Ray::new(Point3::new(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let hits = tree.all_hits(&ray, &RangeIntersector::new(&objects));
        assert_eq!(hits, vec![Hit::new(0, 1.0), Hit::new(1, 7.0)]);
    }

    #[test]
    fn test_closest_prunes_far_leaf() {
        let (tree, objects) = two_leaf_scene();
        let ray = Ray::new(Point3::new(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let outcome = tree
            .query_with(&ray, &RangeIntersector::new(&objects), QueryMode::ClosestHit, &quiet())
            .unwrap();
        // Root and near leaf only.
        assert_eq!(outcome.stats.nodes_visited, 2);
        assert_eq!(outcome.stats.objects_tested, 1);
    }

    #[test]
    fn test_max_hits_cap() {
        let (tree, objects) = two_leaf_scene();
        let ray = Ray::new(Point3::new(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let options = QueryOptions {
            max_hits: Some(1),
            record_global_stats: false,
        };
        let outcome = tree
            .query_with(&ray, &RangeIntersector::new(&objects), QueryMode::AllHits, &options)
            .unwrap();
        assert_eq!(outcome.hits, QueryHits::All(vec![Hit::new(0, 1.0)]));
        assert_eq!(outcome.stats.objects_tested, 1);
    }

    #[test]
    fn test_invalid_options() {
        let (tree, objects) = two_leaf_scene();
        let ray = Ray::new(Point3::new(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
        let options = QueryOptions {
            max_hits: Some(0),
            ..quiet()
        };
        let err = tree
            .query_with(&ray, &RangeIntersector::new(&objects), QueryMode::AllHits, &options)
            .unwrap_err();
        assert!(matches!(err, BintreeError::InvalidOptions(_)));
    }

    #[test]
    fn test_options_deserialize_defaults() {
        let options: QueryOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.max_hits, None);
        assert!(options.record_global_stats);

        let options: QueryOptions = serde_json::from_str(r#"{"max_hits": 3}"#).unwrap();
        assert_eq!(options.max_hits, Some(3));
    }

    #[test]
    fn test_query_hits_slice() {
        assert!(QueryHits::Closest(None).is_empty());
        assert!(QueryHits::All(Vec::new()).as_slice().is_empty());
        let one = QueryHits::Closest(Some(Hit::new(2, 4.0)));
        assert_eq!(one.as_slice(), &[Hit::new(2, 4.0)]);
    }

    #[test]
    fn test_batch_matches_sequential() {
        let (tree, objects) = two_leaf_scene();
        let intersector = RangeIntersector::new(&objects);
        let rays: Vec<Ray> = (0..16)
            .map(|i| {
                let y = i as f64 * 0.25;
                Ray::new(Point3::new(0.0, y, 1.0), Vec3::new(1.0, 0.0, 0.0))
            })
            .collect();

        let batch = tree
            .query_batch(&rays, &intersector, QueryMode::AllHits, &quiet())
            .unwrap();
        assert_eq!(batch.len(), rays.len());
        for (ray, outcome) in rays.iter().zip(&batch) {
            let single = tree
                .query_with(ray, &intersector, QueryMode::AllHits, &quiet())
                .unwrap();
            assert_eq!(&single, outcome);
        }
    }
}
