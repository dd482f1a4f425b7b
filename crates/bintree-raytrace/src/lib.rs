#![warn(missing_docs)]

//! Ray queries over a bintree.
//!
//! A bintree is a binary space partition whose internal nodes split space
//! with one axis-aligned plane and whose leaves list object indices. This
//! crate is the query engine over an already-built tree: it clips a ray to
//! the tree's range, walks the nodes near-to-far along the ray, and hands
//! candidate objects to a caller-supplied intersector.
//!
//! # Architecture
//!
//! - [`Ray`] - Ray representation and the slab test against a range
//! - [`tree`] - Arena of nodes with validated assembly
//! - [`accumulate`] - Closest-hit and all-hits collectors
//! - [`intersect`] - The per-object intersection trait
//! - [`query`] - Query modes, options and parallel batches
//! - [`stats`] - Search-cost counters and reporting
//!
//! # Example
//!
//! ```
//! use bintree_math::{Axis, Point3, Range3, Vec3};
//! use bintree_raytrace::{RangeIntersector, Ray, TreeArena};
//!
//! let objects = vec![
//!     Range3::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0)).unwrap(),
//!     Range3::new(Point3::new(7.0, 0.0, 0.0), Point3::new(8.0, 2.0, 2.0)).unwrap(),
//! ];
//!
//! let mut arena = TreeArena::new();
//! let left = arena.push_leaf([0]);
//! let right = arena.push_leaf([1]);
//! let root = arena.push_split(Axis::X, 5.0, left, right);
//! let bounds = Range3::new(Point3::origin(), Point3::new(10.0, 10.0, 10.0)).unwrap();
//! let tree = arena.finish(root, bounds).unwrap();
//!
//! let ray = Ray::new(Point3::new(0.0, 1.0, 1.0), Vec3::new(1.0, 0.0, 0.0));
//! let hit = tree.closest_hit(&ray, &RangeIntersector::new(&objects)).unwrap();
//! assert_eq!(hit.object, 0);
//! assert_eq!(hit.distance, 1.0);
//! ```

mod ray;
mod traverse;
pub mod accumulate;
pub mod error;
pub mod intersect;
pub mod query;
pub mod stats;
pub mod tree;

pub use accumulate::{AllHits, ClosestHit, Hit, HitAccumulator};
pub use error::{BintreeError, Result};
pub use intersect::{ObjectIntersector, RangeIntersector};
pub use query::{QueryHits, QueryMode, QueryOptions, QueryOutcome};
pub use ray::Ray;
pub use stats::{global_stats, print_bintree_stats, reset_global_stats, GlobalStats, SearchStats, StatsReport};
pub use tree::{Bintree, BintreeNode, NodeId, ObjectIndex, TreeArena};
