//! Search-cost instrumentation.
//!
//! Every traversal returns its own [`SearchStats`]. Queries may also add
//! their totals to process-wide atomic counters, which are only used for
//! tuning builder heuristics and never affect results.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::info;

/// Work done by one or more traversals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes entered, leaves included.
    pub nodes_visited: u64,
    /// Calls made to the object intersector.
    pub objects_tested: u64,
}

impl Add for SearchStats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            nodes_visited: self.nodes_visited + rhs.nodes_visited,
            objects_tested: self.objects_tested + rhs.objects_tested,
        }
    }
}

impl AddAssign for SearchStats {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for SearchStats {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

/// Snapshot of the process-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Summed search cost.
    pub search: SearchStats,
    /// Number of queries recorded.
    pub queries: u64,
}

static NODES_VISITED: AtomicU64 = AtomicU64::new(0);
static OBJECTS_TESTED: AtomicU64 = AtomicU64::new(0);
static QUERIES: AtomicU64 = AtomicU64::new(0);

/// Add one query's cost to the process-wide counters.
pub(crate) fn record_global(stats: SearchStats) {
    NODES_VISITED.fetch_add(stats.nodes_visited, Ordering::Relaxed);
    OBJECTS_TESTED.fetch_add(stats.objects_tested, Ordering::Relaxed);
    QUERIES.fetch_add(1, Ordering::Relaxed);
}

/// Read the process-wide counters.
pub fn global_stats() -> GlobalStats {
    GlobalStats {
        search: SearchStats {
            nodes_visited: NODES_VISITED.load(Ordering::Relaxed),
            objects_tested: OBJECTS_TESTED.load(Ordering::Relaxed),
        },
        queries: QUERIES.load(Ordering::Relaxed),
    }
}

/// Zero the process-wide counters.
pub fn reset_global_stats() {
    NODES_VISITED.store(0, Ordering::Relaxed);
    OBJECTS_TESTED.store(0, Ordering::Relaxed);
    QUERIES.store(0, Ordering::Relaxed);
}

/// Average search cost over some count (objects, rays, queries).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    /// Average nodes visited.
    pub nodes: f64,
    /// Average objects tested.
    pub objects: f64,
}

impl StatsReport {
    /// Divide totals by `count`. A zero count reports zeros.
    pub fn new(stats: SearchStats, count: usize) -> Self {
        if count == 0 {
            return Self {
                nodes: 0.0,
                objects: 0.0,
            };
        }
        let n = count as f64;
        Self {
            nodes: stats.nodes_visited as f64 / n,
            objects: stats.objects_tested as f64 / n,
        }
    }

    /// Averages per recorded query.
    pub fn per_query(stats: GlobalStats) -> Self {
        Self::new(stats.search, stats.queries as usize)
    }
}

impl fmt::Display for StatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nodes {}  Objects {}", self.nodes, self.objects)
    }
}

/// Log the process-wide search cost averaged over `n_objects`.
pub fn print_bintree_stats(n_objects: usize) -> StatsReport {
    let report = StatsReport::new(global_stats().search, n_objects);
    info!(
        nodes = report.nodes,
        objects = report.objects,
        n_objects,
        "bintree search cost: {report}"
    );
    report
}
