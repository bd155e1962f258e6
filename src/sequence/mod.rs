//! Route sequencing: ordering a team's stops into a short walkable path.
//!
//! - [`seed_order`] — sort by straight-line distance from the origin (warm start)
//! - [`greedy_edge`] — shortest-edge-first path construction, O(n² log n)
//! - [`nearest_neighbor`] — nearest-unvisited walk, O(n²)
//! - [`two_opt_improve`] — open-path segment reversal, first stop fixed
//!
//! [`RouteSequencer`] ties these together for one group.

mod greedy_edge;
mod nearest_neighbor;
mod two_opt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::distance::{DistanceMatrix, TravelTimes};
use crate::error::{Error, Result};
use crate::models::{Address, Coordinate};

pub use greedy_edge::greedy_edge;
pub use nearest_neighbor::nearest_neighbor;
pub use two_opt::two_opt_improve;

/// Where leg costs come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Euclidean distance between coordinates, symmetric.
    #[default]
    StraightLine,
    /// Cached provider durations, possibly asymmetric.
    TravelTime,
}

/// Which path construction heuristic to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencerKind {
    #[default]
    GreedyEdge,
    NearestNeighbor,
}

/// Sorts stops by straight-line distance from `origin`, nearest first.
///
/// Equidistant stops keep their input order.
pub fn seed_order(mut group: Vec<Address>, origin: &Coordinate) -> Vec<Address> {
    group.sort_by(|a, b| {
        a.location()
            .distance_to(origin)
            .total_cmp(&b.location().distance_to(origin))
    });
    group
}

/// Orders one group's stops into a visiting path.
///
/// # Examples
///
/// ```
/// use u_canvass::models::{Address, Coordinate};
/// use u_canvass::sequence::{Metric, RouteSequencer, SequencerKind};
///
/// let sequencer = RouteSequencer::new(
///     Coordinate::new(0.0, 0.0),
///     SequencerKind::GreedyEdge,
///     Metric::StraightLine,
///     true,
/// );
/// let group = vec![
///     Address::new("c", 0.0, 3.0),
///     Address::new("a", 0.0, 1.0),
///     Address::new("d", 0.0, 4.0),
///     Address::new("b", 0.0, 2.0),
/// ];
/// let (route, length) = sequencer.sequence(group, None).unwrap();
/// let names: Vec<_> = route.iter().map(|a| a.formatted_address()).collect();
/// assert_eq!(names, vec!["a", "b", "c", "d"]);
/// assert!((length - 3.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct RouteSequencer {
    origin: Coordinate,
    kind: SequencerKind,
    metric: Metric,
    improve: bool,
}

impl RouteSequencer {
    pub fn new(origin: Coordinate, kind: SequencerKind, metric: Metric, improve: bool) -> Self {
        Self {
            origin,
            kind,
            metric,
            improve,
        }
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Returns `group` in visiting order together with the path length.
    ///
    /// Length is in degrees for [`Metric::StraightLine`] and seconds for
    /// [`Metric::TravelTime`]. The travel-time metric needs `travel`, with
    /// every pair of the group already ensured.
    pub fn sequence(
        &self,
        group: Vec<Address>,
        travel: Option<&dyn TravelTimes>,
    ) -> Result<(Vec<Address>, f64)> {
        let seeded = seed_order(group, &self.origin);
        if seeded.len() < 2 {
            return Ok((seeded, 0.0));
        }

        let distances = match (self.metric, travel) {
            (Metric::StraightLine, _) => DistanceMatrix::from_addresses(&seeded),
            (Metric::TravelTime, Some(source)) => {
                let dm = DistanceMatrix::from_travel_times(&seeded, source)?;
                if !dm.is_symmetric(0.0) {
                    debug!(
                        "travel times for {} stops are asymmetric; ranking edges by cheaper direction",
                        dm.size()
                    );
                }
                dm
            }
            (Metric::TravelTime, None) => {
                return Err(Error::invalid_config(
                    "travel-time metric selected but no travel-time source supplied",
                ))
            }
        };

        let tour = match self.kind {
            SequencerKind::GreedyEdge => greedy_edge(&distances),
            SequencerKind::NearestNeighbor => nearest_neighbor(&distances, 0),
        };
        let tour = if self.improve {
            two_opt_improve(&tour, &distances)
        } else {
            tour
        };
        debug!(
            "sequenced {} stops, path length {:.4}",
            tour.len(),
            tour.length()
        );

        let length = tour.length();
        Ok((tour.apply(seeded), length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Table(HashMap<(String, String), u64>);

    impl TravelTimes for Table {
        fn ensure(&mut self, _addresses: &[String]) -> Result<usize> {
            Ok(0)
        }

        fn lookup(&self, origin: &str, destination: &str) -> Result<u64> {
            self.0
                .get(&(origin.to_string(), destination.to_string()))
                .copied()
                .ok_or_else(|| Error::not_found(origin, destination))
        }
    }

    fn sequencer(kind: SequencerKind, metric: Metric) -> RouteSequencer {
        RouteSequencer::new(Coordinate::new(0.0, 0.0), kind, metric, true)
    }

    fn names(route: &[Address]) -> Vec<&str> {
        route.iter().map(Address::formatted_address).collect()
    }

    #[test]
    fn test_seed_order_nearest_first() {
        let origin = Coordinate::new(0.0, 0.0);
        let group = vec![
            Address::new("far", 5.0, 5.0),
            Address::new("near", 0.1, 0.0),
            Address::new("mid", 1.0, 1.0),
        ];
        assert_eq!(names(&seed_order(group, &origin)), vec!["near", "mid", "far"]);
    }

    #[test]
    fn test_empty_and_singleton() {
        let s = sequencer(SequencerKind::GreedyEdge, Metric::StraightLine);
        let (route, len) = s.sequence(Vec::new(), None).expect("empty");
        assert!(route.is_empty());
        assert_eq!(len, 0.0);
        let (route, _) = s
            .sequence(vec![Address::new("only", 1.0, 1.0)], None)
            .expect("single");
        assert_eq!(names(&route), vec!["only"]);
    }

    #[test]
    fn test_colinear_either_direction_is_monotonic() {
        for kind in [SequencerKind::GreedyEdge, SequencerKind::NearestNeighbor] {
            let group = vec![
                Address::new("2", 2.0, 2.0),
                Address::new("4", 4.0, 4.0),
                Address::new("1", 1.0, 1.0),
                Address::new("3", 3.0, 3.0),
            ];
            let (route, _) = sequencer(kind, Metric::StraightLine)
                .sequence(group, None)
                .expect("sequence");
            let order = names(&route);
            assert!(order == ["1", "2", "3", "4"] || order == ["4", "3", "2", "1"]);
        }
    }

    #[test]
    fn test_travel_time_metric_uses_cache() {
        // Straight-line would walk a, b, c; durations make b <-> c a slow leg.
        let group = vec![
            Address::new("a", 0.0, 1.0),
            Address::new("b", 0.0, 2.0),
            Address::new("c", 0.0, 3.0),
        ];
        let mut t = HashMap::new();
        for (o, d, secs) in [
            ("a", "b", 10),
            ("b", "a", 10),
            ("a", "c", 20),
            ("c", "a", 20),
            ("b", "c", 500),
            ("c", "b", 500),
        ] {
            t.insert((o.to_string(), d.to_string()), secs);
        }
        let table = Table(t);
        let (route, len) = sequencer(SequencerKind::GreedyEdge, Metric::TravelTime)
            .sequence(group, Some(&table))
            .expect("sequence");
        assert_eq!(names(&route), vec!["b", "a", "c"]);
        assert_eq!(len, 30.0);
    }

    #[test]
    fn test_travel_time_metric_requires_source() {
        let group = vec![Address::new("a", 0.0, 1.0), Address::new("b", 0.0, 2.0)];
        let err = sequencer(SequencerKind::GreedyEdge, Metric::TravelTime)
            .sequence(group, None)
            .expect_err("no source");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_pair_propagates() {
        let group = vec![Address::new("a", 0.0, 1.0), Address::new("b", 0.0, 2.0)];
        let err = sequencer(SequencerKind::GreedyEdge, Metric::TravelTime)
            .sequence(group, Some(&Table(HashMap::new())))
            .expect_err("empty table");
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
