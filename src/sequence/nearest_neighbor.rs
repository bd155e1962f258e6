//! Nearest-neighbor path construction.
//!
//! Starting from a given stop, always walk to the nearest unvisited stop
//! along the directed leg. Fast and simple; typically longer than the
//! greedy-edge path on scattered stops.
//!
//! # Complexity
//!
//! O(n²).

use crate::distance::DistanceMatrix;
use crate::models::Tour;

/// Builds an open path by repeatedly visiting the nearest unvisited stop.
///
/// `start` is clamped into range; an empty matrix gives an empty tour.
///
/// # Examples
///
/// ```
/// use u_canvass::models::Address;
/// use u_canvass::distance::DistanceMatrix;
/// use u_canvass::sequence::nearest_neighbor;
///
/// let stops = vec![
///     Address::new("a", 0.0, 0.0),
///     Address::new("far", 0.0, 10.0),
///     Address::new("near", 0.0, 1.0),
/// ];
/// let dm = DistanceMatrix::from_addresses(&stops);
/// assert_eq!(nearest_neighbor(&dm, 0).order(), &[0, 2, 1]);
/// ```
pub fn nearest_neighbor(distances: &DistanceMatrix, start: usize) -> Tour {
    let n = distances.size();
    if n == 0 {
        return Tour::empty();
    }

    let mut current = start.min(n - 1);
    let mut remaining: Vec<usize> = (0..n).filter(|&i| i != current).collect();
    let mut order = Vec::with_capacity(n);
    order.push(current);

    while let Some(next) = distances.nearest_neighbor(current, &remaining) {
        remaining.retain(|&i| i != next);
        order.push(next);
        current = next;
    }

    Tour::new(order, distances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;

    fn line_stops() -> DistanceMatrix {
        let stops: Vec<Address> = [0.0, 1.0, 2.0, 3.0]
            .iter()
            .map(|&x| Address::new(format!("{x}"), 0.0, x))
            .collect();
        DistanceMatrix::from_addresses(&stops)
    }

    #[test]
    fn test_nn_walks_line() {
        let tour = nearest_neighbor(&line_stops(), 0);
        assert_eq!(tour.order(), &[0, 1, 2, 3]);
        assert!((tour.length() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_nn_from_middle() {
        let tour = nearest_neighbor(&line_stops(), 2);
        assert!(tour.is_permutation_of(4));
        assert_eq!(tour.order()[0], 2);
    }

    #[test]
    fn test_nn_empty_and_single() {
        assert!(nearest_neighbor(&DistanceMatrix::new(0), 0).is_empty());
        assert_eq!(nearest_neighbor(&DistanceMatrix::new(1), 5).order(), &[0]);
    }

    #[test]
    fn test_nn_follows_directed_legs() {
        let mut dm = DistanceMatrix::new(3);
        dm.set(0, 1, 5.0);
        dm.set(0, 2, 1.0);
        dm.set(2, 1, 1.0);
        dm.set(1, 2, 9.0);
        let tour = nearest_neighbor(&dm, 0);
        assert_eq!(tour.order(), &[0, 2, 1]);
        assert!((tour.length() - 2.0).abs() < 1e-10);
    }
}
