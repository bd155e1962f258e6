//! Open-path 2-opt improvement.
//!
//! # Algorithm
//!
//! For each segment `path[i..=j]` (with `i >= 1`, so the first stop stays
//! put), compute the change in path length from reversing it. The two
//! boundary legs are replaced, and on an asymmetric matrix the legs inside
//! the segment change direction too:
//!
//! ```text
//! delta = d(p[i-1], p[j]) + d(p[i], p[j+1]) - d(p[i-1], p[i]) - d(p[j], p[j+1])
//!       + reversed(p[i..=j]) - forward(p[i..=j])
//! ```
//!
//! The leg to `p[j+1]` is absent when `j` is the last stop. Any reversal
//! with `delta < 0` is applied; passes repeat until none improves.
//!
//! # Complexity
//!
//! O(n³) per pass on asymmetric input (segment costs are recomputed).
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use crate::distance::DistanceMatrix;
use crate::models::Tour;

fn segment_cost(path: &[usize], distances: &DistanceMatrix, reversed: bool) -> f64 {
    path.windows(2)
        .map(|w| {
            if reversed {
                distances.get(w[1], w[0])
            } else {
                distances.get(w[0], w[1])
            }
        })
        .sum()
}

fn reversal_delta(path: &[usize], distances: &DistanceMatrix, i: usize, j: usize) -> f64 {
    let prev = path[i - 1];
    let mut old_cost = distances.get(prev, path[i]);
    let mut new_cost = distances.get(prev, path[j]);
    if let Some(&next) = path.get(j + 1) {
        old_cost += distances.get(path[j], next);
        new_cost += distances.get(path[i], next);
    }
    let inner = &path[i..=j];
    old_cost += segment_cost(inner, distances, false);
    new_cost += segment_cost(inner, distances, true);
    new_cost - old_cost
}

/// Improves an open path by segment reversals, keeping its first stop.
///
/// # Examples
///
/// ```
/// use u_canvass::models::{Address, Tour};
/// use u_canvass::distance::DistanceMatrix;
/// use u_canvass::sequence::two_opt_improve;
///
/// let stops: Vec<Address> = (0..4)
///     .map(|i| Address::new(format!("{i}"), 0.0, i as f64))
///     .collect();
/// let dm = DistanceMatrix::from_addresses(&stops);
/// let zigzag = Tour::new(vec![0, 2, 1, 3], &dm);
/// let improved = two_opt_improve(&zigzag, &dm);
/// assert_eq!(improved.order(), &[0, 1, 2, 3]);
/// ```
pub fn two_opt_improve(tour: &Tour, distances: &DistanceMatrix) -> Tour {
    let mut current = tour.order().to_vec();
    let n = current.len();
    if n < 3 {
        return Tour::new(current, distances);
    }

    let mut improved = true;
    while improved {
        improved = false;
        for i in 1..n - 1 {
            for j in i + 1..n {
                if reversal_delta(&current, distances, i, j) < -1e-10 {
                    current[i..=j].reverse();
                    improved = true;
                }
            }
        }
    }

    Tour::new(current, distances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Address;

    fn square() -> DistanceMatrix {
        let stops = vec![
            Address::new("sw", 0.0, 0.0),
            Address::new("nw", 1.0, 0.0),
            Address::new("ne", 1.0, 1.0),
            Address::new("se", 0.0, 1.0),
        ];
        DistanceMatrix::from_addresses(&stops)
    }

    #[test]
    fn test_uncrosses_path() {
        let dm = square();
        // sw -> ne -> nw -> se crosses itself
        let crossing = Tour::new(vec![0, 2, 1, 3], &dm);
        let improved = two_opt_improve(&crossing, &dm);
        assert!(improved.length() < crossing.length());
        assert!((improved.length() - 3.0).abs() < 1e-10);
        assert_eq!(improved.order()[0], 0);
    }

    #[test]
    fn test_already_optimal_unchanged() {
        let dm = square();
        let tour = Tour::new(vec![0, 1, 2, 3], &dm);
        assert_eq!(two_opt_improve(&tour, &dm), tour);
    }

    #[test]
    fn test_short_paths_untouched() {
        let dm = square();
        let tour = Tour::new(vec![2, 0], &dm);
        assert_eq!(two_opt_improve(&tour, &dm).order(), &[2, 0]);
    }

    #[test]
    fn test_asymmetric_reversal_counts_inner_legs() {
        // Cheap only in the forward direction 0->1->2->3.
        let mut dm = DistanceMatrix::new(4);
        for a in 0..4 {
            for b in 0..4 {
                if a != b {
                    dm.set(a, b, 10.0);
                }
            }
        }
        dm.set(0, 1, 1.0);
        dm.set(1, 2, 1.0);
        dm.set(2, 3, 1.0);
        let tour = Tour::new(vec![0, 1, 2, 3], &dm);
        let improved = two_opt_improve(&tour, &dm);
        assert_eq!(improved.order(), &[0, 1, 2, 3]);
        assert!((improved.length() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_never_worsens() {
        let stops: Vec<Address> = (0..12)
            .map(|i| {
                let t = i as f64;
                Address::new(format!("{i}"), (t * 2.1).sin() * 5.0, (t * 1.7).cos() * 5.0)
            })
            .collect();
        let dm = DistanceMatrix::from_addresses(&stops);
        let tour = Tour::new((0..12).collect(), &dm);
        let improved = two_opt_improve(&tour, &dm);
        assert!(improved.length() <= tour.length() + 1e-10);
        assert!(improved.is_permutation_of(12));
    }
}
