//! Centroid (k-means) partitioning.
//!
//! # Algorithm
//!
//! Lloyd's iteration over `(latitude, longitude)` points: assign each point
//! to its nearest centroid, move each centroid to the mean of its points,
//! and repeat until assignments stop changing or the iteration budget runs
//! out. Initial centroids are chosen by k-means++ seeding from a fixed seed,
//! so runs are reproducible.
//!
//! Groups come out spatially coherent but not size-balanced.
//!
//! # Complexity
//!
//! O(n · k · iterations).

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::Partition;
use crate::models::Address;

type Point = [f64; 2];

fn squared_distance(a: &Point, b: &Point) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn nearest_centroid(point: &Point, centers: &[Point]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (j, center) in centers.iter().enumerate() {
        let d = squared_distance(point, center);
        if d < best_dist {
            best_dist = d;
            best = j;
        }
    }
    best
}

/// k-means++ seeding: each next center is drawn with probability
/// proportional to its squared distance from the nearest chosen center.
fn seed_centers<R: Rng>(points: &[Point], k: usize, rng: &mut R) -> Vec<Point> {
    let mut centers = Vec::with_capacity(k);
    centers.push(points[rng.random_range(0..points.len())]);

    let mut nearest: Vec<f64> = points
        .iter()
        .map(|p| squared_distance(p, &centers[0]))
        .collect();

    while centers.len() < k {
        let total: f64 = nearest.iter().sum();
        let pick = if total > 0.0 {
            let mut target = rng.random_range(0.0..total);
            let mut chosen = points.len() - 1;
            for (i, &d) in nearest.iter().enumerate() {
                if target < d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            // Every point coincides with a center already.
            rng.random_range(0..points.len())
        };
        let center = points[pick];
        for (slot, p) in nearest.iter_mut().zip(points) {
            *slot = slot.min(squared_distance(p, &center));
        }
        centers.push(center);
    }
    centers
}

/// Splits `addresses` into `n` clusters by nearest centroid.
///
/// Always returns exactly `max(n, 1)` groups. With no more addresses than
/// groups, each address gets its own group and the rest stay empty. Input
/// order is preserved inside each group.
///
/// # Examples
///
/// ```
/// use u_canvass::models::Address;
/// use u_canvass::partition::centroid_clustering;
///
/// let stops = vec![
///     Address::new("a1", 0.0, 0.0),
///     Address::new("b1", 10.0, 10.0),
///     Address::new("a2", 0.1, 0.0),
///     Address::new("b2", 10.0, 10.1),
/// ];
/// let parts = centroid_clustering(stops, 2, 50, 7);
/// for group in parts.groups() {
///     assert_eq!(group.len(), 2);
///     assert_eq!(&group[0].formatted_address()[..1], &group[1].formatted_address()[..1]);
/// }
/// ```
pub fn centroid_clustering(
    addresses: Vec<Address>,
    n: usize,
    max_iterations: usize,
    seed: u64,
) -> Partition {
    let k = n.max(1);
    let mut groups: Vec<Vec<Address>> = (0..k).map(|_| Vec::new()).collect();

    if addresses.len() <= k {
        for (i, address) in addresses.into_iter().enumerate() {
            groups[i].push(address);
        }
        return Partition::new(groups, Vec::new());
    }

    let points: Vec<Point> = addresses
        .iter()
        .map(|a| [a.latitude(), a.longitude()])
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut centers = seed_centers(&points, k, &mut rng);
    let mut assignments: Vec<usize> = points.iter().map(|p| nearest_centroid(p, &centers)).collect();

    for iteration in 0..max_iterations {
        let mut sums = vec![[0.0, 0.0]; k];
        let mut counts = vec![0usize; k];
        for (p, &cluster) in points.iter().zip(&assignments) {
            sums[cluster][0] += p[0];
            sums[cluster][1] += p[1];
            counts[cluster] += 1;
        }
        for j in 0..k {
            if counts[j] > 0 {
                centers[j] = [sums[j][0] / counts[j] as f64, sums[j][1] / counts[j] as f64];
            }
        }

        let mut changed = false;
        for (p, slot) in points.iter().zip(assignments.iter_mut()) {
            let best = nearest_centroid(p, &centers);
            if *slot != best {
                *slot = best;
                changed = true;
            }
        }
        if !changed {
            debug!("k-means converged after {} iterations", iteration + 1);
            break;
        }
    }

    for (address, cluster) in addresses.into_iter().zip(assignments) {
        groups[cluster].push(address);
    }

    let partition = Partition::new(groups, Vec::new());
    info!("centroid clustering split into groups like: {:?}", partition.sizes());
    partition
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob(prefix: &str, lat: f64, lon: f64, count: usize) -> Vec<Address> {
        (0..count)
            .map(|i| {
                let jitter = i as f64 * 0.001;
                Address::new(format!("{prefix}{i}"), lat + jitter, lon - jitter)
            })
            .collect()
    }

    #[test]
    fn test_separates_distant_blobs() {
        let mut stops = blob("a", 0.0, 0.0, 5);
        stops.extend(blob("b", 5.0, 5.0, 4));
        stops.extend(blob("c", -5.0, 5.0, 3));
        let parts = centroid_clustering(stops, 3, 100, 42);

        let mut sizes = parts.sizes();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![3, 4, 5]);
        for group in parts.groups() {
            let first = &group[0].formatted_address()[..1];
            assert!(group.iter().all(|a| &a.formatted_address()[..1] == first));
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let mut stops = blob("a", 0.0, 0.0, 6);
        stops.extend(blob("b", 1.0, 1.0, 6));
        let a = centroid_clustering(stops.clone(), 4, 20, 9);
        let b = centroid_clustering(stops, 4, 20, 9);
        assert_eq!(a.groups(), b.groups());
    }

    #[test]
    fn test_fewer_addresses_than_groups() {
        let parts = centroid_clustering(blob("a", 0.0, 0.0, 2), 4, 10, 1);
        assert_eq!(parts.sizes(), vec![1, 1, 0, 0]);
    }

    #[test]
    fn test_all_points_identical() {
        let stops: Vec<Address> = (0..6).map(|i| Address::new(format!("x{i}"), 1.0, 1.0)).collect();
        let parts = centroid_clustering(stops, 3, 10, 3);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts.sizes().iter().sum::<usize>(), 6);
    }

    #[test]
    fn test_zero_iterations_still_assigns() {
        let mut stops = blob("a", 0.0, 0.0, 3);
        stops.extend(blob("b", 9.0, 9.0, 3));
        let parts = centroid_clustering(stops, 2, 0, 5);
        assert_eq!(parts.sizes().iter().sum::<usize>(), 6);
    }
}
