//! Dense distance matrix.

use crate::distance::TravelTimes;
use crate::error::Result;
use crate::models::Address;

/// A dense n×n distance matrix stored in row-major order.
///
/// Built either from straight-line distances between address coordinates
/// (symmetric) or from cached travel durations (possibly asymmetric).
///
/// # Examples
///
/// ```
/// use u_canvass::models::Address;
/// use u_canvass::distance::DistanceMatrix;
///
/// let stops = vec![
///     Address::new("a", 0.0, 0.0),
///     Address::new("b", 3.0, 4.0),
///     Address::new("c", 6.0, 8.0),
/// ];
/// let dm = DistanceMatrix::from_addresses(&stops);
/// assert!((dm.get(0, 1) - 5.0).abs() < 1e-10);
/// assert_eq!(dm.size(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Creates a distance matrix of the given size, initialized to zero.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0.0; size * size],
            size,
        }
    }

    /// Computes a straight-line distance matrix from address coordinates.
    pub fn from_addresses(addresses: &[Address]) -> Self {
        let n = addresses.len();
        let mut dm = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = addresses[i].distance_to(&addresses[j]);
                dm.set(i, j, d);
                dm.set(j, i, d);
            }
        }
        dm
    }

    /// Builds a travel-duration matrix (seconds) from a populated cache.
    ///
    /// Every ordered pair must already be cached; a missing pair surfaces
    /// as [`Error::NotFound`](crate::Error::NotFound).
    pub fn from_travel_times(addresses: &[Address], source: &dyn TravelTimes) -> Result<Self> {
        let n = addresses.len();
        let mut dm = Self::new(n);
        for (i, from) in addresses.iter().enumerate() {
            for (j, to) in addresses.iter().enumerate() {
                if i == j {
                    continue;
                }
                let secs = source.lookup(from.formatted_address(), to.formatted_address())?;
                dm.set(i, j, secs as f64);
            }
        }
        Ok(dm)
    }

    /// Creates a distance matrix from an explicit n×n grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        Some(Self { data, size })
    }

    /// Returns the distance from location `from` to location `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Sets the distance from location `from` to location `to`.
    pub fn set(&mut self, from: usize, to: usize, distance: f64) {
        self.data[from * self.size + to] = distance;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost of the undirected edge `{a, b}`: the cheaper of its two directions.
    pub fn edge_cost(&self, a: usize, b: usize) -> f64 {
        self.get(a, b).min(self.get(b, a))
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the nearest neighbor of `from` among the given candidates.
    ///
    /// Returns `None` if `candidates` is empty. Ties go to the earliest candidate.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .min_by(|&a, &b| self.get(from, a).total_cmp(&self.get(from, b)))
    }
}
