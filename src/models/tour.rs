//! Visiting order over a group of stops.

use crate::distance::DistanceMatrix;

/// An open visiting order: a permutation of `0..n` over a group's members.
///
/// The tour does not return to its start. Its length is the sum of the
/// directed legs between consecutive stops.
///
/// # Examples
///
/// ```
/// use u_canvass::distance::DistanceMatrix;
/// use u_canvass::models::Tour;
///
/// let dm = DistanceMatrix::from_data(3, vec![
///     0.0, 1.0, 2.0,
///     1.0, 0.0, 1.0,
///     2.0, 1.0, 0.0,
/// ]).unwrap();
/// let tour = Tour::new(vec![0, 1, 2], &dm);
/// assert_eq!(tour.len(), 3);
/// assert!((tour.length() - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    order: Vec<usize>,
    length: f64,
}

impl Tour {
    /// Builds a tour from a visiting order, computing its length on `distances`.
    pub fn new(order: Vec<usize>, distances: &DistanceMatrix) -> Self {
        let length = path_length(&order, distances);
        Self { order, length }
    }

    pub fn empty() -> Self {
        Self {
            order: Vec::new(),
            length: 0.0,
        }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns `true` if the order visits each of `0..n` exactly once.
    pub fn is_permutation_of(&self, n: usize) -> bool {
        if self.order.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        for &i in &self.order {
            if i >= n || seen[i] {
                return false;
            }
            seen[i] = true;
        }
        true
    }

    /// Rearranges `items` into visiting order.
    ///
    /// `items` must be the group this tour was built from.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        self.order
            .iter()
            .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
            .collect()
    }
}

/// Sum of directed legs `order[0] → order[1] → … → order[n-1]`.
pub fn path_length(order: &[usize], distances: &DistanceMatrix) -> f64 {
    order
        .windows(2)
        .map(|w| distances.get(w[0], w[1]))
        .sum()
}
