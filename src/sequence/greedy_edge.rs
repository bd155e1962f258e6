//! Greedy-edge path construction.
//!
//! # Algorithm
//!
//! All undirected edges are sorted by cost. Each edge is accepted if neither
//! endpoint already has degree two and the endpoints lie in different path
//! fragments (tracked with union-find), so no cycle can close. On a complete
//! graph this always ends with `n - 1` edges forming one Hamiltonian path.
//!
//! The path is then walked from its endpoint with the lower index. Callers
//! order the matrix so that lower indices sit nearer the origin.
//!
//! # Complexity
//!
//! O(n² log n), dominated by sorting the edges.
//!
//! # Reference
//!
//! Bentley, J.L. (1992). "Fast Algorithms for Geometric Traveling Salesman
//! Problems", *ORSA Journal on Computing* 4(4), 387-411.

use crate::distance::DistanceMatrix;
use crate::models::Tour;

/// Disjoint-set forest over path fragments.
struct Fragments {
    parent: Vec<usize>,
}

impl Fragments {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn root(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Joins the fragments holding `a` and `b`; `false` if already joined.
    fn join(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }
}

/// Builds an open visiting path over every location in `distances`.
///
/// Undirected edge cost is the cheaper of the two directions; the returned
/// tour's length uses the directed legs it actually takes.
///
/// # Examples
///
/// ```
/// use u_canvass::distance::DistanceMatrix;
/// use u_canvass::sequence::greedy_edge;
///
/// // 0 -- 2 -- 1 along a line
/// let dm = DistanceMatrix::from_data(3, vec![
///     0.0, 2.0, 1.0,
///     2.0, 0.0, 1.0,
///     1.0, 1.0, 0.0,
/// ]).unwrap();
/// let tour = greedy_edge(&dm);
/// assert_eq!(tour.order(), &[0, 2, 1]);
/// assert!((tour.length() - 2.0).abs() < 1e-12);
/// ```
pub fn greedy_edge(distances: &DistanceMatrix) -> Tour {
    let n = distances.size();
    match n {
        0 => return Tour::empty(),
        1 => return Tour::new(vec![0], distances),
        _ => {}
    }

    let mut edges: Vec<(f64, usize, usize)> = Vec::with_capacity(n * (n - 1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push((distances.edge_cost(i, j), i, j));
        }
    }
    edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

    let mut degree = vec![0u8; n];
    let mut links: Vec<Vec<usize>> = vec![Vec::with_capacity(2); n];
    let mut fragments = Fragments::new(n);
    let mut accepted = 0;

    for &(_, i, j) in &edges {
        if accepted == n - 1 {
            break;
        }
        if degree[i] >= 2 || degree[j] >= 2 {
            continue;
        }
        if !fragments.join(i, j) {
            continue;
        }
        degree[i] += 1;
        degree[j] += 1;
        links[i].push(j);
        links[j].push(i);
        accepted += 1;
    }

    let start = (0..n).find(|&i| degree[i] <= 1).unwrap_or(0);
    let mut order = Vec::with_capacity(n);
    let mut prev = usize::MAX;
    let mut current = start;
    loop {
        order.push(current);
        let next = links[current].iter().copied().find(|&x| x != prev);
        match next {
            Some(x) if order.len() < n => {
                prev = current;
                current = x;
            }
            _ => break,
        }
    }

    Tour::new(order, distances)
}
