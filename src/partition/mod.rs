//! Geographic partitioning of addresses into team groups.
//!
//! - [`angular_sweep`] — equal polar wedges around the origin, O(n)
//! - [`centroid_clustering`] — k-means over coordinates, O(nk·iterations)
//!
//! Both return a [`Partition`] of exactly `N` groups that together hold
//! every input address once. [`PartitionPolicy`] selects between them.

mod clustering;
mod sweep;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Address, Coordinate};

pub use clustering::centroid_clustering;
pub use sweep::{angular_sweep, bucket_index, polar_angle};

/// The groups produced by a partitioner, plus addresses whose geometry
/// needed special-casing.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    groups: Vec<Vec<Address>>,
    degenerate: Vec<String>,
}

impl Partition {
    pub fn new(groups: Vec<Vec<Address>>, degenerate: Vec<String>) -> Self {
        Self { groups, degenerate }
    }

    pub fn groups(&self) -> &[Vec<Address>] {
        &self.groups
    }

    pub fn into_groups(self) -> Vec<Vec<Address>> {
        self.groups
    }

    /// Addresses placed by latitude sign because their longitude offset was zero.
    pub fn degenerate(&self) -> &[String] {
        &self.degenerate
    }

    /// Fails with [`Error::DegenerateGeometry`] naming the first degenerate
    /// address, for callers that refuse latitude-sign placement.
    pub fn require_regular(self) -> Result<Self> {
        match self.degenerate.first() {
            Some(address) => Err(Error::DegenerateGeometry {
                address: address.clone(),
            }),
            None => Ok(self),
        }
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.groups.iter().map(Vec::len).collect()
    }

    /// Number of groups, empty ones included.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total addresses across all groups.
    pub fn num_addresses(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }
}

/// Which partitioner a pipeline uses.
///
/// # Examples
///
/// ```
/// use u_canvass::models::{Address, Coordinate};
/// use u_canvass::partition::PartitionPolicy;
///
/// let stops = vec![Address::new("a", 1.0, 1.0), Address::new("b", -1.0, -1.0)];
/// let parts = PartitionPolicy::AngularSweep.partition(stops, 2, &Coordinate::new(0.0, 0.0));
/// assert_eq!(parts.sizes(), vec![1, 1]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartitionPolicy {
    /// Deterministic wedges around the origin.
    #[default]
    AngularSweep,
    /// k-means over coordinates, seeded for reproducibility.
    CentroidClustering {
        #[serde(default = "default_max_iterations")]
        max_iterations: usize,
        #[serde(default)]
        seed: u64,
    },
}

fn default_max_iterations() -> usize {
    100
}

impl PartitionPolicy {
    /// Splits `addresses` into `n` groups using this policy.
    pub fn partition(&self, addresses: Vec<Address>, n: usize, origin: &Coordinate) -> Partition {
        match self {
            Self::AngularSweep => angular_sweep(addresses, n, origin),
            Self::CentroidClustering {
                max_iterations,
                seed,
            } => centroid_clustering(addresses, n, *max_iterations, *seed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_json() {
        let p: PartitionPolicy =
            serde_json::from_str(r#"{"kind": "centroid_clustering", "seed": 3}"#).expect("json");
        assert_eq!(
            p,
            PartitionPolicy::CentroidClustering {
                max_iterations: 100,
                seed: 3
            }
        );
        let p: PartitionPolicy = serde_json::from_str(r#"{"kind": "angular_sweep"}"#).expect("json");
        assert_eq!(p, PartitionPolicy::AngularSweep);
    }

    #[test]
    fn test_require_regular() {
        let origin = Coordinate::new(0.0, 0.0);
        let regular = vec![Address::new("east", 0.0, 1.0)];
        assert!(PartitionPolicy::AngularSweep
            .partition(regular, 2, &origin)
            .require_regular()
            .is_ok());

        let north = vec![Address::new("east", 0.0, 1.0), Address::new("north", 1.0, 0.0)];
        let err = PartitionPolicy::AngularSweep
            .partition(north, 2, &origin)
            .require_regular()
            .expect_err("zero longitude offset");
        assert!(matches!(err, Error::DegenerateGeometry { ref address } if address == "north"));
    }

    #[test]
    fn test_policies_cover_input() {
        let stops: Vec<Address> = (0..20)
            .map(|i| {
                let t = i as f64 * 0.7;
                Address::new(format!("s{i}"), t.sin() * (1.0 + t), t.cos() * (2.0 - t / 20.0))
            })
            .collect();
        let origin = Coordinate::new(0.0, 0.0);
        for policy in [
            PartitionPolicy::AngularSweep,
            PartitionPolicy::CentroidClustering {
                max_iterations: 25,
                seed: 11,
            },
        ] {
            let parts = policy.partition(stops.clone(), 4, &origin);
            assert_eq!(parts.len(), 4);
            assert_eq!(parts.num_addresses(), 20);
        }
    }
}
