//! Angular-sweep partitioning.
//!
//! # Algorithm
//!
//! Each address is offset from the origin and converted to a polar angle in
//! `[0, 2π)`. The circle is cut into `N` equal wedges starting at due east
//! and sweeping counter-clockwise; an address joins the wedge its angle falls
//! in. Nearby addresses tend to share a wedge, and the result is fully
//! determined by the input and the origin.
//!
//! # Complexity
//!
//! O(n): no sorting is needed, only bucketing.
//!
//! # Reference
//!
//! Gillett, B.E. & Miller, L.R. (1974). "A Heuristic Algorithm for the
//! Vehicle-Dispatch Problem", *Operations Research* 22(2), 340-349.

use std::f64::consts::TAU;

use log::{debug, info};

use super::Partition;
use crate::models::{Address, Coordinate};

/// Polar angle of an offset, normalized into `[0, 2π)`.
///
/// A zero longitude offset points due north (`π/2`) or due south (`3π/2`)
/// by the sign of the latitude offset. A zero offset on both axes maps to 0.
///
/// # Examples
///
/// ```
/// use std::f64::consts::PI;
/// use u_canvass::partition::polar_angle;
///
/// assert_eq!(polar_angle(1.0, 0.0), 0.0);
/// assert!((polar_angle(0.0, 2.0) - PI / 2.0).abs() < 1e-12);
/// assert!((polar_angle(-1.0, -1.0) - 1.25 * PI).abs() < 1e-12);
/// assert!((polar_angle(0.0, -2.0) - 1.5 * PI).abs() < 1e-12);
/// ```
pub fn polar_angle(offset_lon: f64, offset_lat: f64) -> f64 {
    if offset_lon == 0.0 && offset_lat == 0.0 {
        return 0.0;
    }
    let theta = offset_lat.atan2(offset_lon);
    let theta = if theta < 0.0 { theta + TAU } else { theta };
    if theta >= TAU {
        theta - TAU
    } else {
        theta
    }
}

/// Wedge index for angle `theta` among `n` equal wedges, always in `[0, n-1]`.
pub fn bucket_index(theta: f64, n: usize) -> usize {
    let n = n.max(1);
    let raw = (theta / TAU * n as f64).floor();
    if raw.is_nan() || raw < 0.0 {
        0
    } else {
        (raw as usize).min(n - 1)
    }
}

/// Splits `addresses` into `n` wedges around `origin`.
///
/// Always returns exactly `max(n, 1)` groups (some possibly empty). Input
/// order is preserved inside each group. Addresses with a zero longitude
/// offset are assigned by latitude sign and listed in
/// [`Partition::degenerate`].
///
/// # Examples
///
/// ```
/// use u_canvass::models::{Address, Coordinate};
/// use u_canvass::partition::angular_sweep;
///
/// let stops = vec![
///     Address::new("ne", 1.0, 1.0),
///     Address::new("nw", 1.0, -1.0),
///     Address::new("sw", -1.0, -1.0),
///     Address::new("se", -1.0, 1.0),
/// ];
/// let parts = angular_sweep(stops, 4, &Coordinate::new(0.0, 0.0));
/// let names: Vec<_> = parts
///     .groups()
///     .iter()
///     .map(|g| g[0].formatted_address())
///     .collect();
/// assert_eq!(names, vec!["ne", "nw", "sw", "se"]);
/// ```
pub fn angular_sweep(addresses: Vec<Address>, n: usize, origin: &Coordinate) -> Partition {
    let n = n.max(1);
    let mut groups: Vec<Vec<Address>> = (0..n).map(|_| Vec::new()).collect();
    let mut degenerate = Vec::new();

    for address in addresses {
        let (dx, dy) = address.location().offset_from(origin);
        if dx == 0.0 {
            debug!(
                "{} has zero longitude offset from origin; placing by latitude sign",
                address.formatted_address()
            );
            degenerate.push(address.formatted_address().to_string());
        }
        let theta = polar_angle(dx, dy);
        groups[bucket_index(theta, n)].push(address);
    }

    let partition = Partition::new(groups, degenerate);
    info!("angular sweep split into groups like: {:?}", partition.sizes());
    partition
}
