//! Post-partition team balancing.
//!
//! - [`merge_smallest`] / [`merge_smallest_n`] — fold the smallest group into the next smallest
//! - [`cap`] / [`cap_with_overflow`] — truncate groups to a maximum size

mod cap;
mod merge;

pub use cap::{cap, cap_with_overflow};
pub use merge::{merge_smallest, merge_smallest_n};
