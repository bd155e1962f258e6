//! # u-canvass
//!
//! Field-team routing: split geocoded addresses into balanced teams and
//! order each team's stops into a short walkable path, with travel times
//! served from a persistent, rate-limited cache.
//!
//! ## Modules
//!
//! - [`models`] — Address records, coordinates, tours
//! - [`distance`] — Distance matrix, provider interface, persistent travel-time cache
//! - [`partition`] — Angular sweep and centroid clustering partitioners
//! - [`balance`] — Merging undersized teams, capping oversized ones
//! - [`sequence`] — Greedy-edge and nearest-neighbor path construction, 2-opt
//! - [`pipeline`] — Intake, filtering, and the end-to-end run
//! - [`config`] — Run configuration
//! - [`logging`] — Logger setup for embedding programs

pub mod balance;
pub mod config;
pub mod distance;
pub mod error;
pub mod logging;
pub mod models;
pub mod partition;
pub mod pipeline;
pub mod sequence;

pub use error::{Error, Result};
