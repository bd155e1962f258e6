//! Distance matrices and the persistent travel-time cache.
//!
//! - [`DistanceMatrix`] — dense, possibly asymmetric, per-group matrix
//! - [`DistanceCache`] — write-once pair cache over a [`DistanceProvider`]
//! - [`CacheStore`] — durable backing ([`JsonFileStore`], [`MemoryStore`])
//! - [`Throttle`] — provider cool-down ([`SleepThrottle`])

mod cache;
mod matrix;
mod provider;
mod store;
mod throttle;

pub use cache::{DistanceCache, TravelTimes};
pub use matrix::DistanceMatrix;
pub use provider::{DistanceProvider, Measure, ProviderResponse, ResponseElement, ResponseRow};
pub use store::{CacheStore, DurationRow, JsonFileStore, MemoryStore};
pub use throttle::{SleepThrottle, Throttle};
