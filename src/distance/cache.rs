//! Persistent travel-time cache over a rate-limited provider.
//!
//! # Population protocol
//!
//! Given an address set `A` whose members not yet cached as origins are `N`
//! (and the rest `K = A \ N`), [`DistanceCache::ensure`] fills every ordered
//! pair of `A` missing from the store in disjoint passes:
//!
//! 1. `N × A`: rows for the new origins, including `N × N`.
//! 2. `K × N`: the reverse direction, which the provider does not
//!    guarantee to be symmetric with pass 1.
//! 3. `K × K` gaps left by earlier calls over different address sets.
//!    Origins are grouped by their exact set of missing destinations, so
//!    only missing cells are requested.
//!
//! Every requested slot must be empty both in the store and among the rows
//! fetched so far; an occupied slot is a [`Error::CacheIntegrityViolation`],
//! raised before the request goes out.
//!
//! Fetched rows are staged and committed to the store only after every
//! request of the call has succeeded, so a failed call leaves the store as
//! it found it.
//!
//! Every provider request is preceded by [`Throttle::wait`], and every
//! request is bounded by the batch size on both axes.

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::config::CacheConfig;
use crate::distance::{
    CacheStore, DistanceProvider, DurationRow, SleepThrottle, Throttle,
};
use crate::error::{Error, Result};

/// Read access to travel durations plus the means to populate them.
pub trait TravelTimes {
    /// Makes every ordered pair drawn from `addresses` available to
    /// [`lookup`](TravelTimes::lookup). Returns the number of provider
    /// requests issued.
    fn ensure(&mut self, addresses: &[String]) -> Result<usize>;

    /// Duration in seconds from `origin` to `destination`.
    fn lookup(&self, origin: &str, destination: &str) -> Result<u64>;
}

/// Travel-time cache that looks each address pair up at most once.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_canvass::distance::{
///     DistanceCache, DistanceProvider, MemoryStore, ProviderResponse, SleepThrottle,
/// };
/// use u_canvass::Result;
///
/// struct Flat;
/// impl DistanceProvider for Flat {
///     fn query(&mut self, o: &[String], d: &[String]) -> Result<ProviderResponse> {
///         Ok(ProviderResponse::from_durations(vec![vec![60; d.len()]; o.len()]))
///     }
/// }
///
/// let throttle = SleepThrottle::new(Duration::ZERO);
/// let mut cache = DistanceCache::with_throttle(MemoryStore::new(), Flat, throttle, 9).unwrap();
/// let stops = vec!["a".to_string(), "b".to_string()];
/// assert_eq!(cache.ensure(&stops).unwrap(), 1);
/// assert_eq!(cache.ensure(&stops).unwrap(), 0);
/// assert_eq!(cache.lookup("b", "a").unwrap(), 60);
/// ```
#[derive(Debug)]
pub struct DistanceCache<S, P, T = SleepThrottle> {
    store: S,
    provider: P,
    throttle: T,
    batch_size: usize,
    requests: usize,
}

/// Rows fetched during one `ensure`, not yet in the store.
type Staged = HashMap<String, DurationRow>;

/// Known origins sharing one exact set of missing known destinations.
struct GapGroup {
    origins: Vec<String>,
    destinations: Vec<String>,
}

impl<S, P> DistanceCache<S, P, SleepThrottle>
where
    S: CacheStore,
    P: DistanceProvider,
{
    /// Creates a cache that sleeps out the configured cool-down between requests.
    pub fn new(store: S, provider: P, config: &CacheConfig) -> Result<Self> {
        let cache = Self::with_throttle(
            store,
            provider,
            SleepThrottle::new(config.cooldown),
            config.batch_size,
        )?;
        debug!(
            "distance cache: batch size {}, cool-down {:?}",
            cache.batch_size,
            cache.throttle.cooldown()
        );
        Ok(cache)
    }
}

impl<S, P, T> DistanceCache<S, P, T>
where
    S: CacheStore,
    P: DistanceProvider,
    T: Throttle,
{
    /// Creates a cache with an explicit throttle.
    ///
    /// Fails if `batch_size` is zero.
    pub fn with_throttle(store: S, provider: P, throttle: T, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::invalid_config("cache batch_size must be at least 1"));
        }
        Ok(Self {
            store,
            provider,
            throttle,
            batch_size,
            requests: 0,
        })
    }

    /// Populates every ordered pair drawn from `addresses`, then flushes.
    ///
    /// A no-op (no requests, no flush) when every pair is already cached.
    /// On error the store is left untouched and nothing is flushed; pairs
    /// fetched before the failure are requested again by the next call.
    pub fn ensure(&mut self, addresses: &[String]) -> Result<usize> {
        let all = unique(addresses);
        let (fresh, known): (Vec<String>, Vec<String>) = all
            .iter()
            .cloned()
            .partition(|a| !self.store.contains(a));
        let gaps = self.gaps(&known);

        if fresh.is_empty() && gaps.is_empty() {
            debug!("all {} addresses already in the distance cache", all.len());
            return Ok(0);
        }
        info!(
            "found {} new addresses not in the distance cache ({} already cached)",
            fresh.len(),
            known.len()
        );

        let before = self.requests;
        let batch = self.batch_size;
        let mut staged = Staged::new();

        for origins in fresh.chunks(batch) {
            for destinations in all.chunks(batch) {
                self.fetch(origins, destinations, &mut staged)?;
            }
        }

        for origins in known.chunks(batch) {
            for destinations in fresh.chunks(batch) {
                self.fetch(origins, destinations, &mut staged)?;
            }
        }

        if !gaps.is_empty() {
            debug!(
                "backfilling {} groups of cached origins missing cached destinations",
                gaps.len()
            );
            for group in &gaps {
                for origins in group.origins.chunks(batch) {
                    for destinations in group.destinations.chunks(batch) {
                        self.fetch(origins, destinations, &mut staged)?;
                    }
                }
            }
        }

        self.commit(staged);
        self.store.flush()?;
        let issued = self.requests - before;
        info!("distance cache updated with {issued} provider requests");
        Ok(issued)
    }

    /// Cached duration in seconds, or [`Error::NotFound`].
    pub fn lookup(&self, origin: &str, destination: &str) -> Result<u64> {
        self.store
            .get(origin)
            .and_then(|row| row.get(destination))
            .copied()
            .ok_or_else(|| Error::not_found(origin, destination))
    }

    /// Total provider requests issued over this cache's lifetime.
    pub fn requests_issued(&self) -> usize {
        self.requests
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Known origins whose rows lack some known destination, grouped by
    /// the exact set they lack. Groups keep first-seen order.
    fn gaps(&self, known: &[String]) -> Vec<GapGroup> {
        let mut groups: Vec<GapGroup> = Vec::new();
        for origin in known {
            let Some(row) = self.store.get(origin) else {
                continue;
            };
            let missing: Vec<String> = known
                .iter()
                .filter(|d| !row.contains_key(d.as_str()))
                .cloned()
                .collect();
            if missing.is_empty() {
                continue;
            }
            match groups.iter_mut().find(|g| g.destinations == missing) {
                Some(group) => group.origins.push(origin.clone()),
                None => groups.push(GapGroup {
                    origins: vec![origin.clone()],
                    destinations: missing,
                }),
            }
        }
        groups
    }

    fn fetch(
        &mut self,
        origins: &[String],
        destinations: &[String],
        staged: &mut Staged,
    ) -> Result<()> {
        self.check_vacant(origins, destinations, staged)?;
        self.throttle.wait();
        debug!(
            "querying distance provider: {} origins x {} destinations",
            origins.len(),
            destinations.len()
        );
        self.requests += 1;
        let response = self.provider.query(origins, destinations)?;
        let grid = response.durations(origins.len(), destinations.len())?;
        for (origin, durations) in origins.iter().zip(grid) {
            let row = staged.entry(origin.clone()).or_default();
            for (dest, secs) in destinations.iter().zip(durations) {
                row.insert(dest.clone(), secs);
            }
        }
        Ok(())
    }

    /// Fails if any requested slot is already cached or already fetched.
    fn check_vacant(
        &self,
        origins: &[String],
        destinations: &[String],
        staged: &Staged,
    ) -> Result<()> {
        for origin in origins {
            let rows = [self.store.get(origin), staged.get(origin)];
            for row in rows.into_iter().flatten() {
                if let Some(dest) = destinations.iter().find(|d| row.contains_key(d.as_str())) {
                    return Err(Error::CacheIntegrityViolation {
                        origin: origin.clone(),
                        destination: dest.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn commit(&mut self, staged: Staged) {
        for (origin, fetched) in staged {
            let mut row = self.store.get(&origin).cloned().unwrap_or_default();
            row.extend(fetched);
            self.store.set(&origin, row);
        }
    }
}

impl<S, P, T> TravelTimes for DistanceCache<S, P, T>
where
    S: CacheStore,
    P: DistanceProvider,
    T: Throttle,
{
    fn ensure(&mut self, addresses: &[String]) -> Result<usize> {
        DistanceCache::ensure(self, addresses)
    }

    fn lookup(&self, origin: &str, destination: &str) -> Result<u64> {
        DistanceCache::lookup(self, origin, destination)
    }
}

/// Deduplicates while keeping first-seen order.
fn unique(addresses: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    addresses
        .iter()
        .filter(|a| seen.insert(a.as_str()))
        .cloned()
        .collect()
}
