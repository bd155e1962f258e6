//! Run configuration.
//!
//! Everything a run depends on is passed in explicitly through these types;
//! there are no process-wide defaults beyond the `Default` impls below.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use crate::models::Coordinate;
use crate::partition::PartitionPolicy;
use crate::sequence::{Metric, SequencerKind};

/// Provider request limits for the travel-time cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum origins, and maximum destinations, per request.
    pub batch_size: usize,
    /// Minimum spacing between consecutive requests.
    pub cooldown: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            batch_size: 9,
            cooldown: Duration::from_secs(11),
        }
    }
}

/// Which input rows take part in a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFilter {
    /// Keep only rows whose address contains this substring (e.g. a ZIP code).
    pub address_contains: Option<String>,
    /// Keep only rows whose visitation code is in this set.
    pub codes: Option<Vec<String>>,
    /// After sorting by filing date (newest first), keep this many rows.
    pub limit: Option<usize>,
}

/// Full configuration for one pipeline run.
///
/// # Examples
///
/// ```
/// use u_canvass::config::PipelineConfig;
///
/// let config = PipelineConfig::from_json(r#"{
///     "teams": 4,
///     "merges": 1,
///     "max_team_size": 12,
///     "origin": {"latitude": 43.18, "longitude": -77.62},
///     "policy": {"kind": "centroid_clustering", "seed": 7},
///     "filter": {"address_contains": "14621", "limit": 100}
/// }"#).unwrap();
/// assert_eq!(config.teams, 4);
/// assert_eq!(config.filter.limit, Some(100));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of groups the partitioner produces.
    pub teams: usize,
    /// How many times to fold the smallest group into the next smallest.
    pub merges: usize,
    /// Members beyond this many per team are dropped from the output.
    pub max_team_size: Option<usize>,
    /// Reference point for angles and seed ordering.
    pub origin: Coordinate,
    pub policy: PartitionPolicy,
    pub filter: RecordFilter,
    pub metric: Metric,
    pub sequencer: SequencerKind,
    /// Run 2-opt over each constructed path.
    pub improve: bool,
    pub cache: CacheConfig,
    pub logging: LoggingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            teams: 10,
            merges: 0,
            max_team_size: None,
            origin: Coordinate::default(),
            policy: PartitionPolicy::default(),
            filter: RecordFilter::default(),
            metric: Metric::default(),
            sequencer: SequencerKind::default(),
            improve: true,
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(body: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(body)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let body = std::fs::read_to_string(path)?;
        Self::from_json(&body)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.teams == 0 {
            return Err(Error::invalid_config("teams must be at least 1"));
        }
        if self.max_team_size == Some(0) {
            return Err(Error::invalid_config("max_team_size must be at least 1"));
        }
        if self.cache.batch_size == 0 {
            return Err(Error::invalid_config("cache.batch_size must be at least 1"));
        }
        let (lat, lon) = (self.origin.latitude(), self.origin.longitude());
        if !lat.is_finite() || !lon.is_finite() {
            return Err(Error::invalid_config("origin must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = PipelineConfig::default();
        config.validate().expect("defaults are valid");
        assert_eq!(config.cache.batch_size, 9);
        assert_eq!(config.cache.cooldown, Duration::from_secs(11));
        assert_eq!(config.policy, PartitionPolicy::AngularSweep);
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(
            PipelineConfig::from_json("{}").expect("empty object"),
            PipelineConfig::default()
        );
    }

    #[test]
    fn test_rejects_zero_teams() {
        let err = PipelineConfig::from_json(r#"{"teams": 0}"#).expect_err("zero teams");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_zero_cap() {
        assert!(PipelineConfig::from_json(r#"{"max_team_size": 0}"#).is_err());
    }

    #[test]
    fn test_unknown_metric_is_error() {
        assert!(matches!(
            PipelineConfig::from_json(r#"{"metric": "manhattan"}"#),
            Err(Error::Serialization(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"teams": 3, "metric": "travel_time"}"#).expect("write");
        let config = PipelineConfig::from_json_file(&path).expect("load");
        assert_eq!(config.teams, 3);
        assert_eq!(config.metric, Metric::TravelTime);
    }
}
