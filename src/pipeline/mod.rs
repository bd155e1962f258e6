//! End-to-end run: rows in, one ordered route per team out.
//!
//! Intake ([`parse_records`], [`select`]) → [`PartitionPolicy`] →
//! [`merge_smallest_n`] → [`cap_with_overflow`] → [`RouteSequencer`].
//! Serializing the routes (files, map links) is left to the caller.

mod filter;
mod knowledge;

use log::info;

use crate::balance::{cap_with_overflow, merge_smallest_n};
use crate::config::PipelineConfig;
use crate::distance::TravelTimes;
use crate::error::{Error, Result};
use crate::models::{Address, Record};
use crate::sequence::{Metric, RouteSequencer};

pub use filter::{parse_records, select, Rejection};
pub use knowledge::apply_knowledge;

/// One team's stops in visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRoute {
    /// Dense team index, starting at 0.
    pub team: usize,
    pub stops: Vec<Address>,
    /// Path length in the configured metric's unit.
    pub length: f64,
}

impl TeamRoute {
    /// Stops rendered back into input row shape.
    pub fn records(&self) -> Vec<Record> {
        self.stops.iter().map(Address::to_record).collect()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Everything a run decided besides the routes themselves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    /// Rows excluded at intake.
    pub rejected: Vec<Rejection>,
    /// Addresses left after filtering and the limit.
    pub selected: usize,
    /// Group sizes straight out of the partitioner.
    pub partition_sizes: Vec<usize>,
    /// Addresses placed by latitude sign (zero longitude offset).
    pub degenerate: Vec<String>,
    /// Addresses cut by the team-size cap.
    pub dropped: Vec<String>,
    /// Provider requests issued while ensuring travel times.
    pub provider_requests: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub teams: Vec<TeamRoute>,
    pub report: RunReport,
}

/// Configured partition → balance → sequence run.
///
/// # Examples
///
/// ```
/// use u_canvass::config::PipelineConfig;
/// use u_canvass::models::{Coordinate, Record};
/// use u_canvass::pipeline::Pipeline;
///
/// let config = PipelineConfig {
///     teams: 2,
///     origin: Coordinate::new(0.0, 0.0),
///     ..PipelineConfig::default()
/// };
/// let rows: Vec<Record> = [("east", "0.0", "1.0"), ("west", "0.0", "-1.0"), ("bad", "x", "1")]
///     .iter()
///     .map(|(a, lat, lon)| {
///         Record::from([
///             ("formatted_address".to_string(), a.to_string()),
///             ("latitude".to_string(), lat.to_string()),
///             ("longitude".to_string(), lon.to_string()),
///         ])
///     })
///     .collect();
///
/// let out = Pipeline::new(config).unwrap().run(&rows, None).unwrap();
/// assert_eq!(out.teams.len(), 2);
/// assert_eq!(out.report.rejected.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    sequencer: RouteSequencer,
}

impl Pipeline {
    /// Validates `config` and builds the pipeline.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let sequencer = RouteSequencer::new(
            config.origin,
            config.sequencer,
            config.metric,
            config.improve,
        );
        Ok(Self { config, sequencer })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parses `records` and runs them. Malformed rows are reported, not fatal.
    pub fn run(
        &self,
        records: &[Record],
        travel: Option<&mut dyn TravelTimes>,
    ) -> Result<RunOutput> {
        let (addresses, rejected) = parse_records(records);
        let mut output = self.run_addresses(addresses, travel)?;
        output.report.rejected = rejected;
        Ok(output)
    }

    /// Runs already-parsed addresses.
    ///
    /// `travel` is required when the metric is [`Metric::TravelTime`]; it is
    /// ensured once per team before that team is sequenced. Provider and
    /// cache errors abort the run with no partial output.
    pub fn run_addresses(
        &self,
        addresses: Vec<Address>,
        mut travel: Option<&mut dyn TravelTimes>,
    ) -> Result<RunOutput> {
        if self.config.metric == Metric::TravelTime && travel.is_none() {
            return Err(Error::invalid_config(
                "travel-time metric selected but no travel-time source supplied",
            ));
        }
        let mut report = RunReport::default();

        let selected = select(addresses, &self.config.filter);
        report.selected = selected.len();
        info!("{} addresses selected for {} teams", selected.len(), self.config.teams);

        let partition =
            self.config
                .policy
                .partition(selected, self.config.teams, &self.config.origin);
        report.partition_sizes = partition.sizes();
        report.degenerate = partition.degenerate().to_vec();

        let mut groups = merge_smallest_n(partition.into_groups(), self.config.merges);
        if let Some(max) = self.config.max_team_size {
            let (capped, overflow) = cap_with_overflow(groups, max);
            groups = capped;
            report.dropped = overflow
                .iter()
                .map(|a| a.formatted_address().to_string())
                .collect();
        }
        groups.retain(|g| !g.is_empty());
        info!("down to {} teams", groups.len());

        let mut teams = Vec::with_capacity(groups.len());
        for (team, members) in groups.into_iter().enumerate() {
            let source: Option<&dyn TravelTimes> = match travel.as_deref_mut() {
                Some(src) if self.config.metric == Metric::TravelTime => {
                    let keys: Vec<String> = members
                        .iter()
                        .map(|a| a.formatted_address().to_string())
                        .collect();
                    report.provider_requests += src.ensure(&keys)?;
                    Some(&*src)
                }
                _ => None,
            };
            let (stops, length) = self.sequencer.sequence(members, source)?;
            info!("team {team}: {} stops, length {length:.4}", stops.len());
            teams.push(TeamRoute {
                team,
                stops,
                length,
            });
        }

        Ok(RunOutput { teams, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, CODE_FIELD};
    use crate::partition::PartitionPolicy;
    use std::collections::HashMap;

    fn row(addr: &str, lat: f64, lon: f64) -> Record {
        Record::from([
            ("formatted_address".to_string(), addr.to_string()),
            ("latitude".to_string(), lat.to_string()),
            ("longitude".to_string(), lon.to_string()),
            (CODE_FIELD.to_string(), "unvisited".to_string()),
        ])
    }

    fn ring(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| {
                let t = (i as f64 + 0.5) / n as f64 * std::f64::consts::TAU;
                row(&format!("{i} Ring Rd"), t.sin(), t.cos())
            })
            .collect()
    }

    fn config(teams: usize) -> PipelineConfig {
        PipelineConfig {
            teams,
            origin: Coordinate::new(0.0, 0.0),
            ..PipelineConfig::default()
        }
    }

    /// Straight-line distance scaled to whole seconds, counting ensure calls.
    #[derive(Default)]
    struct GridTimes {
        coords: HashMap<String, (f64, f64)>,
        ensured: Vec<usize>,
    }

    impl TravelTimes for GridTimes {
        fn ensure(&mut self, addresses: &[String]) -> Result<usize> {
            self.ensured.push(addresses.len());
            Ok(1)
        }

        fn lookup(&self, origin: &str, destination: &str) -> Result<u64> {
            let (a, b) = match (self.coords.get(origin), self.coords.get(destination)) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(Error::not_found(origin, destination)),
            };
            Ok((((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt() * 1000.0) as u64)
        }
    }

    #[test]
    fn test_every_address_routed_once() {
        let out = Pipeline::new(config(4)).expect("valid").run(&ring(20), None).expect("run");
        assert_eq!(out.teams.len(), 4);
        let mut all: Vec<String> = out
            .teams
            .iter()
            .flat_map(|t| t.stops.iter().map(|a| a.formatted_address().to_string()))
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 20);
        assert_eq!(out.report.partition_sizes, vec![5, 5, 5, 5]);
    }

    #[test]
    fn test_empty_teams_dropped_and_renumbered() {
        // All addresses east of the origin: only the first of 4 wedges is used.
        let rows: Vec<Record> = (0..5).map(|i| row(&format!("{i}"), 0.01 * i as f64, 1.0)).collect();
        let out = Pipeline::new(config(4)).expect("valid").run(&rows, None).expect("run");
        assert_eq!(out.teams.len(), 1);
        assert_eq!(out.teams[0].team, 0);
        assert_eq!(out.report.partition_sizes, vec![5, 0, 0, 0]);
    }

    #[test]
    fn test_merge_and_cap() {
        let cfg = PipelineConfig {
            merges: 1,
            max_team_size: Some(6),
            ..config(4)
        };
        let out = Pipeline::new(cfg).expect("valid").run(&ring(20), None).expect("run");
        assert_eq!(out.teams.len(), 3);
        assert!(out.teams.iter().all(|t| t.len() <= 6));
        assert_eq!(out.report.dropped.len(), 4);
        let routed: usize = out.teams.iter().map(TeamRoute::len).sum();
        assert_eq!(routed + out.report.dropped.len(), 20);
    }

    #[test]
    fn test_clustering_policy_is_pluggable() {
        let cfg = PipelineConfig {
            policy: PartitionPolicy::CentroidClustering {
                max_iterations: 50,
                seed: 1,
            },
            ..config(3)
        };
        let out = Pipeline::new(cfg).expect("valid").run(&ring(12), None).expect("run");
        let routed: usize = out.teams.iter().map(TeamRoute::len).sum();
        assert_eq!(routed, 12);
    }

    #[test]
    fn test_travel_time_ensures_each_team() {
        let rows = ring(12);
        let mut times = GridTimes::default();
        for r in &rows {
            let lat: f64 = r["latitude"].parse().expect("lat");
            let lon: f64 = r["longitude"].parse().expect("lon");
            times.coords.insert(r["formatted_address"].clone(), (lat, lon));
        }
        let cfg = PipelineConfig {
            metric: Metric::TravelTime,
            ..config(3)
        };
        let out = Pipeline::new(cfg)
            .expect("valid")
            .run(&rows, Some(&mut times))
            .expect("run");
        assert_eq!(times.ensured, vec![4, 4, 4]);
        assert_eq!(out.report.provider_requests, 3);
        assert!(out.teams.iter().all(|t| t.length > 0.0));
    }

    #[test]
    fn test_travel_time_without_source_fails_fast() {
        let cfg = PipelineConfig {
            metric: Metric::TravelTime,
            ..config(2)
        };
        let err = Pipeline::new(cfg).expect("valid").run(&ring(4), None).expect_err("no source");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_records_keep_input_shape() {
        let rows = ring(3);
        let out = Pipeline::new(config(1)).expect("valid").run(&rows, None).expect("run");
        for record in out.teams[0].records() {
            assert!(rows.contains(&record));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(Pipeline::new(config(0)).is_err());
    }
}
