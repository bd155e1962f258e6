//! External travel-duration provider interface.
//!
//! The wire shape follows the distance-matrix JSON answer: one row per
//! origin, one element per destination, each element carrying a duration in
//! seconds. Transport (HTTP client, query encoding, API keys) belongs to the
//! implementor of [`DistanceProvider`].

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Source of travel durations between batches of addresses.
///
/// Implementations block until the answer arrives. They must not be called
/// with more origins or destinations than the provider's per-request limit;
/// [`DistanceCache`](crate::distance::DistanceCache) honors that limit.
pub trait DistanceProvider {
    /// Requests the duration matrix for `origins × destinations`.
    ///
    /// Transport failures map to [`Error::ProviderUnavailable`].
    fn query(&mut self, origins: &[String], destinations: &[String]) -> Result<ProviderResponse>;
}

/// A provider's answer to one matrix request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub origin_addresses: Vec<String>,
    #[serde(default)]
    pub destination_addresses: Vec<String>,
    #[serde(default)]
    pub rows: Vec<ResponseRow>,
}

/// Durations from one origin to each requested destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseRow {
    #[serde(default)]
    pub elements: Vec<ResponseElement>,
}

/// One origin→destination cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseElement {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub duration: Option<Measure>,
}

/// A measured quantity with its machine value and display text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub value: u64,
    #[serde(default)]
    pub text: Option<String>,
}

impl ProviderResponse {
    /// Parses a provider answer from its JSON body.
    pub fn from_json(body: &str) -> Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Builds a successful response from a duration grid (row per origin).
    pub fn from_durations(durations: Vec<Vec<u64>>) -> Self {
        Self {
            status: "OK".to_string(),
            origin_addresses: Vec::new(),
            destination_addresses: Vec::new(),
            rows: durations
                .into_iter()
                .map(|row| ResponseRow {
                    elements: row
                        .into_iter()
                        .map(|value| ResponseElement {
                            status: Some("OK".to_string()),
                            duration: Some(Measure { value, text: None }),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    /// Extracts an `origins × destinations` grid of durations in seconds.
    ///
    /// Zero rows means the provider refused the request; the error carries
    /// its status. A grid whose shape does not match the request, or a cell
    /// with no duration, is rejected whole so nothing from it gets cached.
    pub fn durations(&self, origins: usize, destinations: usize) -> Result<Vec<Vec<u64>>> {
        if self.rows.is_empty() {
            let status = if self.status.is_empty() {
                "no rows returned"
            } else {
                self.status.as_str()
            };
            return Err(Error::provider_error(status));
        }
        if self.rows.len() != origins {
            return Err(Error::provider_error(format!(
                "expected {origins} rows, got {}",
                self.rows.len()
            )));
        }

        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if row.elements.len() != destinations {
                    return Err(Error::provider_error(format!(
                        "row {i}: expected {destinations} elements, got {}",
                        row.elements.len()
                    )));
                }
                row.elements
                    .iter()
                    .enumerate()
                    .map(|(j, element)| {
                        element.duration.as_ref().map(|d| d.value).ok_or_else(|| {
                            let status = element.status.as_deref().unwrap_or("missing duration");
                            Error::provider_error(format!("row {i} element {j}: {status}"))
                        })
                    })
                    .collect()
            })
            .collect()
    }
}
