//! Record intake: parsing rows, rejecting bad ones, and selecting the run set.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::warn;

use crate::config::RecordFilter;
use crate::error::Error;
use crate::models::{Address, Record};

/// A row excluded from the run, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Position of the row in the input.
    pub row: usize,
    /// The row's address, or empty if it had none.
    pub address: String,
    pub reason: String,
}

/// Parses every row, rejecting malformed rows and repeated addresses.
///
/// Rejections never abort intake; they are returned alongside the good rows.
pub fn parse_records(records: &[Record]) -> (Vec<Address>, Vec<Rejection>) {
    let mut addresses = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    let mut seen = HashSet::new();

    for (row, record) in records.iter().enumerate() {
        match Address::from_record(record) {
            Ok(address) => {
                if seen.insert(address.formatted_address().to_string()) {
                    addresses.push(address);
                } else {
                    warn!("row {row}: duplicate address {}", address.formatted_address());
                    rejected.push(Rejection {
                        row,
                        address: address.formatted_address().to_string(),
                        reason: "duplicate formatted_address".to_string(),
                    });
                }
            }
            Err(Error::MalformedInput { address, reason }) => {
                warn!("row {row}: rejected {address:?}: {reason}");
                rejected.push(Rejection {
                    row,
                    address,
                    reason,
                });
            }
            Err(other) => {
                rejected.push(Rejection {
                    row,
                    address: String::new(),
                    reason: other.to_string(),
                });
            }
        }
    }
    (addresses, rejected)
}

/// Newest filing date first; undated rows sort last. Stable.
fn by_filing_date_desc(a: &Address, b: &Address) -> Ordering {
    match (a.filing_date(), b.filing_date()) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Applies inclusion predicates, sorts newest first, and truncates to the limit.
pub fn select(addresses: Vec<Address>, filter: &RecordFilter) -> Vec<Address> {
    let mut kept: Vec<Address> = addresses
        .into_iter()
        .filter(|a| {
            filter
                .address_contains
                .as_deref()
                .is_none_or(|needle| a.formatted_address().contains(needle))
        })
        .filter(|a| {
            filter
                .codes
                .as_ref()
                .is_none_or(|codes| codes.iter().any(|c| c == a.code()))
        })
        .collect();
    kept.sort_by(by_filing_date_desc);
    if let Some(limit) = filter.limit {
        kept.truncate(limit);
    }
    kept
}
