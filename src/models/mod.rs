//! Domain model types for team routing.
//!
//! Provides geocoded address records with their carried metadata, plain
//! coordinates, and tours as visiting orders over a group of addresses.

mod address;
mod tour;

pub use address::{
    Address, Coordinate, Record, ADDRESS_FIELD, CODE_FIELD, FILING_DATE_FIELD, LATITUDE_FIELD,
    LONGITUDE_FIELD, UNVISITED,
};
pub use tour::{path_length, Tour};
