//! # Formats Module
//!
//! Binary framing for persisted records. File and database I/O live in
//! `storage`; this module only converts between values and bytes.

pub mod persistence;

pub use persistence::{PersistenceHeader, record_from_bytes, record_to_bytes};
