//! # Persistence Format
//!
//! Binary framing for records written by the persistent store.
//!
//! Format: Header (5 bytes) + postcard-serialized record.
//! - 4 bytes: Magic ("ESGM")
//! - 1 byte: Version
//!
//! Size and header are validated before the payload is deserialized.

use crate::{EsgError, primitives};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Maximum allowed size of one framed record.
///
/// A survey snapshot with the maximum number of answers stays far below this.
pub const MAX_RECORD_SIZE: usize = 64 * 1024 * 1024; // 64 MB

/// Header length in bytes.
const HEADER_LEN: usize = 5;

// =============================================================================
// RECORD HEADER
// =============================================================================

/// The persistence header precedes every stored record.
#[derive(Debug, Clone, Copy)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), EsgError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(EsgError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(EsgError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EsgError> {
        if bytes.len() < HEADER_LEN {
            return Err(EsgError::DeserializationError(
                "Header too short".to_string(),
            ));
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        Ok(Self {
            magic,
            version: bytes[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a record to bytes (header + payload).
pub fn record_to_bytes<T: Serialize>(record: &T) -> Result<Vec<u8>, EsgError> {
    let header = PersistenceHeader::new();

    let payload =
        postcard::to_stdvec(record).map_err(|e| EsgError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_LEN + payload.len());
    result.extend_from_slice(&header.to_bytes());
    result.extend_from_slice(&payload);

    Ok(result)
}

/// Deserialize a record from bytes.
///
/// Validates, in order: minimum size, maximum size, header. Only then is the
/// payload handed to postcard.
pub fn record_from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EsgError> {
    if bytes.len() < HEADER_LEN {
        return Err(EsgError::DeserializationError(format!(
            "Data too short: minimum {} bytes required",
            HEADER_LEN
        )));
    }

    if bytes.len() > MAX_RECORD_SIZE {
        return Err(EsgError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_RECORD_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(|e| {
        EsgError::DeserializationError(format!("Failed to deserialize record: {}", e))
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AnswerCode, Axis, Company, Indicator, NormalizedAnswer, Production, QuestionId,
        SurveySnapshot,
    };
    use chrono::NaiveDate;

    fn sample_snapshot() -> SurveySnapshot {
        SurveySnapshot {
            company: Company::named("Cerâmica Aurora"),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("date"),
            production: Production::new("1200", "t"),
            answers: vec![NormalizedAnswer::new(
                QuestionId(7),
                Axis::Social,
                "Diversidade",
                2,
                AnswerCode::NotApplicable,
            )],
            indicators: vec![Indicator::new(Axis::Environmental, "Água (m3)", 35.5)],
        }
    }

    #[test]
    fn header_roundtrip() {
        let header = PersistenceHeader::new();
        let bytes = header.to_bytes();
        let restored = PersistenceHeader::from_bytes(&bytes).expect("parse header");

        assert_eq!(restored.magic, *primitives::MAGIC_BYTES);
        assert_eq!(restored.version, primitives::FORMAT_VERSION);
    }

    #[test]
    fn snapshot_survives_framing() {
        let snapshot = sample_snapshot();
        let bytes = record_to_bytes(&snapshot).expect("serialize");
        assert_eq!(&bytes[0..4], primitives::MAGIC_BYTES);

        let restored: SurveySnapshot = record_from_bytes(&bytes).expect("deserialize");
        assert_eq!(restored, snapshot);
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[0..4].copy_from_slice(b"XXXX");

        let result: Result<SurveySnapshot, _> = record_from_bytes(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn truncated_record_rejected() {
        let result: Result<SurveySnapshot, _> = record_from_bytes(b"ESG");
        assert!(matches!(result, Err(EsgError::DeserializationError(_))));
    }
}
