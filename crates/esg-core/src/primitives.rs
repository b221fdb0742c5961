//! # Engine Primitives
//!
//! Hardcoded runtime constants for the ESG maturity engine.
//!
//! These values are compiled into the binary and immutable at runtime.

/// Date formats accepted for survey dates, tried in order.
///
/// The survey forms submit `dd/mm/YYYY`; ISO dates are accepted for files
/// produced by other tools.
pub const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Format used when presenting dates in reports.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Magic bytes for the persisted record header.
///
/// - Record Header = Magic Bytes ("ESGM") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"ESGM";

/// Current serialization format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for free-text answers, in bytes.
pub const MAX_ANSWER_LENGTH: usize = 4096;

/// Maximum length for names and labels (company, theme, item), in bytes.
pub const MAX_LABEL_LENGTH: usize = 512;

/// Maximum length for question text, in bytes.
pub const MAX_QUESTION_TEXT_LENGTH: usize = 8192;

/// Maximum number of answers in a single submission.
pub const MAX_ANSWERS_PER_SURVEY: usize = 10_000;

/// Maximum number of questions in a reference bank.
pub const MAX_QUESTIONS: usize = 100_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"ESGM");
    }

    #[test]
    fn survey_format_tried_first() {
        assert_eq!(DATE_FORMATS[0], DISPLAY_DATE_FORMAT);
    }
}
