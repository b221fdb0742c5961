//! # Answer Normalizer
//!
//! Maps raw survey answer text to a three-valued [`AnswerCode`].
//!
//! Matching is a substring match on folded text (trimmed, lowercased,
//! diacritics removed), in strict precedence:
//!
//! 1. "não aplicado"
//! 2. "não"
//! 3. "sim"
//!
//! Text matching none of them is rejected with
//! [`EsgError::UnrecognizedAnswer`]; it is never guessed.

use crate::{AnswerCode, EsgError};

const NOT_APPLICABLE_MARKER: &str = "nao aplicado";

const NO_MARKER: &str = "nao";

const YES_MARKER: &str = "sim";

/// Combining diacritical marks, as found in decomposed (NFD) text.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{300}'..='\u{36f}';

/// Trim, lowercase and strip Portuguese diacritics, precomposed or decomposed.
#[must_use]
pub fn fold_text(raw: &str) -> String {
    raw.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !COMBINING_MARKS.contains(c))
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Classify raw answer text, or `None` if it carries no recognizable marker.
#[must_use]
pub fn classify(raw: &str) -> Option<AnswerCode> {
    let folded = fold_text(raw);

    if folded.contains(NOT_APPLICABLE_MARKER) {
        Some(AnswerCode::NotApplicable)
    } else if folded.contains(NO_MARKER) {
        Some(AnswerCode::No)
    } else if folded.contains(YES_MARKER) {
        Some(AnswerCode::Yes)
    } else {
        None
    }
}

/// Normalize raw answer text to a code.
///
/// Returns `EsgError::UnrecognizedAnswer` carrying the original text when no
/// marker matches.
pub fn normalize(raw: &str) -> Result<AnswerCode, EsgError> {
    classify(raw).ok_or_else(|| EsgError::UnrecognizedAnswer(raw.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
