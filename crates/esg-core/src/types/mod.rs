//! # Core Type Definitions
//!
//! This module contains all core records of the ESG maturity engine:
//! - Reference data (`Question`, `QuestionId`, `QuestionKind`)
//! - Survey input (`Answer`, `Company`, `Production`)
//! - Normalized input (`NormalizedAnswer`, `AnswerCode`, `Indicator`)
//! - Snapshot and results (`SurveySnapshot`, `AxisLevelResult`)
//! - Scales (`Axis`, `Level`)
//! - Error types (`EsgError`)
//!
//! ## Determinism Guarantees
//!
//! - Levels and codes are small integers; no floating-point math on them
//! - `Axis`, `Level` and `QuestionId` implement `Ord` for use as `BTreeMap` keys
//! - Indicator values are carried as `f64` but never combined arithmetically

use crate::normalizer::fold_text;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// AXIS
// =============================================================================

/// One of the three ESG pillars.
///
/// Declaration order is the canonical presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Axis {
    Environmental,
    Social,
    Governance,
}

impl Axis {
    /// All axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::Environmental, Axis::Social, Axis::Governance];

    /// Stable lowercase key used in survey files and storage.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Axis::Environmental => "ambiental",
            Axis::Social => "social",
            Axis::Governance => "governanca",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Axis::Environmental => "Ambiental",
            Axis::Social => "Social",
            Axis::Governance => "Governança",
        }
    }

    /// Parse an axis name, ignoring case, accents and surrounding whitespace.
    ///
    /// Accepts the Portuguese survey names and their English equivalents.
    pub fn parse(raw: &str) -> Result<Self, EsgError> {
        match fold_text(raw).as_str() {
            "ambiental" | "environmental" | "meio ambiente" => Ok(Axis::Environmental),
            "social" => Ok(Axis::Social),
            "governanca" | "governance" => Ok(Axis::Governance),
            _ => Err(EsgError::UnknownAxis(raw.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Axis {
    type Err = EsgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Axis {
    type Error = EsgError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Axis> for String {
    fn from(axis: Axis) -> Self {
        axis.key().to_string()
    }
}

// =============================================================================
// LEVEL
// =============================================================================

/// Maturity level, rungs 1 through 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    /// 1: Elementar
    Elementary = 1,
    /// 2: Não Integrado
    NonIntegrated = 2,
    /// 3: Gerencial
    Managerial = 3,
    /// 4: Estratégico
    Strategic = 4,
    /// 5: Transformador
    Transformative = 5,
}

impl Level {
    /// All levels, ascending.
    pub const ALL: [Level; 5] = [
        Level::Elementary,
        Level::NonIntegrated,
        Level::Managerial,
        Level::Strategic,
        Level::Transformative,
    ];

    /// The unconditional floor.
    pub const FLOOR: Level = Level::Elementary;

    /// The highest reachable level.
    pub const CEILING: Level = Level::Transformative;

    /// Numeric value (1..=5).
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Level for a numeric value, if within 1..=5.
    #[must_use]
    pub const fn from_value(value: u8) -> Option<Level> {
        match value {
            1 => Some(Level::Elementary),
            2 => Some(Level::NonIntegrated),
            3 => Some(Level::Managerial),
            4 => Some(Level::Strategic),
            5 => Some(Level::Transformative),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl TryFrom<u8> for Level {
    type Error = EsgError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::from_value(value).ok_or(EsgError::InvalidLevel(value))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.value()
    }
}

// =============================================================================
// REFERENCE DATA
// =============================================================================

/// Identifier of a question in the reference bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether a question is a yes/no maturity question or a numeric indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[default]
    #[serde(alias = "Question", alias = "pergunta", alias = "Pergunta")]
    Question,
    #[serde(alias = "Indicator", alias = "indicador", alias = "Indicador")]
    Indicator,
}

/// A question of the reference bank.
///
/// `level` is kept raw here; `QuestionBank` rejects values outside 1..=5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub axis: Axis,
    pub text: String,
    pub theme: String,
    #[serde(default)]
    pub criterion: String,
    #[serde(default)]
    pub kind: QuestionKind,
    pub level: u8,
}

// =============================================================================
// SURVEY INPUT
// =============================================================================

/// A raw answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    #[serde(alias = "answer", alias = "resposta")]
    pub raw_text: String,
}

impl Answer {
    #[must_use]
    pub fn new(question_id: QuestionId, raw_text: impl Into<String>) -> Self {
        Self {
            question_id,
            raw_text: raw_text.into(),
        }
    }
}

/// Company metadata attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub location: String,
}

impl Company {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Monthly production reported with a submission.
///
/// The volume is kept as reported; parsing happens when series are built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Production {
    pub volume: String,
    pub unit: String,
}

impl Production {
    #[must_use]
    pub fn new(volume: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            volume: volume.into(),
            unit: unit.into(),
        }
    }

    /// Parse the reported volume. `None` when empty, non-numeric or not finite.
    #[must_use]
    pub fn parsed_volume(&self) -> Option<f64> {
        self.volume
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }
}

// =============================================================================
// NORMALIZED INPUT
// =============================================================================

/// Three-valued answer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerCode {
    Yes = 0,
    No = 1,
    NotApplicable = 2,
}

impl AnswerCode {
    /// Numeric code (0 yes, 1 no, 2 not applicable).
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Yes and not-applicable both count toward clearing a level.
    #[must_use]
    pub const fn clears_level(self) -> bool {
        matches!(self, AnswerCode::Yes | AnswerCode::NotApplicable)
    }
}

/// An answer resolved against its question and normalized to a code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAnswer {
    pub question_id: QuestionId,
    pub axis: Axis,
    pub theme: String,
    pub level: u8,
    pub code: AnswerCode,
}

impl NormalizedAnswer {
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        axis: Axis,
        theme: impl Into<String>,
        level: u8,
        code: AnswerCode,
    ) -> Self {
        Self {
            question_id,
            axis,
            theme: theme.into(),
            level,
            code,
        }
    }
}

/// A raw numeric metric reported for an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub axis: Axis,
    pub item: String,
    pub value: f64,
}

impl Indicator {
    #[must_use]
    pub fn new(axis: Axis, item: impl Into<String>, value: f64) -> Self {
        Self {
            axis,
            item: item.into(),
            value,
        }
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One company's validated survey submission at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveySnapshot {
    pub company: Company,
    pub date: NaiveDate,
    pub production: Production,
    pub answers: Vec<NormalizedAnswer>,
    pub indicators: Vec<Indicator>,
}

// =============================================================================
// RESULTS
// =============================================================================

/// Achieved level for an axis, or for an (axis, theme) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLevelResult {
    pub axis: Axis,
    pub level: Level,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

impl AxisLevelResult {
    /// Result for a whole axis.
    #[must_use]
    pub fn for_axis(axis: Axis, level: Level) -> Self {
        Self {
            axis,
            level,
            theme: None,
            date: None,
        }
    }

    /// Result for one theme of an axis.
    #[must_use]
    pub fn for_theme(axis: Axis, theme: impl Into<String>, level: Level) -> Self {
        Self {
            axis,
            level,
            theme: Some(theme.into()),
            date: None,
        }
    }

    /// Tag the result with a snapshot date.
    #[must_use]
    pub fn dated(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the ESG engine.
///
/// - No silent coercion of malformed input
/// - Use `Result<T, EsgError>` for fallible operations
/// - The engine never panics
#[derive(Debug, Error)]
pub enum EsgError {
    /// A record failed boundary validation.
    #[error("Invalid {record}: {reason}")]
    InvalidRecord { record: String, reason: String },

    /// An answer references a question missing from the bank.
    #[error("Unknown question: {0}")]
    UnknownQuestion(QuestionId),

    /// Two questions share an id.
    #[error("Duplicate question id: {0}")]
    DuplicateQuestion(QuestionId),

    /// A submission answers the same question twice.
    #[error("Duplicate answer for question {0}")]
    DuplicateAnswer(QuestionId),

    /// Free text that is neither yes, no nor not-applicable.
    #[error("Unrecognized answer text: {0:?}")]
    UnrecognizedAnswer(String),

    /// Axis name outside the three ESG pillars.
    #[error("Unknown axis: {0:?}")]
    UnknownAxis(String),

    /// Level outside 1..=5.
    #[error("Level out of range: {0} (expected 1..=5)")]
    InvalidLevel(u8),

    /// Date in none of the accepted formats.
    #[error("Invalid date: {0:?}")]
    InvalidDate(String),

    /// A reference-table lookup that should never fail did.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Snapshots of different companies were combined into one history.
    #[error("Mixed companies in history: expected {expected:?}, found {found:?}")]
    MixedCompanies { expected: String, found: String },

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl EsgError {
    /// Shorthand for `InvalidRecord`.
    #[must_use]
    pub fn invalid(record: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            record: record.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
