//! # Ingestor Module
//!
//! Boundary validation for reference data and survey submissions.
//!
//! - Validate question records before they enter a bank
//! - Resolve answers against the bank and normalize them
//! - Reject malformed input, naming the offending record
//! - No defaults for missing answers; they are simply absent

use crate::normalizer;
use crate::primitives::{
    DATE_FORMATS, MAX_ANSWER_LENGTH, MAX_ANSWERS_PER_SURVEY, MAX_LABEL_LENGTH,
    MAX_QUESTION_TEXT_LENGTH, MAX_QUESTIONS,
};
use crate::{
    Answer, Axis, Company, EsgError, Indicator, Level, NormalizedAnswer, Production, Question,
    QuestionId, QuestionKind, SurveySnapshot,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// QUESTION BANK
// =============================================================================

/// Validated reference questions, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: BTreeMap<QuestionId, Question>,
}

impl QuestionBank {
    /// Build a bank, validating every question and rejecting duplicate ids.
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Result<Self, EsgError> {
        let mut bank = BTreeMap::new();
        for question in questions {
            Ingestor::validate_question(&question)?;
            if bank.len() >= MAX_QUESTIONS {
                return Err(EsgError::invalid(
                    "question bank",
                    format!("more than {} questions", MAX_QUESTIONS),
                ));
            }
            let id = question.id;
            if bank.insert(id, question).is_some() {
                return Err(EsgError::DuplicateQuestion(id));
            }
        }
        Ok(Self { questions: bank })
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }
}

// =============================================================================
// RAW SUBMISSION
// =============================================================================

/// A number as it arrives in a submission: JSON number or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    /// Parse as a finite number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }

    /// The value as reported, as text.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(s) => s.trim().to_string(),
        }
    }
}

/// Indicator values reported for one axis, keyed by item name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorBlock {
    pub axis: String,
    pub values: BTreeMap<String, RawNumber>,
}

/// A survey submission as received, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveySubmission {
    pub company: Company,
    pub date: String,
    #[serde(default)]
    pub production_volume: Option<RawNumber>,
    #[serde(default)]
    pub production_unit: String,
    pub answers: Vec<Answer>,
    #[serde(default)]
    pub indicators: Vec<IndicatorBlock>,
}

// =============================================================================
// INGESTOR
// =============================================================================

/// The Ingestor turns raw records into validated engine input.
pub struct Ingestor;

impl Ingestor {
    /// Validate a question record.
    ///
    /// A question is valid if:
    /// - Text and theme are non-empty and within length limits
    /// - Level is within 1..=5
    pub fn validate_question(question: &Question) -> Result<(), EsgError> {
        let record = || format!("question {}", question.id);

        if question.text.trim().is_empty() {
            return Err(EsgError::invalid(record(), "empty text"));
        }
        if question.text.len() > MAX_QUESTION_TEXT_LENGTH {
            return Err(EsgError::invalid(record(), "text too long"));
        }
        if question.theme.trim().is_empty() {
            return Err(EsgError::invalid(record(), "empty theme"));
        }
        if question.theme.len() > MAX_LABEL_LENGTH {
            return Err(EsgError::invalid(record(), "theme too long"));
        }
        if Level::from_value(question.level).is_none() {
            return Err(EsgError::invalid(
                record(),
                format!("level {} outside 1..=5", question.level),
            ));
        }
        Ok(())
    }

    /// Parse a survey date in any of the accepted formats.
    pub fn parse_date(raw: &str) -> Result<NaiveDate, EsgError> {
        let trimmed = raw.trim();
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
            .ok_or_else(|| EsgError::InvalidDate(raw.to_string()))
    }

    /// Resolve answers against the bank.
    ///
    /// Yes/no questions become `NormalizedAnswer`s; indicator questions become
    /// `Indicator`s named after the question text.
    pub fn resolve_answers(
        bank: &QuestionBank,
        answers: &[Answer],
    ) -> Result<(Vec<NormalizedAnswer>, Vec<Indicator>), EsgError> {
        if answers.len() > MAX_ANSWERS_PER_SURVEY {
            return Err(EsgError::invalid(
                "submission",
                format!("more than {} answers", MAX_ANSWERS_PER_SURVEY),
            ));
        }

        let mut seen = BTreeSet::new();
        let mut normalized = Vec::with_capacity(answers.len());
        let mut indicators = Vec::new();

        for answer in answers {
            let id = answer.question_id;
            let question = bank.get(id).ok_or(EsgError::UnknownQuestion(id))?;
            if !seen.insert(id) {
                return Err(EsgError::DuplicateAnswer(id));
            }
            if answer.raw_text.len() > MAX_ANSWER_LENGTH {
                return Err(EsgError::invalid(
                    format!("answer to question {}", id),
                    "text too long",
                ));
            }

            match question.kind {
                QuestionKind::Question => {
                    let code = normalizer::normalize(&answer.raw_text).map_err(|e| {
                        EsgError::invalid(format!("answer to question {}", id), e.to_string())
                    })?;
                    normalized.push(NormalizedAnswer::new(
                        id,
                        question.axis,
                        question.theme.clone(),
                        question.level,
                        code,
                    ));
                }
                QuestionKind::Indicator => {
                    let value = RawNumber::Text(answer.raw_text.clone())
                        .as_f64()
                        .ok_or_else(|| {
                            EsgError::invalid(
                                format!("answer to question {}", id),
                                format!("non-numeric indicator value {:?}", answer.raw_text),
                            )
                        })?;
                    indicators.push(Indicator::new(question.axis, question.text.clone(), value));
                }
            }
        }

        Ok((normalized, indicators))
    }

    /// Parse explicit indicator blocks.
    pub fn parse_indicators(blocks: &[IndicatorBlock]) -> Result<Vec<Indicator>, EsgError> {
        let mut indicators = Vec::new();
        for block in blocks {
            let axis = Axis::parse(&block.axis)?;
            for (item, raw) in &block.values {
                if item.trim().is_empty() || item.len() > MAX_LABEL_LENGTH {
                    return Err(EsgError::invalid(
                        format!("{} indicator", axis.key()),
                        "item name empty or too long",
                    ));
                }
                let value = raw.as_f64().ok_or_else(|| {
                    EsgError::invalid(
                        format!("{} indicator {:?}", axis.key(), item),
                        format!("non-numeric value {:?}", raw.as_text()),
                    )
                })?;
                indicators.push(Indicator::new(axis, item.clone(), value));
            }
        }
        Ok(indicators)
    }

    /// Validate a full submission and produce an immutable snapshot.
    ///
    /// The production volume is kept as reported; an unparseable volume does
    /// not reject the submission.
    pub fn ingest(
        bank: &QuestionBank,
        submission: &SurveySubmission,
    ) -> Result<SurveySnapshot, EsgError> {
        let name = submission.company.name.trim();
        if name.is_empty() {
            return Err(EsgError::invalid("company", "empty name"));
        }
        if name.len() > MAX_LABEL_LENGTH {
            return Err(EsgError::invalid("company", "name too long"));
        }

        let date = Self::parse_date(&submission.date)?;
        let (answers, mut indicators) = Self::resolve_answers(bank, &submission.answers)?;
        indicators.extend(Self::parse_indicators(&submission.indicators)?);

        let mut company = submission.company.clone();
        company.name = name.to_string();

        let volume = submission
            .production_volume
            .as_ref()
            .map(RawNumber::as_text)
            .unwrap_or_default();

        tracing::debug!(
            company = %company.name,
            %date,
            answers = answers.len(),
            indicators = indicators.len(),
            "survey ingested"
        );

        Ok(SurveySnapshot {
            company,
            date,
            production: Production::new(volume, submission.production_unit.trim()),
            answers,
            indicators,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
