//! # Level Classification
//!
//! Determines the maturity level reached by a set of answers.
//!
//! ## Rules
//!
//! | Situation at level L (L >= 2)          | Effect                     |
//! |----------------------------------------|----------------------------|
//! | every answer is Yes or Not Applicable  | L cleared, keep climbing   |
//! | at least one No                        | result is L - 1            |
//! | no answers at L                        | result is L                |
//!
//! Level 1 is the floor and is cleared regardless of its answers. A set with
//! no usable answers at all sits on the floor. Clearing every level gives 5.
//! Answers whose level lies outside 1..=5 are ignored.
//!
//! The same rules apply to a whole axis and to one theme of an axis.

use crate::{Axis, AxisLevelResult, Level, NormalizedAnswer, SurveySnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// LEVEL TALLY
// =============================================================================

/// Answer counts at one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTally {
    pub level: Level,
    /// Answers that clear the level (Yes or Not Applicable).
    pub clearing: usize,
    pub total: usize,
}

impl LevelTally {
    fn empty(level: Level) -> Self {
        Self {
            level,
            clearing: 0,
            total: 0,
        }
    }

    /// Strict unanimity: at least one answer, all of them clearing.
    #[must_use]
    pub fn is_unanimous(&self) -> bool {
        self.total > 0 && self.clearing == self.total
    }

    /// Share of clearing answers in parts per thousand (integer only).
    #[must_use]
    pub fn clearing_per_mille(&self) -> u16 {
        if self.total == 0 {
            return 0;
        }
        ((self.clearing as u64).saturating_mul(1000) / (self.total as u64)) as u16
    }
}

/// How a level fared in an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelOutcome {
    /// Level 1, cleared unconditionally.
    Floor,
    /// Every answer cleared the level.
    Cleared,
    /// At least one answer was No.
    Failed,
    /// No answers at this level.
    Unanswered,
}

impl LevelOutcome {
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            LevelOutcome::Floor => "floor",
            LevelOutcome::Cleared => "cleared",
            LevelOutcome::Failed => "failed",
            LevelOutcome::Unanswered => "unanswered",
        }
    }
}

// =============================================================================
// ASSESSMENT
// =============================================================================

/// The achieved level together with the per-level evidence behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelAssessment {
    pub achieved: Level,
    /// One tally per level, ascending, levels 1..=5.
    pub tallies: Vec<LevelTally>,
}

impl LevelAssessment {
    /// Outcome of a single level.
    #[must_use]
    pub fn outcome(&self, level: Level) -> LevelOutcome {
        if level == Level::FLOOR {
            return LevelOutcome::Floor;
        }
        match self.tallies.iter().find(|t| t.level == level) {
            Some(tally) if tally.total == 0 => LevelOutcome::Unanswered,
            Some(tally) if tally.is_unanimous() => LevelOutcome::Cleared,
            Some(_) => LevelOutcome::Failed,
            None => LevelOutcome::Unanswered,
        }
    }

    /// Total answers considered.
    #[must_use]
    pub fn answer_count(&self) -> usize {
        self.tallies.iter().map(|t| t.total).sum()
    }
}

/// Per-axis and per-theme results of one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotLevels {
    /// One result per axis, canonical axis order.
    pub axes: Vec<AxisLevelResult>,
    /// One result per (axis, theme) present, ordered by axis then theme.
    pub themes: Vec<AxisLevelResult>,
}

// =============================================================================
// LEVEL CLASSIFIER
// =============================================================================

/// Level Classifier - pure functions from answers to achieved levels.
pub struct LevelClassifier;

impl LevelClassifier {
    /// Assess a set of answers, already restricted to one axis or theme.
    #[must_use]
    pub fn assess<'a>(answers: impl IntoIterator<Item = &'a NormalizedAnswer>) -> LevelAssessment {
        let mut tallies: BTreeMap<Level, LevelTally> = Level::ALL
            .iter()
            .map(|&level| (level, LevelTally::empty(level)))
            .collect();

        for answer in answers {
            let Some(level) = Level::from_value(answer.level) else {
                continue;
            };
            if let Some(tally) = tallies.get_mut(&level) {
                tally.total = tally.total.saturating_add(1);
                if answer.code.clears_level() {
                    tally.clearing = tally.clearing.saturating_add(1);
                }
            }
        }

        let tallies: Vec<LevelTally> = tallies.into_values().collect();
        let achieved = Self::achieved_from_tallies(&tallies);

        LevelAssessment { achieved, tallies }
    }

    /// Walk up from the floor until the first level that fails or is missing.
    fn achieved_from_tallies(tallies: &[LevelTally]) -> Level {
        if tallies.iter().all(|t| t.total == 0) {
            return Level::FLOOR;
        }

        let mut reached = Level::FLOOR;
        for tally in tallies.iter().filter(|t| t.level > Level::FLOOR) {
            if tally.total == 0 {
                return tally.level;
            }
            if !tally.is_unanimous() {
                return reached;
            }
            reached = tally.level;
        }
        reached
    }

    /// Achieved level for a set of answers.
    #[must_use]
    pub fn achieved_level<'a>(answers: impl IntoIterator<Item = &'a NormalizedAnswer>) -> Level {
        Self::assess(answers).achieved
    }

    /// Per-level evidence for one axis.
    #[must_use]
    pub fn assess_axis(answers: &[NormalizedAnswer], axis: Axis) -> LevelAssessment {
        Self::assess(answers.iter().filter(|a| a.axis == axis))
    }

    /// Achieved level of one axis.
    #[must_use]
    pub fn classify_axis(answers: &[NormalizedAnswer], axis: Axis) -> AxisLevelResult {
        AxisLevelResult::for_axis(axis, Self::assess_axis(answers, axis).achieved)
    }

    /// Achieved level of one theme of an axis.
    #[must_use]
    pub fn classify_theme(answers: &[NormalizedAnswer], axis: Axis, theme: &str) -> AxisLevelResult {
        let level = Self::achieved_level(
            answers
                .iter()
                .filter(|a| a.axis == axis && a.theme == theme),
        );
        AxisLevelResult::for_theme(axis, theme, level)
    }

    /// One result per axis, in canonical order. Axes without answers sit on the floor.
    #[must_use]
    pub fn classify_axes(answers: &[NormalizedAnswer]) -> Vec<AxisLevelResult> {
        Axis::ALL
            .iter()
            .map(|&axis| Self::classify_axis(answers, axis))
            .collect()
    }

    /// One result per (axis, theme) pair that has answers, ordered by axis then theme.
    #[must_use]
    pub fn classify_themes(answers: &[NormalizedAnswer]) -> Vec<AxisLevelResult> {
        let mut groups: BTreeMap<(Axis, &str), Vec<&NormalizedAnswer>> = BTreeMap::new();
        for answer in answers {
            groups
                .entry((answer.axis, answer.theme.as_str()))
                .or_default()
                .push(answer);
        }

        groups
            .into_iter()
            .map(|((axis, theme), group)| {
                AxisLevelResult::for_theme(axis, theme, Self::achieved_level(group))
            })
            .collect()
    }

    /// Classify a snapshot at both granularities, tagging results with its date.
    #[must_use]
    pub fn classify_snapshot(snapshot: &SurveySnapshot) -> SnapshotLevels {
        let axes: Vec<AxisLevelResult> = Self::classify_axes(&snapshot.answers)
            .into_iter()
            .map(|r| r.dated(snapshot.date))
            .collect();
        let themes: Vec<AxisLevelResult> = Self::classify_themes(&snapshot.answers)
            .into_iter()
            .map(|r| r.dated(snapshot.date))
            .collect();

        tracing::debug!(
            company = %snapshot.company.name,
            date = %snapshot.date,
            axes = ?axes.iter().map(|r| (r.axis.key(), r.level.value())).collect::<Vec<_>>(),
            "snapshot classified"
        );

        SnapshotLevels { axes, themes }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnswerCode, QuestionId};

    fn answer(level: u8, code: AnswerCode) -> NormalizedAnswer {
        answer_in(Axis::Environmental, "Resíduos", level, code)
    }

    fn answer_in(axis: Axis, theme: &str, level: u8, code: AnswerCode) -> NormalizedAnswer {
        NormalizedAnswer::new(QuestionId(u32::from(level)), axis, theme, level, code)
    }

    fn full_yes() -> Vec<NormalizedAnswer> {
        (1..=5).map(|l| answer(l, AnswerCode::Yes)).collect()
    }

    #[test]
    fn all_yes_reaches_ceiling() {
        assert_eq!(LevelClassifier::achieved_level(&full_yes()), Level::CEILING);
    }

    #[test]
    fn single_no_at_level_two_stays_on_floor() {
        let mut answers = full_yes();
        answers[1].code = AnswerCode::No;
        assert_eq!(LevelClassifier::achieved_level(&answers), Level::Elementary);
    }

    #[test]
    fn not_applicable_clears_a_level() {
        let mut answers = full_yes();
        answers[2].code = AnswerCode::NotApplicable;
        assert_eq!(LevelClassifier::achieved_level(&answers), Level::CEILING);
    }

    #[test]
    fn no_at_level_four_freezes_at_three() {
        let mut answers = full_yes();
        answers.push(answer(4, AnswerCode::No));
        assert_eq!(LevelClassifier::achieved_level(&answers), Level::Managerial);
    }

    #[test]
    fn level_one_is_never_gated() {
        let answers = vec![answer(1, AnswerCode::No)];
        assert_eq!(LevelClassifier::achieved_level(&answers), Level::NonIntegrated);

        let answers = vec![answer(1, AnswerCode::No), answer(2, AnswerCode::Yes)];
        assert_eq!(LevelClassifier::achieved_level(&answers), Level::Managerial);
    }

    #[test]
    fn empty_set_sits_on_floor() {
        let none: Vec<NormalizedAnswer> = Vec::new();
        assert_eq!(LevelClassifier::achieved_level(&none), Level::FLOOR);
    }

    #[test]
    fn gap_at_level_two_caps_at_two() {
        let answers = vec![answer(1, AnswerCode::Yes), answer(3, AnswerCode::Yes)];
        assert_eq!(LevelClassifier::achieved_level(&answers), Level::NonIntegrated);
    }

    #[test]
    fn out_of_range_levels_are_ignored() {
        let mut answers = full_yes();
        answers.push(answer(0, AnswerCode::No));
        answers.push(answer(9, AnswerCode::No));
        assert_eq!(LevelClassifier::achieved_level(&answers), Level::CEILING);

        let only_invalid = vec![answer(7, AnswerCode::Yes)];
        assert_eq!(LevelClassifier::achieved_level(&only_invalid), Level::FLOOR);
    }

    #[test]
    fn assessment_reports_outcomes() {
        let mut answers = full_yes();
        answers.push(answer(3, AnswerCode::No));
        let assessment = LevelClassifier::assess(&answers);

        assert_eq!(assessment.achieved, Level::NonIntegrated);
        assert_eq!(assessment.outcome(Level::Elementary), LevelOutcome::Floor);
        assert_eq!(assessment.outcome(Level::NonIntegrated), LevelOutcome::Cleared);
        assert_eq!(assessment.outcome(Level::Managerial), LevelOutcome::Failed);
        assert_eq!(assessment.answer_count(), 6);

        let third = assessment.tallies[2];
        assert_eq!((third.clearing, third.total), (1, 2));
        assert_eq!(third.clearing_per_mille(), 500);
    }

    #[test]
    fn axis_assessment_ignores_other_axes() {
        let mut answers = full_yes();
        answers.push(answer_in(Axis::Social, "Saúde", 1, AnswerCode::Yes));
        answers.push(answer_in(Axis::Social, "Saúde", 2, AnswerCode::No));

        let social = LevelClassifier::assess_axis(&answers, Axis::Social);
        assert_eq!(social.achieved, Level::FLOOR);
        assert_eq!(social.answer_count(), 2);
        assert_eq!(social.outcome(Level::NonIntegrated), LevelOutcome::Failed);
        assert_eq!(social.outcome(Level::Managerial).label(), "unanswered");

        let environmental = LevelClassifier::assess_axis(&answers, Axis::Environmental);
        assert_eq!(environmental.achieved, Level::CEILING);
        assert_eq!(environmental.answer_count(), 5);
    }

    #[test]
    fn classify_axes_covers_every_axis() {
        let mut answers = full_yes();
        answers.push(answer_in(Axis::Social, "Diversidade", 2, AnswerCode::No));
        let results = LevelClassifier::classify_axes(&answers);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0], AxisLevelResult::for_axis(Axis::Environmental, Level::CEILING));
        assert_eq!(results[1], AxisLevelResult::for_axis(Axis::Social, Level::FLOOR));
        assert_eq!(results[2], AxisLevelResult::for_axis(Axis::Governance, Level::FLOOR));
    }

    #[test]
    fn classify_themes_groups_by_axis_and_theme() {
        let mut answers = full_yes();
        answers.push(answer_in(Axis::Environmental, "Água", 1, AnswerCode::Yes));
        answers.push(answer_in(Axis::Environmental, "Água", 2, AnswerCode::No));
        answers.push(answer_in(Axis::Governance, "Ética", 1, AnswerCode::Yes));

        let results = LevelClassifier::classify_themes(&answers);
        let summary: Vec<(Axis, &str, u8)> = results
            .iter()
            .map(|r| (r.axis, r.theme.as_deref().unwrap_or(""), r.level.value()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (Axis::Environmental, "Resíduos", 5),
                (Axis::Environmental, "Água", 1),
                (Axis::Governance, "Ética", 2),
            ]
        );
    }

    #[test]
    fn theme_filter_matches_whole_axis_when_single_theme() {
        let answers = full_yes();
        let axis = LevelClassifier::classify_axis(&answers, Axis::Environmental);
        let theme = LevelClassifier::classify_theme(&answers, Axis::Environmental, "Resíduos");
        assert_eq!(axis.level, theme.level);
    }
}
