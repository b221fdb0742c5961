//! # Property-Based Tests
//!
//! Determinism and range invariants of classification and aggregation.

use esg_core::{
    AnswerCode, Axis, Company, Level, LevelClassifier, NormalizedAnswer, Production, QuestionId,
    SeriesAggregator, SurveySnapshot,
};
use chrono::NaiveDate;
use proptest::collection::vec;
use proptest::prelude::*;

fn code_strategy() -> impl Strategy<Value = AnswerCode> {
    prop_oneof![
        Just(AnswerCode::Yes),
        Just(AnswerCode::No),
        Just(AnswerCode::NotApplicable),
    ]
}

fn axis_strategy() -> impl Strategy<Value = Axis> {
    prop_oneof![
        Just(Axis::Environmental),
        Just(Axis::Social),
        Just(Axis::Governance),
    ]
}

/// Answers over all axes, three themes, levels 0..=6 (out-of-range included).
fn answers_strategy() -> impl Strategy<Value = Vec<NormalizedAnswer>> {
    vec((axis_strategy(), 0usize..3, 0u8..7, code_strategy()), 0..60).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (axis, theme, level, code))| {
                let theme = ["Água", "Energia", "Pessoas"][theme];
                NormalizedAnswer::new(QuestionId(i as u32), axis, theme, level, code)
            })
            .collect()
    })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Every axis result lies within 1..=5.
    #[test]
    fn level_always_in_range(answers in answers_strategy()) {
        for result in LevelClassifier::classify_axes(&answers) {
            prop_assert!(result.level >= Level::FLOOR);
            prop_assert!(result.level <= Level::CEILING);
        }
        for result in LevelClassifier::classify_themes(&answers) {
            prop_assert!((1..=5).contains(&result.level.value()));
        }
    }

    /// Classifying twice gives identical results.
    #[test]
    fn classification_idempotent(answers in answers_strategy()) {
        prop_assert_eq!(
            LevelClassifier::classify_axes(&answers),
            LevelClassifier::classify_axes(&answers)
        );
        prop_assert_eq!(
            LevelClassifier::classify_themes(&answers),
            LevelClassifier::classify_themes(&answers)
        );
    }

    /// Permuting the answers does not change any result.
    #[test]
    fn classification_order_independent(answers in answers_strategy()) {
        let mut reversed = answers.clone();
        reversed.reverse();
        prop_assert_eq!(
            LevelClassifier::classify_axes(&answers),
            LevelClassifier::classify_axes(&reversed)
        );
        prop_assert_eq!(
            LevelClassifier::classify_themes(&answers),
            LevelClassifier::classify_themes(&reversed)
        );
    }

    /// Without any No at levels 2..=5 and with every level answered, the result is 5.
    #[test]
    fn no_failures_reach_ceiling(codes in vec(prop_oneof![Just(AnswerCode::Yes), Just(AnswerCode::NotApplicable)], 5)) {
        let answers: Vec<NormalizedAnswer> = codes
            .iter()
            .zip(1u8..=5)
            .map(|(&code, level)| {
                NormalizedAnswer::new(QuestionId(u32::from(level)), Axis::Social, "Pessoas", level, code)
            })
            .collect();
        prop_assert_eq!(LevelClassifier::achieved_level(&answers), Level::CEILING);
    }

    /// Turning a Yes into a No never raises the level.
    #[test]
    fn extra_no_never_raises(answers in answers_strategy(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!answers.is_empty());
        let before = LevelClassifier::achieved_level(&answers);

        let mut worse = answers.clone();
        let index = pick.index(worse.len());
        if worse[index].code == AnswerCode::Yes && worse[index].level >= 2 {
            worse[index].code = AnswerCode::No;
        }
        prop_assert!(LevelClassifier::achieved_level(&worse) <= before);
    }

    /// Series points are always in non-decreasing date order.
    #[test]
    fn series_dates_sorted(days in vec(1u32..28, 1..12)) {
        let snapshots: Vec<SurveySnapshot> = days
            .iter()
            .map(|&day| SurveySnapshot {
                company: Company::named("Aurora"),
                date: NaiveDate::from_ymd_opt(2024, 2, day).expect("date"),
                production: Production::new(day.to_string(), "t"),
                answers: Vec::new(),
                indicators: Vec::new(),
            })
            .collect();

        let history = SeriesAggregator::new(&snapshots).expect("aggregator").aggregate();
        for series in &history.axes {
            prop_assert_eq!(series.points.len(), days.len());
            prop_assert!(series.points.windows(2).all(|w| w[0].date <= w[1].date));
        }
        prop_assert!(history.production.windows(2).all(|w| w[0].date <= w[1].date));
    }
}
