//! # Series Aggregator
//!
//! Combines the snapshots of one company into longitudinal series:
//! - level per axis over time
//! - level per (axis, theme) over time
//! - indicator values over time, projected as reported
//! - production volume over time
//!
//! Snapshots are ordered by date with a stable sort, so snapshots sharing a
//! date keep their submission order. Every series inherits that order.

use crate::maturity::{LevelClassifier, SnapshotLevels};
use crate::{Axis, EsgError, Level, SurveySnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// SERIES RECORDS
// =============================================================================

/// A level observed at a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedLevel {
    pub date: NaiveDate,
    pub level: Level,
}

/// Level over time for an axis, or for one theme of an axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSeries {
    pub axis: Axis,
    pub theme: Option<String>,
    pub points: Vec<DatedLevel>,
}

/// A numeric value observed at a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

/// Values of one indicator over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSeries {
    pub axis: Axis,
    pub item: String,
    pub points: Vec<DatedValue>,
}

/// One production report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub unit: String,
}

/// Everything known about one company over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyHistory {
    pub company: String,
    pub snapshot_count: usize,
    pub axes: Vec<LevelSeries>,
    pub themes: Vec<LevelSeries>,
    pub indicators: Vec<IndicatorSeries>,
    pub production: Vec<ProductionPoint>,
}

// =============================================================================
// SERIES AGGREGATOR
// =============================================================================

/// Series Aggregator over the snapshots of a single company.
#[derive(Debug)]
pub struct SeriesAggregator<'a> {
    company: &'a str,
    /// Snapshots in date order, each with its classification.
    entries: Vec<(&'a SurveySnapshot, SnapshotLevels)>,
}

impl<'a> SeriesAggregator<'a> {
    /// Order and classify the snapshots.
    ///
    /// All snapshots must belong to the same company.
    pub fn new(snapshots: &'a [SurveySnapshot]) -> Result<Self, EsgError> {
        let company = snapshots
            .first()
            .map(|s| s.company.name.as_str())
            .unwrap_or_default();

        if let Some(other) = snapshots.iter().find(|s| s.company.name != company) {
            return Err(EsgError::MixedCompanies {
                expected: company.to_string(),
                found: other.company.name.clone(),
            });
        }

        let mut ordered: Vec<&SurveySnapshot> = snapshots.iter().collect();
        ordered.sort_by_key(|s| s.date);

        let entries = ordered
            .into_iter()
            .map(|s| (s, LevelClassifier::classify_snapshot(s)))
            .collect();

        Ok(Self { company, entries })
    }

    /// Company the series describe. Empty when built from no snapshots.
    #[must_use]
    pub fn company(&self) -> &str {
        self.company
    }

    /// Number of snapshots aggregated.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no snapshots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classification of the most recent snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<(&'a SurveySnapshot, &SnapshotLevels)> {
        self.entries.last().map(|(s, levels)| (*s, levels))
    }

    /// Level over time per axis, canonical axis order.
    #[must_use]
    pub fn axis_series(&self) -> Vec<LevelSeries> {
        Axis::ALL
            .iter()
            .map(|&axis| LevelSeries {
                axis,
                theme: None,
                points: self
                    .entries
                    .iter()
                    .flat_map(|(snapshot, levels)| {
                        let date = snapshot.date;
                        levels
                            .axes
                            .iter()
                            .filter(move |r| r.axis == axis)
                            .map(move |r| DatedLevel {
                                date,
                                level: r.level,
                            })
                    })
                    .collect(),
            })
            .collect()
    }

    /// Level over time per (axis, theme), ordered by axis then theme.
    ///
    /// A theme only gets points for snapshots that answered it.
    #[must_use]
    pub fn theme_series(&self) -> Vec<LevelSeries> {
        let mut series: BTreeMap<(Axis, &str), Vec<DatedLevel>> = BTreeMap::new();
        for (snapshot, levels) in &self.entries {
            for result in &levels.themes {
                let theme = result.theme.as_deref().unwrap_or_default();
                series.entry((result.axis, theme)).or_default().push(DatedLevel {
                    date: snapshot.date,
                    level: result.level,
                });
            }
        }

        series
            .into_iter()
            .map(|((axis, theme), points)| LevelSeries {
                axis,
                theme: Some(theme.to_string()),
                points,
            })
            .collect()
    }

    /// Indicator values over time, ordered by axis then item.
    #[must_use]
    pub fn indicator_series(&self) -> Vec<IndicatorSeries> {
        let mut series: BTreeMap<(Axis, &str), Vec<DatedValue>> = BTreeMap::new();
        for (snapshot, _) in &self.entries {
            for indicator in &snapshot.indicators {
                series
                    .entry((indicator.axis, indicator.item.as_str()))
                    .or_default()
                    .push(DatedValue {
                        date: snapshot.date,
                        value: indicator.value,
                    });
            }
        }

        series
            .into_iter()
            .map(|((axis, item), points)| IndicatorSeries {
                axis,
                item: item.to_string(),
                points,
            })
            .collect()
    }

    /// Production volume over time.
    ///
    /// If any snapshot reports a volume that is not a number the whole series
    /// is empty. This is logged, never an error.
    #[must_use]
    pub fn production_series(&self) -> Vec<ProductionPoint> {
        let mut points = Vec::with_capacity(self.entries.len());
        for (snapshot, _) in &self.entries {
            let Some(value) = snapshot.production.parsed_volume() else {
                tracing::warn!(
                    company = %self.company,
                    date = %snapshot.date,
                    volume = %snapshot.production.volume,
                    "unparseable production volume, production series left empty"
                );
                return Vec::new();
            };
            points.push(ProductionPoint {
                date: snapshot.date,
                value,
                unit: snapshot.production.unit.clone(),
            });
        }
        points
    }

    /// All series at once.
    #[must_use]
    pub fn aggregate(&self) -> CompanyHistory {
        CompanyHistory {
            company: self.company.to_string(),
            snapshot_count: self.entries.len(),
            axes: self.axis_series(),
            themes: self.theme_series(),
            indicators: self.indicator_series(),
            production: self.production_series(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnswerCode, Company, Indicator, NormalizedAnswer, Production, QuestionId};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn snapshot(company: &str, when: NaiveDate, no_at: Option<u8>, volume: &str) -> SurveySnapshot {
        let answers = (1..=5u8)
            .map(|level| {
                let code = if Some(level) == no_at {
                    AnswerCode::No
                } else {
                    AnswerCode::Yes
                };
                NormalizedAnswer::new(
                    QuestionId(u32::from(level)),
                    Axis::Environmental,
                    "Água",
                    level,
                    code,
                )
            })
            .collect();

        SurveySnapshot {
            company: Company::named(company),
            date: when,
            production: Production::new(volume, "t"),
            answers,
            indicators: vec![Indicator::new(Axis::Environmental, "Consumo de água", 10.0)],
        }
    }

    #[test]
    fn series_are_date_ordered() {
        let snapshots = vec![
            snapshot("Aurora", date(2024, 3, 1), None, "300"),
            snapshot("Aurora", date(2024, 1, 1), Some(2), "100"),
            snapshot("Aurora", date(2024, 2, 1), Some(4), "200"),
        ];
        let aggregator = SeriesAggregator::new(&snapshots).expect("aggregator");

        let axes = aggregator.axis_series();
        let environmental = &axes[0];
        assert_eq!(environmental.axis, Axis::Environmental);
        let dates: Vec<NaiveDate> = environmental.points.iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]);

        let levels: Vec<u8> = environmental.points.iter().map(|p| p.level.value()).collect();
        assert_eq!(levels, vec![1, 3, 5]);

        let production: Vec<u64> = aggregator
            .production_series()
            .iter()
            .map(|p| p.value as u64)
            .collect();
        assert_eq!(production, vec![100, 200, 300]);
    }

    #[test]
    fn same_date_keeps_submission_order() {
        let snapshots = vec![
            snapshot("Aurora", date(2024, 5, 1), None, "1"),
            snapshot("Aurora", date(2024, 5, 1), None, "2"),
        ];
        let aggregator = SeriesAggregator::new(&snapshots).expect("aggregator");
        let production = aggregator.production_series();
        assert_eq!(production.len(), 2);
        assert_eq!(production[0].value as u64, 1);
        assert_eq!(production[1].value as u64, 2);
    }

    #[test]
    fn unparseable_production_empties_series() {
        let snapshots = vec![
            snapshot("Aurora", date(2024, 1, 1), None, "100"),
            snapshot("Aurora", date(2024, 2, 1), None, "cem toneladas"),
        ];
        let aggregator = SeriesAggregator::new(&snapshots).expect("aggregator");
        assert!(aggregator.production_series().is_empty());
        assert_eq!(aggregator.axis_series()[0].points.len(), 2);
    }

    #[test]
    fn mixed_companies_rejected() {
        let snapshots = vec![
            snapshot("Aurora", date(2024, 1, 1), None, "1"),
            snapshot("Boreal", date(2024, 2, 1), None, "1"),
        ];
        assert!(matches!(
            SeriesAggregator::new(&snapshots),
            Err(EsgError::MixedCompanies { .. })
        ));
    }

    #[test]
    fn theme_and_indicator_series() {
        let snapshots = vec![
            snapshot("Aurora", date(2024, 2, 1), None, "1"),
            snapshot("Aurora", date(2024, 1, 1), Some(3), "1"),
        ];
        let history = SeriesAggregator::new(&snapshots)
            .expect("aggregator")
            .aggregate();

        assert_eq!(history.company, "Aurora");
        assert_eq!(history.snapshot_count, 2);
        assert_eq!(history.themes.len(), 1);
        assert_eq!(history.themes[0].theme.as_deref(), Some("Água"));
        let theme_levels: Vec<u8> = history.themes[0]
            .points
            .iter()
            .map(|p| p.level.value())
            .collect();
        assert_eq!(theme_levels, vec![2, 5]);

        assert_eq!(history.indicators.len(), 1);
        assert_eq!(history.indicators[0].item, "Consumo de água");
        assert_eq!(history.indicators[0].points.len(), 2);
    }

    #[test]
    fn empty_history() {
        let aggregator = SeriesAggregator::new(&[]).expect("aggregator");
        assert!(aggregator.is_empty());
        assert!(aggregator.latest().is_none());
        let history = aggregator.aggregate();
        assert_eq!(history.axes.len(), 3);
        assert!(history.axes.iter().all(|s| s.points.is_empty()));
        assert!(history.production.is_empty());
    }
}
