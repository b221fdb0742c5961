//! # Report Assembler
//!
//! Collects everything a presentation layer needs to render a maturity
//! report for one snapshot, as plain serializable data:
//!
//! 1. Header (company, date, location)
//! 2. Maturity summary per axis
//! 3. Recommendations per axis
//! 4. Final maturity (weakest axis)
//! 5. Theme radar per axis
//! 6. Indicator tables per axis
//! 7. Optional history series
//!
//! No layout, fonts or charts are produced here.

use crate::maturity::{FinalMaturity, LevelClassifier, MaturityCatalog};
use crate::primitives::DISPLAY_DATE_FORMAT;
use crate::series::{CompanyHistory, SeriesAggregator};
use crate::{Axis, EsgError, Level, SurveySnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// REPORT SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportHeader {
    pub company: String,
    pub activity: String,
    pub location: String,
    pub date: NaiveDate,
    /// Date as printed on the report (dd/mm/YYYY).
    pub date_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSummary {
    pub axis: Axis,
    pub level: Level,
    pub title: String,
    pub color: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRecommendations {
    pub axis: Axis,
    pub level: Level,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeLevel {
    pub theme: String,
    pub level: Level,
}

/// Theme levels of one axis, as plotted on a radar chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeRadar {
    pub axis: Axis,
    pub themes: Vec<ThemeLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub item: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorTable {
    pub axis: Axis,
    pub rows: Vec<IndicatorRow>,
}

/// A complete maturity report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub header: ReportHeader,
    pub maturity: Vec<AxisSummary>,
    pub recommendations: Vec<AxisRecommendations>,
    pub final_maturity: Option<FinalMaturity>,
    pub themes: Vec<ThemeRadar>,
    pub indicators: Vec<IndicatorTable>,
    pub history: Option<CompanyHistory>,
}

// =============================================================================
// REPORT ASSEMBLER
// =============================================================================

/// Options controlling report content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Final maturity lists the recommendations of every axis at its level,
    /// instead of only the weakest axis's.
    pub cumulative_recommendations: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            cumulative_recommendations: true,
        }
    }
}

/// Report Assembler - builds `Report`s from snapshots.
#[derive(Debug)]
pub struct ReportAssembler {
    catalog: &'static MaturityCatalog,
    options: ReportOptions,
}

impl ReportAssembler {
    #[must_use]
    pub fn new(options: ReportOptions) -> Self {
        Self {
            catalog: MaturityCatalog::global(),
            options,
        }
    }

    /// Assemble a report for `snapshot`.
    ///
    /// When `history` is given it must hold snapshots of the same company;
    /// it becomes the history section.
    pub fn assemble(
        &self,
        snapshot: &SurveySnapshot,
        history: Option<&[SurveySnapshot]>,
    ) -> Result<Report, EsgError> {
        let levels = LevelClassifier::classify_snapshot(snapshot);

        let mut maturity = Vec::with_capacity(levels.axes.len());
        let mut recommendations = Vec::with_capacity(levels.axes.len());
        for result in &levels.axes {
            let enriched = self.catalog.enrich_result(result)?;
            maturity.push(AxisSummary {
                axis: result.axis,
                level: result.level,
                title: enriched.profile.title,
                color: enriched.profile.color,
                description: enriched.profile.description,
            });
            recommendations.push(AxisRecommendations {
                axis: result.axis,
                level: result.level,
                recommendations: enriched.recommendations.recommendations,
            });
        }

        let final_maturity = self
            .catalog
            .final_maturity(&levels.axes, self.options.cumulative_recommendations)?;

        let themes = Axis::ALL
            .iter()
            .map(|&axis| ThemeRadar {
                axis,
                themes: levels
                    .themes
                    .iter()
                    .filter(|r| r.axis == axis)
                    .map(|r| ThemeLevel {
                        theme: r.theme.clone().unwrap_or_default(),
                        level: r.level,
                    })
                    .collect(),
            })
            .collect();

        let indicators = Axis::ALL
            .iter()
            .map(|&axis| IndicatorTable {
                axis,
                rows: snapshot
                    .indicators
                    .iter()
                    .filter(|i| i.axis == axis)
                    .map(|i| IndicatorRow {
                        item: i.item.clone(),
                        value: i.value,
                    })
                    .collect(),
            })
            .collect();

        let history = match history {
            Some(snapshots) => Some(self.history(snapshot, snapshots)?),
            None => None,
        };

        tracing::debug!(
            company = %snapshot.company.name,
            date = %snapshot.date,
            with_history = history.is_some(),
            "report assembled"
        );

        Ok(Report {
            header: Self::header(snapshot),
            maturity,
            recommendations,
            final_maturity,
            themes,
            indicators,
            history,
        })
    }

    fn history(
        &self,
        snapshot: &SurveySnapshot,
        snapshots: &[SurveySnapshot],
    ) -> Result<CompanyHistory, EsgError> {
        let aggregator = SeriesAggregator::new(snapshots)?;
        if !aggregator.is_empty() && aggregator.company() != snapshot.company.name {
            return Err(EsgError::MixedCompanies {
                expected: snapshot.company.name.clone(),
                found: aggregator.company().to_string(),
            });
        }
        Ok(aggregator.aggregate())
    }

    fn header(snapshot: &SurveySnapshot) -> ReportHeader {
        let company = &snapshot.company;
        let location = if !company.location.trim().is_empty() {
            company.location.trim().to_string()
        } else {
            [company.city.trim(), company.state.trim()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" - ")
        };

        ReportHeader {
            company: company.name.clone(),
            activity: company.activity.clone(),
            location,
            date: snapshot.date,
            date_label: snapshot.date.format(DISPLAY_DATE_FORMAT).to_string(),
        }
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(ReportOptions::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnswerCode, Company, Indicator, NormalizedAnswer, Production, QuestionId};

    fn snapshot(company: &str, month: u32, social_no: bool) -> SurveySnapshot {
        let mut answers = Vec::new();
        let mut id = 0u32;
        for axis in Axis::ALL {
            for level in 1..=5u8 {
                id = id.saturating_add(1);
                let code = if axis == Axis::Social && level == 3 && social_no {
                    AnswerCode::No
                } else {
                    AnswerCode::Yes
                };
                answers.push(NormalizedAnswer::new(QuestionId(id), axis, "Gestão", level, code));
            }
        }
        for level in 1..=5u8 {
            id = id.saturating_add(1);
            answers.push(NormalizedAnswer::new(
                QuestionId(id),
                Axis::Social,
                "Comunidade",
                level,
                AnswerCode::NotApplicable,
            ));
        }

        let mut company = Company::named(company);
        company.city = "Criciúma".to_string();
        company.state = "SC".to_string();

        SurveySnapshot {
            company,
            date: NaiveDate::from_ymd_opt(2024, month, 15).expect("date"),
            production: Production::new("800", "t"),
            answers,
            indicators: vec![
                Indicator::new(Axis::Environmental, "Resíduos (t)", 12.5),
                Indicator::new(Axis::Social, "Colaboradores", 140.0),
            ],
        }
    }

    #[test]
    fn report_sections() {
        let report = ReportAssembler::default()
            .assemble(&snapshot("Aurora", 6, true), None)
            .expect("assemble");

        assert_eq!(report.header.company, "Aurora");
        assert_eq!(report.header.location, "Criciúma - SC");
        assert_eq!(report.header.date_label, "15/06/2024");

        let levels: Vec<u8> = report.maturity.iter().map(|m| m.level.value()).collect();
        assert_eq!(levels, vec![5, 2, 5]);
        assert_eq!(report.maturity[1].title, "Não Integrado");
        assert_eq!(report.recommendations[1].recommendations.len(), 2);

        let final_maturity = report.final_maturity.expect("final maturity");
        assert_eq!(final_maturity.axis, Axis::Social);
        assert_eq!(final_maturity.recommendations.len(), 6);

        assert_eq!(report.themes.len(), 3);
        let social_themes: Vec<(&str, u8)> = report.themes[1]
            .themes
            .iter()
            .map(|t| (t.theme.as_str(), t.level.value()))
            .collect();
        assert_eq!(social_themes, vec![("Comunidade", 5), ("Gestão", 2)]);

        assert_eq!(report.indicators[0].rows.len(), 1);
        assert!(report.indicators[2].rows.is_empty());
        assert!(report.history.is_none());
    }

    #[test]
    fn final_maturity_is_cumulative_by_default() {
        assert!(ReportOptions::default().cumulative_recommendations);

        let report = ReportAssembler::new(ReportOptions::default())
            .assemble(&snapshot("Aurora", 6, true), None)
            .expect("assemble");
        let final_maturity = report.final_maturity.expect("final maturity");
        assert_eq!(final_maturity.recommendations.len(), 6);
    }

    #[test]
    fn axis_only_final_maturity() {
        let assembler = ReportAssembler::new(ReportOptions {
            cumulative_recommendations: false,
        });
        let report = assembler
            .assemble(&snapshot("Aurora", 6, true), None)
            .expect("assemble");
        let final_maturity = report.final_maturity.expect("final maturity");
        assert_eq!(final_maturity.recommendations.len(), 2);
    }

    #[test]
    fn history_section() {
        let latest = snapshot("Aurora", 6, false);
        let all = vec![latest.clone(), snapshot("Aurora", 1, true)];
        let report = ReportAssembler::default()
            .assemble(&latest, Some(&all))
            .expect("assemble");
        let history = report.history.expect("history");
        assert_eq!(history.snapshot_count, 2);
        assert_eq!(history.axes[1].points[0].level, Level::NonIntegrated);
    }

    #[test]
    fn history_of_other_company_rejected() {
        let latest = snapshot("Aurora", 6, false);
        let other = vec![snapshot("Boreal", 1, false)];
        assert!(matches!(
            ReportAssembler::default().assemble(&latest, Some(&other)),
            Err(EsgError::MixedCompanies { .. })
        ));
    }
}
