//! # esg-core
//!
//! The deterministic ESG maturity engine.
//!
//! This crate turns survey answers into maturity levels (1 to 5) per ESG
//! axis and per theme, attaches the reference profile and recommendations
//! for each level, and combines a company's surveys into longitudinal series.
//!
//! ## Pipeline
//!
//! ```text
//! SurveySubmission -> Ingestor (normalizer) -> SurveySnapshot
//!                  -> LevelClassifier        -> AxisLevelResult
//!                  -> MaturityCatalog        -> profiles, recommendations
//!                  -> SeriesAggregator       -> CompanyHistory
//!                  -> ReportAssembler        -> Report
//! ```
//!
//! ## Architectural Constraints
//!
//! - Classification, enrichment and aggregation are pure functions
//! - I/O happens only in `storage`, reached through an explicit `Session`
//! - No async, no network dependencies

// =============================================================================
// MODULES
// =============================================================================

pub mod formats;
pub mod ingestor;
pub mod maturity;
pub mod normalizer;
pub mod primitives;
pub mod report;
pub mod series;
pub mod session;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Answer, AnswerCode, Axis, AxisLevelResult, Company, EsgError, Indicator, Level,
    NormalizedAnswer, Production, Question, QuestionId, QuestionKind, SurveySnapshot,
};

// =============================================================================
// RE-EXPORTS: Engine
// =============================================================================

pub use ingestor::{IndicatorBlock, Ingestor, QuestionBank, RawNumber, SurveySubmission};
pub use maturity::{
    EnrichedLevel, Enrichment, FinalMaturity, LevelAssessment, LevelClassifier, LevelOutcome,
    LevelTally, MaturityCatalog, MaturityProfile, RecommendationSet, SnapshotLevels,
};
pub use report::{Report, ReportAssembler, ReportOptions};
pub use series::{
    CompanyHistory, DatedLevel, DatedValue, IndicatorSeries, LevelSeries, ProductionPoint,
    SeriesAggregator,
};
pub use session::{Session, StorageBackend, StoreStatus};
pub use storage::{MemoryDump, MemoryStore, RedbStore, SnapshotId, SurveyStore};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{PersistenceHeader, record_from_bytes, record_to_bytes};
