//! # Maturity Module
//!
//! Level classification and the reference catalog used to describe levels.
//!
//! - `classifier`: answers to achieved levels, per axis and per theme
//! - `catalog`: level profiles, recommendations and the final maturity summary

pub mod catalog;
pub mod classifier;

pub use catalog::{
    EnrichedLevel, Enrichment, FinalMaturity, MaturityCatalog, MaturityProfile, RecommendationSet,
};
pub use classifier::{
    LevelAssessment, LevelClassifier, LevelOutcome, LevelTally, SnapshotLevels,
};
