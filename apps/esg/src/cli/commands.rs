//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::{Backend, Settings};
use esg_core::{
    Axis, CompanyHistory, EsgError, Ingestor, Level, LevelAssessment, LevelClassifier,
    MaturityCatalog, MemoryDump,
    MemoryStore, Question, Report, ReportAssembler, ReportOptions, Session, SnapshotLevels,
    SurveySubmission,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for question banks and submissions (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum file size for a JSON-file store (500 MB).
const MAX_STORE_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), EsgError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| EsgError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(EsgError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input file path.
///
/// Canonicalizes the path (resolving symlinks and "..") and requires a
/// regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, EsgError> {
    let canonical = path.canonicalize().map_err(|e| {
        EsgError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(EsgError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, EsgError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        EsgError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(EsgError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| EsgError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// Read and parse a JSON input file.
pub fn read_json_file<T: DeserializeOwned>(path: &Path, max_size: u64) -> Result<T, EsgError> {
    let validated_path = validate_file_path(path)?;
    validate_file_size(&validated_path, max_size)?;

    let contents = std::fs::read(&validated_path)
        .map_err(|e| EsgError::IoError(format!("Read file: {}", e)))?;

    serde_json::from_slice(&contents).map_err(|e| {
        EsgError::DeserializationError(format!("{}: {}", path.display(), e))
    })
}

/// Write a value as pretty JSON.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<PathBuf, EsgError> {
    let validated_path = validate_output_path(path)?;
    let data = serde_json::to_vec_pretty(value)
        .map_err(|e| EsgError::SerializationError(e.to_string()))?;
    std::fs::write(&validated_path, data)
        .map_err(|e| EsgError::IoError(format!("Write file: {}", e)))?;
    Ok(validated_path)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), EsgError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| EsgError::SerializationError(e.to_string()))?;
    println!("{}", text);
    Ok(())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create a new empty store, or empty an existing one with `force`.
pub fn cmd_init(settings: &Settings, force: bool) -> Result<(), EsgError> {
    let db_path = &settings.database;
    if db_path.exists() && !force {
        return Err(EsgError::Configuration(
            "Database already exists. Use --force to empty it.".to_string(),
        ));
    }

    match settings.backend {
        Backend::Redb => {
            let mut session = Session::with_redb(db_path)?;
            session.reset()?;
        }
        Backend::File => {
            write_json_file(db_path, &MemoryDump::default())?;
        }
    }

    tracing::info!(database = %db_path.display(), backend = %settings.backend, "store initialized");
    if settings.json_mode {
        print_json(&serde_json::json!({
            "database": db_path.to_string_lossy(),
            "backend": settings.backend.name(),
            "initialized": true
        }))?;
    } else {
        println!("Initialized new {} store at {:?}", settings.backend, db_path);
    }
    Ok(())
}

// =============================================================================
// LOAD-QUESTIONS COMMAND
// =============================================================================

/// Load reference questions; ids already stored are kept.
pub fn cmd_load_questions(settings: &Settings, file: &Path) -> Result<(), EsgError> {
    tracing::info!("Loading questions from {:?}", file);

    let questions: Vec<Question> = read_json_file(file, MAX_INPUT_FILE_SIZE)?;
    let received = questions.len();

    let mut session = open_session(settings)?;
    let inserted = session.load_questions(questions)?;
    save_session(&session, settings)?;

    if settings.json_mode {
        print_json(&serde_json::json!({
            "received": received,
            "inserted": inserted,
            "skipped": received.saturating_sub(inserted)
        }))?;
    } else {
        println!(
            "Loaded {} questions ({} new, {} already stored)",
            received,
            inserted,
            received.saturating_sub(inserted)
        );
    }
    Ok(())
}

// =============================================================================
// SUBMIT COMMAND
// =============================================================================

/// Validate a submission against the stored bank and store it.
pub fn cmd_submit(settings: &Settings, file: &Path) -> Result<(), EsgError> {
    tracing::info!("Submitting survey from {:?}", file);

    let submission: SurveySubmission = read_json_file(file, MAX_INPUT_FILE_SIZE)?;

    let mut session = open_session(settings)?;
    let (id, snapshot) = session.submit(&submission)?;
    save_session(&session, settings)?;

    let levels = LevelClassifier::classify_snapshot(&snapshot);

    if settings.json_mode {
        print_json(&serde_json::json!({
            "snapshot_id": id.0,
            "company": snapshot.company.name,
            "date": snapshot.date,
            "axes": levels.axes
        }))?;
    } else {
        println!(
            "Stored survey #{} for {} ({})",
            id,
            snapshot.company.name,
            snapshot.date.format(esg_core::primitives::DISPLAY_DATE_FORMAT)
        );
        print_levels(&levels, false)?;
    }
    Ok(())
}

// =============================================================================
// CLASSIFY COMMAND
// =============================================================================

/// Classify a submission against the stored bank without storing it.
pub fn cmd_classify(
    settings: &Settings,
    file: &Path,
    themes: bool,
    evidence: bool,
) -> Result<(), EsgError> {
    let submission: SurveySubmission = read_json_file(file, MAX_INPUT_FILE_SIZE)?;

    let session = open_session(settings)?;
    let bank = session.question_bank()?;
    let snapshot = Ingestor::ingest(&bank, &submission)?;
    let levels = LevelClassifier::classify_snapshot(&snapshot);

    if settings.json_mode {
        let catalog = MaturityCatalog::global();
        let mut axes = Vec::with_capacity(levels.axes.len());
        for result in &levels.axes {
            axes.push(catalog.enrich_result(result)?);
        }
        let mut output = serde_json::json!({ "axes": axes });
        if themes {
            output["themes"] = serde_json::json!(levels.themes);
        }
        if evidence {
            let assessments: Vec<serde_json::Value> = Axis::ALL
                .iter()
                .map(|&axis| {
                    let assessment = LevelClassifier::assess_axis(&snapshot.answers, axis);
                    serde_json::json!({
                        "axis": axis.key(),
                        "achieved": assessment.achieved,
                        "levels": evidence_rows(&assessment)
                    })
                })
                .collect();
            output["evidence"] = serde_json::json!(assessments);
        }
        print_json(&output)?;
    } else {
        println!("Classification for {}", snapshot.company.name);
        println!("========================");
        print_levels(&levels, themes)?;
        if evidence {
            println!();
            for axis in Axis::ALL {
                let assessment = LevelClassifier::assess_axis(&snapshot.answers, axis);
                print_evidence(axis, &assessment);
            }
        }
    }
    Ok(())
}

fn evidence_rows(assessment: &LevelAssessment) -> Vec<serde_json::Value> {
    assessment
        .tallies
        .iter()
        .map(|tally| {
            serde_json::json!({
                "level": tally.level,
                "outcome": assessment.outcome(tally.level),
                "clearing": tally.clearing,
                "total": tally.total,
                "clearing_per_mille": tally.clearing_per_mille()
            })
        })
        .collect()
}

fn print_evidence(axis: Axis, assessment: &LevelAssessment) {
    println!(
        "  {} - nível {} ({} answers)",
        axis.label(),
        assessment.achieved,
        assessment.answer_count()
    );
    for level in Level::ALL {
        let tally = assessment.tallies.iter().find(|t| t.level == level);
        let (clearing, total) = tally.map(|t| (t.clearing, t.total)).unwrap_or((0, 0));
        println!(
            "    {}  {:<10} {}/{}",
            level,
            assessment.outcome(level).label(),
            clearing,
            total
        );
    }
}

/// Print axis levels, and theme levels when asked.
fn print_levels(levels: &SnapshotLevels, themes: bool) -> Result<(), EsgError> {
    let catalog = MaturityCatalog::global();
    for result in &levels.axes {
        let profile = catalog.profile(result.level)?;
        println!("  {:<12} {}  {}", result.axis.label(), result.level, profile.title);
    }

    if themes {
        println!();
        for result in &levels.themes {
            println!(
                "  {:<12} {:<40} {}",
                result.axis.label(),
                result.theme.as_deref().unwrap_or_default(),
                result.level
            );
        }
    }
    Ok(())
}

// =============================================================================
// REPORT COMMAND
// =============================================================================

/// Build the report of a company's latest survey.
pub fn cmd_report(
    settings: &Settings,
    company: &str,
    output: Option<&Path>,
    with_history: bool,
) -> Result<(), EsgError> {
    let session = open_session(settings)?;
    let latest = session
        .latest(company)?
        .ok_or_else(|| EsgError::invalid("company", format!("no surveys for {:?}", company)))?;

    let history = if with_history {
        Some(session.snapshots(company)?)
    } else {
        None
    };

    let assembler = ReportAssembler::new(ReportOptions {
        cumulative_recommendations: settings.cumulative_recommendations,
    });
    let report = assembler.assemble(&latest, history.as_deref())?;

    if let Some(path) = output {
        let written = write_json_file(path, &report)?;
        tracing::info!(company, output = %written.display(), "report written");
        if !settings.json_mode {
            println!("Report written to {:?}", written);
        }
        return Ok(());
    }

    if settings.json_mode {
        print_json(&report)
    } else {
        print_report(&report);
        Ok(())
    }
}

fn print_report(report: &Report) {
    let header = &report.header;
    println!("Relatório de Maturidade ESG");
    println!("===========================");
    println!("Empresa:   {}", header.company);
    if !header.activity.is_empty() {
        println!("Atividade: {}", header.activity);
    }
    if !header.location.is_empty() {
        println!("Local:     {}", header.location);
    }
    println!("Data:      {}", header.date_label);
    println!();

    for (summary, recs) in report.maturity.iter().zip(&report.recommendations) {
        println!("{} - nível {} ({})", summary.axis.label(), summary.level, summary.title);
        for rec in &recs.recommendations {
            println!("  - {}", rec);
        }
    }

    if let Some(final_maturity) = &report.final_maturity {
        println!();
        println!(
            "Maturidade final: nível {} ({}), eixo {}",
            final_maturity.profile.level,
            final_maturity.profile.title,
            final_maturity.axis.label()
        );
        for rec in &final_maturity.recommendations {
            println!("  - {}", rec);
        }
    }

    if let Some(history) = &report.history {
        println!();
        print_history(history);
    }
}

// =============================================================================
// HISTORY COMMAND
// =============================================================================

/// Show a company's maturity over time.
pub fn cmd_history(settings: &Settings, company: &str) -> Result<(), EsgError> {
    let session = open_session(settings)?;
    let history = session.history(company)?;

    if history.snapshot_count == 0 {
        return Err(EsgError::invalid("company", format!("no surveys for {:?}", company)));
    }

    if settings.json_mode {
        print_json(&history)
    } else {
        print_history(&history);
        Ok(())
    }
}

fn print_history(history: &CompanyHistory) {
    println!("History of {} ({} surveys)", history.company, history.snapshot_count);
    for series in &history.axes {
        let levels: Vec<String> = series
            .points
            .iter()
            .map(|p| format!("{}={}", p.date, p.level))
            .collect();
        println!("  {:<12} {}", series.axis.label(), levels.join("  "));
    }

    if history.production.is_empty() {
        println!("  Production: unavailable");
    } else {
        let points: Vec<String> = history
            .production
            .iter()
            .map(|p| format!("{}={} {}", p.date, p.value, p.unit))
            .collect();
        println!("  Production: {}", points.join("  "));
    }
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show store status.
pub fn cmd_status(settings: &Settings) -> Result<(), EsgError> {
    let session = open_session(settings)?;
    let status = session.status()?;
    let companies = session.companies()?;

    if settings.json_mode {
        return print_json(&serde_json::json!({
            "database": settings.database.to_string_lossy(),
            "backend": settings.backend.name(),
            "questions": status.questions,
            "snapshots": status.snapshots,
            "companies": companies
        }));
    }

    println!("ESG Store Status");
    println!("================");
    println!("Database:  {:?}", settings.database);
    println!("Backend:   {}", settings.backend);
    println!();
    println!("Questions: {}", status.questions);
    println!("Surveys:   {}", status.snapshots);
    println!("Companies: {}", status.companies);
    for company in &companies {
        println!("  - {}", company);
    }

    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Open a session on the configured backend.
///
/// A missing JSON store file yields an empty session.
pub fn open_session(settings: &Settings) -> Result<Session, EsgError> {
    match settings.backend {
        Backend::Redb => Session::with_redb(&settings.database),
        Backend::File => {
            if settings.database.exists() {
                let dump: MemoryDump = read_json_file(&settings.database, MAX_STORE_FILE_SIZE)?;
                Ok(Session::with_memory(MemoryStore::restore(dump)?))
            } else {
                Ok(Session::new())
            }
        }
    }
}

/// Save a session after a mutating command.
pub fn save_session(session: &Session, settings: &Settings) -> Result<(), EsgError> {
    match session.memory_store() {
        // Redb backend - already persisted, nothing to do
        None => Ok(()),
        Some(store) => {
            write_json_file(&settings.database, &store.dump())?;
            Ok(())
        }
    }
}
