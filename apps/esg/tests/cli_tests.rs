//! CLI parsing and end-to-end command tests.

use clap::Parser;
use esg::cli::{
    Cli, Commands, cmd_classify, cmd_history, cmd_init, cmd_load_questions, cmd_report,
    cmd_status, cmd_submit, open_session, read_json_file,
};
use esg::config::{Backend, EsgConfig, Settings};
use esg_core::{EsgError, Report};
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

// =============================================================================
// FIXTURES
// =============================================================================

const QUESTIONS: &str = r#"[
    {"id": 1, "axis": "Ambiental", "text": "Atende à legislação ambiental?", "theme": "Resíduos", "level": 1},
    {"id": 2, "axis": "Ambiental", "text": "Possui práticas de coleta seletiva?", "theme": "Resíduos", "level": 2},
    {"id": 3, "axis": "Ambiental", "text": "Monitora indicadores de resíduos?", "theme": "Resíduos", "level": 3},
    {"id": 4, "axis": "Social", "text": "Possui política de segurança?", "theme": "Saúde", "level": 1},
    {"id": 5, "axis": "Social", "text": "Realiza treinamentos periódicos?", "theme": "Saúde", "level": 2},
    {"id": 6, "axis": "Governança", "text": "Possui código de ética?", "theme": "Ética", "level": 1},
    {"id": 7, "axis": "Governança", "text": "Consumo de energia (kWh)", "theme": "Energia", "kind": "indicador", "level": 1}
]"#;

fn survey(date: &str, answer_two: &str, volume: &str) -> String {
    format!(
        r#"{{
            "company": {{"name": "Cerâmica Aurora", "activity": "Cerâmica", "city": "Criciúma", "state": "SC"}},
            "date": "{date}",
            "production_volume": "{volume}",
            "production_unit": "t",
            "answers": [
                {{"question_id": 1, "answer": "Sim"}},
                {{"question_id": 2, "answer": "{answer_two}"}},
                {{"question_id": 3, "answer": "sim, parcialmente"}},
                {{"question_id": 4, "answer": "Sim"}},
                {{"question_id": 5, "answer": "Não aplicado"}},
                {{"question_id": 6, "answer": "SIM "}},
                {{"question_id": 7, "answer": "1200"}}
            ]
        }}"#
    )
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

fn settings(db: &Path, backend: Backend) -> Settings {
    Settings {
        database: db.to_path_buf(),
        backend,
        json_mode: true,
        cumulative_recommendations: true,
    }
}

/// init, load questions, submit two surveys.
fn populated(dir: &TempDir, backend: Backend) -> Settings {
    let settings = settings(&dir.path().join("store"), backend);
    cmd_init(&settings, false).expect("init");

    let questions = write(dir, "questions.json", QUESTIONS);
    cmd_load_questions(&settings, &questions).expect("load questions");

    let later = write(dir, "later.json", &survey("01/06/2024", "Sim", "900"));
    let earlier = write(dir, "earlier.json", &survey("2024-01-15", "Não", "700"));
    cmd_submit(&settings, &later).expect("submit later");
    cmd_submit(&settings, &earlier).expect("submit earlier");
    settings
}

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

#[test]
fn parses_global_flags_and_subcommand() {
    let cli = Cli::try_parse_from([
        "esg",
        "--json-mode",
        "-B",
        "file",
        "report",
        "-c",
        "Cerâmica Aurora",
        "-o",
        "out.json",
        "--with-history",
    ])
    .expect("parse");

    assert!(cli.json_mode);
    assert_eq!(cli.backend.as_deref(), Some("file"));
    assert!(cli.database.is_none());
    match cli.command {
        Some(Commands::Report {
            company,
            output,
            with_history,
        }) => {
            assert_eq!(company, "Cerâmica Aurora");
            assert_eq!(output, Some(PathBuf::from("out.json")));
            assert!(with_history);
        }
        other => unreachable!("unexpected command {:?}", other),
    }
}

#[test]
fn parses_kebab_case_commands() {
    let cli = Cli::try_parse_from(["esg", "load-questions", "-f", "q.json"]).expect("parse");
    assert!(matches!(cli.command, Some(Commands::LoadQuestions { .. })));

    let cli = Cli::try_parse_from(["esg", "classify", "-f", "s.json", "--themes"]).expect("parse");
    assert!(matches!(
        cli.command,
        Some(Commands::Classify {
            themes: true,
            evidence: false,
            ..
        })
    ));

    let cli = Cli::try_parse_from(["esg", "classify", "-f", "s.json", "-e"]).expect("parse");
    assert!(matches!(cli.command, Some(Commands::Classify { evidence: true, .. })));
}

#[test]
fn missing_required_argument_rejected() {
    assert!(Cli::try_parse_from(["esg", "history"]).is_err());
}

// =============================================================================
// COMMANDS
// =============================================================================

#[test]
fn file_backend_round_trip() {
    let dir = tempdir().expect("temp dir");
    let settings = populated(&dir, Backend::File);

    let session = open_session(&settings).expect("open");
    let status = session.status().expect("status");
    assert_eq!((status.questions, status.snapshots, status.companies), (7, 2, 1));

    let history = session.history("Cerâmica Aurora").expect("history");
    let environmental: Vec<u8> = history.axes[0]
        .points
        .iter()
        .map(|p| p.level.value())
        .collect();
    assert_eq!(environmental, vec![1, 4]);
    assert_eq!(history.indicators.len(), 1);
    assert_eq!(history.indicators[0].item, "Consumo de energia (kWh)");
    assert_eq!(history.production.len(), 2);
}

#[test]
fn redb_backend_report_to_file() {
    let dir = tempdir().expect("temp dir");
    let settings = populated(&dir, Backend::Redb);

    let output = dir.path().join("report.json");
    cmd_report(&settings, "Cerâmica Aurora", Some(&output), true).expect("report");

    let report: Report = read_json_file(&output, 10 * 1024 * 1024).expect("read report");
    assert_eq!(report.header.company, "Cerâmica Aurora");
    assert_eq!(report.header.date_label, "01/06/2024");
    assert_eq!(report.header.location, "Criciúma - SC");

    let levels: Vec<u8> = report.maturity.iter().map(|m| m.level.value()).collect();
    assert_eq!(levels, vec![4, 3, 2]);

    let final_maturity = report.final_maturity.expect("final maturity");
    assert_eq!(final_maturity.profile.level.value(), 2);
    assert_eq!(report.history.expect("history").snapshot_count, 2);

    cmd_history(&settings, "Cerâmica Aurora").expect("history");
    cmd_status(&settings).expect("status");
}

#[test]
fn classify_with_evidence_does_not_store() {
    let dir = tempdir().expect("temp dir");
    let mut settings = populated(&dir, Backend::File);

    let file = write(&dir, "draft.json", &survey("01/09/2024", "Não", "1"));
    cmd_classify(&settings, &file, true, true).expect("classify json");
    settings.json_mode = false;
    cmd_classify(&settings, &file, true, true).expect("classify text");

    let status = open_session(&settings).expect("open").status().expect("status");
    assert_eq!(status.snapshots, 2);
}

#[test]
fn init_refuses_existing_store_without_force() {
    let dir = tempdir().expect("temp dir");
    let settings = populated(&dir, Backend::File);

    assert!(matches!(
        cmd_init(&settings, false),
        Err(EsgError::Configuration(_))
    ));
    cmd_init(&settings, true).expect("forced init");
    let status = open_session(&settings).expect("open").status().expect("status");
    assert_eq!(status.snapshots, 0);
}

#[test]
fn unknown_company_is_an_error() {
    let dir = tempdir().expect("temp dir");
    let settings = populated(&dir, Backend::File);
    assert!(cmd_report(&settings, "Ninguém", None, false).is_err());
    assert!(cmd_history(&settings, "Ninguém").is_err());
}

#[test]
fn unrecognized_answer_rejects_submission() {
    let dir = tempdir().expect("temp dir");
    let settings = populated(&dir, Backend::File);

    let bad = write(&dir, "bad.json", &survey("01/07/2024", "talvez", "1"));
    let err = cmd_submit(&settings, &bad).expect_err("must fail");
    assert!(err.to_string().contains("question 2"), "{err}");

    let status = open_session(&settings).expect("open").status().expect("status");
    assert_eq!(status.snapshots, 2);
}

// =============================================================================
// CONFIG
// =============================================================================

#[test]
fn config_file_loaded_from_disk() {
    let dir = tempdir().expect("temp dir");
    let path = write(
        &dir,
        "esg.toml",
        "backend = \"file\"\nlog_format = \"json\"\n\n[report]\ncumulative_recommendations = false\n",
    );

    let config = EsgConfig::load(&path).expect("load");
    let settings = Settings::resolve(None, None, false, &config).expect("resolve");
    assert_eq!(settings.backend, Backend::File);
    assert!(!settings.cumulative_recommendations);
}

#[test]
fn missing_config_file_is_configuration_error() {
    let dir = tempdir().expect("temp dir");
    assert!(matches!(
        EsgConfig::load(&dir.path().join("absent.toml")),
        Err(EsgError::Configuration(_))
    ));
}
