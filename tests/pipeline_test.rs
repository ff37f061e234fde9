use oposita_pipeline::clients::{FileStore, QuestionStore};
use oposita_pipeline::config::Config;
use oposita_pipeline::models::{
    list_stage_files, ExtractionSummary, RawBlock, RejectedEntry, ReviewStatus, ReviewedQuestion,
    StageFile,
};
use oposita_pipeline::orchestrator::{App, Publisher, Stage};
use oposita_pipeline::utils::logging;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CONSTITUTION_EXAM: &str = "\
TEST DE REPASO

1. ¿Cuándo se produjo la entrada en vigor de la Constitución Española?
a) El 6 de diciembre de 1978
b) El 29 de diciembre de 1978
c) El 27 de diciembre de 1978
d) El 1 de enero de 1979

2. ¿Qué atajo de teclado copia el texto seleccionado?
a) Control más C
b) Control más V
c) Control más X
";

const REPEATED_EXAM: &str = "\
1. ¿Cuándo se produjo la entrada en vigor de la Constitución Española?
a) El 6 de diciembre de 1978
b) El 29 de diciembre de 1978
c) El 27 de diciembre de 1978
";

fn test_config(dir: &TempDir) -> Config {
    let root = dir.path();
    Config {
        questions_dir: root.join("questions").display().to_string(),
        exams_dir: root.join("examenes").display().to_string(),
        max_concurrent_documents: 2,
        output_log_file: root.join("pipeline_log.txt").display().to_string(),
        review_file: root.join("review.txt").display().to_string(),
        ..Config::default()
    }
}

fn write_exam(config: &Config, name: &str, content: &str) -> PathBuf {
    write_exam_in(config, "Constitucion", name, content)
}

fn write_exam_in(config: &Config, folder: &str, name: &str, content: &str) -> PathBuf {
    let folder = Path::new(&config.exams_dir).join(folder);
    std::fs::create_dir_all(&folder).unwrap();
    let path = folder.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn full_pipeline_routes_and_publishes_questions() {
    logging::init();
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    write_exam(&config, "TEMA 1 Constitucion.md", CONSTITUTION_EXAM);
    write_exam(&config, "TEMA 2 Repaso.md", REPEATED_EXAM);

    let app = App::initialize(config.clone()).await.unwrap();
    app.run(Stage::All).await.unwrap();

    // 抽取汇总
    let summary: ExtractionSummary = read_json(&config.raw_dir().join("_extraction_summary.json"));
    assert_eq!(summary.total_files_scanned, 2);
    assert_eq!(summary.total_questions, 3);
    assert_eq!(summary.by_tema.get(&1), Some(&2));

    // 草稿旁边有人工核对清单
    assert!(config.draft_dir().join("Constitucion_TEMA_1_Constitucion_prompt.md").exists());

    // 已知题目自动通过，答案为 29 de diciembre
    let approved: StageFile<ReviewedQuestion> =
        read_json(&config.approved_dir().join("Constitucion_TEMA_1_Constitucion_approved.json"));
    assert_eq!(approved.questions.len(), 1);
    let reviewed = &approved.questions[0];
    assert_eq!(reviewed.evaluation.status, ReviewStatus::AutoApproved);
    assert_eq!(reviewed.evaluation.weighted_score, 1.0);
    assert_eq!(reviewed.question.correct_index(), Some(1));
    assert_eq!(reviewed.question.legal_reference, "Disposición Final CE");

    // 无法解析的题目进入 rejected 和 review.txt
    let rejected: StageFile<RejectedEntry> =
        read_json(&config.rejected_dir().join("Constitucion_TEMA_1_Constitucion_rejected.json"));
    assert_eq!(rejected.questions.len(), 1);
    assert!(rejected.questions[0]
        .errors
        .contains(&"No hay respuesta correcta marcada".to_string()));
    let review = std::fs::read_to_string(&config.review_file).unwrap();
    assert!(review.contains("atajo de teclado"));

    // 第二份试卷中的同一道题被判为重复
    let store = FileStore::in_dir(&config.approved_dir());
    let published = store.existing_stems().await.unwrap();
    assert_eq!(published.len(), 1);
    assert!(published[0].contains("entrada en vigor"));
}

#[tokio::test]
async fn republishing_finds_everything_already_in_store() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    write_exam(&config, "TEMA 1 Constitucion.md", CONSTITUTION_EXAM);

    let app = App::initialize(config.clone()).await.unwrap();
    for stage in [Stage::Extract, Stage::Prepare, Stage::Resolve, Stage::Review, Stage::Publish] {
        app.run(stage).await.unwrap();
    }

    let publisher = Publisher::new(
        FileStore::in_dir(&config.approved_dir()),
        config.approved_dir(),
        config.duplicate_threshold,
    );
    let batch = publisher.publish().await.unwrap().unwrap();
    assert_eq!(batch.total_questions, 1);
    assert_eq!(batch.to_insert_count, 0);
    assert_eq!(batch.duplicates_count, 1);
}

#[tokio::test]
async fn malformed_record_does_not_block_its_document() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let draft = serde_json::json!({
        "metadata": {"source_file": "manual.md", "tema": 3},
        "questions": [
            {"question_text": "¿Registro roto?", "options": "no es una lista"},
            {
                "question_text": "¿Cuál es la forma política del Estado español?",
                "options": [
                    {"text": "República federal", "is_correct": false},
                    {"text": "Monarquía parlamentaria", "is_correct": true},
                    {"text": "Monarquía absoluta", "is_correct": false}
                ],
                "explanation": "El Art. 1.3 CE establece la Monarquía Parlamentaria.",
                "legal_reference": "Art. 1.3 CE",
                "confidence_score": 0.95,
                "tema": 3,
                "materia": "ce-constitucion",
                "difficulty": "facil",
                "needs_review": false,
                "origin_type": "reformulated",
                "original_text": "¿Cuál es la forma política del Estado español?",
                "source": "manual.md"
            }
        ]
    });
    std::fs::create_dir_all(config.draft_dir()).unwrap();
    std::fs::write(
        config.draft_dir().join("manual_draft.json"),
        serde_json::to_string_pretty(&draft).unwrap(),
    )
    .unwrap();

    let app = App::initialize(config.clone()).await.unwrap();
    app.run(Stage::Review).await.unwrap();

    let approved: StageFile<ReviewedQuestion> =
        read_json(&config.approved_dir().join("manual_approved.json"));
    assert_eq!(approved.questions.len(), 1);
    assert_eq!(approved.questions[0].evaluation.status, ReviewStatus::AutoApproved);

    let rejected: StageFile<RejectedEntry> =
        read_json(&config.rejected_dir().join("manual_rejected.json"));
    assert_eq!(rejected.questions.len(), 1);
    assert!(rejected.questions[0].evaluation.is_none());
    assert!(rejected.questions[0].errors[0].starts_with("Registro mal formado"));
}

const UNKNOWN_ANSWER_DRAFT: &str = r#"{
    "metadata": {"source_file": "informatica.md", "tema": 5},
    "questions": [
        {
            "question_text": "¿Qué atajo de teclado copia el texto seleccionado?",
            "options": [
                {"text": "Control más C", "is_correct": false},
                {"text": "Control más V", "is_correct": false},
                {"text": "Control más X", "is_correct": false}
            ],
            "tema": 5
        }
    ]
}"#;

fn write_draft(config: &Config, name: &str, content: &str) {
    std::fs::create_dir_all(config.draft_dir()).unwrap();
    std::fs::write(config.draft_dir().join(name), content).unwrap();
}

#[tokio::test]
async fn unwritable_review_file_still_rejects_the_question() {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    // 复核清单路径是一个目录，写入必然失败
    let review_dir = dir.path().join("review_as_dir");
    std::fs::create_dir_all(&review_dir).unwrap();
    config.review_file = review_dir.display().to_string();
    write_draft(&config, "informatica_draft.json", UNKNOWN_ANSWER_DRAFT);

    let app = App::initialize(config.clone()).await.unwrap();
    app.run(Stage::Review).await.unwrap();

    let rejected: StageFile<RejectedEntry> =
        read_json(&config.rejected_dir().join("informatica_rejected.json"));
    assert_eq!(rejected.questions.len(), 1);
    let entry = &rejected.questions[0];
    assert!(entry.evaluation.is_none());
    assert_eq!(entry.errors.len(), 1);
    assert!(entry.question["question_text"]
        .as_str()
        .unwrap()
        .contains("atajo de teclado"));
    assert!(!config.approved_dir().join("informatica_approved.json").exists());
}

#[tokio::test]
async fn rerunning_review_does_not_duplicate_review_lines() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    write_draft(&config, "informatica_draft.json", UNKNOWN_ANSWER_DRAFT);

    let app = App::initialize(config.clone()).await.unwrap();
    app.run(Stage::Review).await.unwrap();
    app.run(Stage::Review).await.unwrap();

    let review = std::fs::read_to_string(&config.review_file).unwrap();
    assert_eq!(review.lines().count(), 1);
    assert!(review.contains("atajo de teclado"));
}

#[tokio::test]
async fn same_file_name_in_different_folders_keeps_both_documents() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    write_exam_in(&config, "Test Contratos", "TEMA 1.md", REPEATED_EXAM);
    write_exam_in(&config, "Test Administrativo", "TEMA 1.md", CONSTITUTION_EXAM);

    let app = App::initialize(config.clone()).await.unwrap();
    app.run(Stage::Extract).await.unwrap();

    let files = list_stage_files(&config.raw_dir(), "_raw.json").await.unwrap();
    assert_eq!(files.len(), 2);
    let on_disk: usize = files
        .iter()
        .map(|f| read_json::<StageFile<RawBlock>>(f).questions.len())
        .sum();
    assert_eq!(on_disk, 3);
    assert!(config.raw_dir().join("Test_Contratos_TEMA_1_raw.json").exists());
    assert!(config.raw_dir().join("Test_Administrativo_TEMA_1_raw.json").exists());
}

#[tokio::test]
async fn invalid_config_is_rejected_at_startup() {
    let config = Config {
        max_concurrent_documents: 0,
        ..Config::default()
    };
    assert!(App::initialize(config).await.is_err());
}
