//! 流水线状态
//!
//! 统计各阶段目录中的文件数和题目数，并读取最近一次抽取汇总

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;
use crate::models::loaders::list_stage_files;
use crate::models::stage_file::ExtractionSummary;
use crate::orchestrator::document_processor::{
    APPROVED_SUFFIX, DRAFT_SUFFIX, RAW_SUFFIX, REJECTED_SUFFIX,
};

pub const SUMMARY_FILE: &str = "_extraction_summary.json";

/// 单个阶段目录的统计
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCount {
    pub name: &'static str,
    /// 目录不存在时为 None
    pub files: Option<usize>,
    pub questions: usize,
}

/// 流水线状态
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStatus {
    pub stages: Vec<StageCount>,
    pub last_extraction: Option<ExtractionSummary>,
}

#[derive(Deserialize)]
struct QuestionsOnly {
    #[serde(default)]
    questions: Vec<serde::de::IgnoredAny>,
}

async fn count_questions(path: &Path) -> usize {
    let Ok(content) = tokio::fs::read_to_string(path).await else {
        return 0;
    };
    serde_json::from_str::<QuestionsOnly>(&content)
        .map(|f| f.questions.len())
        .unwrap_or(0)
}

async fn count_stage(name: &'static str, dir: PathBuf, suffix: &str) -> StageCount {
    let Ok(files) = list_stage_files(&dir, suffix).await else {
        return StageCount {
            name,
            files: None,
            questions: 0,
        };
    };

    let mut questions = 0;
    for file in &files {
        questions += count_questions(file).await;
    }
    StageCount {
        name,
        files: Some(files.len()),
        questions,
    }
}

/// 收集流水线状态
///
/// 无法读取的文件按零题计算
pub async fn collect_status(config: &Config) -> PipelineStatus {
    let stages = vec![
        count_stage("raw/", config.raw_dir(), RAW_SUFFIX).await,
        count_stage("draft/", config.draft_dir(), DRAFT_SUFFIX).await,
        count_stage("approved/", config.approved_dir(), APPROVED_SUFFIX).await,
        count_stage("rejected/", config.rejected_dir(), REJECTED_SUFFIX).await,
    ];

    let last_extraction = match tokio::fs::read_to_string(config.raw_dir().join(SUMMARY_FILE)).await
    {
        Ok(content) => serde_json::from_str(&content).ok(),
        Err(_) => None,
    };

    PipelineStatus {
        stages,
        last_extraction,
    }
}

/// 输出流水线状态
pub fn log_status(status: &PipelineStatus) {
    info!("{}", "=".repeat(60));
    info!("📊 流水线状态");
    info!("{}", "=".repeat(60));
    info!("{:<15} {:<12} {:<12}", "目录", "文件", "题目");
    for stage in &status.stages {
        match stage.files {
            Some(files) => info!("{:<15} {:<12} {:<12}", stage.name, files, stage.questions),
            None => info!("{:<15} {:<12} {:<12}", stage.name, "N/A", "N/A"),
        }
    }

    if let Some(summary) = &status.last_extraction {
        info!("{}", "─".repeat(40));
        info!("最近一次抽取:");
        match &summary.extraction_date {
            Some(date) => info!("  日期: {}", date.format("%Y-%m-%d %H:%M:%S")),
            None => info!("  日期: N/A"),
        }
        info!("  扫描文件: {}", summary.total_files_scanned);
        info!("  题目总数: {}", summary.total_questions);
    }
}
