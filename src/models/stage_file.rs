//! 阶段文件
//!
//! 每个阶段的输出都是带元数据头的自描述记录集，任何阶段都可以直接从上一阶段的文件恢复

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::evaluation::EvaluationResult;
use crate::models::publication::PublicationRecord;
use crate::models::question::Question;
use crate::models::subject::Category;

/// 阶段状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Extracted,
    PendingCompletion,
    Completed,
    PartialCompletion,
    Reviewed,
}

/// 阶段文件元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StageMetadata {
    pub source_file: String,
    pub source_path: String,
    #[serde(rename = "tema")]
    pub topic: u32,
    #[serde(rename = "categoria")]
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extraction_date: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reformulation_date: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<DateTime<Local>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_date: Option<DateTime<Local>>,
    pub total_questions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_count: Option<usize>,
    pub status: StageStatus,
}

/// 阶段文件：元数据 + 题目列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFile<T> {
    pub metadata: StageMetadata,
    pub questions: Vec<T>,
}

impl<T> StageFile<T> {
    pub fn new(metadata: StageMetadata, questions: Vec<T>) -> Self {
        Self {
            metadata,
            questions,
        }
    }
}

/// 审核通过的题目（附评估结果）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewedQuestion {
    pub question: Question,
    pub evaluation: EvaluationResult,
}

/// 被拒绝、需要人工处理的条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedEntry {
    /// 无法解析的记录保留原始 JSON
    pub question: serde_json::Value,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<EvaluationResult>,
}

/// 抽取汇总中的单个文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedFileEntry {
    pub file: String,
    pub path: String,
    #[serde(rename = "tema")]
    pub topic: u32,
    #[serde(rename = "categoria")]
    pub category: Category,
    pub questions: usize,
}

/// `_extraction_summary.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExtractionSummary {
    pub extraction_date: Option<DateTime<Local>>,
    pub total_files_scanned: usize,
    pub files_with_questions: usize,
    pub total_questions: usize,
    pub by_categoria: BTreeMap<String, usize>,
    pub by_tema: BTreeMap<u32, usize>,
    pub files: Vec<ExtractedFileEntry>,
}

impl ExtractionSummary {
    pub fn record(&mut self, metadata: &StageMetadata) {
        self.files_with_questions += 1;
        self.total_questions += metadata.total_questions;
        *self
            .by_categoria
            .entry(metadata.category.name().to_string())
            .or_default() += metadata.total_questions;
        if metadata.topic > 0 {
            *self.by_tema.entry(metadata.topic).or_default() += metadata.total_questions;
        }
        self.files.push(ExtractedFileEntry {
            file: metadata.source_file.clone(),
            path: metadata.source_path.clone(),
            topic: metadata.topic,
            category: metadata.category,
            questions: metadata.total_questions,
        });
    }
}

/// 发布失败的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedInsert {
    pub question: PublicationRecord,
    pub reason: String,
}

/// `_publication_batch_<时间戳>.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationBatch {
    pub generated_at: DateTime<Local>,
    pub total_questions: usize,
    pub to_insert_count: usize,
    pub duplicates_count: usize,
    pub failed_count: usize,
    pub to_insert: Vec<PublicationRecord>,
    pub duplicates: Vec<PublicationRecord>,
    pub failed: Vec<FailedInsert>,
}
