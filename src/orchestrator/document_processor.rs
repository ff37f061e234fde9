//! 单个文档处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责一个文档在各阶段中的处理，是文档级别的编排器。
//!
//! ## 核心功能
//!
//! 1. **抽取**：转换文档 → 结构抽取 → 写 `*_raw.json`
//! 2. **准备**：原始题块 → 草稿题目 → 写 `*_draft.json` 和复核清单
//! 3. **解析**：逐题调用 `QuestionFlow::resolve`，原地更新草稿
//! 4. **审核**：逐题调用 `QuestionFlow::review`，写 approved / rejected 分区
//! 5. **统计输出**：记录每个文档的解析/通过/修正/拒绝数量

use chrono::Local;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::DocumentConverter;
use crate::models::evaluation::ReviewStatus;
use crate::models::loaders::{
    load_stage_file, load_stage_file_lenient, next_stage_name, safe_file_stem, save_json,
    LoadedRecord,
};
use crate::models::question::Question;
use crate::models::raw_block::RawBlock;
use crate::models::stage_file::{
    RejectedEntry, ReviewedQuestion, StageFile, StageMetadata, StageStatus,
};
use crate::services::extractor::detect_provenance;
use crate::services::scorer::missing_fields;
use crate::services::{build_draft, review_prompt, StructuralExtractor};
use crate::workflow::{Disposition, ProcessResult, QuestionCtx, QuestionFlow};

pub const RAW_SUFFIX: &str = "_raw.json";
pub const DRAFT_SUFFIX: &str = "_draft.json";
pub const APPROVED_SUFFIX: &str = "_approved.json";
pub const REJECTED_SUFFIX: &str = "_rejected.json";
pub const PROMPT_SUFFIX: &str = "_prompt.md";

/// 各文档共享的只读资源
pub struct PipelineContext {
    pub config: Config,
    pub extractor: StructuralExtractor,
    pub converter: DocumentConverter,
    pub flow: QuestionFlow,
}

/// 题目处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QuestionStats {
    pub questions: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub approved: usize,
    pub corrected: usize,
    pub rejected: usize,
}

impl QuestionStats {
    /// 累加另一份统计
    pub fn absorb(&mut self, other: &QuestionStats) {
        self.questions += other.questions;
        self.resolved += other.resolved;
        self.unresolved += other.unresolved;
        self.approved += other.approved;
        self.corrected += other.corrected;
        self.rejected += other.rejected;
    }
}

/// 抽取单个文档
///
/// # 参数
/// - `ctx`: 共享资源
/// - `path`: 试卷文件路径
/// - `document_index`: 文档索引（用于日志）
///
/// # 返回
/// 有题目时返回写出的元数据；零题文档返回 None
pub async fn extract_document(
    ctx: Arc<PipelineContext>,
    path: PathBuf,
    document_index: usize,
) -> AppResult<Option<StageMetadata>> {
    let provenance = detect_provenance(&path);
    info!("[文档 {}] 开始抽取: {}", document_index, provenance.source_file);

    let text = ctx.converter.convert(&path).await;
    if text.trim().is_empty() {
        warn!("[文档 {}] ⚠️ 无法获取文本内容，跳过", document_index);
        return Ok(None);
    }

    let blocks = ctx.extractor.extract(&text, &provenance);
    if blocks.is_empty() {
        warn!("[文档 {}] ⚠️ 未识别到题目，跳过", document_index);
        return Ok(None);
    }

    let exams_dir = Path::new(&ctx.config.exams_dir);
    let metadata = StageMetadata {
        source_file: provenance.source_file.clone(),
        source_path: path
            .strip_prefix(exams_dir)
            .unwrap_or(&path)
            .display()
            .to_string(),
        topic: provenance.topic,
        category: provenance.category,
        extraction_date: Some(Local::now()),
        total_questions: blocks.len(),
        status: StageStatus::Extracted,
        ..StageMetadata::default()
    };

    let output = ctx
        .config
        .raw_dir()
        .join(format!("{}{}", safe_file_stem(&path, exams_dir), RAW_SUFFIX));
    save_json(&output, &StageFile::new(metadata.clone(), blocks)).await?;

    info!(
        "[文档 {}] ✓ 抽取 {} 道题 (主题 {}, {})",
        document_index,
        metadata.total_questions,
        metadata.topic,
        metadata.category.name()
    );
    Ok(Some(metadata))
}

/// 由原始题块生成草稿
pub async fn prepare_document(
    ctx: Arc<PipelineContext>,
    path: PathBuf,
    document_index: usize,
) -> AppResult<QuestionStats> {
    let raw: StageFile<RawBlock> = load_stage_file(&path).await?;
    let drafts: Vec<Question> = raw.questions.iter().map(build_draft).collect();

    let metadata = StageMetadata {
        reformulation_date: Some(Local::now()),
        total_questions: drafts.len(),
        status: StageStatus::PendingCompletion,
        ..raw.metadata
    };

    let draft_dir = ctx.config.draft_dir();
    let draft_name = next_stage_name(&path, RAW_SUFFIX, DRAFT_SUFFIX);
    let prompt_name = next_stage_name(&path, RAW_SUFFIX, PROMPT_SUFFIX);

    let prompt = review_prompt(&drafts, &metadata.source_file);
    save_json(&draft_dir.join(&draft_name), &StageFile::new(metadata, drafts.clone())).await?;
    tokio::fs::write(draft_dir.join(&prompt_name), prompt)
        .await
        .map_err(|e| crate::error::AppError::file_write_failed(prompt_name.clone(), e))?;

    info!("[文档 {}] ✓ 草稿已生成: {} ({} 道题)", document_index, draft_name, drafts.len());
    Ok(QuestionStats {
        questions: drafts.len(),
        ..QuestionStats::default()
    })
}

/// 把解析结果写回原始记录，保留记录中原有（或缺失）的其他字段
fn patch_resolution(raw: &mut Value, question: &Question) -> AppResult<()> {
    let Some(obj) = raw.as_object_mut() else {
        *raw = serde_json::to_value(question)?;
        return Ok(());
    };
    obj.insert("question_text".into(), question.question_text.clone().into());
    obj.insert("original_text".into(), question.original_text.clone().into());
    obj.insert("options".into(), serde_json::to_value(&question.options)?);
    obj.insert("explanation".into(), question.explanation.clone().into());
    obj.insert("legal_reference".into(), question.legal_reference.clone().into());
    obj.insert("confidence_score".into(), question.confidence_score.into());
    obj.insert("needs_review".into(), question.needs_review.into());
    match &question.review_note {
        Some(note) => obj.insert("review_note".into(), note.clone().into()),
        None => obj.remove("review_note"),
    };
    Ok(())
}

/// 解析草稿中每道题的答案（原地更新草稿文件）
pub async fn resolve_document(
    ctx: Arc<PipelineContext>,
    path: PathBuf,
    document_index: usize,
) -> AppResult<QuestionStats> {
    let (metadata, records) = load_stage_file_lenient::<Question>(&path).await?;
    log_document_start(document_index, &metadata, records.len());

    let mut stats = QuestionStats {
        questions: records.len(),
        ..QuestionStats::default()
    };
    let mut output = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        match record {
            LoadedRecord::Valid {
                record: mut question,
                mut raw,
            } => {
                let qctx = QuestionCtx::new(
                    metadata.source_file.clone(),
                    document_index,
                    index,
                    question.topic,
                );
                match ctx.flow.resolve(&mut question, &qctx) {
                    ProcessResult::Resolved => stats.resolved += 1,
                    ProcessResult::Unresolved => stats.unresolved += 1,
                }
                patch_resolution(&mut raw, &question)?;
                output.push(raw);
            }
            LoadedRecord::Malformed { raw, error } => {
                warn!("[文档 {}] ⚠️ 题目 {} 无法解析: {}", document_index, index, error);
                stats.unresolved += 1;
                output.push(raw);
            }
        }
    }

    let status = if stats.unresolved == 0 {
        StageStatus::Completed
    } else {
        StageStatus::PartialCompletion
    };
    let metadata = StageMetadata {
        completion_date: Some(Local::now()),
        completed_count: Some(stats.resolved),
        failed_count: Some(stats.unresolved),
        status,
        ..metadata
    };
    save_json(&path, &StageFile::new(metadata, output)).await?;

    info!(
        "[文档 {}] 解析统计: 成功 {}, 待复核 {}, 总计 {}",
        document_index, stats.resolved, stats.unresolved, stats.questions
    );
    Ok(stats)
}

/// 审核草稿，写出 approved / rejected 分区
pub async fn review_document(
    ctx: Arc<PipelineContext>,
    path: PathBuf,
    document_index: usize,
) -> AppResult<QuestionStats> {
    let (metadata, records) = load_stage_file_lenient::<Question>(&path).await?;
    log_document_start(document_index, &metadata, records.len());

    let mut stats = QuestionStats {
        questions: records.len(),
        ..QuestionStats::default()
    };
    let mut approved: Vec<ReviewedQuestion> = Vec::new();
    let mut rejected: Vec<RejectedEntry> = Vec::new();

    for (index, record) in records.into_iter().enumerate() {
        let topic = match &record {
            LoadedRecord::Valid { record, .. } => record.topic,
            LoadedRecord::Malformed { .. } => metadata.topic,
        };
        let qctx = QuestionCtx::new(metadata.source_file.clone(), document_index, index, topic);

        let (original, disposition) = match record {
            LoadedRecord::Valid { record, raw } => {
                let disposition = ctx.flow.review(record, &missing_fields(&raw), &qctx);
                (raw, disposition)
            }
            LoadedRecord::Malformed { raw, error } => {
                let disposition = ctx.flow.reject_malformed(raw.clone(), &error, &qctx);
                (raw, disposition)
            }
        };

        match disposition {
            Ok(Disposition::Approved(reviewed)) => {
                match reviewed.evaluation.status {
                    ReviewStatus::AutoCorrected => stats.corrected += 1,
                    _ => stats.approved += 1,
                }
                approved.push(reviewed);
            }
            Ok(Disposition::Rejected(entry)) => {
                stats.rejected += 1;
                rejected.push(entry);
            }
            Err(e) => {
                // 写 review.txt 等失败时题目仍要落到 rejected 分区
                error!("[文档 {}] 题目 {} 审核失败: {}", document_index, index, e);
                stats.rejected += 1;
                rejected.push(RejectedEntry {
                    question: original,
                    errors: vec![e.to_string()],
                    evaluation: None,
                });
            }
        }
    }

    let reviewed_meta = |count: usize| StageMetadata {
        review_date: Some(Local::now()),
        total_questions: count,
        status: StageStatus::Reviewed,
        ..metadata.clone()
    };

    if !approved.is_empty() {
        let name = next_stage_name(&path, DRAFT_SUFFIX, APPROVED_SUFFIX);
        let file = StageFile::new(reviewed_meta(approved.len()), approved);
        save_json(&ctx.config.approved_dir().join(name), &file).await?;
    }
    if !rejected.is_empty() {
        let name = next_stage_name(&path, DRAFT_SUFFIX, REJECTED_SUFFIX);
        let file = StageFile::new(reviewed_meta(rejected.len()), rejected);
        save_json(&ctx.config.rejected_dir().join(name), &file).await?;
    }

    log_review_complete(document_index, &stats);
    Ok(stats)
}

// ========== 日志辅助函数 ==========

fn log_document_start(document_index: usize, metadata: &StageMetadata, question_count: usize) {
    info!("[文档 {}] 开始处理", document_index);
    info!("[文档 {}] 名称: {}", document_index, metadata.source_file);
    info!("[文档 {}] 题目总数: {}", document_index, question_count);
}

fn log_review_complete(document_index: usize, stats: &QuestionStats) {
    info!(
        "[文档 {}] 审核统计: 通过 {}, 修正 {}, 人工 {}, 总计 {}",
        document_index, stats.approved, stats.corrected, stats.rejected, stats.questions
    );
    info!("[文档 {}] ✅ 文档处理完成", document_index);
}
