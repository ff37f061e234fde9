//! 题目处理流程 - 流程层
//!
//! 核心职责：定义"一道题"的完整处理流程
//!
//! 流程顺序：
//! 1. 解析答案（知识库规则 → 兜底检查 → 标记人工复核）
//! 2. 质量评分
//! 3. 边缘分数尝试自动修正后重新评分
//! 4. 分流：通过 / 人工处理（写入 review.txt）

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::evaluation::{EvaluationResult, ReviewStatus};
use crate::models::question::Question;
use crate::models::stage_file::{RejectedEntry, ReviewedQuestion};
use crate::services::{apply_fixes, AnswerResolver, QualityScorer, ReviewWriter, ScoreBand};
use crate::utils::logging::truncate_text;
use crate::workflow::question_ctx::QuestionCtx;

/// 答案解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 已解析
    Resolved,
    /// 未解析，等待人工复核
    Unresolved,
}

/// 审核分流结果
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    Approved(ReviewedQuestion),
    Rejected(RejectedEntry),
}

impl Disposition {
    pub fn status(&self) -> ReviewStatus {
        match self {
            Disposition::Approved(reviewed) => reviewed.evaluation.status,
            Disposition::Rejected(_) => ReviewStatus::HumanRequired,
        }
    }
}

/// 题目处理流程
///
/// - 编排单道题的处理顺序
/// - 决定何时修正、何时交给人工
/// - 不持有文件级资源
/// - 只依赖业务能力（services）
#[derive(Debug, Clone)]
pub struct QuestionFlow {
    resolver: AnswerResolver,
    scorer: QualityScorer,
    review_writer: ReviewWriter,
    verbose_logging: bool,
}

impl QuestionFlow {
    /// 创建新的题目处理流程
    pub fn new(config: &Config, resolver: AnswerResolver) -> Self {
        Self {
            resolver,
            scorer: QualityScorer::new(),
            review_writer: ReviewWriter::with_path(&config.review_file),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 开始新一轮审核：清空上一轮写下的复核清单
    pub fn begin_review(&self) -> AppResult<()> {
        self.review_writer.reset()
    }

    /// 解析一道题的答案（原地更新）
    pub fn resolve(&self, question: &mut Question, ctx: &QuestionCtx) -> ProcessResult {
        if self.verbose_logging {
            self.log_stem(ctx, &question.question_text);
        }

        // 规则命中但答案索引越界时不会留下唯一正确选项
        if self.resolver.resolve(question) && question.is_resolved() {
            debug!(
                "[文档 {}] ✓ 题目 {} 已解析: 选项 {:?}",
                ctx.document_index,
                ctx.question_index,
                question.correct_index()
            );
            ProcessResult::Resolved
        } else {
            debug!(
                "[文档 {}] ⚠️ 题目 {} 未能解析，等待人工复核",
                ctx.document_index, ctx.question_index
            );
            ProcessResult::Unresolved
        }
    }

    /// 评分并分流一道题
    ///
    /// # 参数
    /// - `question`: 已解析的题目
    /// - `missing`: 原始记录中缺失的必填字段
    /// - `ctx`: 题目上下文
    ///
    /// # 返回
    /// 通过（自动通过 / 自动修正）或人工处理
    pub fn review(
        &self,
        mut question: Question,
        missing: &[String],
        ctx: &QuestionCtx,
    ) -> AppResult<Disposition> {
        let mut evaluation = self.scorer.evaluate_record(&question, missing);

        if self.scorer.band(&evaluation) == ScoreBand::Fixable {
            let fixes = apply_fixes(&mut question);
            if !fixes.is_empty() {
                info!(
                    "[文档 {}] 🔧 题目 {} 自动修正: {}",
                    ctx.document_index,
                    ctx.question_index,
                    fixes.join("; ")
                );
                let rescored = self.scorer.evaluate_record(&question, missing);
                evaluation = EvaluationResult {
                    per_dimension_scores: rescored.per_dimension_scores,
                    weighted_score: rescored.weighted_score,
                    status: ReviewStatus::AutoCorrected,
                    diagnostics: evaluation.diagnostics,
                    fixes_applied: fixes,
                };
            }
        }

        if evaluation.status != ReviewStatus::HumanRequired {
            return Ok(Disposition::Approved(ReviewedQuestion {
                question,
                evaluation,
            }));
        }

        let mut errors = evaluation.diagnostics.clone();
        if let Some(note) = &question.review_note {
            errors.push(note.clone());
        }
        self.write_review(ctx, &question.question_text, &errors)?;

        Ok(Disposition::Rejected(RejectedEntry {
            question: serde_json::to_value(&question)?,
            errors,
            evaluation: Some(evaluation),
        }))
    }

    /// 无法解析的原始记录直接交给人工
    pub fn reject_malformed(
        &self,
        raw: serde_json::Value,
        error: &str,
        ctx: &QuestionCtx,
    ) -> AppResult<Disposition> {
        let errors = vec![format!("Registro mal formado: {}", error)];
        let stem = raw
            .get("question_text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        self.write_review(ctx, &stem, &errors)?;

        Ok(Disposition::Rejected(RejectedEntry {
            question: raw,
            errors,
            evaluation: None,
        }))
    }

    /// 写入人工复核清单
    fn write_review(&self, ctx: &QuestionCtx, stem: &str, reasons: &[String]) -> AppResult<()> {
        self.review_writer
            .write(&ctx.document, ctx.question_index, stem, reasons)?;

        warn!(
            "[文档 {}] ⚠️ 已写入 {}: 题目 {}",
            ctx.document_index,
            self.review_writer.path().display(),
            ctx.question_index
        );

        Ok(())
    }

    // ========== 日志辅助方法 ==========

    /// 显示题干预览
    fn log_stem(&self, ctx: &QuestionCtx, stem: &str) {
        info!("[文档 {}] 题干: {}", ctx.document_index, truncate_text(stem, 80));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::KnowledgeBase;
    use crate::models::question::{AnswerOption, DifficultyLabel};
    use std::sync::Arc;

    fn flow(dir: &tempfile::TempDir) -> QuestionFlow {
        let config = Config {
            review_file: dir.path().join("review.txt").display().to_string(),
            ..Config::default()
        };
        let resolver = AnswerResolver::new(Arc::new(KnowledgeBase::builtin().unwrap()));
        QuestionFlow::new(&config, resolver)
    }

    fn ctx() -> QuestionCtx {
        QuestionCtx::new("tema1.md".to_string(), 1, 0, 1)
    }

    fn resolved() -> Question {
        Question {
            question_text: "¿Cuál es la forma política del Estado español?".to_string(),
            options: vec![
                AnswerOption::new("República federal"),
                AnswerOption::correct("Monarquía parlamentaria"),
                AnswerOption::new("Monarquía absoluta"),
            ],
            legal_reference: "Art. 1.3 CE".to_string(),
            confidence_score: 0.95,
            needs_review: false,
            topic: 1,
            ..Question::default()
        }
    }

    #[test]
    fn borderline_question_is_corrected_and_rescored() {
        let dir = tempfile::tempdir().unwrap();
        let mut q = resolved();
        q.legal_reference.clear();
        q.difficulty = DifficultyLabel::Unrecognized("normal".to_string());

        match flow(&dir).review(q, &[], &ctx()).unwrap() {
            Disposition::Approved(r) => {
                assert_eq!(r.evaluation.status, ReviewStatus::AutoCorrected);
                assert_eq!(r.evaluation.fixes_applied.len(), 2);
                assert_eq!(r.evaluation.weighted_score, 1.0);
                assert!(r
                    .evaluation
                    .diagnostics
                    .contains(&"Sin referencia legal".to_string()));
                assert_eq!(r.question.legal_reference, "Constitución Española");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn borderline_without_fix_stays_approved_with_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let mut q = resolved();
        q.legal_reference = "Doctrina consolidada".to_string();

        let disposition = flow(&dir).review(q, &[], &ctx()).unwrap();
        assert_eq!(disposition.status(), ReviewStatus::AutoApproved);
        if let Disposition::Approved(r) = disposition {
            assert!(r.evaluation.fixes_applied.is_empty());
            assert_eq!(r.evaluation.diagnostics.len(), 1);
        }
    }

    #[test]
    fn unresolved_question_goes_to_review_file() {
        let dir = tempfile::tempdir().unwrap();
        let f = flow(&dir);
        let mut q = Question {
            question_text: "¿Qué atajo de teclado copia el texto seleccionado?".to_string(),
            options: vec![
                AnswerOption::new("Control más C"),
                AnswerOption::new("Control más V"),
                AnswerOption::new("Control más X"),
            ],
            ..Question::default()
        };
        assert_eq!(f.resolve(&mut q, &ctx()), ProcessResult::Unresolved);

        match f.review(q, &[], &ctx()).unwrap() {
            Disposition::Rejected(entry) => {
                assert!(entry.errors.contains(&"No hay respuesta correcta marcada".to_string()));
                assert!(entry.evaluation.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
        let review = std::fs::read_to_string(dir.path().join("review.txt")).unwrap();
        assert!(review.contains("atajo de teclado"));
    }

    #[test]
    fn known_question_is_resolved_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut q = Question {
            question_text: "¿Cuál es la forma política del Estado español?".to_string(),
            options: vec![
                AnswerOption::new("República federal"),
                AnswerOption::new("Monarquía parlamentaria"),
                AnswerOption::new("Monarquía absoluta"),
            ],
            ..Question::default()
        };
        assert_eq!(flow(&dir).resolve(&mut q, &ctx()), ProcessResult::Resolved);
        assert!(q.is_resolved());
        assert_eq!(q.correct_index(), Some(1));
        assert!(!q.needs_review);
    }

    #[test]
    fn malformed_record_is_rejected_without_evaluation() {
        let dir = tempfile::tempdir().unwrap();
        let raw = serde_json::json!({"question_text": "¿Roto?", "options": "no es una lista"});
        match flow(&dir).reject_malformed(raw, "invalid type", &ctx()).unwrap() {
            Disposition::Rejected(entry) => {
                assert!(entry.evaluation.is_none());
                assert_eq!(entry.errors, vec!["Registro mal formado: invalid type"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
