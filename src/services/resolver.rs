//! 答案解析服务 - 业务能力层
//!
//! 只处理单道题：先按顺序扫描知识库规则，再尝试兜底检查。
//! 解析不到答案不是错误，题目留给人工复核。

use std::sync::Arc;

use crate::knowledge::KnowledgeBase;
use crate::models::question::Question;
use crate::services::text_repair::{normalize_for_matching, repair_encoding};

/// 解析成功时的置信度
pub const RESOLVED_CONFIDENCE: f64 = 0.95;

/// 无法解析时附加的复核说明
pub const UNRESOLVED_NOTE: &str = "No se pudo identificar la respuesta correcta automáticamente";

/// 答案来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerSource {
    /// 知识库规则（规则表中的位置）
    Rule(usize),
    /// 兜底检查
    Fallback(&'static str),
}

/// 解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub correct_index: usize,
    pub explanation: String,
    pub legal_reference: String,
    pub source: AnswerSource,
}

/// 答案解析器
///
/// 持有只读知识库，可在多个任务间共享
#[derive(Debug, Clone)]
pub struct AnswerResolver {
    knowledge: Arc<KnowledgeBase>,
}

impl AnswerResolver {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// 查找正确选项
    ///
    /// # 参数
    /// - `stem`: 题干
    /// - `options`: 选项文本（按展示顺序）
    ///
    /// # 返回
    /// 命中时返回正确选项索引及解析；命中规则但没有选项包含答案片段时继续尝试下一条规则
    pub fn find_answer(&self, stem: &str, options: &[String]) -> Option<Resolution> {
        let stem = normalize_for_matching(stem);
        let options: Vec<String> = options.iter().map(|o| normalize_for_matching(o)).collect();

        for (i, rule) in self.knowledge.rules().iter().enumerate() {
            if !rule.matches_stem(&stem) {
                continue;
            }
            if let Some(index) = rule.find_option(&options) {
                return Some(Resolution {
                    correct_index: index,
                    explanation: rule.explanation.clone(),
                    legal_reference: rule.legal_reference.clone(),
                    source: AnswerSource::Rule(i),
                });
            }
        }

        for check in self.knowledge.fallbacks() {
            if !check.applies_to(&stem) {
                continue;
            }
            if let Some(index) = check.find_option(&options) {
                return Some(Resolution {
                    correct_index: index,
                    explanation: check.explanation(),
                    legal_reference: check.legal_reference.to_string(),
                    source: AnswerSource::Fallback(check.name),
                });
            }
        }

        None
    }

    /// 修复文本编码并解析答案，原地更新题目
    ///
    /// # 返回
    /// 返回是否解析成功
    pub fn resolve(&self, question: &mut Question) -> bool {
        question.question_text = repair_encoding(&question.question_text);
        question.original_text = repair_encoding(&question.original_text);
        for opt in question.options.iter_mut() {
            opt.text = repair_encoding(&opt.text);
        }

        let option_texts: Vec<String> = question.options.iter().map(|o| o.text.clone()).collect();

        match self.find_answer(&question.question_text, &option_texts) {
            Some(resolution) => {
                question.mark_correct(resolution.correct_index);
                question.explanation = resolution.explanation;
                question.legal_reference = resolution.legal_reference;
                question.confidence_score = RESOLVED_CONFIDENCE;
                question.needs_review = false;
                question.review_note = None;
                true
            }
            None => {
                question.confidence_score = 0.0;
                question.needs_review = true;
                question.review_note = Some(UNRESOLVED_NOTE.to_string());
                false
            }
        }
    }
}
