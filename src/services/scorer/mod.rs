//! 质量评分服务 - 业务能力层
//!
//! 对每道题按七个维度打分，加权求和后分档：
//! - `>= 0.95`：自动通过
//! - `[0.80, 0.95)`：尝试自动修正
//! - `< 0.80`：人工处理
//!
//! 多个正确答案无法自动修正，直接进入人工处理。

pub mod dimensions;

use std::collections::BTreeMap;

use crate::models::evaluation::{Dimension, EvaluationResult, ReviewStatus};
use crate::models::question::Question;

pub use dimensions::{missing_fields, DimensionScore, REQUIRED_FIELDS};

/// 自动通过阈值
pub const APPROVE_THRESHOLD: f64 = 0.95;
/// 自动修正阈值
pub const FIX_THRESHOLD: f64 = 0.80;

/// 分档
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Approve,
    Fixable,
    Reject,
}

/// 按维度计算分数（诊断顺序固定）
fn score_dimension(dimension: Dimension, question: &Question, missing: &[String]) -> DimensionScore {
    match dimension {
        Dimension::Format => dimensions::check_format(question, missing),
        Dimension::SingleAnswer => dimensions::check_single_answer(question),
        Dimension::Distractors => dimensions::check_distractors(question),
        Dimension::Clarity => dimensions::check_clarity(question),
        Dimension::LegalPrecision => dimensions::check_legal_precision(question),
        Dimension::Currency => dimensions::check_currency(question),
        Dimension::Difficulty => dimensions::check_difficulty(question),
    }
}

/// 诊断信息的输出顺序
const DIAGNOSTIC_ORDER: [Dimension; 7] = [
    Dimension::Format,
    Dimension::SingleAnswer,
    Dimension::Distractors,
    Dimension::Clarity,
    Dimension::LegalPrecision,
    Dimension::Currency,
    Dimension::Difficulty,
];

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// 质量评分器
#[derive(Debug, Clone, Copy, Default)]
pub struct QualityScorer;

impl QualityScorer {
    pub fn new() -> Self {
        Self
    }

    /// 评估一道题
    pub fn evaluate(&self, question: &Question) -> EvaluationResult {
        self.evaluate_record(question, &[])
    }

    /// 评估一道题，附带原始记录中缺失的必填字段
    ///
    /// # 参数
    /// - `question`: 题目
    /// - `missing`: 缺失字段名（见 [`missing_fields`]）
    ///
    /// # 返回
    /// 修正阶段之前的评估结果；`[0.80, 0.95)` 档暂记为自动通过
    pub fn evaluate_record(&self, question: &Question, missing: &[String]) -> EvaluationResult {
        let mut per_dimension_scores = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for dimension in DIAGNOSTIC_ORDER {
            let result = score_dimension(dimension, question, missing);
            diagnostics.extend(result.diagnostics);
            per_dimension_scores.insert(dimension, result.score);
        }

        let weighted: f64 = Dimension::ALL
            .iter()
            .map(|d| per_dimension_scores.get(d).copied().unwrap_or(0.0) * d.weight())
            .sum();
        let weighted_score = round3(weighted);

        let status = match Self::band_of(weighted_score, &per_dimension_scores) {
            ScoreBand::Approve | ScoreBand::Fixable => ReviewStatus::AutoApproved,
            ScoreBand::Reject => ReviewStatus::HumanRequired,
        };

        EvaluationResult {
            per_dimension_scores,
            weighted_score,
            status,
            diagnostics,
            fixes_applied: Vec::new(),
        }
    }

    /// 评估结果所在的分档
    pub fn band(&self, evaluation: &EvaluationResult) -> ScoreBand {
        Self::band_of(evaluation.weighted_score, &evaluation.per_dimension_scores)
    }

    fn band_of(weighted_score: f64, scores: &BTreeMap<Dimension, f64>) -> ScoreBand {
        let single_answer = scores.get(&Dimension::SingleAnswer).copied().unwrap_or(0.0);
        if single_answer < 1.0 {
            return ScoreBand::Reject;
        }
        if weighted_score >= APPROVE_THRESHOLD {
            ScoreBand::Approve
        } else if weighted_score >= FIX_THRESHOLD {
            ScoreBand::Fixable
        } else {
            ScoreBand::Reject
        }
    }
}
