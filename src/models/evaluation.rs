use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 质量评估的七个维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dimension {
    #[serde(rename = "precision_legal")]
    LegalPrecision,
    #[serde(rename = "respuesta_unica")]
    SingleAnswer,
    #[serde(rename = "distractores")]
    Distractors,
    #[serde(rename = "claridad")]
    Clarity,
    #[serde(rename = "actualizacion")]
    Currency,
    #[serde(rename = "formato")]
    Format,
    #[serde(rename = "dificultad")]
    Difficulty,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::LegalPrecision,
        Dimension::SingleAnswer,
        Dimension::Distractors,
        Dimension::Clarity,
        Dimension::Currency,
        Dimension::Format,
        Dimension::Difficulty,
    ];

    /// 维度权重，合计为 1.0
    pub fn weight(self) -> f64 {
        match self {
            Dimension::LegalPrecision => 0.30,
            Dimension::SingleAnswer => 0.25,
            Dimension::Distractors => 0.15,
            Dimension::Clarity => 0.15,
            Dimension::Currency => 0.10,
            Dimension::Format => 0.03,
            Dimension::Difficulty => 0.02,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Dimension::LegalPrecision => "precision_legal",
            Dimension::SingleAnswer => "respuesta_unica",
            Dimension::Distractors => "distractores",
            Dimension::Clarity => "claridad",
            Dimension::Currency => "actualizacion",
            Dimension::Format => "formato",
            Dimension::Difficulty => "dificultad",
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// 审核结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    AutoApproved,
    AutoCorrected,
    HumanRequired,
}

impl ReviewStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewStatus::AutoApproved => "auto_approved",
            ReviewStatus::AutoCorrected => "auto_corrected",
            ReviewStatus::HumanRequired => "human_required",
        }
    }
}

/// 单道题的评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    #[serde(rename = "scores")]
    pub per_dimension_scores: BTreeMap<Dimension, f64>,
    pub weighted_score: f64,
    pub status: ReviewStatus,
    #[serde(rename = "errors")]
    pub diagnostics: Vec<String>,
    /// 自动修正记录（仅 auto_corrected）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fixes_applied: Vec<String>,
}

impl EvaluationResult {
    pub fn score(&self, dimension: Dimension) -> f64 {
        self.per_dimension_scores
            .get(&dimension)
            .copied()
            .unwrap_or(0.0)
    }
}
