use serde::{Deserialize, Serialize};

use crate::models::subject::SubjectArea;

/// 最少选项数
pub const MIN_OPTIONS: usize = 3;
/// 最多选项数
pub const MAX_OPTIONS: usize = 4;

/// 单个选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnswerOption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

impl AnswerOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_correct: false,
        }
    }

    pub fn correct(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_correct: true,
        }
    }
}

/// 难度等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    #[serde(rename = "facil", alias = "easy")]
    Easy,
    #[serde(rename = "media", alias = "medium")]
    Medium,
    #[serde(rename = "dificil", alias = "hard")]
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "facil",
            Difficulty::Medium => "media",
            Difficulty::Hard => "dificil",
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 记录中的难度字段
///
/// 来自外部文件的记录可能带有无法识别的难度标签，保留原值以便评分和修正
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DifficultyLabel {
    Known(Difficulty),
    Unrecognized(String),
}

impl Default for DifficultyLabel {
    fn default() -> Self {
        DifficultyLabel::Known(Difficulty::Medium)
    }
}

impl From<Difficulty> for DifficultyLabel {
    fn from(d: Difficulty) -> Self {
        DifficultyLabel::Known(d)
    }
}

impl DifficultyLabel {
    pub fn known(&self) -> Option<Difficulty> {
        match self {
            DifficultyLabel::Known(d) => Some(*d),
            DifficultyLabel::Unrecognized(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DifficultyLabel::Known(d) => d.as_str(),
            DifficultyLabel::Unrecognized(s) => s,
        }
    }
}

/// 题目来源类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OriginType {
    #[default]
    Reformulated,
    Original,
}

impl OriginType {
    pub fn as_str(self) -> &'static str {
        match self {
            OriginType::Reformulated => "reformulated",
            OriginType::Original => "original",
        }
    }
}

/// 题目：贯穿所有阶段的处理单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Question {
    pub question_text: String,
    pub options: Vec<AnswerOption>,
    pub explanation: String,
    pub legal_reference: String,
    pub confidence_score: f64,
    #[serde(rename = "tema")]
    pub topic: u32,
    #[serde(rename = "materia")]
    pub subject_area: SubjectArea,
    pub difficulty: DifficultyLabel,
    pub needs_review: bool,
    pub origin_type: OriginType,
    pub original_text: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_note: Option<String>,
}

impl Default for Question {
    fn default() -> Self {
        Self {
            question_text: String::new(),
            options: Vec::new(),
            explanation: String::new(),
            legal_reference: String::new(),
            confidence_score: 0.0,
            topic: 0,
            subject_area: SubjectArea::default(),
            difficulty: DifficultyLabel::default(),
            needs_review: true,
            origin_type: OriginType::default(),
            original_text: String::new(),
            source: String::new(),
            review_note: None,
        }
    }
}

impl Question {
    /// 被标记为正确的选项数量
    pub fn correct_count(&self) -> usize {
        self.options.iter().filter(|o| o.is_correct).count()
    }

    /// 第一个正确选项的索引
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| o.is_correct)
    }

    /// 只标记 `index` 为正确
    pub fn mark_correct(&mut self, index: usize) {
        for (i, opt) in self.options.iter_mut().enumerate() {
            opt.is_correct = i == index;
        }
    }

    /// 已由解析器给出正确答案
    pub fn is_resolved(&self) -> bool {
        self.confidence_score > 0.0 && self.correct_count() == 1
    }
}
