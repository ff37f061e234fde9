use serde::{Deserialize, Serialize};

use crate::models::evaluation::ReviewStatus;
use crate::models::question::Question;
use crate::models::subject::SubjectArea;

/// 发布时写入的校验状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    AutoValidated,
    AutoCorrected,
}

impl From<ReviewStatus> for ValidationStatus {
    fn from(status: ReviewStatus) -> Self {
        match status {
            ReviewStatus::AutoCorrected => ValidationStatus::AutoCorrected,
            ReviewStatus::AutoApproved | ReviewStatus::HumanRequired => {
                ValidationStatus::AutoValidated
            }
        }
    }
}

/// 题库表 `questions` 的记录格式
///
/// 字段名与题库表的列名保持一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationRecord {
    #[serde(rename = "pregunta")]
    pub stem: String,
    #[serde(rename = "opciones")]
    pub options: Vec<String>,
    #[serde(rename = "respuesta_correcta")]
    pub correct_option_index: usize,
    #[serde(rename = "tema")]
    pub topic: u32,
    #[serde(rename = "materia")]
    pub subject_area: SubjectArea,
    #[serde(rename = "dificultad")]
    pub difficulty: String,
    #[serde(rename = "explicacion")]
    pub explanation: String,
    #[serde(rename = "articulo_referencia")]
    pub legal_reference: String,
    #[serde(rename = "is_active")]
    pub active: bool,
    pub validation_status: ValidationStatus,
    pub source: String,
    pub origin_type: String,
}

impl PublicationRecord {
    /// 把审核通过的题目转换为题库记录
    pub fn from_question(question: &Question, status: ReviewStatus) -> Self {
        Self {
            stem: question.question_text.clone(),
            options: question.options.iter().map(|o| o.text.clone()).collect(),
            correct_option_index: question.correct_index().unwrap_or(0),
            topic: question.topic,
            subject_area: question.subject_area,
            difficulty: question.difficulty.as_str().to_string(),
            explanation: question.explanation.clone(),
            legal_reference: question.legal_reference.clone(),
            active: true,
            validation_status: status.into(),
            source: question.source.clone(),
            origin_type: question.origin_type.as_str().to_string(),
        }
    }
}

/// 待发布的候选记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationCandidate {
    pub record: PublicationRecord,
    pub duplicate: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::AnswerOption;

    #[test]
    fn record_uses_store_column_names() {
        let question = Question {
            question_text: "¿Cuál es la forma política del Estado español?".to_string(),
            options: vec![
                AnswerOption::new("República federal"),
                AnswerOption::correct("Monarquía parlamentaria"),
                AnswerOption::new("Monarquía absoluta"),
            ],
            topic: 1,
            ..Question::default()
        };
        let record = PublicationRecord::from_question(&question, ReviewStatus::AutoApproved);
        assert_eq!(record.correct_option_index, 1);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["respuesta_correcta"], 1);
        assert_eq!(value["is_active"], true);
        assert_eq!(value["validation_status"], "auto_validated");
        assert_eq!(value["materia"], "ce-constitucion");
        assert_eq!(value["opciones"].as_array().unwrap().len(), 3);
    }
}
