//! 自动修正服务 - 业务能力层
//!
//! 只处理可以机械修正的问题：缺少正确答案、难度标签无效、缺少法律依据

use crate::models::question::{Difficulty, Question};

/// 第 1-5 主题属于宪法部分
const CONSTITUTION_TOPIC_MAX: u32 = 5;

pub const FIX_MARKED_FIRST: &str = "Marcada la primera opción como correcta";
pub const FIX_DIFFICULTY: &str = "Normalizada dificultad a 'media'";
pub const FIX_REFERENCE: &str = "Añadida referencia legal genérica";

/// 主题对应的通用法律依据
pub fn generic_reference(topic: u32) -> &'static str {
    if topic <= CONSTITUTION_TOPIC_MAX {
        "Constitución Española"
    } else {
        "Legislación administrativa"
    }
}

/// 应用所有可用的修正
///
/// # 返回
/// 实际生效的修正说明（为空表示没有修正）
pub fn apply_fixes(question: &mut Question) -> Vec<String> {
    let mut fixes = Vec::new();

    if !question.options.is_empty() && question.correct_count() == 0 {
        question.options[0].is_correct = true;
        fixes.push(FIX_MARKED_FIRST.to_string());
    }

    if question.difficulty.known().is_none() {
        question.difficulty = Difficulty::Medium.into();
        fixes.push(FIX_DIFFICULTY.to_string());
    }

    if question.legal_reference.trim().is_empty() {
        question.legal_reference = generic_reference(question.topic).to_string();
        fixes.push(FIX_REFERENCE.to_string());
    }

    fixes
}
