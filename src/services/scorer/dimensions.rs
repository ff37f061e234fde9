//! 七个评估维度
//!
//! 每个维度独立打分（0–1），并给出诊断信息

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::models::question::{Question, MAX_OPTIONS, MIN_OPTIONS};

/// 记录中必须出现的字段
pub const REQUIRED_FIELDS: &[&str] = &["question_text", "options", "origin_type", "tema", "materia"];

/// 干扰项最少字符数
const MIN_DISTRACTOR_CHARS: usize = 10;
const MIN_STEM_CHARS: usize = 20;
const MAX_STEM_CHARS: usize = 500;

static AMBIGUOUS_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\betc\b",
        r"(?i)\bcualquier\b.*\bcualquier\b",
        r"(?i)posiblemente",
        r"(?i)quizás",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("constant pattern"))
    .collect()
});

/// 可识别的法律引用格式
static CITATION_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)art[íi]culo?\s*\d+",
        r"(?i)art\.?\s*\d+",
        r"(?i)ley\s+\d+/\d+",
        r"(?i)real\s+decreto",
        r"(?i)constituci[óo]n",
        r"(?i)CE\s*$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("constant pattern"))
    .collect()
});

/// 已被废止的法律
static SUPERSEDED_RES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"(?i)ley\s+30/1992", "Ley 30/1992 derogada por Ley 39/2015"),
        (r"(?i)ley\s+6/1997", "Ley 6/1997 derogada por Ley 40/2015"),
    ]
    .iter()
    .map(|(p, msg)| (Regex::new(p).expect("constant pattern"), *msg))
    .collect()
});

/// 单个维度的得分
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionScore {
    pub score: f64,
    pub diagnostics: Vec<String>,
}

impl DimensionScore {
    fn perfect() -> Self {
        Self {
            score: 1.0,
            diagnostics: Vec::new(),
        }
    }

    fn flat(score: f64, diagnostic: impl Into<String>) -> Self {
        Self {
            score,
            diagnostics: vec![diagnostic.into()],
        }
    }

    /// 每条诊断扣 `penalty`，最低 0
    fn penalized(diagnostics: Vec<String>, penalty: f64) -> Self {
        let score = (1.0 - diagnostics.len() as f64 * penalty).max(0.0);
        Self { score, diagnostics }
    }
}

/// 找出原始记录中缺失的必填字段
pub fn missing_fields(raw: &serde_json::Value) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|f| raw.get(**f).is_none())
        .map(|f| f.to_string())
        .collect()
}

/// 格式：必填字段、3–4 个选项且都有文本、题干非空；每个问题扣 0.2
pub fn check_format(question: &Question, missing: &[String]) -> DimensionScore {
    let mut diagnostics: Vec<String> = missing
        .iter()
        .map(|f| format!("Campo faltante: {}", f))
        .collect();

    let count = question.options.len();
    if count < MIN_OPTIONS {
        diagnostics.push(format!("Mínimo {} opciones, hay {}", MIN_OPTIONS, count));
    } else if count > MAX_OPTIONS {
        diagnostics.push(format!("Máximo {} opciones, hay {}", MAX_OPTIONS, count));
    } else {
        for (i, opt) in question.options.iter().enumerate() {
            if opt.text.trim().is_empty() {
                diagnostics.push(format!("Opción {} sin texto", i));
            }
        }
    }

    if question.question_text.trim().is_empty() {
        diagnostics.push("Pregunta vacía".to_string());
    }

    DimensionScore::penalized(diagnostics, 0.2)
}

/// 唯一答案：0 个正确 → 0.0；多个 → 0.3；恰好 1 个 → 1.0
pub fn check_single_answer(question: &Question) -> DimensionScore {
    match question.correct_count() {
        0 => DimensionScore::flat(0.0, "No hay respuesta correcta marcada"),
        1 => DimensionScore::perfect(),
        n => DimensionScore::flat(0.3, format!("Hay {} respuestas correctas (debe ser 1)", n)),
    }
}

/// 干扰项：错误选项过短每个扣 0.25；存在重复选项时最高 0.5
pub fn check_distractors(question: &Question) -> DimensionScore {
    let mut diagnostics = Vec::new();

    for opt in question.options.iter().filter(|o| !o.is_correct) {
        if opt.text.chars().count() < MIN_DISTRACTOR_CHARS {
            let preview: String = opt.text.chars().take(20).collect();
            diagnostics.push(format!("Distractor muy corto: '{}...'", preview));
        }
    }
    let short = diagnostics.len();
    let mut score = (1.0 - short as f64 * 0.25).max(0.0);

    let mut seen = HashSet::new();
    let has_duplicates = !question
        .options
        .iter()
        .all(|o| seen.insert(o.text.trim().to_lowercase()));
    if has_duplicates {
        diagnostics.push("Hay opciones duplicadas".to_string());
        score = score.min(0.5);
    }

    DimensionScore { score, diagnostics }
}

/// 清晰度：长度 20–500、以 `?` `:` `.` 结尾、无模糊措辞；每项扣 0.25
pub fn check_clarity(question: &Question) -> DimensionScore {
    let text = &question.question_text;
    let mut diagnostics = Vec::new();

    let len = text.chars().count();
    if len < MIN_STEM_CHARS {
        diagnostics.push("Pregunta muy corta".to_string());
    } else if len > MAX_STEM_CHARS {
        diagnostics.push("Pregunta muy larga".to_string());
    }

    if !text.trim().ends_with(['?', ':', '.']) {
        diagnostics.push("Pregunta no termina correctamente".to_string());
    }

    if AMBIGUOUS_RES.iter().any(|re| re.is_match(text)) {
        diagnostics.push("Lenguaje ambiguo detectado".to_string());
    }

    DimensionScore::penalized(diagnostics, 0.25)
}

/// 法律依据：缺失 → 0.6；格式无法识别 → 0.7；有效 → 1.0
pub fn check_legal_precision(question: &Question) -> DimensionScore {
    let reference = &question.legal_reference;
    if reference.is_empty() {
        return DimensionScore::flat(0.6, "Sin referencia legal");
    }
    if !CITATION_RES.iter().any(|re| re.is_match(reference)) {
        return DimensionScore::flat(0.7, "Formato de referencia legal no reconocido");
    }
    DimensionScore::perfect()
}

/// 时效性：题干或选项引用已废止的法律 → 0.5
pub fn check_currency(question: &Question) -> DimensionScore {
    let options: Vec<&str> = question.options.iter().map(|o| o.text.as_str()).collect();
    let combined = format!("{} {}", question.question_text, options.join(" "));

    SUPERSEDED_RES
        .iter()
        .find(|(re, _)| re.is_match(&combined))
        .map(|(_, msg)| DimensionScore::flat(0.5, *msg))
        .unwrap_or_else(DimensionScore::perfect)
}

/// 难度标签：不是三个有效等级之一 → 0.5
pub fn check_difficulty(question: &Question) -> DimensionScore {
    match question.difficulty.known() {
        Some(_) => DimensionScore::perfect(),
        None => DimensionScore::flat(
            0.5,
            format!("Dificultad inválida: {}", question.difficulty.as_str()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{AnswerOption, DifficultyLabel};

    fn question(stem: &str, options: Vec<AnswerOption>) -> Question {
        Question {
            question_text: stem.to_string(),
            options,
            ..Question::default()
        }
    }

    #[test]
    fn format_counts_every_problem() {
        let q = question("", vec![AnswerOption::new("uno"), AnswerOption::new("dos")]);
        let s = check_format(&q, &["tema".to_string()]);
        assert_eq!(
            s.diagnostics,
            vec!["Campo faltante: tema", "Mínimo 3 opciones, hay 2", "Pregunta vacía"]
        );
        assert!((s.score - 0.4).abs() < 1e-9);
    }

    #[test]
    fn missing_fields_from_raw_record() {
        let raw = serde_json::json!({"question_text": "x", "options": [], "tema": 1});
        assert_eq!(missing_fields(&raw), vec!["origin_type", "materia"]);
    }

    #[test]
    fn single_answer_scores() {
        let mut q = question(
            "¿Pregunta?",
            vec![AnswerOption::new("a"), AnswerOption::new("b"), AnswerOption::new("c")],
        );
        assert_eq!(check_single_answer(&q).score, 0.0);
        q.options[0].is_correct = true;
        assert_eq!(check_single_answer(&q).score, 1.0);
        q.options[1].is_correct = true;
        let s = check_single_answer(&q);
        assert_eq!(s.score, 0.3);
        assert_eq!(s.diagnostics, vec!["Hay 2 respuestas correctas (debe ser 1)"]);
    }

    #[test]
    fn duplicates_cap_distractor_score() {
        let q = question(
            "¿Pregunta?",
            vec![
                AnswerOption::correct("Opción correcta larga"),
                AnswerOption::new("Distractor bastante largo"),
                AnswerOption::new("  distractor BASTANTE largo "),
            ],
        );
        let s = check_distractors(&q);
        assert_eq!(s.score, 0.5);
        assert_eq!(s.diagnostics, vec!["Hay opciones duplicadas"]);
    }

    #[test]
    fn short_distractors_each_cost_a_quarter() {
        let q = question(
            "¿Pregunta?",
            vec![
                AnswerOption::correct("Sí"),
                AnswerOption::new("No"),
                AnswerOption::new("Quizá"),
                AnswerOption::new("Distractor suficientemente largo"),
            ],
        );
        let s = check_distractors(&q);
        assert_eq!(s.score, 0.5);
        assert_eq!(s.diagnostics.len(), 2);
        assert_eq!(s.diagnostics[0], "Distractor muy corto: 'No...'");
    }

    #[test]
    fn clarity_violations() {
        let q = question("Corta", Vec::new());
        let s = check_clarity(&q);
        assert_eq!(s.diagnostics, vec!["Pregunta muy corta", "Pregunta no termina correctamente"]);
        assert_eq!(s.score, 0.5);

        let q = question("¿Cuál es, posiblemente, el órgano competente, etc.?", Vec::new());
        let s = check_clarity(&q);
        assert_eq!(s.diagnostics, vec!["Lenguaje ambiguo detectado"]);
        assert_eq!(s.score, 0.75);
    }

    #[test]
    fn legal_reference_shapes() {
        let mut q = question("¿Pregunta?", Vec::new());
        assert_eq!(check_legal_precision(&q).score, 0.6);
        q.legal_reference = "Doctrina del Tribunal Supremo".to_string();
        assert_eq!(check_legal_precision(&q).score, 0.7);
        for valid in ["Art. 21.3 Ley 39/2015", "artículo 14", "Real Decreto 364/1995", "Disposición Final CE"] {
            q.legal_reference = valid.to_string();
            assert_eq!(check_legal_precision(&q).score, 1.0, "{}", valid);
        }
    }

    #[test]
    fn superseded_law_is_flagged() {
        let q = question(
            "Según la Ley 30/1992, ¿cuál es el plazo?",
            vec![AnswerOption::new("tres meses")],
        );
        let s = check_currency(&q);
        assert_eq!(s.score, 0.5);
        assert_eq!(s.diagnostics, vec!["Ley 30/1992 derogada por Ley 39/2015"]);
    }

    #[test]
    fn unknown_difficulty_label() {
        let mut q = question("¿Pregunta?", Vec::new());
        assert_eq!(check_difficulty(&q).score, 1.0);
        q.difficulty = DifficultyLabel::Unrecognized("extrema".to_string());
        let s = check_difficulty(&q);
        assert_eq!(s.score, 0.5);
        assert_eq!(s.diagnostics, vec!["Dificultad inválida: extrema"]);
    }
}
