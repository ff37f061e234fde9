//! 草稿构建服务 - 业务能力层
//!
//! 把抽取出的原始题块整理成待解析的题目

use regex::Regex;
use std::fmt::Write as _;
use std::sync::LazyLock;

use crate::models::question::{AnswerOption, Difficulty, OriginType, Question, MAX_OPTIONS};
use crate::models::raw_block::RawBlock;
use crate::models::subject::SubjectArea;
use crate::services::text_repair::clean_text;

/// 高难度标志：否定式、例外式提问
static HARD_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[
        r"excep(to|ción)",
        r"no\s+es",
        r"falsa",
        r"incorrecta",
        r"cual.*no.*es",
        r"todas.*siguientes.*excepto",
    ])
});

/// 中等难度标志：条文细节、期限、多数
static MEDIUM_MARKERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile_all(&[r"según.*art[íi]culo", r"plazo", r"mayor[ií]a", r"quor[úu]m"])
});

fn compile_all(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p)).expect("constant pattern"))
        .collect()
}

/// 根据题干和选项中的标志词估计难度
///
/// - 两个及以上高难度标志 → 难
/// - 一个高难度标志，或两个及以上中等标志 → 中
/// - 其余 → 易
pub fn estimate_difficulty(stem: &str, options: &[String]) -> Difficulty {
    let combined = format!("{} {}", stem, options.join(" ")).to_lowercase();

    let hard = HARD_MARKERS.iter().filter(|re| re.is_match(&combined)).count();
    let medium = MEDIUM_MARKERS.iter().filter(|re| re.is_match(&combined)).count();

    if hard >= 2 {
        Difficulty::Hard
    } else if hard >= 1 || medium >= 2 {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

/// 原始题块 → 草稿题目
///
/// 所有选项先标为错误，解析字段留空，`needs_review = true`
pub fn build_draft(block: &RawBlock) -> Question {
    let stem = clean_text(&block.raw_text);
    let options: Vec<String> = block
        .raw_options
        .iter()
        .map(|o| clean_text(o))
        .take(MAX_OPTIONS)
        .collect();

    let provenance = &block.provenance;
    let source = if provenance.source_file.is_empty() {
        "unknown".to_string()
    } else {
        provenance.source_file.clone()
    };

    Question {
        difficulty: estimate_difficulty(&stem, &options).into(),
        options: options.into_iter().map(AnswerOption::new).collect(),
        original_text: stem.clone(),
        question_text: stem,
        topic: provenance.topic,
        subject_area: SubjectArea::for_topic(provenance.topic, provenance.category),
        origin_type: OriginType::Reformulated,
        source,
        needs_review: true,
        confidence_score: 0.0,
        ..Question::default()
    }
}

/// 生成供人工核对的题目清单（与草稿文件放在一起）
pub fn review_prompt(questions: &[Question], source_file: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Revisión de preguntas de examen\n");
    let _ = writeln!(out, "**Archivo fuente:** {}", source_file);
    let _ = writeln!(out, "**Total preguntas:** {}\n", questions.len());
    let _ = writeln!(
        out,
        "Para cada pregunta indique la opción correcta (0-{}), una explicación breve y la referencia legal.\n",
        MAX_OPTIONS - 1
    );

    for (i, q) in questions.iter().enumerate() {
        let _ = writeln!(out, "### Pregunta {}\n", i + 1);
        let _ = writeln!(out, "**Texto:** {}\n", q.question_text);
        let _ = writeln!(out, "**Opciones:**");
        for (j, opt) in q.options.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", j, opt.text);
        }
        let _ = writeln!(out, "\n---");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::DifficultyLabel;
    use crate::models::raw_block::{BlockFormat, Provenance};
    use crate::models::subject::Category;

    fn block(stem: &str, options: &[&str]) -> RawBlock {
        RawBlock {
            raw_text: stem.to_string(),
            raw_options: options.iter().map(|s| s.to_string()).collect(),
            format: BlockFormat::Lettered,
            provenance: Provenance {
                source_file: "TEST TEMA 14.docx".to_string(),
                topic: 14,
                category: Category::General,
            },
        }
    }

    #[test]
    fn difficulty_levels() {
        let none: Vec<String> = Vec::new();
        assert_eq!(
            estimate_difficulty("¿Cuál de las siguientes NO es correcta? Señale la FALSA", &none),
            Difficulty::Hard
        );
        assert_eq!(
            estimate_difficulty("¿Cuál es el plazo para la mayoría absoluta?", &none),
            Difficulty::Medium
        );
        assert_eq!(
            estimate_difficulty("Indique la respuesta incorrecta", &none),
            Difficulty::Medium
        );
        assert_eq!(
            estimate_difficulty("¿Quién sanciona las leyes?", &["El Rey".to_string()]),
            Difficulty::Easy
        );
    }

    #[test]
    fn draft_is_unresolved_and_cleaned() {
        let q = build_draft(&block(
            "  ¿Qué   plazo tiene la Administración\tpara resolver?  ",
            &["1 mes", " 3  meses ", "6 meses"],
        ));
        assert_eq!(q.question_text, "¿Qué plazo tiene la Administración para resolver?");
        assert_eq!(q.original_text, q.question_text);
        assert_eq!(q.options[1].text, "3 meses");
        assert_eq!(q.correct_count(), 0);
        assert!(q.needs_review);
        assert_eq!(q.confidence_score, 0.0);
        assert_eq!(q.topic, 14);
        assert_eq!(q.subject_area, SubjectArea::ProcAdministrativo);
        assert_eq!(q.source, "TEST TEMA 14.docx");
        assert_eq!(q.difficulty, DifficultyLabel::Known(Difficulty::Easy));
    }

    #[test]
    fn review_prompt_lists_every_option() {
        let q = build_draft(&block("¿Pregunta?", &["uno", "dos", "tres"]));
        let text = review_prompt(&[q], "a.docx");
        assert!(text.contains("**Archivo fuente:** a.docx"));
        assert!(text.contains("### Pregunta 1"));
        assert!(text.contains("  2. tres"));
    }
}
