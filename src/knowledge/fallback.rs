//! 兜底检查
//!
//! 规则表全部未命中时，按固定顺序尝试以下几种常见题型

use crate::knowledge::facts;

/// 兜底检查：题干关键词条件 + 选项片段
#[derive(Debug)]
pub struct FallbackCheck {
    pub name: &'static str,
    /// 每组中至少一个关键词出现，且所有组都满足
    required: &'static [&'static [&'static str]],
    pub answer_fragment: &'static str,
    /// 解析模板，`{}` 由 `fact_key` 对应的基础数据填充
    explanation: &'static str,
    fact_key: Option<&'static str>,
    pub legal_reference: &'static str,
}

impl FallbackCheck {
    /// 题干（已规范化、小写）是否满足关键词条件
    pub fn applies_to(&self, normalized_stem: &str) -> bool {
        self.required
            .iter()
            .all(|any_of| any_of.iter().any(|kw| normalized_stem.contains(kw)))
    }

    pub fn find_option(&self, options_lower: &[String]) -> Option<usize> {
        options_lower
            .iter()
            .position(|o| o.contains(self.answer_fragment))
    }

    pub fn explanation(&self) -> String {
        match self.fact_key.and_then(facts::fact) {
            Some(value) => self.explanation.replace("{}", value),
            None => self.explanation.to_string(),
        }
    }
}

pub const FALLBACK_CHECKS: &[FallbackCheck] = &[
    FallbackCheck {
        name: "entrada_vigor_ce",
        required: &[&["constitución"], &["vigor", "entró"]],
        answer_fragment: "29 de diciembre",
        explanation: "La CE entró en vigor el {}, día de su publicación en el BOE.",
        fact_key: Some("entrada_vigor_ce"),
        legal_reference: "Disposición Final CE",
    },
    FallbackCheck {
        name: "referendum_ce",
        required: &[&["referéndum"], &["constitución"]],
        answer_fragment: "6 de diciembre",
        explanation: "El referéndum de la CE se celebró el {}.",
        fact_key: Some("referendum_ce"),
        legal_reference: "Historia constitucional",
    },
    FallbackCheck {
        name: "forma_politica",
        required: &[&["forma política"]],
        answer_fragment: "parlamentaria",
        explanation: "La forma política del Estado español es la {} (Art. 1.3 CE).",
        fact_key: Some("forma_politica"),
        legal_reference: "Art. 1.3 CE",
    },
    FallbackCheck {
        name: "titulo_ii",
        required: &[&["título ii"], &["constitución"]],
        answer_fragment: "corona",
        explanation: "El Título II CE (Arts. 56-65) regula la Corona.",
        fact_key: None,
        legal_reference: "Título II CE",
    },
    FallbackCheck {
        name: "titulo_i",
        required: &[&["título i"], &["constitución", "derechos"]],
        answer_fragment: "derechos",
        explanation: "El Título I CE (Arts. 10-55) regula los derechos y deberes fundamentales.",
        fact_key: None,
        legal_reference: "Título I CE",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enactment_check_accepts_either_verb() {
        let check = &FALLBACK_CHECKS[0];
        assert!(check.applies_to("¿cuándo entró la constitución en vigor?"));
        assert!(check.applies_to("la constitución, ¿cuándo entró?"));
        assert!(!check.applies_to("¿cuándo se aprobó la constitución?"));
    }

    #[test]
    fn explanations_are_filled_from_facts() {
        assert_eq!(
            FALLBACK_CHECKS[0].explanation(),
            "La CE entró en vigor el 29 de diciembre de 1978, día de su publicación en el BOE."
        );
        assert_eq!(
            FALLBACK_CHECKS[2].explanation(),
            "La forma política del Estado español es la Monarquía Parlamentaria (Art. 1.3 CE)."
        );
    }

    #[test]
    fn title_one_accepts_derechos_without_constitucion() {
        let check = FALLBACK_CHECKS.iter().find(|c| c.name == "titulo_i").unwrap();
        assert!(check.applies_to("el título i trata de los derechos"));
        assert!(!check.applies_to("el título i trata de la corona"));
    }
}
