//! 知识库规则
//!
//! 每条规则：题干正则 → 正确选项应包含的片段 + 解析 + 法律依据

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::KnowledgeError;

/// 正确选项的判定方式
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AnswerKey {
    /// 选项包含该片段（忽略大小写）
    Fragment(String),
    /// 选项同时包含所有片段
    AllOf(Vec<String>),
}

impl AnswerKey {
    /// 判断已转为小写的选项文本是否满足条件
    pub fn matches(&self, option_lower: &str) -> bool {
        match self {
            AnswerKey::Fragment(fragment) => option_lower.contains(&fragment.to_lowercase()),
            AnswerKey::AllOf(fragments) => fragments
                .iter()
                .all(|f| option_lower.contains(&f.to_lowercase())),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            AnswerKey::Fragment(fragment) => fragment.trim().is_empty(),
            AnswerKey::AllOf(fragments) => {
                fragments.is_empty() || fragments.iter().any(|f| f.trim().is_empty())
            }
        }
    }
}

/// 一条知识库规则
#[derive(Debug, Clone)]
pub struct KnowledgeRule {
    pattern: Regex,
    pub answer: AnswerKey,
    pub explanation: String,
    pub legal_reference: String,
}

impl KnowledgeRule {
    /// 编译规则（正则忽略大小写）
    pub fn new(
        pattern: &str,
        answer: AnswerKey,
        explanation: impl Into<String>,
        legal_reference: impl Into<String>,
    ) -> Result<Self, KnowledgeError> {
        if answer.is_empty() {
            return Err(KnowledgeError::EmptyAnswerKey {
                pattern: pattern.to_string(),
            });
        }

        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| KnowledgeError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: compiled,
            answer,
            explanation: explanation.into(),
            legal_reference: legal_reference.into(),
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// 题干（已规范化、小写）是否命中
    pub fn matches_stem(&self, normalized_stem: &str) -> bool {
        self.pattern.is_match(normalized_stem)
    }

    /// 返回第一个满足答案条件的选项索引
    pub fn find_option(&self, options_lower: &[String]) -> Option<usize> {
        options_lower.iter().position(|o| self.answer.matches(o))
    }
}

/// TOML 扩展文件中的规则
#[derive(Debug, Clone, Deserialize)]
pub struct RuleDef {
    pub pattern: String,
    pub answer: AnswerKey,
    pub explanation: String,
    pub reference: String,
}

impl RuleDef {
    pub fn compile(&self) -> Result<KnowledgeRule, KnowledgeError> {
        KnowledgeRule::new(
            &self.pattern,
            self.answer.clone(),
            self.explanation.clone(),
            self.reference.clone(),
        )
    }
}

struct BuiltinRule {
    pattern: &'static str,
    answer: &'static [&'static str],
    explanation: &'static str,
    reference: &'static str,
}

/// 内置规则（按优先级排列，先匹配者生效）
const BUILTIN_RULES: &[BuiltinRule] = &[
    // 宪法：日期
    BuiltinRule {
        pattern: "entrada en vigor.*constitución",
        answer: &["29 de diciembre"],
        explanation: "La Constitución Española de 1978 entró en vigor el 29 de diciembre de 1978, día de su publicación en el BOE.",
        reference: "Disposición Final CE",
    },
    BuiltinRule {
        pattern: "referéndum.*constitución",
        answer: &["6 de diciembre"],
        explanation: "El referéndum de ratificación de la Constitución se celebró el 6 de diciembre de 1978, con un 87,78% de votos afirmativos.",
        reference: "Historia constitucional",
    },
    BuiltinRule {
        pattern: "primeras elecciones democráticas",
        answer: &["1977"],
        explanation: "Las primeras elecciones democráticas tras el franquismo se celebraron el 15 de junio de 1977.",
        reference: "Historia constitucional",
    },
    // 政体
    BuiltinRule {
        pattern: "forma política del estado",
        answer: &["parlamentaria"],
        explanation: "El Art. 1.3 CE establece que la forma política del Estado español es la Monarquía Parlamentaria.",
        reference: "Art. 1.3 CE",
    },
    // 编章（第二编必须在第一编之前，否则 "título i" 会吞掉 "título ii"）
    BuiltinRule {
        pattern: "título ii.*constitución",
        answer: &["corona"],
        explanation: "El Título II de la CE (Arts. 56-65) está dedicado a la Corona, regulando la figura del Rey, sucesión y funciones.",
        reference: "Título II CE (Arts. 56-65)",
    },
    BuiltinRule {
        pattern: "título i.*constitución",
        answer: &["derechos"],
        explanation: "El Título I de la CE (Arts. 10-55) regula los derechos y deberes fundamentales.",
        reference: "Título I CE (Arts. 10-55)",
    },
    BuiltinRule {
        pattern: "valores superiores",
        answer: &["libertad", "justicia", "igualdad", "pluralismo"],
        explanation: "El Art. 1.1 CE establece los valores superiores del ordenamiento: libertad, justicia, igualdad y pluralismo político.",
        reference: "Art. 1.1 CE",
    },
    BuiltinRule {
        pattern: "soberanía nacional",
        answer: &["pueblo español"],
        explanation: "El Art. 1.2 CE establece que la soberanía nacional reside en el pueblo español, del que emanan los poderes del Estado.",
        reference: "Art. 1.2 CE",
    },
    // 宪法法院
    BuiltinRule {
        pattern: "magistrados.*tribunal constitucional",
        answer: &["12"],
        explanation: "El TC está compuesto por 12 magistrados nombrados por el Rey: 4 a propuesta del Congreso, 4 del Senado, 2 del Gobierno y 2 del CGPJ.",
        reference: "Art. 159.1 CE",
    },
    BuiltinRule {
        pattern: "mandato.*magistrados.*tc",
        answer: &["9 años"],
        explanation: "Los magistrados del TC son designados por un período de 9 años, renovándose por terceras partes cada 3 años.",
        reference: "Art. 159.3 CE",
    },
    BuiltinRule {
        pattern: "defensor del pueblo.*mandato",
        answer: &["5 años"],
        explanation: "El Defensor del Pueblo es designado por las Cortes Generales por un período de 5 años.",
        reference: "Art. 2 LODP",
    },
    // 基本权利
    BuiltinRule {
        pattern: "derecho a la vida",
        answer: &["15"],
        explanation: "El derecho a la vida está reconocido en el Art. 15 CE, que también prohíbe la tortura y las penas o tratos inhumanos.",
        reference: "Art. 15 CE",
    },
    BuiltinRule {
        pattern: "libertad ideológica",
        answer: &["16"],
        explanation: "La libertad ideológica, religiosa y de culto está garantizada en el Art. 16 CE.",
        reference: "Art. 16 CE",
    },
    BuiltinRule {
        pattern: "tutela judicial efectiva",
        answer: &["24"],
        explanation: "El derecho a la tutela judicial efectiva se reconoce en el Art. 24 CE.",
        reference: "Art. 24 CE",
    },
    // 行政程序（Ley 39/2015）
    BuiltinRule {
        pattern: "plazo.*resolución.*procedimiento",
        answer: &["3 meses"],
        explanation: "El plazo máximo para resolver es de 3 meses cuando la norma no fije plazo específico (Art. 21.3 Ley 39/2015).",
        reference: "Art. 21.3 Ley 39/2015",
    },
    BuiltinRule {
        pattern: "silencio administrativo.*positivo",
        answer: &["positivo"],
        explanation: "Como regla general, el silencio es positivo en procedimientos iniciados a solicitud del interesado (Art. 24.1 Ley 39/2015).",
        reference: "Art. 24.1 Ley 39/2015",
    },
    // TREBEP
    BuiltinRule {
        pattern: "clases.*funcionarios",
        answer: &["carrera", "interinos"],
        explanation: "El Art. 9 TREBEP distingue funcionarios de carrera e interinos.",
        reference: "Art. 9 TREBEP",
    },
    // LCSP
    BuiltinRule {
        pattern: "contratos.*armonizados",
        answer: &["publicidad"],
        explanation: "Los contratos armonizados (SARA) requieren publicidad en el DOUE.",
        reference: "Art. 135 LCSP",
    },
];

/// 编译内置规则
pub fn builtin_rules() -> Result<Vec<KnowledgeRule>, KnowledgeError> {
    BUILTIN_RULES
        .iter()
        .map(|rule| {
            let answer = match rule.answer {
                [single] => AnswerKey::Fragment(single.to_string()),
                many => AnswerKey::AllOf(many.iter().map(|s| s.to_string()).collect()),
            };
            KnowledgeRule::new(rule.pattern, answer, rule.explanation, rule.reference)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(options: &[&str]) -> Vec<String> {
        options.iter().map(|o| o.to_lowercase()).collect()
    }

    #[test]
    fn builtin_rules_all_compile() {
        let rules = builtin_rules().unwrap();
        assert_eq!(rules.len(), BUILTIN_RULES.len());
    }

    #[test]
    fn all_of_requires_every_fragment() {
        let key = AnswerKey::AllOf(vec!["carrera".to_string(), "interinos".to_string()]);
        assert!(key.matches("funcionarios de carrera e interinos"));
        assert!(!key.matches("funcionarios de carrera y eventuales"));
    }

    #[test]
    fn find_option_returns_first_match() {
        let rule = KnowledgeRule::new(
            "tutela judicial efectiva",
            AnswerKey::Fragment("24".to_string()),
            "",
            "Art. 24 CE",
        )
        .unwrap();
        let options = lower(&["Artículo 14", "Artículo 24", "Artículo 24 bis"]);
        assert_eq!(rule.find_option(&options), Some(1));
    }

    #[test]
    fn title_two_rule_precedes_title_one() {
        let rules = builtin_rules().unwrap();
        let stem = "¿qué regula el título ii de la constitución?";
        let first = rules.iter().find(|r| r.matches_stem(stem)).unwrap();
        assert_eq!(first.legal_reference, "Título II CE (Arts. 56-65)");
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = KnowledgeRule::new("(sin cerrar", AnswerKey::Fragment("x".into()), "", "")
            .unwrap_err();
        assert!(matches!(err, KnowledgeError::InvalidPattern { .. }));
    }

    #[test]
    fn empty_answer_is_rejected() {
        let err = KnowledgeRule::new("plazo", AnswerKey::AllOf(vec![]), "", "").unwrap_err();
        assert!(matches!(err, KnowledgeError::EmptyAnswerKey { .. }));
    }
}
