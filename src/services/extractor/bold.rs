use regex::Regex;
use std::sync::LazyLock;

use super::{BlockBuilder, FormatExtractor};
use crate::models::raw_block::{BlockFormat, RawBlock};

/// `1. **题干**` 或 `1. **题干:**`
static QUESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*\*\*(.+?)\*\*:?\s*$").unwrap());

/// `1. 选项`
static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*(\d+)\.\s+(.+)$").unwrap());

/// 加粗编号题干 + 编号选项
///
/// ```text
/// 1. **¿Pregunta?**
///    1. Opción a
///    2. Opción b
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BoldFormat;

impl FormatExtractor for BoldFormat {
    fn format(&self) -> BlockFormat {
        BlockFormat::Bold
    }

    fn extract(&self, text: &str) -> Vec<RawBlock> {
        let mut builder = BlockBuilder::new(BlockFormat::Bold);

        for line in text.lines() {
            let stripped = line.trim();

            if let Some(caps) = QUESTION_RE.captures(stripped) {
                builder.start(caps[2].trim());
                continue;
            }

            if let Some(caps) = OPTION_RE.captures(stripped) {
                builder.push_option(&caps[2]);
            }
        }

        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bold_questions_with_trailing_colon() {
        let text = "\
Test de repaso

1. **La Constitución entró en vigor el**:
   1. 6 de diciembre de 1978
   2. 27 de diciembre de 1978
   3. 29 de diciembre de 1978
   4. 31 de octubre de 1978
2. **Pregunta sin opciones suficientes**
   1. Sí
   2. No lo sé
";
        let blocks = BoldFormat.extract(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].raw_text, "La Constitución entró en vigor el");
        assert_eq!(blocks[0].raw_options.len(), 4);
        assert_eq!(blocks[0].raw_options[2], "29 de diciembre de 1978");
    }

    #[test]
    fn options_before_first_question_are_ignored() {
        let text = "1. Introducción\n2. Índice\n3. Anexo\n";
        assert!(BoldFormat.extract(text).is_empty());
    }
}
