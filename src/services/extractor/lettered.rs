use regex::Regex;
use std::sync::LazyLock;

use super::{BlockBuilder, FormatExtractor};
use crate::models::raw_block::{BlockFormat, RawBlock};

/// `1. 题干` 或 `1) 题干`
static QUESTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)[\.\)]\s+(.+)$").unwrap());

/// 题干本身以 `a)` 开头时其实是选项
static LOOKS_LIKE_OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-d]\)").unwrap());

/// `a) 选项` 或 `a. 选项`
static OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-dA-D][\)\.]\s*(.+)$").unwrap());

/// 编号题干 + `a)`–`d)` 选项
#[derive(Debug, Clone, Copy, Default)]
pub struct LetteredFormat;

impl FormatExtractor for LetteredFormat {
    fn format(&self) -> BlockFormat {
        BlockFormat::Lettered
    }

    fn extract(&self, text: &str) -> Vec<RawBlock> {
        let mut builder = BlockBuilder::new(BlockFormat::Lettered);

        for line in text.lines() {
            let stripped = line.trim();

            if let Some(caps) = QUESTION_RE.captures(stripped) {
                let stem = caps[2].trim();
                if !LOOKS_LIKE_OPTION_RE.is_match(stem) {
                    builder.start(stem);
                    continue;
                }
            }

            if let Some(caps) = OPTION_RE.captures(stripped) {
                builder.push_option(&caps[1]);
            }
        }

        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lettered_options_with_both_separators() {
        let text = "\
1) ¿Cuál es el plazo máximo para resolver un procedimiento?
a) 1 mes
b. 3 meses
C) 6 meses
d) 1 año
2. Pregunta incompleta
a) Única opción
";
        let blocks = LetteredFormat.extract(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].raw_options, vec!["1 mes", "3 meses", "6 meses", "1 año"]);
    }

    #[test]
    fn plain_prose_is_not_an_option() {
        let text = "\
1. ¿Quién sanciona las leyes?
El Rey sanciona y promulga las leyes.
a) El Rey
b) El Presidente
c) Las Cortes
";
        let blocks = LetteredFormat.extract(text);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].raw_options, vec!["El Rey", "El Presidente", "Las Cortes"]);
    }
}
