use regex::Regex;
use std::sync::LazyLock;

use super::{BlockBuilder, FormatExtractor};
use crate::models::raw_block::{BlockFormat, RawBlock};

/// `# 题干`（末尾的冒号去掉，问号保留）
static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#\s*(.+?):?\s*$").unwrap());

/// 章节标题而不是题目
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(TEMA|TEST|ORGANIZA|BLOQUE)").unwrap());

/// `* 1. 选项` 或 `1. 选项`
static OPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*?\s*(\d+)\.\s+(.+)$").unwrap());

/// 一级标题题干 + 项目符号/编号选项
///
/// ```text
/// # ¿Pregunta?
/// * 1. Opción a
///   2. Opción b
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingFormat;

impl FormatExtractor for HeadingFormat {
    fn format(&self) -> BlockFormat {
        BlockFormat::Heading
    }

    fn extract(&self, text: &str) -> Vec<RawBlock> {
        let mut builder = BlockBuilder::new(BlockFormat::Heading);

        for line in text.lines() {
            let stripped = line.trim();

            if !stripped.starts_with("##") {
                if let Some(caps) = QUESTION_RE.captures(stripped) {
                    let heading = caps[1].trim();
                    if TITLE_RE.is_match(heading) {
                        builder.reset();
                    } else {
                        builder.start(heading);
                    }
                    continue;
                }
            }

            if let Some(caps) = OPTION_RE.captures(stripped) {
                builder.push_option(&caps[2]);
            }
        }

        builder.finish()
    }
}
