use serde::{Deserialize, Serialize};

use crate::models::subject::Category;

/// 题块的版式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockFormat {
    /// `1. **题干**` + 编号选项
    Bold,
    /// `# 题干` + 项目符号/编号选项
    Heading,
    /// `1. 题干` + `a)`–`d)` 选项
    Lettered,
}

impl BlockFormat {
    pub fn name(self) -> &'static str {
        match self {
            BlockFormat::Bold => "bold",
            BlockFormat::Heading => "heading",
            BlockFormat::Lettered => "lettered",
        }
    }
}

/// 文档来源信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Provenance {
    pub source_file: String,
    #[serde(rename = "tema")]
    pub topic: u32,
    #[serde(rename = "categoria")]
    pub category: Category,
}

/// 抽取出的原始题块：一个题干加 3–4 个选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBlock {
    pub raw_text: String,
    pub raw_options: Vec<String>,
    pub format: BlockFormat,
    #[serde(default)]
    pub provenance: Provenance,
}
