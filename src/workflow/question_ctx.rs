//! 题目处理上下文
//!
//! 封装"我正在处理哪个文档的第几题"这一信息

use std::fmt::Display;

/// 题目处理上下文
///
/// 包含处理单个题目所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct QuestionCtx {
    /// 来源文件名
    pub document: String,

    /// 文档索引（仅用于日志显示）
    pub document_index: usize,

    /// 题目在文档中的索引（从0开始，与选项索引一致）
    pub question_index: usize,

    /// 主题编号
    pub topic: u32,
}

impl QuestionCtx {
    /// 创建新的题目上下文
    pub fn new(document: String, document_index: usize, question_index: usize, topic: u32) -> Self {
        Self {
            document,
            document_index,
            question_index,
            topic,
        }
    }
}

impl Display for QuestionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文档 {} 题目#{} 主题#{}]",
            self.document, self.question_index, self.topic
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_document_and_question() {
        let ctx = QuestionCtx::new("TEMA 3.docx".to_string(), 2, 7, 3);
        assert_eq!(ctx.to_string(), "[文档 TEMA 3.docx 题目#7 主题#3]");
    }
}
