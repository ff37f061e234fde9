//! 人工复核写入服务 - 业务能力层
//!
//! 只负责"写 review.txt"能力，不关心流程

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 人工复核写入服务
///
/// 职责：
/// - 将被拒绝或未解析的题目追加到 review.txt
/// - 只处理单个题目
/// - 不关心流程顺序
#[derive(Debug, Clone)]
pub struct ReviewWriter {
    review_file_path: PathBuf,
}

impl ReviewWriter {
    /// 创建新的复核写入服务
    pub fn new() -> Self {
        Self {
            review_file_path: PathBuf::from("review.txt"),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            review_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.review_file_path
    }

    /// 清空复核清单，开始新一轮审核
    ///
    /// 审核阶段会为每个被拒绝的题目重新写一行，重跑时不清空会重复
    pub fn reset(&self) -> AppResult<()> {
        let path = self.review_file_path.display().to_string();
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.review_file_path)
            .map_err(|e| AppError::file_write_failed(&path, e))?;
        debug!("已清空复核清单: {}", path);
        Ok(())
    }

    /// 写入复核记录
    ///
    /// # 参数
    /// - `document`: 来源文件名
    /// - `question_index`: 题目索引
    /// - `stem`: 题干内容
    /// - `reasons`: 需要复核的原因
    pub fn write(
        &self,
        document: &str,
        question_index: usize,
        stem: &str,
        reasons: &[String],
    ) -> AppResult<()> {
        debug!(
            "写入复核记录: 文档 {} | 题目 {} | 原因 {} 条",
            document,
            question_index,
            reasons.len()
        );

        let path = self.review_file_path.display().to_string();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.review_file_path)
            .map_err(|e| AppError::file_write_failed(&path, e))?;

        let line = format!(
            "文档 {} | 题目 {} | 题干: {} | 原因: {}\n",
            document,
            question_index,
            stem,
            reasons.join("; ")
        );

        file.write_all(line.as_bytes())
            .map_err(|e| AppError::file_write_failed(&path, e))?;

        Ok(())
    }
}

impl Default for ReviewWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_one_line_per_item() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReviewWriter::with_path(dir.path().join("review.txt"));
        writer
            .write("tema1.md", 0, "¿Pregunta?", &["Sin referencia legal".to_string()])
            .unwrap();
        writer.write("tema1.md", 3, "¿Otra?", &[]).unwrap();

        let content = std::fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("题目 0"));
        assert!(lines[0].ends_with("原因: Sin referencia legal"));
    }

    #[test]
    fn reset_starts_a_fresh_run() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReviewWriter::with_path(dir.path().join("review.txt"));
        for _ in 0..2 {
            writer.reset().unwrap();
            writer.write("tema1.md", 0, "¿Pregunta?", &[]).unwrap();
            writer.write("tema1.md", 1, "¿Otra?", &[]).unwrap();
        }

        let content = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn reset_fails_when_path_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ReviewWriter::with_path(dir.path());
        assert!(writer.reset().is_err());
        assert!(writer.write("tema1.md", 0, "¿Pregunta?", &[]).is_err());
    }
}
