//! 文档转换器 - 基础设施层
//!
//! 调用外部命令把 Office/PDF 文档转换为纯文本，只暴露"转换"能力。
//! 超时或失败时返回空文本，由上层记为零题文档。

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult, ConverterError, FileError};

/// 需要外部转换的扩展名
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["pdf", "docx", "doc"];

/// 直接读取的纯文本扩展名
pub const TEXT_EXTENSIONS: &[&str] = &["md", "txt"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// 文档转换器
///
/// 职责：
/// - 启动外部转换进程并限制运行时间
/// - 不认识题目，不处理业务流程
#[derive(Debug, Clone)]
pub struct DocumentConverter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl DocumentConverter {
    /// 创建新的转换器
    ///
    /// # 参数
    /// - `command`: 转换命令，可带参数（文件路径追加在最后）
    /// - `timeout_secs`: 超时秒数
    pub fn new(command: &str, timeout_secs: u64) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.converter_command, config.converter_timeout_secs)
    }

    /// 是否是本转换器能处理的文件
    pub fn supports(path: &Path) -> bool {
        let ext = extension_of(path);
        CONVERTIBLE_EXTENSIONS.contains(&ext.as_str()) || TEXT_EXTENSIONS.contains(&ext.as_str())
    }

    /// 转换文档
    ///
    /// # 返回
    /// 文档文本；任何失败都记录警告并返回空文本
    pub async fn convert(&self, path: &Path) -> String {
        match self.try_convert(path).await {
            Ok(text) => text,
            Err(e) => {
                warn!("⚠️ 文档转换失败，按空文档处理: {}", e);
                String::new()
            }
        }
    }

    /// 转换文档，保留错误信息
    pub async fn try_convert(&self, path: &Path) -> AppResult<String> {
        let path_str = path.display().to_string();

        if TEXT_EXTENSIONS.contains(&extension_of(path).as_str()) {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| AppError::file_read_failed(&path_str, e))?;
            return Ok(String::from_utf8_lossy(&bytes).into_owned());
        }

        debug!("调用转换器: {} {:?} {}", self.program, self.args, path_str);

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ConverterError::SpawnFailed {
                command: self.program.clone(),
                source: e,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ConverterError::SpawnFailed {
                command: self.program.clone(),
                source: e,
            })?,
            Err(_) => {
                return Err(ConverterError::Timeout {
                    path: path_str,
                    timeout_secs: self.timeout.as_secs(),
                }
                .into())
            }
        };

        if !output.status.success() {
            return Err(ConverterError::Failed {
                path: path_str,
                code: output.status.code(),
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// 递归扫描试卷目录
///
/// # 返回
/// 所有可处理的文件（排序、去重）
pub async fn scan_documents(root: &Path) -> AppResult<Vec<PathBuf>> {
    if !root.exists() {
        return Err(AppError::File(FileError::DirectoryNotFound {
            path: root.display().to_string(),
        }));
    }

    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| AppError::file_read_failed(dir.display().to_string(), e))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(path);
            } else if DocumentConverter::supports(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn text_files_are_read_directly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tema1.md");
        std::fs::write(&path, "1. **¿Pregunta?**").unwrap();

        let converter = DocumentConverter::new("no-existe-este-comando", 1);
        assert_eq!(converter.convert(&path).await, "1. **¿Pregunta?**");
    }

    #[tokio::test]
    async fn missing_converter_yields_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examen.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        let converter = DocumentConverter::new("no-existe-este-comando --flag", 1);
        assert!(matches!(
            converter.try_convert(&path).await,
            Err(AppError::Converter(ConverterError::SpawnFailed { .. }))
        ));
        assert_eq!(converter.convert(&path).await, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn converter_output_and_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examen.pdf");
        std::fs::write(&path, b"%PDF").unwrap();

        // 路径追加在参数之后
        let echo = DocumentConverter::new("echo texto", 5);
        let text = echo.try_convert(&path).await.unwrap();
        assert_eq!(text.trim(), format!("texto {}", path.display()));

        let failing = DocumentConverter::new("false", 5);
        assert!(matches!(
            failing.try_convert(&path).await,
            Err(AppError::Converter(ConverterError::Failed { code: Some(1), .. }))
        ));
    }

    #[tokio::test]
    async fn scan_walks_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("Test Contratos");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("TEMA 2.docx"), b"").unwrap();
        std::fs::write(dir.path().join("TEMA 1.pdf"), b"").unwrap();
        std::fs::write(dir.path().join("notas.xlsx"), b"").unwrap();

        let files = scan_documents(dir.path()).await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|f| DocumentConverter::supports(f)));
    }
}
