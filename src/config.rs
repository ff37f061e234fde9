use crate::error::{AppError, AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 各阶段题目文件的根目录（raw/ draft/ approved/ rejected/）
    pub questions_dir: String,
    /// 原始试卷目录
    pub exams_dir: String,
    /// 同时处理的文档数量
    pub max_concurrent_documents: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 人工复核清单
    pub review_file: String,
    // --- 文档转换器 ---
    pub converter_command: String,
    pub converter_timeout_secs: u64,
    // --- 发布 ---
    pub duplicate_threshold: f64,
    pub store_url: Option<String>,
    pub store_api_key: Option<String>,
    pub store_table: String,
    /// 额外知识库规则（TOML）
    pub knowledge_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            questions_dir: "questions".to_string(),
            exams_dir: "references/examenes".to_string(),
            max_concurrent_documents: 8,
            verbose_logging: false,
            output_log_file: "pipeline_log.txt".to_string(),
            review_file: "review.txt".to_string(),
            converter_command: "markitdown".to_string(),
            converter_timeout_secs: 120,
            duplicate_threshold: 0.90,
            store_url: None,
            store_api_key: None,
            store_table: "questions".to_string(),
            knowledge_file: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值，然后叠加环境变量
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            AppError::File(FileError::TomlParseFailed {
                path: path.display().to_string(),
                source: e,
            })
        })?;
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        let base = self;
        Self {
            questions_dir: std::env::var("QUESTIONS_DIR").unwrap_or(base.questions_dir),
            exams_dir: std::env::var("EXAMS_DIR").unwrap_or(base.exams_dir),
            max_concurrent_documents: std::env::var("MAX_CONCURRENT_DOCUMENTS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.max_concurrent_documents),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(base.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(base.output_log_file),
            review_file: std::env::var("REVIEW_FILE").unwrap_or(base.review_file),
            converter_command: std::env::var("CONVERTER_COMMAND").unwrap_or(base.converter_command),
            converter_timeout_secs: std::env::var("CONVERTER_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.converter_timeout_secs),
            duplicate_threshold: std::env::var("DUPLICATE_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(base.duplicate_threshold),
            store_url: std::env::var("STORE_URL").ok().or(base.store_url),
            store_api_key: std::env::var("STORE_API_KEY").ok().or(base.store_api_key),
            store_table: std::env::var("STORE_TABLE").unwrap_or(base.store_table),
            knowledge_file: std::env::var("KNOWLEDGE_FILE").ok().or(base.knowledge_file),
        }
    }

    /// 校验数值型配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_documents == 0 {
            return Err(ConfigError::OutOfRange {
                key: "max_concurrent_documents".to_string(),
                value: self.max_concurrent_documents.to_string(),
                expected: ">= 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.duplicate_threshold) {
            return Err(ConfigError::OutOfRange {
                key: "duplicate_threshold".to_string(),
                value: self.duplicate_threshold.to_string(),
                expected: "[0, 1]".to_string(),
            });
        }
        Ok(())
    }

    pub fn raw_dir(&self) -> PathBuf {
        Path::new(&self.questions_dir).join("raw")
    }

    pub fn draft_dir(&self) -> PathBuf {
        Path::new(&self.questions_dir).join("draft")
    }

    pub fn approved_dir(&self) -> PathBuf {
        Path::new(&self.questions_dir).join("approved")
    }

    pub fn rejected_dir(&self) -> PathBuf {
        Path::new(&self.questions_dir).join("rejected")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            questions_dir = "/tmp/qs"
            duplicate_threshold = 0.85
            "#,
        )
        .unwrap();
        assert_eq!(config.questions_dir, "/tmp/qs");
        assert_eq!(config.duplicate_threshold, 0.85);
        assert_eq!(config.max_concurrent_documents, 8);
        assert_eq!(config.store_table, "questions");
        assert!(config.store_url.is_none());
    }

    #[test]
    fn stage_dirs_hang_off_questions_dir() {
        let config = Config {
            questions_dir: "data".to_string(),
            ..Config::default()
        };
        assert_eq!(config.raw_dir(), Path::new("data").join("raw"));
        assert_eq!(config.rejected_dir(), Path::new("data").join("rejected"));
    }

    #[test]
    fn validate_rejects_bad_threshold() {
        let config = Config {
            duplicate_threshold: 1.5,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(Config::default().validate().is_ok());
    }
}
