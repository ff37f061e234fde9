//! 知识库（只读参考数据）
//!
//! 启动时加载一次，之后以 `Arc<KnowledgeBase>` 共享给解析器，运行期间不再修改。
//!
//! - `rules` - 有序规则表（先匹配者生效）
//! - `fallback` - 规则全部未命中时的兜底检查
//! - `facts` - 宪法基础数据静态表

pub mod facts;
pub mod fallback;
pub mod rules;

use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, AppResult, FileError};

pub use fallback::{FallbackCheck, FALLBACK_CHECKS};
pub use rules::{AnswerKey, KnowledgeRule, RuleDef};

/// 内置知识库版本
pub const KNOWLEDGE_BASE_VERSION: &str = "2025.1";

/// 扩展规则文件格式
///
/// ```toml
/// version = "local-1"
///
/// [[rule]]
/// pattern = "iniciativa legislativa popular"
/// answer = "500.000"
/// explanation = "..."
/// reference = "Art. 87.3 CE"
/// ```
#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default, rename = "rule")]
    rules: Vec<RuleDef>,
}

/// 知识库
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    rules: Vec<KnowledgeRule>,
    fallbacks: &'static [FallbackCheck],
    version: String,
}

impl KnowledgeBase {
    /// 仅包含内置规则
    pub fn builtin() -> AppResult<Self> {
        Ok(Self {
            rules: rules::builtin_rules()?,
            fallbacks: FALLBACK_CHECKS,
            version: KNOWLEDGE_BASE_VERSION.to_string(),
        })
    }

    /// 内置规则 + 可选扩展文件，返回共享的只读实例
    pub async fn load(extension: Option<&Path>) -> AppResult<Arc<Self>> {
        let mut kb = Self::builtin()?;
        if let Some(path) = extension {
            kb.extend_from_file(path).await?;
        }
        info!(
            "📚 知识库已加载: 版本 {}, {} 条规则, {} 条兜底检查",
            kb.version,
            kb.rules.len(),
            kb.fallbacks.len()
        );
        Ok(Arc::new(kb))
    }

    /// 追加扩展文件中的规则（排在内置规则之后）
    pub async fn extend_from_file(&mut self, path: &Path) -> AppResult<()> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        self.extend_from_toml(&content).map_err(|e| match e {
            AppError::File(FileError::TomlParseFailed { source, .. }) => {
                AppError::File(FileError::TomlParseFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    pub fn extend_from_toml(&mut self, content: &str) -> AppResult<()> {
        let file: KnowledgeFile = toml::from_str(content)?;
        for def in &file.rules {
            self.rules.push(def.compile()?);
        }
        if let Some(version) = file.version {
            self.version = format!("{}+{}", self.version, version);
        }
        Ok(())
    }

    pub fn rules(&self) -> &[KnowledgeRule] {
        &self.rules
    }

    pub fn fallbacks(&self) -> &[FallbackCheck] {
        self.fallbacks
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}
