use crate::error::{AppError, AppResult, FileError};
use crate::models::stage_file::{StageFile, StageMetadata};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// 逐条解析的记录
#[derive(Debug, Clone)]
pub enum LoadedRecord<T> {
    /// 解析成功的记录，附带原始 JSON（用于检查缺失字段）
    Valid { record: T, raw: serde_json::Value },
    /// 无法解析的记录：保留原始 JSON 和错误信息
    Malformed {
        raw: serde_json::Value,
        error: String,
    },
}

#[derive(Deserialize)]
struct LooseStageFile {
    #[serde(default)]
    metadata: StageMetadata,
    #[serde(default)]
    questions: Vec<serde_json::Value>,
}

/// 列出目录中以 `suffix` 结尾的阶段文件（按文件名排序，跳过以 `_` 开头的汇总文件）
pub async fn list_stage_files(folder: &Path, suffix: &str) -> AppResult<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(AppError::File(FileError::DirectoryNotFound {
            path: folder.display().to_string(),
        }));
    }

    let mut files = Vec::new();
    let mut entries = fs::read_dir(folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder.display().to_string(), e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('_') || !name.ends_with(suffix) {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

/// 严格加载整个阶段文件
pub async fn load_stage_file<T: DeserializeOwned>(path: &Path) -> AppResult<StageFile<T>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    serde_json::from_str(&content)
        .map_err(|e| AppError::json_parse_failed(path.display().to_string(), e))
}

/// 宽松加载：单条记录解析失败不会影响同一文件中的其他记录
pub async fn load_stage_file_lenient<T: DeserializeOwned>(
    path: &Path,
) -> AppResult<(StageMetadata, Vec<LoadedRecord<T>>)> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let loose: LooseStageFile = serde_json::from_str(&content)
        .map_err(|e| AppError::json_parse_failed(path.display().to_string(), e))?;

    let records = loose
        .questions
        .into_iter()
        .map(|raw| match serde_json::from_value::<T>(raw.clone()) {
            Ok(record) => LoadedRecord::Valid { record, raw },
            Err(e) => {
                tracing::warn!("记录解析失败 {}: {}", path.display(), e);
                LoadedRecord::Malformed {
                    raw,
                    error: e.to_string(),
                }
            }
        })
        .collect();

    Ok((loose.metadata, records))
}

/// 保存 JSON 文件（必要时创建父目录）
pub async fn save_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| AppError::file_write_failed(parent.display().to_string(), e))?;
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    tracing::debug!("已写入: {}", path.display());
    Ok(())
}

/// 根据上一阶段的文件名生成下一阶段的文件名
///
/// `tema_1_raw.json` + (`_raw.json`, `_draft.json`) → `tema_1_draft.json`
pub fn next_stage_name(path: &Path, from_suffix: &str, to_suffix: &str) -> String {
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let base = name.strip_suffix(from_suffix).unwrap_or(&name);
    format!("{}{}", base, to_suffix)
}

/// 由试卷相对于 `root` 的路径生成阶段文件名前缀
///
/// 目录名与文件名以 `_` 连接，非单词字符替换为 `_`，
/// 这样不同目录下的同名试卷不会写到同一个文件：
/// `Test Contratos/TEMA 1.md` → `Test_Contratos_TEMA_1`
///
/// 开头的 `_` 会被去掉（`_` 开头的文件在列目录时被跳过）
pub fn safe_file_stem(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    let joined = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("_");

    let safe: String = joined
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    match safe.trim_start_matches('_') {
        "" => "documento".to_string(),
        trimmed => trimmed.to_string(),
    }
}
