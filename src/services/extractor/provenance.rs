use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::models::raw_block::Provenance;
use crate::models::subject::Category;

/// 从文件名识别主题编号（按顺序，先匹配者生效）
static TOPIC_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)TEMA\s*(\d+)",
        r"(?i)TEST\s+TEMA\s*(\d+)",
        r"(?i)^(\d+)\s+TEST",
        r"(?i)TEMA(\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("constant pattern"))
    .collect()
});

/// 从文件名识别主题编号，识别不到时为 0
pub fn detect_topic(file_name: &str) -> u32 {
    let upper = file_name.to_uppercase();
    TOPIC_RES
        .iter()
        .find_map(|re| re.captures(&upper))
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// 根据文件路径识别来源信息
///
/// # 参数
/// - `path`: 试卷文件路径
///
/// # 返回
/// 文件名、主题编号（文件名）和分类（上级目录名）
pub fn detect_provenance(path: &Path) -> Provenance {
    let source_file = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    let parent = path
        .parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Provenance {
        topic: detect_topic(&source_file),
        category: Category::from_folder_name(&parent),
        source_file,
    }
}
