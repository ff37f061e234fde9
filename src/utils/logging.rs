//! 日志工具
//!
//! tracing 初始化、运行日志文件头和各阶段的日志横幅
use std::fs;
use std::sync::Once;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{AppError, AppResult};

static INIT: Once = Once::new();

/// 初始化 tracing 订阅器
///
/// 读取 `RUST_LOG`，未设置时默认 `info`；重复调用无副作用
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(false))
            .with(filter)
            .init();
    });
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
/// - `stage`: 本次运行的阶段名称
pub fn init_log_file(log_file_path: &str, stage: &str) -> AppResult<()> {
    let log_header = format!(
        "{rule}\n题目流水线日志 | 阶段 {} | 开始于 {}\n{rule}\n\n",
        stage,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        rule = "#".repeat(60),
    );
    fs::write(log_file_path, log_header)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

/// 记录阶段启动信息
pub fn log_startup(stage: &str, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 阶段 {} 启动（文档并发上限 {}）", stage, max_concurrent);
}

/// 记录阶段输入
///
/// # 参数
/// - `stage`: 阶段名称
/// - `total`: 文档总数
/// - `max_concurrent`: 最大并发数
pub fn log_documents_loaded(stage: &str, total: usize, max_concurrent: usize) {
    info!("✓ [{}] 待处理文档 {} 个，每批最多 {} 个", stage, total, max_concurrent);
}

/// 记录批次开始信息
///
/// # 参数
/// - `stage`: 阶段名称
/// - `batch_num`: 批次编号
/// - `total_batches`: 批次总数
/// - `range`: 本批文档编号（含两端）
/// - `total`: 文档总数
pub fn log_batch_start(
    stage: &str,
    batch_num: usize,
    total_batches: usize,
    range: (usize, usize),
    total: usize,
) {
    info!("{}", "─".repeat(60));
    info!(
        "📦 [{}] 第 {}/{} 批: 文档 {}-{} / 共 {} 个",
        stage, batch_num, total_batches, range.0, range.1, total
    );
}

/// 记录批次完成信息
pub fn log_batch_complete(stage: &str, batch_num: usize, success: usize, total: usize) {
    let failed = total - success;
    if failed == 0 {
        info!("✓ [{}] 第 {} 批完成: {}/{}", stage, batch_num, success, total);
    } else {
        info!(
            "⚠️ [{}] 第 {} 批完成: 成功 {}/{}，失败 {}",
            stage, batch_num, success, total, failed
        );
    }
}

/// 输出阶段汇总
///
/// # 参数
/// - `stage`: 阶段名称
/// - `lines`: 统计行（名称, 数值）
/// - `log_file_path`: 日志文件路径
pub fn print_stage_summary(stage: &str, lines: &[(&str, usize)], log_file_path: &str) {
    let width = lines
        .iter()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);

    info!("{}", "=".repeat(60));
    info!(
        "📊 阶段 {} 完成 ({})",
        stage,
        chrono::Local::now().format("%H:%M:%S")
    );
    for (name, value) in lines {
        let pad = width - name.chars().count();
        info!("  {}{} : {}", name, " ".repeat(pad), value);
    }
    info!("📝 运行日志: {}", log_file_path);
    info!("{}", "=".repeat(60));
}

/// 按字符截断长文本（题干预览用）
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
