/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::orchestrator::RunStats;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，`verbose` 时为 `debug`。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 周边地块抓取");
    info!("🏠 目标地址: {}", config.target_address);
    info!("📏 搜索半径: {} 英里", config.radius_miles);
    info!("🌐 门户: {}", config.portal_url);
    if config.strict_radius {
        info!("🔒 严格模式: 超出半径的候选将被丢弃");
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 运行统计
/// - `record_count`: 结果集条数
/// - `output_path`: 输出文件路径（写入失败时为空）
pub fn print_final_stats(stats: &RunStats, record_count: usize, output_path: Option<&Path>) {
    info!("\n{}", "=".repeat(60));
    info!("📊 抓取完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("🏠 目标地块: {}", target_status(stats));
    info!("🔎 周边候选: {}", stats.discovered);
    info!("✅ 保留: {}/{}", stats.accepted, stats.discovered);
    info!("🧩 部分抽取: {}", stats.partial);
    info!(
        "❌ 跳过: {} (无结果 {}, 门户异常 {}, 抽取失败 {}, 超出半径 {})",
        stats.skipped(),
        stats.not_found,
        stats.transient,
        stats.extraction_failed,
        stats.outside_radius
    );
    if stats.duplicates > 0 {
        info!("♻️ 重复地址: {}", stats.duplicates);
    }
    info!("📦 结果集: {} 条记录", record_count);
    info!("{}", "=".repeat(60));
    if let Some(path) = output_path {
        info!("\n结果已保存至: {}", path.display());
    }
}

fn target_status(stats: &RunStats) -> String {
    match (&stats.target_failure, stats.target_extracted) {
        (Some(reason), _) => format!("失败 ({})", reason),
        (None, true) => "已抽取".to_string(),
        (None, false) => "未处理".to_string(),
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
