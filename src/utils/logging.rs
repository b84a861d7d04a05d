use anyhow::Result;
/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use std::fs;
use tracing::info;

use crate::config::Config;
use crate::workflow::{RunOutcome, RunSummary};

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n日历事件清理日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 日历事件批量删除");
    info!("🔎 正则: /{}/{}", config.match_pattern, config.match_flags);
    info!("📊 最多处理 {} 页", config.max_pages);
    if let Some(profile) = &config.profile_file {
        info!("📁 配置档: {}", profile);
    }
    info!("{}", "=".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `summary`: 运行汇总
/// - `log_file_path`: 日志文件路径
pub fn print_final_summary(summary: &RunSummary, log_file_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 删除流程统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    match &summary.outcome {
        RunOutcome::Done => info!("✅ 状态: 完成"),
        RunOutcome::Aborted { reason } => info!("❌ 状态: 中止 ({})", reason),
    }
    info!("📄 页数: {}/{}", summary.pages_visited, summary.max_pages);
    info!("🗑️ 删除: {}", summary.total_deleted);
    info!("⚠️ 错误: {}", summary.total_errors);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", log_file_path);
    println!("\n{}", summary);
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
