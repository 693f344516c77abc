/// 日志工具模块
///
/// 提供审核会话日志格式化和输出的辅助函数
use std::fs;

use tracing::info;

use crate::error::{AppResult, FileError};

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n题目验证日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header).map_err(|e| FileError::WriteFailed {
        path: log_file_path.to_string(),
        source: Box::new(e),
    })?;
    Ok(())
}

/// 记录程序启动信息
///
/// # 参数
/// - `api_base_url`: 后端地址
/// - `use_mock_api`: 是否使用模拟后端
pub fn log_startup(api_base_url: &str, use_mock_api: bool) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 题目知识点验证模式");
    if use_mock_api {
        info!("🧪 使用模拟后端");
    } else {
        info!("🌐 后端地址: {}", api_base_url);
    }
    info!("{}", "=".repeat(60));
}

/// 记录批次加载信息
///
/// # 参数
/// - `total`: 题目总数
pub fn log_batch_loaded(total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 已获取新批次: 共 {} 道题目", total);
    info!("💡 所有题目已重置为待验证状态");
    info!("{}", "=".repeat(60));
}

/// 记录提交前的进度
///
/// # 参数
/// - `completed`: 已处理数量
/// - `total`: 题目总数
/// - `modified`: 已修改数量
pub fn log_submit_start(completed: usize, total: usize, modified: usize) {
    info!("\n{}", "─".repeat(60));
    info!("📤 正在提交本次验证: 已处理 {}/{}，其中修改 {}", completed, total, modified);
    info!("{}", "─".repeat(60));
}

/// 打印提交完成信息
///
/// # 参数
/// - `total`: 提交题目数量
/// - `message`: 后端确认消息
pub fn log_submit_complete(total: usize, message: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 提交完成");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 已提交: {} 道题目", total);
    info!("📨 后端回执: {}", message);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
