/// 日志工具模块
///
/// 提供批量生成过程中的日志输出辅助函数
use tracing::info;

/// 记录一轮生成开始的信息
///
/// # 参数
/// - `total`: 期望的题目总数
/// - `batch_size`: 每批题目数量
/// - `total_batches`: 批次总数
pub fn log_run_start(total: usize, batch_size: usize, total_batches: usize) {
    info!("{}", "=".repeat(60));
    info!("🚀 开始批量生成题目");
    info!("📊 目标数量: {} 道，每批 {} 道，共 {} 批", total, batch_size, total_batches);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始的信息
///
/// # 参数
/// - `batch_num`: 批次编号（从 1 开始）
/// - `total_batches`: 批次总数
/// - `batch_count`: 本批请求的题目数量
pub fn log_batch_start(batch_num: usize, total_batches: usize, batch_count: usize) {
    info!("📦 正在生成第 {}/{} 批（本批 {} 道）...", batch_num, total_batches, batch_count);
}

/// 记录批次完成的信息
///
/// # 参数
/// - `batch_num`: 批次编号
/// - `valid`: 通过校验的题目数量
/// - `returned`: 接口返回的题目数量
pub fn log_batch_complete(batch_num: usize, valid: usize, returned: usize) {
    info!("✓ 第 {} 批完成: 有效 {}/{}", batch_num, valid, returned);
}

/// 打印一轮生成的最终统计信息
///
/// # 参数
/// - `generated`: 实际生成的题目数量
/// - `total`: 期望的题目总数
pub fn log_run_complete(generated: usize, total: usize) {
    info!("{}", "─".repeat(60));
    info!("📊 生成完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 共生成 {}/{} 道题目", generated, total);
    info!("{}", "─".repeat(60));
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
