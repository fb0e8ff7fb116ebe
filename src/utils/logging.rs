/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use crate::config::Config;
use crate::orchestrator::RunStats;
use crate::workflow::SemesterCtx;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 info，详细模式下本 crate 使用 debug
pub fn init(verbose: bool) {
    let default_directive = if verbose {
        "info,jntuh_results=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 成绩单抓取模式");
    info!("🌐 成绩入口: {}", config.base_url);
    info!(
        "📊 最大并发数: {} | 请求超时: {} 秒",
        config.max_concurrent_requests, config.request_timeout_secs
    );
    info!("{}", "=".repeat(60));
}

/// 记录学期开始信息
pub fn log_semester_start(ctx: &SemesterCtx, task_count: usize) {
    info!("{} 📦 开始抓取，共 {} 个请求", ctx, task_count);
}

/// 记录学期完成信息
pub fn log_semester_complete(ctx: &SemesterCtx, subject_count: usize) {
    if subject_count > 0 {
        info!("{} ✓ 完成: {} 门科目", ctx, subject_count);
    } else {
        info!("{} 无成绩", ctx);
    }
}

/// 打印单次运行的统计信息
pub fn print_final_stats(hall_ticket: &str, stats: &RunStats, found: bool) {
    info!("{}", "─".repeat(60));
    info!("📊 [{}] 抓取完成统计", hall_ticket);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!(
        "页面: 共 {} | 成功 {} | 无成绩 {} | 异常 {} | 失败 {}",
        stats.pages(),
        stats.parsed,
        stats.no_result,
        stats.malformed,
        stats.absent
    );
    if found {
        info!("✅ 科目总数: {}", stats.subjects);
    } else {
        info!("❌ 未找到可用成绩");
    }
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
