/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 `info`，`verbose` 时为 `debug`。
/// 重复初始化（比如测试里）会被忽略。
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
///
/// # 参数
/// - `course_id`: 课程 ID
/// - `quiz_id`: 测验 ID
/// - `endpoint`: 答案来源描述
pub fn log_startup(course_id: &str, quiz_id: &str, endpoint: &str) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📚 课程: {} / 测验: {}", course_id, quiz_id);
    info!("🔗 答案来源: {}", endpoint);
    info!("{}", "=".repeat(60));
}

/// 记录题目提取结果
///
/// # 参数
/// - `total`: 题目总数
/// - `by_kind`: 各题型数量（题型名, 数量）
pub fn log_questions_found(total: usize, by_kind: &[(String, usize)]) {
    info!("✓ 找到 {} 道题目", total);
    for (kind, count) in by_kind.iter().filter(|(_, count)| *count > 0) {
        info!("  - {}: {}", kind, count);
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `answered`: 拿到答案的题数
/// - `failed`: 请求失败的题数
/// - `total`: 题目总数
pub fn log_run_complete(answered: usize, failed: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 有答案: {}/{}", answered, total);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
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
