use tracing::info;
/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// 默认级别 info，可通过 RUST_LOG 环境变量覆盖；
/// verbose 打开 debug 级别
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// 记录服务启动信息
///
/// # 参数
/// - `bind_addr`: 监听地址
/// - `text_model`: 文本模型名称
/// - `image_model`: 图片模型名称
pub fn log_startup(bind_addr: &str, text_model: &str, image_model: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 FutureSelf 服务启动");
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📡 监听地址: {}", bind_addr);
    info!("🧠 文本模型: {}", text_model);
    info!("🎨 图片模型: {}", image_model);
    info!("{}", "=".repeat(60));
}
