use anyhow::Result;

use future_self_quiz::app::App;
use future_self_quiz::config::Config;
use future_self_quiz::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
