use anyhow::Result;
use calendar_purge::{logger, App, Config};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = match Config::load().await {
        Ok(config) => config,
        Err(e) => {
            logger::init(false);
            error!("配置加载失败: {}", e);
            return Err(e.into());
        }
    };

    // 初始化日志
    logger::init(config.verbose_logging);

    // 初始化并运行应用
    let summary = App::initialize(config).await?.run().await?;

    if let Some(summary) = summary {
        if !summary.is_done() {
            std::process::exit(2);
        }
    }

    Ok(())
}
