use anyhow::Result;
use clap::Parser;
use tracing::info;

use property_scraper::cli::Cli;
use property_scraper::utils::logging;
use property_scraper::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置：文件 → 环境变量 → 命令行
    let mut config = Config::load(cli.config.as_deref()).await?;
    cli.apply(&mut config);
    config.validate()?;

    logging::init(config.verbose_logging);

    let app = App::initialize(config).await?;

    // Ctrl-C 时会话先释放，再以错误退出（非零状态码）
    let path = app.run().await?;
    info!("✅ 完成: {}", path.display());

    Ok(())
}
