use anyhow::Result;
use clap::Parser;
use novel_translate::app::App;
use novel_translate::cli::Cli;
use novel_translate::config::Config;
use novel_translate::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config, cli.yes).await?.run(&cli.document).await?;

    Ok(())
}
