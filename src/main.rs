use anyhow::Result;
use clap::Parser;

use oposita_pipeline::cli::Cli;
use oposita_pipeline::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 解析参数并运行
    Cli::parse().run().await
}
