//! 命令行入口
//!
//! 只负责解析参数和路由，所有逻辑都在库中

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::orchestrator::{App, Stage};

#[derive(Parser, Debug)]
#[command(
    name = "oposita-pipeline",
    version,
    about = "试卷题目抽取、解析、审核与发布流水线"
)]
pub struct Cli {
    /// 配置文件（TOML），未指定时只使用环境变量和默认值
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// 从试卷目录抽取题目（→ raw/）
    Extract,
    /// 生成待解析草稿（raw/ → draft/）
    Prepare,
    /// 用知识库解析正确答案（draft/）
    Resolve,
    /// 质量评分与分流（draft/ → approved/ + rejected/）
    Review,
    /// 查重并发布（approved/ → 题库）
    Publish,
    /// 依次运行全部阶段
    All,
    /// 查看各阶段状态
    Status,
}

impl From<Commands> for Stage {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Extract => Stage::Extract,
            Commands::Prepare => Stage::Prepare,
            Commands::Resolve => Stage::Resolve,
            Commands::Review => Stage::Review,
            Commands::Publish => Stage::Publish,
            Commands::All => Stage::All,
            Commands::Status => Stage::Status,
        }
    }
}

impl Cli {
    /// 加载配置
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => Config::from_toml_file(path)
                .with_context(|| format!("无法加载配置文件: {}", path.display())),
            None => Ok(Config::from_env()),
        }
    }

    /// 运行子命令
    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let app = App::initialize(config).await.context("初始化失败")?;
        app.run(self.command.into())
            .await
            .with_context(|| format!("阶段 {:?} 运行失败", self.command))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subcommand_and_global_config() {
        let cli = Cli::try_parse_from(["oposita-pipeline", "review", "--config", "p.toml"]).unwrap();
        assert_eq!(cli.command, Commands::Review);
        assert_eq!(cli.config, Some(PathBuf::from("p.toml")));
        assert_eq!(Stage::from(cli.command), Stage::Review);
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["oposita-pipeline"]).is_err());
    }
}
