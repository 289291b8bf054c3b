//! # 命令处理模块
//!
//! 每个子命令对应一个处理函数，负责把命令行参数和配置转换为服务层调用：
//! - `extract` - 按版本提取（`extract`）和使用本地脚本提取（`binary`）
//! - `patch` - 单独修补脚本
//! - `report` - 由已有抓包文件生成报告
//! - `settings` - 配置文件加载

pub mod extract;
pub mod patch;
pub mod report;
pub mod settings;

use crate::cli::{Cli, Commands};

/// 按子命令分发
///
/// # 错误
/// 配置加载失败或子命令执行失败时返回错误信息
pub async fn dispatch(cli: Cli) -> Result<(), String> {
    let settings = settings::load_settings(cli.config.as_deref()).await?;
    let out_dir = settings::resolve_out_dir(cli.out_dir.as_deref(), &settings);

    match cli.command {
        Commands::Extract { from, to, latest } => {
            extract::extract(&from, to.as_deref(), latest, &settings, &out_dir).await
        }
        Commands::Binary {
            path,
            label,
            release_date,
        } => extract::binary(&path, label.as_deref(), &release_date, &settings, &out_dir).await,
        Commands::Patch { path, no_backup } => patch::patch(&path, no_backup, &settings).await,
        Commands::Report {
            capture,
            label,
            release_date,
            out,
        } => report::report(&capture, &label, &release_date, out.as_deref()).await,
    }
}
