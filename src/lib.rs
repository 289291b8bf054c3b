//! # Claude Prompt History - 命令行应用核心
//!
//! 从 Claude Code 的网络抓包中提取系统提示词、首条用户消息和工具定义，
//! 每个版本生成一份可 diff 的 Markdown 报告。
//!
//! ## 架构说明
//! 核心逻辑放在 `lib.rs` 中，`main.rs` 只负责调用 [`run`]，便于测试直接使用库接口。
//!
//! ## 模块结构
//! - `cli` - 命令行参数定义
//! - `commands/` - 子命令处理函数
//! - `models/` - 数据模型（抓包记录、配置、报告输入）
//! - `services/` - 核心业务逻辑（修补、解析、选择、归一化、格式化、流水线）
//! - `utils/` - 通用工具函数

mod cli;
mod commands;
pub mod error;
pub mod models;
pub mod services;
mod utils;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;

/// 应用启动函数
///
/// 1. 初始化日志（默认 info 级别，可通过 `RUST_LOG` 覆盖，输出到 stderr）
/// 2. 解析命令行参数
/// 3. 在单线程 tokio 运行时中执行子命令
///
/// 任何失败都会记录为 error 日志并返回非零退出码。
pub fn run() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("创建异步运行时失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(commands::dispatch(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
