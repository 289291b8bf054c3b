//! # 命令行参数定义

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// 配置文件路径的环境变量
pub const ENV_CONFIG: &str = "CPH_CONFIG";
/// 报告输出目录的环境变量
pub const ENV_OUT_DIR: &str = "CPH_OUT_DIR";

#[derive(Parser, Debug)]
#[command(name = "cph")]
#[command(
    version,
    about = "Extract Claude Code system prompts and tool definitions, one report per version",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (default: ~/.mo/CPH/config.json)
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Directory reports are written to (overrides outputDir in config)
    #[arg(long, short = 'o', global = true, env = ENV_OUT_DIR)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Extract a published version, or every version in a range
    Extract {
        /// First version (inclusive)
        from: String,

        /// Last version (inclusive)
        #[arg(long, conflicts_with = "latest")]
        to: Option<String>,

        /// Extract every version from FROM up to the newest release
        #[arg(long)]
        latest: bool,
    },
    /// Extract from a locally installed cli.js (patched in place, backup kept)
    Binary {
        /// Path to the entry script
        path: PathBuf,

        /// Report label (default: custom-<unix timestamp>)
        #[arg(long)]
        label: Option<String>,

        /// Release date written into the report header
        #[arg(long, default_value = "unknown")]
        release_date: String,
    },
    /// Disable the version check in a script file and report what happened
    Patch {
        /// Path to the entry script
        path: PathBuf,

        /// Do not keep a .cphbak backup of the original
        #[arg(long)]
        no_backup: bool,
    },
    /// Build a report from an existing capture file
    Report {
        /// Capture file (JSONL, one record per line)
        capture: PathBuf,

        /// Version label written into the report header
        #[arg(long)]
        label: String,

        /// Release date written into the report header
        #[arg(long, default_value = "unknown")]
        release_date: String,

        /// Write the report to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}
