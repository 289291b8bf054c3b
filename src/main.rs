//! # Claude Prompt History - 命令行入口点
//!
//! 所有初始化和子命令分发均在 `app_lib`（即 `lib.rs`）中完成。

use std::process::ExitCode;

fn main() -> ExitCode {
    app_lib::run()
}
