//! # 提取器配置数据模型
//!
//! 定义了提取流水线的可配置项（ExtractorSettings）。
//! 配置文件默认位于 `~/.mo/CPH/config.json`，所有字段均可省略，缺省值即为
//! 针对 `@anthropic-ai/claude-code` + claude-trace 的标准配置。

use serde::Deserialize;

/// 版本过期警告字符串
///
/// Claude Code 启动时检测到自身版本过旧会打印这句提示并退出，
/// 修补器以它为锚点定位版本检查函数。
pub const DEFAULT_VERSION_CHECK_MARKER: &str = "It looks like your version of Claude Code";

/// 提取器配置
///
/// 对应配置文件 JSON（camelCase 键名）：
/// ```json
/// {
///   "packageName": "@anthropic-ai/claude-code",
///   "captureDir": ".claude-trace",
///   "tracerArgs": ["--yes", "@mariozechner/claude-trace", "--claude-path", "{script}"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractorSettings {
    /// npm 包名
    pub package_name: String,

    /// npm registry 根地址（不含结尾斜杠）
    pub registry_url: String,

    /// 包内入口脚本的相对路径
    pub script_path: String,

    /// 修补器定位版本检查函数所用的标记字符串
    pub version_check_marker: String,

    /// 抓包命令（可执行文件名）
    pub tracer_command: String,

    /// 抓包命令参数模板，`{script}` 和 `{prompt}` 会被逐个参数替换
    pub tracer_args: Vec<String>,

    /// 发给 Claude Code 的一次性提示词
    pub prompt: String,

    /// 抓包命令的超时时间（秒），超时后子进程被终止
    pub tracer_timeout_secs: u64,

    /// 抓包输出子目录（相对于运行时工作目录）
    pub capture_dir: String,

    /// 抓包文件名前缀
    pub capture_prefix: String,

    /// 抓包文件扩展名
    pub capture_extension: String,

    /// 报告输出目录：`None` 表示当前工作目录
    pub output_dir: Option<String>,
}

impl Default for ExtractorSettings {
    fn default() -> Self {
        Self {
            package_name: "@anthropic-ai/claude-code".to_string(),
            registry_url: "https://registry.npmjs.org".to_string(),
            script_path: "cli.js".to_string(),
            version_check_marker: DEFAULT_VERSION_CHECK_MARKER.to_string(),
            tracer_command: "npx".to_string(),
            tracer_args: [
                "--yes",
                "@mariozechner/claude-trace",
                "--include-all-requests",
                "--claude-path",
                "{script}",
                "--run-with",
                "-p",
                "{prompt}",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            prompt: "Hello".to_string(),
            tracer_timeout_secs: 300,
            capture_dir: ".claude-trace".to_string(),
            capture_prefix: "log-".to_string(),
            capture_extension: ".jsonl".to_string(),
            output_dir: None,
        }
    }
}
