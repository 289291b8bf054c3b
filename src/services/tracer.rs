//! # 抓包运行器
//!
//! 在临时工作目录中执行抓包命令（默认 claude-trace），让它以修补后的脚本运行一次 Claude Code，
//! 再按"子目录 + 文件名前缀 + 扩展名"定位抓包输出文件并读回全文。
//!
//! 同一目录下可能残留多次运行的抓包文件，取修改时间最新的一个。

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::models::settings::ExtractorSettings;
use crate::services::pipeline::TraceRunner;

/// 参数模板中的脚本路径占位符
const SCRIPT_PLACEHOLDER: &str = "{script}";
/// 参数模板中的提示词占位符
const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// 基于外部命令的抓包运行器
pub struct CommandTracer {
    command: String,
    args: Vec<String>,
    prompt: String,
    timeout: Duration,
    capture_dir: String,
    capture_prefix: String,
    capture_extension: String,
}

impl CommandTracer {
    pub fn new(settings: &ExtractorSettings) -> Self {
        Self {
            command: settings.tracer_command.clone(),
            args: settings.tracer_args.clone(),
            prompt: settings.prompt.clone(),
            timeout: Duration::from_secs(settings.tracer_timeout_secs),
            capture_dir: settings.capture_dir.clone(),
            capture_prefix: settings.capture_prefix.clone(),
            capture_extension: settings.capture_extension.clone(),
        }
    }
}

#[async_trait]
impl TraceRunner for CommandTracer {
    async fn run(&self, script: &Path, workdir: &Path) -> Result<String, String> {
        let args = expand_args(&self.args, script, &self.prompt);
        log::info!("运行抓包命令: {} {}", self.command, args.join(" "));

        let mut command = Command::new(&self.command);
        command
            .args(&args)
            .current_dir(workdir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| format!("抓包命令超时（{} 秒）", self.timeout.as_secs()))?
            .map_err(|e| format!("启动抓包命令失败: {}", e))?;

        // Claude Code 本身可能因网络或鉴权以非零状态退出，但请求已经被抓到，
        // 是否可用以抓包文件为准
        if !output.status.success() {
            log::warn!(
                "抓包命令以非零状态退出（{}）: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let capture = find_capture_file(
            &workdir.join(&self.capture_dir),
            &self.capture_prefix,
            &self.capture_extension,
        )
        .await?;
        log::debug!("抓包文件: {}", capture.display());

        tokio::fs::read_to_string(&capture)
            .await
            .map_err(|e| format!("读取抓包文件失败: {}", e))
    }
}

/// 替换参数模板中的占位符
///
/// 占位符可以出现在参数中间（如 `--claude-path={script}`），每个参数独立替换，不会拆分或合并参数。
pub fn expand_args(template: &[String], script: &Path, prompt: &str) -> Vec<String> {
    let script = script.to_string_lossy();
    template
        .iter()
        .map(|arg| {
            arg.replace(SCRIPT_PLACEHOLDER, &script)
                .replace(PROMPT_PLACEHOLDER, prompt)
        })
        .collect()
}

/// 在抓包目录中查找最新的抓包文件
///
/// # 参数
/// - `dir` - 抓包输出目录
/// - `prefix` - 文件名前缀（如 "log-"）
/// - `extension` - 文件扩展名（如 ".jsonl"）
///
/// # 错误
/// 目录不存在、不可读或没有匹配文件时返回错误
pub async fn find_capture_file(
    dir: &Path,
    prefix: &str,
    extension: &str,
) -> Result<PathBuf, String> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| format!("读取抓包目录 {} 失败: {}", dir.display(), e))?;

    let mut newest: Option<(std::time::SystemTime, PathBuf)> = None;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| format!("遍历抓包目录失败: {}", e))?
    {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with(prefix) || !name.ends_with(extension) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        let modified = metadata.modified().unwrap_or(std::time::UNIX_EPOCH);
        let path = entry.path();

        // 修改时间相同时按文件名取较大者（claude-trace 文件名内含时间戳）
        let is_newer = match &newest {
            None => true,
            Some((time, best)) => modified > *time || (modified == *time && path > *best),
        };
        if is_newer {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, path)| path).ok_or_else(|| {
        format!(
            "抓包目录 {} 中没有 {}*{} 文件",
            dir.display(),
            prefix,
            extension
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_args_substitutes_per_argument() {
        let template: Vec<String> = [
            "--claude-path",
            "{script}",
            "--run-with",
            "-p",
            "{prompt}",
            "--x={script}",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let args = expand_args(&template, Path::new("/w/cli.js"), "say hi");
        assert_eq!(
            args,
            vec!["--claude-path", "/w/cli.js", "--run-with", "-p", "say hi", "--x=/w/cli.js"]
        );
    }

    #[tokio::test]
    async fn test_find_capture_file_filters_by_prefix_and_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("log-2025-01-01.html"), "<html>").unwrap();
        std::fs::write(dir.path().join("other.jsonl"), "{}").unwrap();
        std::fs::write(dir.path().join("log-2025-01-01.jsonl"), "{}").unwrap();

        let found = find_capture_file(dir.path(), "log-", ".jsonl").await.unwrap();
        assert_eq!(found, dir.path().join("log-2025-01-01.jsonl"));
    }

    #[tokio::test]
    async fn test_find_capture_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_capture_file(dir.path(), "log-", ".jsonl").await.is_err());
        assert!(
            find_capture_file(&dir.path().join("absent"), "log-", ".jsonl")
                .await
                .is_err()
        );
    }
}
