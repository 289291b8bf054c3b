//! # 路径工具函数
//!
//! 提供与文件路径相关的工具函数，包括：
//! - 获取 CPH 自身配置目录路径（`~/.mo/CPH/`）
//! - 报告产物文件命名（版本标签或时间戳标签）

use std::path::PathBuf;

/// 获取 CPH 配置目录的绝对路径
///
/// 与 CCR 一样存放在 `~/.mo/` 下，避免污染 Claude Code 自身的 `~/.claude/` 目录。
///
/// # 错误
/// 如果无法确定用户主目录，返回错误信息。
pub fn get_cph_config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or_else(|| "无法获取用户主目录".to_string())?;
    Ok(home.join(".mo").join("CPH"))
}

/// 报告产物文件名：`prompts-{label}.md`
///
/// 标签中的路径分隔符和其他不适合出现在文件名中的字符替换为 `-`。
pub fn artifact_file_name(label: &str) -> String {
    let safe: String = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    format!("prompts-{}.md", safe)
}

/// 自定义脚本运行时使用的时间戳标签
pub fn timestamp_label(unix_secs: u64) -> String {
    format!("custom-{}", unix_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_file_name_version() {
        assert_eq!(artifact_file_name("1.0.44"), "prompts-1.0.44.md");
    }

    #[test]
    fn test_artifact_file_name_sanitizes() {
        assert_eq!(artifact_file_name("../x:y"), "prompts-..-x-y.md");
    }

    #[test]
    fn test_timestamp_label() {
        assert_eq!(timestamp_label(1_740_000_000), "custom-1740000000");
    }
}
