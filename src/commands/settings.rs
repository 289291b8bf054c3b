//! # 配置加载
//!
//! 读取 `~/.mo/CPH/config.json`（或 `--config` 指定的文件），并与命令行参数合并：
//! - 文件不存在：使用全部默认值
//! - 文件存在但无法解析：报错，不静默回退到默认值
//! - 输出目录优先级：`--out-dir` > 配置中的 `outputDir` > 当前工作目录

use std::path::{Path, PathBuf};

use crate::models::settings::ExtractorSettings;
use crate::utils::path;

/// 配置文件名
const CONFIG_FILE_NAME: &str = "config.json";

/// 加载提取器配置
///
/// # 参数
/// - `explicit` - 命令行显式指定的配置文件路径；为 `None` 时使用默认位置
///
/// # 错误
/// 文件存在但无法读取或 JSON 解析失败时返回错误
pub async fn load_settings(explicit: Option<&Path>) -> Result<ExtractorSettings, String> {
    let config_path = match explicit {
        Some(p) => p.to_path_buf(),
        None => path::get_cph_config_path()?.join(CONFIG_FILE_NAME),
    };

    if !config_path.exists() {
        // 显式指定却不存在多半是拼写错误，提醒一下但不中止
        if explicit.is_some() {
            log::warn!("配置文件不存在，使用默认配置: {}", config_path.display());
        } else {
            log::debug!("未找到配置文件，使用默认配置");
        }
        return Ok(ExtractorSettings::default());
    }

    let content = tokio::fs::read_to_string(&config_path)
        .await
        .map_err(|e| format!("读取配置文件失败: {}", e))?;

    let settings: ExtractorSettings = serde_json::from_str(&content)
        .map_err(|e| format!("解析配置文件 {} 失败: {}", config_path.display(), e))?;
    log::debug!("已加载配置文件: {}", config_path.display());
    Ok(settings)
}

/// 计算报告输出目录
pub fn resolve_out_dir(cli_out_dir: Option<&Path>, settings: &ExtractorSettings) -> PathBuf {
    cli_out_dir
        .map(Path::to_path_buf)
        .or_else(|| settings.output_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(Some(&dir.path().join("absent.json")))
            .await
            .unwrap();
        assert_eq!(settings, ExtractorSettings::default());
    }

    #[tokio::test]
    async fn test_partial_file_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.json");
        std::fs::write(&file, r#"{"registryUrl": "http://localhost:4873"}"#).unwrap();

        let settings = load_settings(Some(&file)).await.unwrap();
        assert_eq!(settings.registry_url, "http://localhost:4873");
        assert_eq!(settings.package_name, "@anthropic-ai/claude-code");
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.json");
        std::fs::write(&file, "{ not json").unwrap();

        assert!(load_settings(Some(&file)).await.is_err());
    }

    #[test]
    fn test_out_dir_precedence() {
        let mut settings = ExtractorSettings::default();
        assert_eq!(resolve_out_dir(None, &settings), PathBuf::from("."));

        settings.output_dir = Some("reports".into());
        assert_eq!(resolve_out_dir(None, &settings), PathBuf::from("reports"));
        assert_eq!(
            resolve_out_dir(Some(Path::new("cli-out")), &settings),
            PathBuf::from("cli-out")
        );
    }
}
