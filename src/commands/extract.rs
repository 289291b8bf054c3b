//! # 提取命令
//!
//! - `extract` - 按版本号（或版本区间）从 npm 安装并提取
//! - `binary` - 使用本地已有的入口脚本提取

use std::path::Path;
use std::sync::Arc;

use crate::models::settings::ExtractorSettings;
use crate::services::artifact::DirArtifactStore;
use crate::services::file_guard::unix_timestamp;
use crate::services::npm::{NpmFetcher, NpmRegistry};
use crate::services::pipeline::{Outcome, Pipeline};
use crate::services::tracer::CommandTracer;
use crate::services::version::Version;
use crate::utils::path::timestamp_label;

/// 用真实协作者组装流水线
fn build_pipeline(settings: &ExtractorSettings, out_dir: &Path) -> Pipeline {
    Pipeline::new(
        Arc::new(NpmRegistry::new(settings)),
        Arc::new(NpmFetcher::new(settings)),
        Arc::new(CommandTracer::new(settings)),
        Arc::new(DirArtifactStore::new(out_dir)),
        settings.version_check_marker.clone(),
    )
}

/// 解析命令行给出的版本号
fn parse_version(raw: &str) -> Result<Version, String> {
    Version::parse(raw).ok_or_else(|| format!("无法解析版本号: {}", raw))
}

/// 计算版本区间上界
///
/// - `--to` 给出：使用该版本
/// - `--latest`：无上界
/// - 都没有：只处理 `from` 这一个版本
fn upper_bound(from: &Version, to: Option<&str>, latest: bool) -> Result<Option<Version>, String> {
    match (to, latest) {
        (Some(to), _) => parse_version(to).map(Some),
        (None, true) => Ok(None),
        (None, false) => Ok(Some(from.clone())),
    }
}

/// 提取已发布版本
///
/// # 错误
/// 版本号无法解析、版本列表获取失败、区间为空或任一版本处理失败时返回错误
pub async fn extract(
    from: &str,
    to: Option<&str>,
    latest: bool,
    settings: &ExtractorSettings,
    out_dir: &Path,
) -> Result<(), String> {
    let from = parse_version(from)?;
    let to = upper_bound(&from, to, latest)?;

    let pipeline = build_pipeline(settings, out_dir);
    let summary = pipeline.run_range(&from, to.as_ref()).await?;

    if summary.failed.is_empty() {
        return Ok(());
    }
    let failed: Vec<&str> = summary.failed.iter().map(|(v, _)| v.as_str()).collect();
    Err(format!(
        "{} 个版本处理失败: {}",
        failed.len(),
        failed.join(", ")
    ))
}

/// 使用本地脚本提取
///
/// 未指定标签时使用 `custom-<timestamp>`。
pub async fn binary(
    script: &Path,
    label: Option<&str>,
    release_date: &str,
    settings: &ExtractorSettings,
    out_dir: &Path,
) -> Result<(), String> {
    let label = label
        .map(str::to_string)
        .unwrap_or_else(|| timestamp_label(unix_timestamp()));

    let pipeline = build_pipeline(settings, out_dir);
    match pipeline.run_script(script, &label, release_date).await? {
        Outcome::Written { path, .. } => println!("{}", path.display()),
        Outcome::Skipped => log::info!("标签 {} 的报告已存在，未重新生成", label),
    }
    Ok(())
}
