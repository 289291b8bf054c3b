//! # npm 协作者
//!
//! 流水线的两个外部协作者：
//! - [`NpmRegistry`]：查询 registry 中的全部版本及发布日期
//! - [`NpmFetcher`]：把指定版本安装到临时工作目录，返回入口脚本路径
//!
//! 安装使用 `npm install --prefix`，而不是手动下载解包 tarball：
//! 入口脚本运行时依赖包内的其他文件（vendor、wasm 等），完整安装最简单可靠。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::process::Command;

use crate::models::release::Release;
use crate::models::settings::ExtractorSettings;
use crate::services::pipeline::{PackageFetcher, ReleaseRegistry};

/// registry 包文档中本工具关心的部分
#[derive(Debug, Deserialize)]
struct PackageDocument {
    /// 版本号 → 版本元数据（只使用键）
    #[serde(default)]
    versions: Map<String, Value>,
    /// 版本号 → ISO 8601 发布时间（另含 created / modified 两个特殊键）
    #[serde(default)]
    time: HashMap<String, String>,
}

/// npm registry 客户端
pub struct NpmRegistry {
    client: reqwest::Client,
    registry_url: String,
    package_name: String,
}

impl NpmRegistry {
    pub fn new(settings: &ExtractorSettings) -> Self {
        Self {
            client: reqwest::Client::new(),
            registry_url: settings.registry_url.trim_end_matches('/').to_string(),
            package_name: settings.package_name.clone(),
        }
    }
}

#[async_trait]
impl ReleaseRegistry for NpmRegistry {
    async fn releases(&self) -> Result<Vec<Release>, String> {
        let url = format!("{}/{}", self.registry_url, self.package_name);
        log::info!("查询版本列表: {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| format!("请求 npm registry 失败: {}", e))?
            .error_for_status()
            .map_err(|e| format!("npm registry 返回错误: {}", e))?;

        let document: PackageDocument = response
            .json()
            .await
            .map_err(|e| format!("解析 npm registry 响应失败: {}", e))?;

        Ok(releases_from_document(&document))
    }
}

/// 从包文档生成发布列表（保持 registry 中的键顺序）
fn releases_from_document(document: &PackageDocument) -> Vec<Release> {
    document
        .versions
        .keys()
        .map(|version| Release {
            version: version.clone(),
            date: release_date(document.time.get(version).map(String::as_str)),
        })
        .collect()
}

/// ISO 8601 时间戳截取日期部分，缺失或格式异常时为 "unknown"
fn release_date(raw: Option<&str>) -> String {
    match raw {
        Some(ts) if ts.len() >= 10 && ts.is_char_boundary(10) => ts[..10].to_string(),
        _ => "unknown".to_string(),
    }
}

/// 通过 `npm install` 获取指定版本的入口脚本
pub struct NpmFetcher {
    package_name: String,
    script_path: String,
}

impl NpmFetcher {
    pub fn new(settings: &ExtractorSettings) -> Self {
        Self {
            package_name: settings.package_name.clone(),
            script_path: settings.script_path.clone(),
        }
    }

    /// 安装后入口脚本所在路径：`<dest>/node_modules/<package>/<script>`
    fn script_location(&self, dest: &Path) -> PathBuf {
        let mut path = dest.join("node_modules");
        // 作用域包名（@scope/name）按路径分隔符逐段拼接
        for segment in self.package_name.split('/') {
            path.push(segment);
        }
        path.join(&self.script_path)
    }
}

/// npm 可执行文件名：Windows 下是 npm.cmd
fn npm_program() -> &'static str {
    if cfg!(target_os = "windows") {
        "npm.cmd"
    } else {
        "npm"
    }
}

#[async_trait]
impl PackageFetcher for NpmFetcher {
    async fn fetch(&self, version: &str, dest: &Path) -> Result<PathBuf, String> {
        let package_ref = format!("{}@{}", self.package_name, version);
        log::info!("安装 {} 到 {}", package_ref, dest.display());

        let output = Command::new(npm_program())
            .arg("install")
            .arg("--prefix")
            .arg(dest)
            .args(["--no-save", "--ignore-scripts", "--no-audit", "--no-fund"])
            .arg(&package_ref)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| format!("启动 npm 失败: {}", e))?;

        if !output.status.success() {
            return Err(format!(
                "npm install {} 失败（{}）: {}",
                package_ref,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let script = self.script_location(dest);
        if !script.exists() {
            return Err(format!("安装完成但未找到入口脚本: {}", script.display()));
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_releases_from_document() {
        let document: PackageDocument = serde_json::from_str(
            r#"{
                "name": "@anthropic-ai/claude-code",
                "versions": {"0.2.9": {}, "1.0.0": {}},
                "time": {"created": "2025-02-24T00:00:00.000Z", "1.0.0": "2025-05-22T16:41:12.345Z"}
            }"#,
        )
        .unwrap();

        let releases = releases_from_document(&document);
        assert_eq!(
            releases,
            vec![
                Release {
                    version: "0.2.9".into(),
                    date: "unknown".into()
                },
                Release {
                    version: "1.0.0".into(),
                    date: "2025-05-22".into()
                },
            ]
        );
    }

    #[test]
    fn test_release_date_edge_cases() {
        assert_eq!(release_date(Some("2025-05-22")), "2025-05-22");
        assert_eq!(release_date(Some("2025")), "unknown");
        assert_eq!(release_date(None), "unknown");
    }

    #[test]
    fn test_script_location_for_scoped_package() {
        let fetcher = NpmFetcher::new(&ExtractorSettings::default());
        let path = fetcher.script_location(Path::new("/tmp/ws"));
        assert_eq!(
            path,
            Path::new("/tmp/ws")
                .join("node_modules")
                .join("@anthropic-ai")
                .join("claude-code")
                .join("cli.js")
        );
    }
}
