//! # 提取流水线
//!
//! 把核心算法和外部协作者串成一次完整的提取：
//!
//! ```text
//! 获取脚本 → 屏蔽版本检查 → 抓包运行 → 解析 → 选择 → 归一化 → 工具整理 → 格式化 → 写出报告
//! ```
//!
//! 外部协作者（registry、npm 安装、抓包子进程、报告存储）都以 trait 形式注入，
//! 测试中用内存实现替换。单个版本内部严格顺序执行；批处理逐版本顺序运行，
//! 某个版本失败只记录日志，不影响后续版本。

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{CoreError, ErrorKind, PatchFileError};
use crate::models::release::Release;
use crate::models::report::ReportInput;
use crate::services::catalogue::filter_and_sort_tools;
use crate::services::file_guard::safe_write_file;
use crate::services::normalizer::{canonical_user_message, extract_system_prompt, extract_text};
use crate::services::parser::parse_trace;
use crate::services::patcher::{PatchResult, patch_source};
use crate::services::report::format_report;
use crate::services::selector::{SelectionTier, select_best};
use crate::services::version::{Version, select_range};

/// 发布版本来源
#[async_trait]
pub trait ReleaseRegistry: Send + Sync {
    /// 列出全部已发布版本（附发布日期）
    async fn releases(&self) -> Result<Vec<Release>, String>;
}

/// 脚本获取器：把指定版本安装到 `dest`，返回入口脚本路径
#[async_trait]
pub trait PackageFetcher: Send + Sync {
    async fn fetch(&self, version: &str, dest: &Path) -> Result<PathBuf, String>;
}

/// 抓包运行器：以 `workdir` 为工作目录运行一次脚本，返回抓包文件全文
#[async_trait]
pub trait TraceRunner: Send + Sync {
    async fn run(&self, script: &Path, workdir: &Path) -> Result<String, String>;
}

/// 报告存储
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// 该标签的报告是否已存在
    async fn exists(&self, label: &str) -> bool;

    /// 写入报告，返回落盘位置
    async fn write(&self, label: &str, document: &str) -> Result<PathBuf, String>;
}

/// 由抓包文本生成的报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltReport {
    pub document: String,
    /// 命中的选择层级
    pub tier: SelectionTier,
    /// 报告中实际输出的工具数量（已剔除 MCP 工具）
    pub tool_count: usize,
}

/// 单个版本（或脚本）的运行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 报告已存在，未做任何事
    Skipped,
    /// 已生成并写出报告
    Written {
        path: PathBuf,
        tier: SelectionTier,
        tool_count: usize,
    },
}

/// 批处理汇总
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RangeSummary {
    pub written: Vec<String>,
    pub skipped: Vec<String>,
    /// (版本号, 失败原因)
    pub failed: Vec<(String, String)>,
}

/// 从抓包文本生成报告（纯计算，不涉及 I/O）
///
/// # 参数
/// - `capture` - 抓包文件全文（JSONL）
/// - `label` - 报告标题中的版本标签
/// - `release_date` - 发布日期
///
/// # 错误
/// 抓包行无法解码时返回 `Decode`，没有可用请求时返回 `NotFound`
pub fn build_report(
    capture: &str,
    label: &str,
    release_date: &str,
) -> Result<BuiltReport, CoreError> {
    let records = parse_trace(capture)?;
    let selection = select_best(&records)?;

    if selection.tier == SelectionTier::Fallback {
        log::warn!(
            "[{}] 没有同时带工具和 system 提示词的请求，降级使用第一条非 haiku 请求（model: {}）",
            label,
            selection.body.model.as_deref().unwrap_or("?")
        );
        if !selection.has_tools() {
            log::warn!("[{}] 选中的请求没有工具定义，报告的 Tools 小节为空", label);
        }
    }

    let user_message = extract_text(canonical_user_message(selection.body));
    let system_prompt = extract_system_prompt(selection.body);
    let tools = filter_and_sort_tools(selection.body.tools.as_deref());
    log::debug!(
        "[{}] 选中请求: {} 个工具（输出 {} 个），{} 个 system 块",
        label,
        selection.body.tool_count(),
        tools.len(),
        selection.body.system_block_count()
    );

    let document = format_report(&ReportInput {
        version_label: label,
        release_date,
        user_message: &user_message,
        system_prompt: &system_prompt,
        tools: &tools,
    });

    Ok(BuiltReport {
        document,
        tier: selection.tier,
        tool_count: tools.len(),
    })
}

/// 读取脚本、屏蔽版本检查并回写
///
/// 未找到标记时不写文件，返回 `patched == false` 的结果。
///
/// # 参数
/// - `backup` - 回写前是否备份原文件（用户自己的脚本需要备份）
///
/// # 错误
/// - 标记存在但函数结构无法识别：`PatchFileError::Core`（`Structure`）
/// - 读取、备份或回写失败：`PatchFileError::Io`
pub async fn patch_file(
    path: &Path,
    marker: &str,
    backup: bool,
) -> Result<PatchResult, PatchFileError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| PatchFileError::Io(format!("读取脚本 {} 失败: {}", path.display(), e)))?;

    let result = patch_source(&content, marker)?;
    if result.patched {
        safe_write_file(path, result.content.as_bytes(), backup)
            .await
            .map_err(PatchFileError::Io)?;
        log::info!("已屏蔽版本检查: {}", path.display());
    } else {
        log::info!("脚本中没有版本检查标记，按原样运行");
    }
    Ok(result)
}

/// 提取流水线
pub struct Pipeline {
    registry: Arc<dyn ReleaseRegistry>,
    fetcher: Arc<dyn PackageFetcher>,
    tracer: Arc<dyn TraceRunner>,
    store: Arc<dyn ArtifactStore>,
    marker: String,
}

impl Pipeline {
    pub fn new(
        registry: Arc<dyn ReleaseRegistry>,
        fetcher: Arc<dyn PackageFetcher>,
        tracer: Arc<dyn TraceRunner>,
        store: Arc<dyn ArtifactStore>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            fetcher,
            tracer,
            store,
            marker: marker.into(),
        }
    }

    /// 处理单个已发布版本
    ///
    /// # 错误
    /// 安装、修补读写、抓包、解析、选择或写出任一步失败时返回错误；
    /// 脚本结构无法识别导致的修补失败只记录警告
    pub async fn run_version(&self, version: &str, release_date: &str) -> Result<Outcome, String> {
        if self.store.exists(version).await {
            log::info!("[{}] 报告已存在，跳过", version);
            return Ok(Outcome::Skipped);
        }

        let workspace = new_workspace()?;
        let script = self.fetcher.fetch(version, workspace.path()).await?;
        self.patch_script(&script, false).await?;
        self.trace_and_store(&script, workspace.path(), version, release_date).await
    }

    /// 处理用户提供的脚本
    ///
    /// 脚本运行时会加载同目录下的其他文件，因此原地修补（修补前备份），
    /// 只把抓包输出放在临时工作目录中。
    pub async fn run_script(
        &self,
        script: &Path,
        label: &str,
        release_date: &str,
    ) -> Result<Outcome, String> {
        if self.store.exists(label).await {
            log::info!("[{}] 报告已存在，跳过", label);
            return Ok(Outcome::Skipped);
        }
        if !script.is_file() {
            return Err(format!("脚本不存在: {}", script.display()));
        }

        let workspace = new_workspace()?;
        self.patch_script(script, true).await?;
        self.trace_and_store(script, workspace.path(), label, release_date).await
    }

    /// 处理版本闭区间 `[from, to]` 内的全部已发布版本（`to` 为空表示到最新）
    ///
    /// # 错误
    /// 无法获取版本列表或区间内没有任何版本时返回错误；单个版本失败计入汇总
    pub async fn run_range(
        &self,
        from: &Version,
        to: Option<&Version>,
    ) -> Result<RangeSummary, String> {
        let releases = self.registry.releases().await?;
        let versions: Vec<String> = releases.iter().map(|r| r.version.clone()).collect();
        let dates: HashMap<&str, &str> = releases
            .iter()
            .map(|r| (r.version.as_str(), r.date.as_str()))
            .collect();

        let selected = select_range(&versions, from, to);
        if selected.is_empty() {
            return Err(match to {
                Some(to) => format!("没有介于 {} 和 {} 之间的版本", from, to),
                None => format!("没有不低于 {} 的版本", from),
            });
        }
        log::info!("共 {} 个版本待处理: {}", selected.len(), selected.join(", "));

        let mut summary = RangeSummary::default();
        for (index, version) in selected.iter().enumerate() {
            log::info!("({}/{}) 处理版本 {}", index + 1, selected.len(), version);
            let date = dates.get(version.as_str()).copied().unwrap_or("unknown");
            match self.run_version(version, date).await {
                Ok(Outcome::Written { .. }) => summary.written.push(version.clone()),
                Ok(Outcome::Skipped) => summary.skipped.push(version.clone()),
                Err(e) => {
                    log::error!("[{}] 处理失败: {}", version, e);
                    summary.failed.push((version.clone(), e));
                }
            }
        }

        log::info!(
            "批处理完成: 写出 {}，跳过 {}，失败 {}",
            summary.written.len(),
            summary.skipped.len(),
            summary.failed.len()
        );
        Ok(summary)
    }

    /// 修补脚本：结构无法识别时降级为不修补继续运行，读写失败则中止本次运行
    async fn patch_script(&self, script: &Path, backup: bool) -> Result<(), String> {
        match patch_file(script, &self.marker, backup).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == Some(ErrorKind::Structure) => {
                log::warn!("版本检查修补失败，按原样运行: {}", e);
                Ok(())
            }
            Err(e) => Err(format!("修补脚本 {} 失败: {}", script.display(), e)),
        }
    }

    async fn trace_and_store(
        &self,
        script: &Path,
        workdir: &Path,
        label: &str,
        release_date: &str,
    ) -> Result<Outcome, String> {
        let capture = self.tracer.run(script, workdir).await?;
        let report = build_report(&capture, label, release_date).map_err(|e| e.to_string())?;
        let path = self.store.write(label, &report.document).await?;
        log::info!("[{}] 报告已写出: {}", label, path.display());

        Ok(Outcome::Written {
            path,
            tier: report.tier,
            tool_count: report.tool_count,
        })
    }
}

/// 每次运行独立的临时工作目录，离开作用域时自动删除
fn new_workspace() -> Result<tempfile::TempDir, String> {
    tempfile::Builder::new()
        .prefix("cph-")
        .tempdir()
        .map_err(|e| format!("创建临时工作目录失败: {}", e))
}
