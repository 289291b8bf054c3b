//! # 代表性请求选择器
//!
//! 一次抓包通常包含多次后端调用：Claude Code 自身用 haiku 模型做的轻量探测、
//! 标题生成等元调用，以及真正的主请求。本模块从中选出唯一一条"代表性记录"。
//!
//! ## 选择规则（有序层级，首个命中的层级生效）
//! 0. 预过滤：剔除 model 缺失、或 model 含 "haiku"（不区分大小写）的记录
//! 1. `ToolsAndSystem`：同时带有非空工具列表和非空 system 块的记录中，
//!    按工具数量降序稳定排序后取第一条
//! 2. `Fallback`：任意一条通过预过滤的记录（按原始顺序取第一条），置信度较低
//! 3. 都不满足 → `NotFoundError`
//!
//! 层级以 `(SelectionTier, 选择函数)` 列表的形式顺序求值，便于单独测试每一层。

use crate::error::CoreError;
use crate::models::trace::{RequestBody, TraceRecord};

/// 命中的选择层级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTier {
    /// 同时带有工具和 system 提示词，视为真实的主请求
    ToolsAndSystem,
    /// 降级选择：可能不是真实的 agent 调用，调用方应向用户发出警告
    Fallback,
}

/// 选择结果
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    /// 被选中记录的请求体（通过预过滤的记录一定带有请求体）
    pub body: &'a RequestBody,
    pub tier: SelectionTier,
}

impl Selection<'_> {
    /// 被选中的记录是否带有工具定义
    pub fn has_tools(&self) -> bool {
        self.body.tool_count() > 0
    }
}

/// 单个层级的选择函数签名
///
/// 接收通过预过滤的候选记录（保持原始顺序），返回该层级选中的记录。
type TierPicker = for<'a> fn(&[&'a TraceRecord]) -> Option<&'a TraceRecord>;

/// 选择层级表：按顺序求值
const TIERS: &[(SelectionTier, TierPicker)] = &[
    (SelectionTier::ToolsAndSystem, pick_richest_with_tools_and_system),
    (SelectionTier::Fallback, pick_first),
];

/// 从抓包记录中选出代表性记录
///
/// # 错误
/// 没有任何记录通过预过滤时返回 `CoreError::NotFound`
pub fn select_best(records: &[TraceRecord]) -> Result<Selection<'_>, CoreError> {
    let candidates: Vec<&TraceRecord> = records.iter().filter(|r| is_candidate(r)).collect();
    log::debug!(
        "请求选择: {} 条记录中 {} 条通过预过滤",
        records.len(),
        candidates.len()
    );

    TIERS
        .iter()
        .find_map(|(tier, pick)| {
            let record = pick(&candidates)?;
            let body = record.request.body.as_ref()?;
            Some(Selection { body, tier: *tier })
        })
        .ok_or_else(|| CoreError::NotFound("no qualifying request in capture".to_string()))
}

/// 预过滤：带有 model 且不是 haiku 模型
fn is_candidate(record: &TraceRecord) -> bool {
    record
        .request
        .body
        .as_ref()
        .and_then(|body| body.model.as_deref())
        .is_some_and(|model| !model.to_lowercase().contains("haiku"))
}

fn has_tools_and_system(record: &TraceRecord) -> bool {
    record
        .request
        .body
        .as_ref()
        .is_some_and(|body| body.tool_count() > 0 && body.system_block_count() > 0)
}

fn tool_count(record: &TraceRecord) -> usize {
    record.request.body.as_ref().map_or(0, RequestBody::tool_count)
}

/// 层级 1：工具数量最多的"工具 + system"记录，数量相同时取原始顺序靠前者
fn pick_richest_with_tools_and_system<'a>(
    candidates: &[&'a TraceRecord],
) -> Option<&'a TraceRecord> {
    let mut rich: Vec<&'a TraceRecord> = candidates
        .iter()
        .copied()
        .filter(|r| has_tools_and_system(r))
        .collect();
    // sort_by 是稳定排序，平局保持抓包顺序
    rich.sort_by(|a, b| tool_count(b).cmp(&tool_count(a)));
    rich.first().copied()
}

/// 层级 2：第一条候选记录
fn pick_first<'a>(candidates: &[&'a TraceRecord]) -> Option<&'a TraceRecord> {
    candidates.first().copied()
}
