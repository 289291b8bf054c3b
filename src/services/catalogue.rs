//! # 工具目录
//!
//! 过滤并排序被选中请求的工具列表。
//! `mcp__` 前缀的工具来自用户本地配置的 MCP 服务器，随环境变化，不属于某个 Claude Code 版本本身，
//! 因此从报告中剔除。

use std::cmp::Ordering;

use crate::models::trace::Tool;

/// MCP 工具名称前缀
pub const MCP_TOOL_PREFIX: &str = "mcp__";

/// 剔除 MCP 工具并按名称升序排序
///
/// 排序是稳定的，重复名称保持原始顺序。输入缺失时返回空列表。
pub fn filter_and_sort_tools(tools: Option<&[Tool]>) -> Vec<Tool> {
    let mut catalogue: Vec<Tool> = tools
        .unwrap_or_default()
        .iter()
        .filter(|t| !t.name.starts_with(MCP_TOOL_PREFIX))
        .cloned()
        .collect();
    catalogue.sort_by(|a, b| locale_compare(&a.name, &b.name));
    catalogue
}

/// 近似区域感知的字符串比较
///
/// 先按不区分大小写的字符序比较；仅大小写不同时小写在前（与常见区域排序规则一致，`a < A < b`）。
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
