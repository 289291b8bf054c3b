//! # 报告数据模型
//!
//! 报告格式化器的输入：版本标签、发布日期、已归一化的文本和已过滤排序的工具列表。
//! 与原始抓包记录完全解耦，格式化器只读取这里的字段。

use crate::models::trace::Tool;

/// 报告输入
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    /// 版本标签：npm 版本号，或自定义脚本运行时的时间戳标签
    pub version_label: &'a str,
    /// 发布日期（`YYYY-MM-DD`，未知时为 "unknown"）
    pub release_date: &'a str,
    /// 归一化后的用户消息文本（未重缩进）
    pub user_message: &'a str,
    /// 归一化后的 system 提示词文本（未重缩进）
    pub system_prompt: &'a str,
    /// 已剔除 MCP 工具并排序的工具列表
    pub tools: &'a [Tool],
}
