//! # 抓包流解析服务
//!
//! 将 claude-trace 生成的 JSONL 抓包文本解析为有序的 [`TraceRecord`] 列表。
//!
//! 与会话文件的容错解析不同，抓包文件由受信任的拦截工具生成，
//! 任何一行解码失败都视为整个文件损坏，不返回部分结果。

use crate::error::CoreError;
use crate::models::trace::TraceRecord;

/// 解析 JSONL 抓包文本
///
/// 每个非空行（去除首尾空白后）是一条独立的 JSON 记录，空行跳过。
/// 输出顺序与文件行顺序一致；函数无状态，重复调用结果相同。
///
/// # 参数
/// - `text` - 抓包文件全文
///
/// # 错误
/// 任意一行解码失败时返回 `CoreError::Decode`，`line` 为从 1 开始的物理行号
pub fn parse_trace(text: &str) -> Result<Vec<TraceRecord>, CoreError> {
    let mut records = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str(line).map_err(|e| CoreError::Decode {
            line: index + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    log::debug!("抓包解析完成: {} 条记录", records.len());
    Ok(records)
}
