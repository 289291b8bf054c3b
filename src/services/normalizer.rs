//! # 内容归一化
//!
//! 从被选中的请求体中提取纯文本，并调整 Markdown 标题层级，使其能嵌入报告文档。
//! 所有函数都是全函数：任何输入形态都返回字符串，从不失败。

use std::sync::LazyLock;

use regex::Regex;

use crate::models::trace::{Message, MessageContent, RequestBody};

/// Markdown 标题行：行首一个或多个 `#`，后跟至少一个空白字符
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#+\s").unwrap());

/// 提取消息的纯文本内容
///
/// 处理 `content` 的几种形态：
/// - 消息或内容缺失：空字符串
/// - 字符串：原样返回
/// - 块列表：提取所有 `type == "text"` 块的 text（缺失视为空串），用换行符拼接
/// - 其他形态：空字符串
pub fn extract_text(message: Option<&Message>) -> String {
    match message.and_then(|m| m.content.as_ref()) {
        Some(MessageContent::Text(text)) => text.clone(),
        Some(MessageContent::Blocks(blocks)) => blocks
            .iter()
            .filter(|b| b.kind == "text")
            .map(|b| b.text.as_deref().unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n"),
        Some(MessageContent::Other(_)) | None => String::new(),
    }
}

/// 提取 system 提示词：所有 text 块的文本用换行符拼接
pub fn extract_system_prompt(body: &RequestBody) -> String {
    body.system
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter(|b| b.kind == "text")
        .map(|b| b.text.as_deref().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 规范的用户消息：请求中第一条 role 为 user 的消息
pub fn canonical_user_message(body: &RequestBody) -> Option<&Message> {
    body.messages.iter().find(|m| m.role == "user")
}

/// 将文本中的 Markdown 标题下沉一级
///
/// 每个匹配 `^#+\s` 的行前面追加一个 `#`，其余行原样保留（包括行尾结构）。
pub fn reindent_headers(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if HEADER_RE.is_match(line) {
                format!("#{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(value: serde_json::Value) -> Message {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_text_string_content() {
        let msg = message(json!({"role": "user", "content": "hi"}));
        assert_eq!(extract_text(Some(&msg)), "hi");
    }

    #[test]
    fn test_extract_text_block_content() {
        let msg = message(json!({
            "role": "user",
            "content": [{"type": "text", "text": "a"}, {"type": "image"}]
        }));
        assert_eq!(extract_text(Some(&msg)), "a");

        let msg = message(json!({
            "role": "user",
            "content": [{"type": "text", "text": "a"}, {"type": "text"}, {"type": "text", "text": "b"}]
        }));
        assert_eq!(extract_text(Some(&msg)), "a\n\nb");
    }

    #[test]
    fn test_extract_text_is_total() {
        assert_eq!(extract_text(None), "");
        assert_eq!(extract_text(Some(&message(json!({"role": "user", "content": []})))), "");
        assert_eq!(extract_text(Some(&message(json!({"role": "user"})))), "");
        assert_eq!(extract_text(Some(&message(json!({"role": "user", "content": {"x": 1}})))), "");
    }

    #[test]
    fn test_extract_system_prompt() {
        let body: RequestBody = serde_json::from_value(json!({
            "model": "m",
            "system": [
                {"type": "text", "text": "You are Claude Code."},
                {"type": "image"},
                {"type": "text", "text": "Be concise."}
            ]
        }))
        .unwrap();
        assert_eq!(extract_system_prompt(&body), "You are Claude Code.\nBe concise.");
        assert_eq!(extract_system_prompt(&RequestBody::default()), "");
    }

    #[test]
    fn test_canonical_user_message_skips_other_roles() {
        let body: RequestBody = serde_json::from_value(json!({
            "messages": [
                {"role": "assistant", "content": "prefill"},
                {"role": "user", "content": "first"},
                {"role": "user", "content": "second"}
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(canonical_user_message(&body)), "first");
        assert!(canonical_user_message(&RequestBody::default()).is_none());
    }

    #[test]
    fn test_reindent_headers() {
        assert_eq!(reindent_headers("# H\nbody"), "## H\nbody");
        assert_eq!(reindent_headers(&reindent_headers("# H\nbody")), "### H\nbody");
    }

    #[test]
    fn test_reindent_leaves_non_headers() {
        let text = "#hashtag\n  # indented\n## Sub\n#\n\n###\tTab";
        assert_eq!(
            reindent_headers(text),
            "#hashtag\n  # indented\n### Sub\n#\n\n####\tTab"
        );
        assert_eq!(reindent_headers(""), "");
        assert_eq!(reindent_headers("# H\n"), "## H\n");
    }
}
