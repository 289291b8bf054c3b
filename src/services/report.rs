//! # 报告格式化服务
//!
//! 将归一化后的请求内容组合为一份 Markdown 文档，供逐版本 diff。
//!
//! ## 文档结构
//! ```text
//! # Claude Code Version {label}
//! Release Date: {date}
//! # User Message      : 标题下沉一级
//! # System Prompt     : 标题下沉一级
//! # Tools
//! ## {tool name}      : 描述标题下沉两级，input_schema 以 json 代码块输出，工具之间用 --- 分隔
//! ```

use crate::models::report::ReportInput;
use crate::models::trace::Tool;
use crate::services::normalizer::reindent_headers;

/// 生成报告文档
///
/// 纯函数：相同输入始终产生逐字节相同的输出。
/// 工具列表为空时 `# Tools` 标题仍然存在，其下没有任何内容。
pub fn format_report(input: &ReportInput<'_>) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# Claude Code Version {}", input.version_label));
    lines.push(String::new());
    lines.push(format!("Release Date: {}", input.release_date));
    lines.push(String::new());

    lines.push("# User Message".into());
    lines.push(String::new());
    lines.push(reindent_headers(input.user_message));
    lines.push(String::new());

    lines.push("# System Prompt".into());
    lines.push(String::new());
    lines.push(reindent_headers(input.system_prompt));
    lines.push(String::new());

    lines.push("# Tools".into());
    lines.push(String::new());
    for tool in input.tools {
        push_tool(&mut lines, tool);
    }

    lines.join("\n")
}

/// 输出单个工具小节
fn push_tool(lines: &mut Vec<String>, tool: &Tool) {
    lines.push(format!("## {}", tool.name));
    lines.push(String::new());
    lines.push(reindent_headers(&reindent_headers(&tool.description)));
    lines.push(String::new());
    lines.push("```json".into());
    // Value 的序列化不会失败；退化时输出 null 而不是中断整份报告
    lines.push(
        serde_json::to_string_pretty(&tool.input_schema).unwrap_or_else(|_| "null".to_string()),
    );
    lines.push("```".into());
    lines.push(String::new());
    lines.push("---".into());
    lines.push(String::new());
}
