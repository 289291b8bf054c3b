//! # 抓包记录数据模型
//!
//! 对应 claude-trace 输出的 JSONL 抓包文件中的每一行记录：
//! 一次被拦截的请求/响应交换。
//!
//! 请求体只强类型化选择和归一化需要的字段（model、messages、system、tools），
//! 其余字段由 serde 忽略；响应体整体保留为不透明的 JSON 对象。

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// 一条抓包记录
///
/// 解析后不可变，记录顺序即抓包顺序。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceRecord {
    /// 被拦截的请求
    pub request: TraceRequest,

    /// 响应体（不透明）：请求失败时可能缺失或为 null
    #[serde(default)]
    pub response: Option<Map<String, Value>>,
}

/// 被拦截的 HTTP 请求
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceRequest {
    /// 请求时间戳（claude-trace 记录为秒级浮点数，这里不做解释）
    #[serde(default)]
    pub timestamp: Option<Value>,

    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub url: String,

    /// 请求头集合
    #[serde(default)]
    pub headers: Map<String, Value>,

    /// 请求体：非 Messages API 请求（如遥测）可能没有 body，或 body 不是 JSON 对象
    #[serde(default, deserialize_with = "deserialize_body")]
    pub body: Option<RequestBody>,
}

/// Messages API 请求体
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RequestBody {
    /// 模型标识符，缺失的记录在选择阶段被剔除
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub messages: Vec<Message>,

    #[serde(default)]
    pub temperature: Option<f64>,

    /// 系统提示词块列表
    ///
    /// API 同时接受裸字符串形式的 system，这里统一转换为单个 text 块。
    #[serde(default, deserialize_with = "deserialize_system")]
    pub system: Option<Vec<SystemBlock>>,

    #[serde(default)]
    pub tools: Option<Vec<Tool>>,
}

impl RequestBody {
    /// 工具定义数量（缺失视为 0）
    pub fn tool_count(&self) -> usize {
        self.tools.as_ref().map_or(0, Vec::len)
    }

    /// 系统提示词块数量（缺失视为 0）
    pub fn system_block_count(&self) -> usize {
        self.system.as_ref().map_or(0, Vec::len)
    }
}

/// 单条对话消息
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Message {
    /// 角色标签："user" | "assistant"
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,

    /// 消息内容：字符串或内容块列表，可能缺失
    #[serde(default)]
    pub content: Option<MessageContent>,
}

/// 消息内容的三种形态
///
/// `Other` 兜住既不是字符串也不是块列表的值，保证解码永不因内容形态失败。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
    Other(Value),
}

/// 消息内容块
///
/// 只有 `type == "text"` 的块携带可显示文本，其余类型（image、tool_use 等）在本工具中被忽略。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,

    #[serde(default)]
    pub text: Option<String>,
}

/// 系统提示词块
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SystemBlock {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,

    #[serde(default)]
    pub text: Option<String>,
}

/// 工具定义
///
/// 同一请求体中的工具名称理论上唯一，但这里不做假设，重复名称按原样保留。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tool {
    pub name: String,

    /// 描述文本，`null` 与缺失一样视为空串
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    /// 输入参数的 JSON Schema，仅用于美化输出
    #[serde(default)]
    pub input_schema: Value,
}

/// 只把 JSON 对象形态的 body 当作请求体解码，字符串等其他形态视为无请求体
fn deserialize_body<'de, D>(deserializer: D) -> Result<Option<RequestBody>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => RequestBody::deserialize(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

/// 把显式的 `null` 当作字段缺失，取类型默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// system 字段的两种线上形态
#[derive(Deserialize)]
#[serde(untagged)]
enum SystemField {
    Text(String),
    Blocks(Vec<SystemBlock>),
}

/// 将 system 字段统一反序列化为块列表
fn deserialize_system<'de, D>(deserializer: D) -> Result<Option<Vec<SystemBlock>>, D::Error>
where
    D: Deserializer<'de>,
{
    let field: Option<SystemField> = Option::deserialize(deserializer)?;
    Ok(field.map(|f| match f {
        SystemField::Text(text) => vec![SystemBlock {
            kind: "text".to_string(),
            text: Some(text),
        }],
        SystemField::Blocks(blocks) => blocks,
    }))
}
