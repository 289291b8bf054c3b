//! # 数据模型模块
//!
//! 抓包文件和配置文件中需要解码的结构体派生 serde 的 `Deserialize`：
//! - `trace` - 抓包记录和 Messages API 请求体
//! - `settings` - 提取器配置
//! - `report` - 报告格式化输入
//! - `release` - registry 中的发布版本

pub mod release;
pub mod report;
pub mod settings;
pub mod trace;
