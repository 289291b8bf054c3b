//! # 发布版本数据模型

/// registry 中的一个发布版本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// 版本号字符串（原样保留 registry 中的写法）
    pub version: String,
    /// 发布日期 `YYYY-MM-DD`，registry 未记录时为 "unknown"
    pub date: String,
}
