//! # 业务逻辑服务模块
//!
//! 核心算法（纯函数，无 I/O）：
//! - `patcher` - 版本检查修补器：屏蔽入口脚本中的版本过期检查
//! - `parser` - 抓包 JSONL 解析
//! - `selector` - 从多条请求中选出代表性请求
//! - `normalizer` - 文本提取和 Markdown 标题重缩进
//! - `catalogue` - 工具过滤（剔除 MCP 工具）和排序
//! - `report` - 报告 Markdown 格式化
//! - `version` - 版本号解析、比较和区间筛选
//!
//! 外部协作者与编排：
//! - `npm` - registry 查询和包安装
//! - `tracer` - 抓包子进程
//! - `artifact` - 报告产物存储
//! - `file_guard` - 原子写入 + 可选备份
//! - `pipeline` - 提取流水线

pub mod artifact;
pub mod catalogue;
pub mod file_guard;
pub mod normalizer;
pub mod npm;
pub mod parser;
pub mod patcher;
pub mod pipeline;
pub mod report;
pub mod selector;
pub mod tracer;
pub mod version;
