//! # 通用工具函数模块
//!
//! - `path` - 配置目录定位和报告文件命名

pub mod path;
