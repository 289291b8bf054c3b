//! # 核心错误类型
//!
//! 核心算法（脚本修补、抓包解析、请求选择）对外暴露的错误。
//! 每个变体都带有稳定的 [`ErrorKind`]，调用方据此决定是跳过、继续还是中止：
//! - `Structure`：修补失败，调用方应放弃修补并继续运行
//! - `Decode`：抓包文件某一行不是合法 JSON，整次解析失败
//! - `NotFound`：抓包中没有符合条件的请求，本版本失败，批处理继续
//!
//! 外部协作者（npm、子进程、文件系统）沿用 `Result<T, String>` 约定，不使用本类型。

use thiserror::Error;

/// 核心错误的稳定分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structure,
    Decode,
    NotFound,
}

/// 核心错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// 找不到包围标记字符串的函数、左花括号或与之匹配的右花括号
    #[error("StructureError: {0}")]
    Structure(String),

    /// 抓包文件的某一行无法解码（`line` 从 1 开始计数）
    #[error("DecodeError: line {line}: {message}")]
    Decode { line: usize, message: String },

    /// 没有任何请求通过选择规则
    #[error("NotFoundError: {0}")]
    NotFound(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Structure(_) => ErrorKind::Structure,
            CoreError::Decode { .. } => ErrorKind::Decode,
            CoreError::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// 修补脚本文件的错误：保留核心错误的分类，与文件读写失败区分开
///
/// 调用方只有在 [`ErrorKind::Structure`] 时才可以放弃修补继续运行，
/// 读写失败（包括备份失败）必须向上传播。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchFileError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0}")]
    Io(String),
}

impl PatchFileError {
    /// 核心错误的分类；读写失败返回 `None`
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PatchFileError::Core(e) => Some(e.kind()),
            PatchFileError::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        assert_eq!(
            CoreError::Structure("no opening brace".into()).kind(),
            ErrorKind::Structure
        );
        assert_eq!(
            CoreError::Decode {
                line: 3,
                message: "EOF".into()
            }
            .kind(),
            ErrorKind::Decode
        );
        assert_eq!(CoreError::NotFound("x".into()).kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_display_carries_message() {
        let err = CoreError::Decode {
            line: 2,
            message: "expected value".into(),
        };
        assert_eq!(err.to_string(), "DecodeError: line 2: expected value");
    }

    #[test]
    fn test_patch_file_error_keeps_kind() {
        let err: PatchFileError = CoreError::Structure("unbalanced braces".into()).into();
        assert_eq!(err.kind(), Some(ErrorKind::Structure));
        assert_eq!(err.to_string(), "StructureError: unbalanced braces");

        let io = PatchFileError::Io("创建备份失败: denied".into());
        assert_eq!(io.kind(), None);
        assert_eq!(io.to_string(), "创建备份失败: denied");
    }
}
