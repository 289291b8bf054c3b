//! # 版本检查修补器
//!
//! 在不做完整语法解析的前提下，定位并屏蔽 Claude Code 入口脚本中的版本过期检查。
//! 旧版本被 npm 安装后立即运行时，会因为"版本过旧"提示直接退出，无法抓到真实请求。
//!
//! ## 算法（单趟线性扫描）
//! 1. 查找标记字符串（版本过期警告）的首次出现；不存在 → 不修补，也不报错
//! 2. 自标记起向前查找最近的 `function` 字面量
//! 3. 自该位置向后查找第一个 `{`
//! 4. 从 `{` 开始计数深度（`{` +1，`}` −1，初始为 1），深度归零处即匹配的 `}`
//! 5. 用一个仅含注释的空函数体替换 `{ ... }`，函数名和签名、文件其余部分逐字节保留
//!
//! ## 已知局限
//! 花括号计数不区分字符串、正则字面量和注释中的花括号，`function` 也按原始子串匹配。
//! 真正的词法分析需要理解完整的 JavaScript 语法，这里有意不做。
//!
//! ## 性能
//! 压缩后的 cli.js 可达数 MB，子串搜索使用 `memchr::memmem`（SIMD 加速）。
//! 所有搜索的目标都是 ASCII 字节，命中位置一定落在 UTF-8 字符边界上，可直接切片。

use memchr::memmem;

use crate::error::CoreError;

/// 替换后的函数体
pub const DISABLED_BODY: &str = "{ /* version check disabled */ }";

const FUNCTION_TOKEN: &[u8] = b"function";

/// 修补结果
///
/// 每次调用生成一个，之后不再修改。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    /// 是否实际发生了修补
    pub patched: bool,
    /// 修补后的脚本全文（未修补时为原文）
    pub content: String,
    /// 结果描述："success" | "not found"
    pub message: String,
}

/// 屏蔽脚本中包围 `marker` 的函数
///
/// # 参数
/// - `content` - 脚本原文
/// - `marker` - 版本过期警告字符串
///
/// # 返回值
/// - 标记不存在：`patched == false`，内容原样返回
/// - 修补成功：`patched == true`，函数体被替换为 [`DISABLED_BODY`]
///
/// # 错误
/// 标记存在但找不到包围函数、左花括号或匹配的右花括号时返回 `CoreError::Structure`
pub fn patch_source(content: &str, marker: &str) -> Result<PatchResult, CoreError> {
    let bytes = content.as_bytes();

    let Some(marker_pos) = memmem::find(bytes, marker.as_bytes()) else {
        log::debug!("未找到版本检查标记，跳过修补");
        return Ok(PatchResult {
            patched: false,
            content: content.to_string(),
            message: "not found".to_string(),
        });
    };

    let function_pos = memmem::rfind(&bytes[..marker_pos], FUNCTION_TOKEN)
        .ok_or_else(|| CoreError::Structure("no enclosing function".to_string()))?;

    let open = memchr::memchr(b'{', &bytes[function_pos..])
        .map(|offset| function_pos + offset)
        .ok_or_else(|| CoreError::Structure("no opening brace".to_string()))?;

    let close = find_matching_brace(bytes, open)
        .ok_or_else(|| CoreError::Structure("unbalanced braces".to_string()))?;

    log::debug!(
        "版本检查函数定位成功: function@{} body[{}..={}] marker@{}",
        function_pos,
        open,
        close,
        marker_pos
    );

    let removed = close + 1 - open;
    let mut patched = String::with_capacity(content.len() - removed + DISABLED_BODY.len());
    patched.push_str(&content[..open]);
    patched.push_str(DISABLED_BODY);
    patched.push_str(&content[close + 1..]);

    Ok(PatchResult {
        patched: true,
        content: patched,
        message: "success".to_string(),
    })
}

/// 从 `open` 处的 `{` 开始做深度计数，返回匹配的 `}` 的位置
///
/// 只在花括号之间跳跃（`memchr2`），不逐字节遍历。
fn find_matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth: usize = 1;
    let mut cursor = open + 1;

    while cursor < bytes.len() {
        let offset = memchr::memchr2(b'{', b'}', &bytes[cursor..])?;
        let pos = cursor + offset;
        if bytes[pos] == b'{' {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(pos);
            }
        }
        cursor = pos + 1;
    }

    None
}
