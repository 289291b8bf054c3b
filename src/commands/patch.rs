//! # 修补命令
//!
//! 单独对一个脚本文件执行版本检查屏蔽，不运行抓包。

use std::path::Path;

use crate::models::settings::ExtractorSettings;
use crate::services::pipeline::patch_file;

/// 原地修补脚本，并在标准输出打印结果（"success" 或 "not found"）
///
/// # 错误
/// 文件读写失败，或标记存在但函数结构无法识别时返回错误
pub async fn patch(
    path: &Path,
    no_backup: bool,
    settings: &ExtractorSettings,
) -> Result<(), String> {
    let result = patch_file(path, &settings.version_check_marker, !no_backup)
        .await
        .map_err(|e| e.to_string())?;
    println!("{}: {}", path.display(), result.message);
    Ok(())
}
