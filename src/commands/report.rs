//! # 报告命令
//!
//! 对已有的抓包文件执行解析、选择和格式化，不需要 npm 或 claude-trace。

use std::path::Path;

use crate::services::file_guard::safe_write_file;
use crate::services::pipeline::build_report;

/// 从抓包文件生成报告
///
/// # 参数
/// - `capture` - 抓包文件路径
/// - `label` / `release_date` - 报告标题信息
/// - `out` - 输出文件；为 `None` 时打印到标准输出
///
/// # 错误
/// 抓包文件读取失败、解码失败、没有可用请求或写出失败时返回错误
pub async fn report(
    capture: &Path,
    label: &str,
    release_date: &str,
    out: Option<&Path>,
) -> Result<(), String> {
    let text = tokio::fs::read_to_string(capture)
        .await
        .map_err(|e| format!("读取抓包文件 {} 失败: {}", capture.display(), e))?;

    let built = build_report(&text, label, release_date).map_err(|e| e.to_string())?;
    log::info!("选择层级 {:?}，输出 {} 个工具", built.tier, built.tool_count);

    match out {
        Some(path) => {
            safe_write_file(path, built.document.as_bytes(), false).await?;
            log::info!("报告已写出: {}", path.display());
        }
        None => println!("{}", built.document),
    }
    Ok(())
}
