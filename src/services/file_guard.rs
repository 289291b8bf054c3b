//! # 文件写入守卫服务
//!
//! 统一所有落盘修改操作（脚本回写、报告产物写入）：
//!
//! ## 原子写入
//! 先写入同目录下的 `.cph-tmp` 临时文件，再 rename 覆盖目标。
//! 报告产物"存在即跳过"，半截文件会让后续运行误以为该版本已完成，因此必须原子落盘。
//!
//! ## 可选备份
//! 回写用户自己提供的脚本前，在原文件同目录创建 `.cphbak<timestamp>` 备份；
//! 临时工作目录中下载的脚本不需要备份。

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// 安全写入文件（统一入口）
///
/// 执行流程：
/// 1. 如果要求备份且原文件存在，复制一份 `.cphbak<timestamp>` 备份
/// 2. 写入临时文件，并沿用原文件的权限位（npm 安装的 cli.js 带可执行位）
/// 3. rename 到目标路径
///
/// # 参数
/// - `file_path` - 目标文件路径
/// - `content` - 要写入的字节内容
/// - `backup` - 是否在覆盖前备份原文件
///
/// # 错误
/// 备份、写入或 rename 失败时返回错误；失败时临时文件会被尽力清理
pub async fn safe_write_file(file_path: &Path, content: &[u8], backup: bool) -> Result<(), String> {
    let original_permissions = tokio::fs::metadata(file_path)
        .await
        .ok()
        .map(|m| m.permissions());

    if backup && original_permissions.is_some() {
        let backup_path = create_backup(file_path).await?;
        log::info!("已备份原文件: {}", backup_path.display());
    }

    let temp_path = temp_sibling(file_path);
    tokio::fs::write(&temp_path, content)
        .await
        .map_err(|e| format!("写入临时文件失败: {}", e))?;

    if let Some(permissions) = original_permissions {
        if let Err(e) = tokio::fs::set_permissions(&temp_path, permissions).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(format!("设置临时文件权限失败: {}", e));
        }
    }

    if let Err(e) = tokio::fs::rename(&temp_path, file_path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(format!("替换目标文件失败: {}", e));
    }

    Ok(())
}

/// 获取当前 Unix 时间戳（秒）
pub(crate) fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// 临时文件路径：`<原文件名>.cph-tmp`，与目标同目录以保证 rename 不跨文件系统
fn temp_sibling(file_path: &Path) -> PathBuf {
    let mut name = file_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".cph-tmp");
    file_path.with_file_name(name)
}

/// 创建备份（与原文件同目录）
///
/// 备份路径格式：`<原始文件路径>.cphbak<timestamp>`
async fn create_backup(file_path: &Path) -> Result<PathBuf, String> {
    let mut backup_name = file_path.as_os_str().to_os_string();
    backup_name.push(format!(".cphbak{}", unix_timestamp()));
    let backup_path = PathBuf::from(backup_name);

    tokio::fs::copy(file_path, &backup_path)
        .await
        .map_err(|e| format!("创建备份失败: {}", e))?;

    Ok(backup_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("prompts-1.0.0.md");

        safe_write_file(&target, b"# doc", false).await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "# doc");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_backup_keeps_original_content() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cli.js");
        std::fs::write(&target, "original").unwrap();

        safe_write_file(&target, b"patched", true).await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "patched");
        let backups: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("cli.js.cphbak"))
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(std::fs::read_to_string(backups[0].path()).unwrap(), "original");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_rewrite_keeps_executable_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cli.js");
        std::fs::write(&target, "#!/usr/bin/env node\nold").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o755)).unwrap();

        safe_write_file(&target, b"#!/usr/bin/env node\nnew", true).await.unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[tokio::test]
    async fn test_failed_temp_write_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cli.js");
        std::fs::write(&target, "original").unwrap();
        // 临时文件路径被目录占用，写入必然失败
        std::fs::create_dir(temp_sibling(&target)).unwrap();

        assert!(safe_write_file(&target, b"patched", false).await.is_err());
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "original");
    }

    #[test]
    fn test_temp_sibling_stays_in_same_dir() {
        let path = Path::new("/tmp/out/prompts-1.0.0.md");
        assert_eq!(
            temp_sibling(path),
            PathBuf::from("/tmp/out/prompts-1.0.0.md.cph-tmp")
        );
    }
}
