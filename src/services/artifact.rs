//! # 报告产物存储
//!
//! 每个版本标签对应输出目录下的一个 `prompts-{label}.md` 文件。
//! 文件存在即视为该版本已完成，因此写入必须经过 [`safe_write_file`] 原子落盘。

use std::path::PathBuf;

use async_trait::async_trait;

use crate::services::file_guard::safe_write_file;
use crate::services::pipeline::ArtifactStore;
use crate::utils::path::artifact_file_name;

/// 基于目录的报告存储
pub struct DirArtifactStore {
    out_dir: PathBuf,
}

impl DirArtifactStore {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// 标签对应的报告路径
    pub fn path_for(&self, label: &str) -> PathBuf {
        self.out_dir.join(artifact_file_name(label))
    }
}

#[async_trait]
impl ArtifactStore for DirArtifactStore {
    async fn exists(&self, label: &str) -> bool {
        tokio::fs::try_exists(self.path_for(label))
            .await
            .unwrap_or(false)
    }

    async fn write(&self, label: &str, document: &str) -> Result<PathBuf, String> {
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .map_err(|e| format!("创建输出目录 {} 失败: {}", self.out_dir.display(), e))?;

        let path = self.path_for(label);
        safe_write_file(&path, document.as_bytes(), false).await?;
        Ok(path)
    }
}
