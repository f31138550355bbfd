// region:    --- Imports
use super::Bucket;
use crate::error::{MarketError, MarketResult};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::info;

// endregion: --- Imports

/// 파일 시스템 기반 버킷 스토리지
/// `<root>/<bucket>/<path>`에 저장하고 `<public_base_url>/<bucket>/<path>`로 공개한다.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
    public_base_url: String,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 업로드
    pub async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: &[u8],
        upsert: bool,
    ) -> MarketResult<()> {
        let target = self.object_path(bucket, path)?;
        if !upsert && fs::try_exists(&target).await? {
            return Err(MarketError::Storage(format!(
                "The resource already exists: {}/{}",
                bucket.as_str(),
                path
            )));
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&target, bytes).await?;
        info!(
            "{:<12} --> 업로드 완료: {}/{} ({} bytes)",
            "Storage",
            bucket.as_str(),
            path,
            bytes.len()
        );
        Ok(())
    }

    pub fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, bucket.as_str(), path)
    }

    // 버킷 밖으로 나가는 경로 차단
    fn object_path(&self, bucket: Bucket, path: &str) -> MarketResult<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || path.is_empty() {
            return Err(MarketError::Storage(format!("Invalid object path: {}", path)));
        }
        Ok(self.root.join(bucket.as_str()).join(relative))
    }
}
