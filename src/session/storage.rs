// region:    --- Imports
use super::SessionSnapshot;
use crate::error::{MarketError, MarketResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::RwLock;

// endregion: --- Imports

/// 세션 스냅샷 영속화 어댑터
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    async fn load(&self, name: &str) -> MarketResult<Option<SessionSnapshot>>;
    async fn save(&self, name: &str, snapshot: &SessionSnapshot) -> MarketResult<()>;
    async fn remove(&self, name: &str) -> MarketResult<()>;
    /// 저장된 스냅샷 이름 목록
    async fn names(&self) -> MarketResult<Vec<String>>;
}

// region:    --- File Storage
/// `<dir>/<name>.json` 파일로 저장
#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    dir: PathBuf,
}

impl FileSnapshotStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }
}

fn session_error(e: impl std::fmt::Display) -> MarketError {
    MarketError::Session(e.to_string())
}

#[async_trait]
impl SnapshotStorage for FileSnapshotStorage {
    async fn load(&self, name: &str) -> MarketResult<Option<SessionSnapshot>> {
        match fs::read_to_string(self.path(name)).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json).map_err(session_error)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(session_error(e)),
        }
    }

    async fn save(&self, name: &str, snapshot: &SessionSnapshot) -> MarketResult<()> {
        fs::create_dir_all(&self.dir).await.map_err(session_error)?;
        let json = serde_json::to_string_pretty(snapshot).map_err(session_error)?;
        // 쓰기 도중 중단되어도 기존 스냅샷이 깨지지 않도록 임시 파일 후 교체
        let tmp = self.dir.join(format!("{}.json.tmp", name));
        fs::write(&tmp, json).await.map_err(session_error)?;
        fs::rename(&tmp, self.path(name)).await.map_err(session_error)?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> MarketResult<()> {
        match fs::remove_file(self.path(name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(session_error(e)),
        }
    }

    async fn names(&self) -> MarketResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(session_error(e)),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(session_error)? {
            let file_name = entry.file_name();
            if let Some(name) = file_name.to_str().and_then(|f| f.strip_suffix(".json")) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// endregion: --- File Storage

// region:    --- Memory Storage
#[derive(Debug, Default)]
pub struct MemorySnapshotStorage {
    snapshots: RwLock<HashMap<String, SessionSnapshot>>,
}

#[async_trait]
impl SnapshotStorage for MemorySnapshotStorage {
    async fn load(&self, name: &str) -> MarketResult<Option<SessionSnapshot>> {
        Ok(self.snapshots.read().await.get(name).cloned())
    }

    async fn save(&self, name: &str, snapshot: &SessionSnapshot) -> MarketResult<()> {
        self.snapshots
            .write()
            .await
            .insert(name.to_string(), snapshot.clone());
        Ok(())
    }

    async fn remove(&self, name: &str) -> MarketResult<()> {
        self.snapshots.write().await.remove(name);
        Ok(())
    }

    async fn names(&self) -> MarketResult<Vec<String>> {
        let mut names: Vec<String> = self.snapshots.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

// endregion: --- Memory Storage
