// region:    --- Imports
use super::{SessionStore, SnapshotStorage, SNAPSHOT_PREFIX};
use crate::error::MarketResult;
use crate::profile::model::User;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

pub type SessionHandle = Arc<Mutex<SessionStore>>;

/// 토큰별 세션 보관소
pub struct SessionRegistry {
    storage: Arc<dyn SnapshotStorage>,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

fn snapshot_name(token: &str) -> String {
    format!("{}-{}", SNAPSHOT_PREFIX, token)
}

impl SessionRegistry {
    /// 저장된 인증 세션 복원
    pub async fn hydrate(storage: Arc<dyn SnapshotStorage>) -> MarketResult<Self> {
        let prefix = format!("{}-", SNAPSHOT_PREFIX);
        let mut sessions = HashMap::new();
        for name in storage.names().await? {
            let Some(token) = name.strip_prefix(&prefix) else {
                continue;
            };
            let store = SessionStore::hydrate(name.clone(), Arc::clone(&storage)).await?;
            if store.is_authenticated() {
                sessions.insert(token.to_string(), Arc::new(Mutex::new(store)));
            }
        }
        info!("{:<12} --> 세션 복원: {}개", "Session", sessions.len());
        Ok(Self {
            storage,
            sessions: RwLock::new(sessions),
        })
    }

    /// 로그인 후 새 토큰 발급
    pub async fn open(&self, user: User) -> MarketResult<(String, SessionHandle)> {
        let token = Uuid::new_v4().simple().to_string();
        let mut store =
            SessionStore::hydrate(snapshot_name(&token), Arc::clone(&self.storage)).await?;
        store.login(user).await?;

        let handle = Arc::new(Mutex::new(store));
        self.sessions
            .write()
            .await
            .insert(token.clone(), Arc::clone(&handle));
        Ok((token, handle))
    }

    pub async fn get(&self, token: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(token).cloned()
    }

    /// 로그아웃: 세션 비우고 스냅샷 제거
    pub async fn close(&self, token: &str) -> MarketResult<bool> {
        let Some(handle) = self.sessions.write().await.remove(token) else {
            return Ok(false);
        };
        let mut store = handle.lock().await;
        store.logout().await?;
        self.storage.remove(store.name()).await?;
        Ok(true)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::test_user;
    use crate::session::MemorySnapshotStorage;

    #[tokio::test]
    async fn test_sessions_survive_restart() {
        let storage: Arc<dyn SnapshotStorage> = Arc::new(MemorySnapshotStorage::default());
        let registry = SessionRegistry::hydrate(Arc::clone(&storage)).await.unwrap();
        let (token, _) = registry.open(test_user("Ada")).await.unwrap();

        let restarted = SessionRegistry::hydrate(Arc::clone(&storage)).await.unwrap();
        let handle = restarted.get(&token).await.unwrap();
        assert_eq!(handle.lock().await.user().unwrap().name, "Ada");

        assert!(restarted.close(&token).await.unwrap());
        assert!(!restarted.close(&token).await.unwrap());
        assert!(restarted.get(&token).await.is_none());
        assert!(storage.names().await.unwrap().is_empty());
    }
}
