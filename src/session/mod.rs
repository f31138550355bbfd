//! 세션 컨텍스트
//! 시작 시 저장소에서 복원하고, 로그인/로그아웃/입찰/프로필 변경마다 다시 저장한다.
//! 입찰 캐시는 본인 입찰 내역 화면용일 뿐 경매 상태의 원본이 아니다.

// region:    --- Imports
use crate::bidding::model::ProductStatus;
use crate::error::MarketResult;
use crate::profile::model::{User, UserPatch};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Modules
pub mod registry;
pub mod storage;

pub use registry::SessionRegistry;
pub use storage::{FileSnapshotStorage, MemorySnapshotStorage, SnapshotStorage};

// endregion: --- Modules

/// 스냅샷 이름 접두사
pub const SNAPSHOT_PREFIX: &str = "auth-storage";

// region:    --- Snapshot
/// 입찰 당시 상품 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidProductSummary {
    pub title: String,
    pub image_url: String,
    pub seller: String,
    pub end_time: DateTime<Utc>,
    pub status: ProductStatus,
    pub winner: Option<String>,
    pub starting_price: i64,
    pub current_price: i64,
}

/// 본인 입찰 캐시 항목
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedBid {
    pub id: Uuid,
    pub product_id: Uuid,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<BidProductSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_authenticated: bool,
    /// 최신 입찰이 앞
    pub bids: Vec<CachedBid>,
}

// endregion: --- Snapshot

// region:    --- Session Store
pub struct SessionStore {
    name: String,
    snapshot: SessionSnapshot,
    storage: Arc<dyn SnapshotStorage>,
}

impl SessionStore {
    /// 저장된 스냅샷으로 복원 (없으면 빈 세션)
    pub async fn hydrate(
        name: impl Into<String>,
        storage: Arc<dyn SnapshotStorage>,
    ) -> MarketResult<Self> {
        let name = name.into();
        let snapshot = storage.load(&name).await?.unwrap_or_default();
        debug!("{:<12} --> 세션 복원: {}", "Session", name);
        Ok(Self {
            name,
            snapshot,
            storage,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    /// 인증된 사용자 (플래그와 사용자 모두 있어야 함)
    pub fn user(&self) -> Option<&User> {
        if self.snapshot.is_authenticated {
            self.snapshot.user.as_ref()
        } else {
            None
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn bids(&self) -> &[CachedBid] {
        &self.snapshot.bids
    }

    pub async fn login(&mut self, user: User) -> MarketResult<()> {
        self.snapshot.user = Some(user);
        self.snapshot.is_authenticated = true;
        self.persist().await
    }

    /// 사용자, 인증 플래그, 입찰 캐시 모두 초기화
    pub async fn logout(&mut self) -> MarketResult<()> {
        self.snapshot = SessionSnapshot::default();
        self.persist().await
    }

    /// 최신 입찰을 맨 앞에 추가 (기존 항목 유지)
    pub async fn add_bid(&mut self, bid: CachedBid) -> MarketResult<()> {
        self.snapshot.bids.insert(0, bid);
        self.persist().await
    }

    /// 로그인 상태일 때만 사용자 정보 병합
    pub async fn update_profile(&mut self, patch: UserPatch) -> MarketResult<()> {
        match self.snapshot.user.as_mut() {
            Some(user) => user.merge(patch),
            None => return Ok(()),
        }
        self.persist().await
    }

    async fn persist(&self) -> MarketResult<()> {
        self.storage.save(&self.name, &self.snapshot).await
    }
}

// endregion: --- Session Store

// endregion: --- Tests
