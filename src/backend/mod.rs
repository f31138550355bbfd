//! 데이터/인증/스토리지 백엔드
//! 모든 읽기/쓰기는 이 트레이트를 거친다.

// region:    --- Imports
use crate::bidding::model::{
    BidWithBidder, BidWrite, Category, NewBid, NewProduct, Product, ProductWithSeller,
};
use crate::error::MarketResult;
use crate::profile::model::{AuthUser, Profile, ProfileFields};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Modules
pub mod memory;
pub mod postgres;
pub mod storage;

pub use memory::MemoryBackend;
pub use postgres::PostgresBackend;
pub use storage::FileStorage;

// endregion: --- Modules

/// 스토리지 버킷
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Avatars,
    Products,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Avatars => "avatars",
            Bucket::Products => "products",
        }
    }
}

// region:    --- Backend Trait
#[async_trait]
pub trait Backend: Send + Sync {
    // --- products
    /// 최신순, 판매자 프로필 조인
    async fn list_products(&self, category: Option<Category>)
        -> MarketResult<Vec<ProductWithSeller>>;
    async fn get_product(&self, id: Uuid) -> MarketResult<Option<ProductWithSeller>>;
    async fn insert_product(&self, product: NewProduct) -> MarketResult<Product>;

    // --- bids
    /// 최신순, 입찰자 프로필 조인
    async fn list_bids(&self, product_id: Uuid) -> MarketResult<Vec<BidWithBidder>>;
    /// 입찰 기록과 현재가 갱신을 하나의 트랜잭션으로 처리.
    /// `amount >= current_price + min_increment`이고 경매가 진행 중일 때만 커밋된다.
    async fn record_bid(&self, bid: NewBid, min_increment: i64) -> MarketResult<BidWrite>;

    // --- profiles
    async fn get_profile(&self, id: Uuid) -> MarketResult<Option<Profile>>;
    /// 이미 있으면 기존 프로필을 그대로 반환
    async fn insert_profile(&self, profile: Profile) -> MarketResult<Profile>;
    async fn save_profile(
        &self,
        id: Uuid,
        fields: &ProfileFields,
        now: DateTime<Utc>,
    ) -> MarketResult<Profile>;
    async fn set_profile_avatar(
        &self,
        id: Uuid,
        avatar_url: &str,
        now: DateTime<Utc>,
    ) -> MarketResult<Profile>;

    // --- storage
    async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> MarketResult<()>;
    fn public_url(&self, bucket: Bucket, path: &str) -> String;

    // --- auth
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> MarketResult<AuthUser>;
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> MarketResult<AuthUser>;
}

// endregion: --- Backend Trait
