// region:    --- Imports
use super::{Backend, Bucket, FileStorage};
use crate::auth::password::{self, PasswordCredential};
use crate::bidding::model::{
    Bid, BidWithBidder, BidWrite, BidderSummary, Category, NewBid, NewProduct, Product,
    ProductStatus, ProductWithSeller, SellerSummary,
};
use crate::database::DatabaseManager;
use crate::error::{MarketError, MarketResult};
use crate::profile::model::{AuthUser, Profile, ProfileFields};
use crate::query::queries;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Rows
// 상품 + 판매자 조인 행
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    title: String,
    description: String,
    image_url: String,
    category: String,
    starting_price: i64,
    current_price: i64,
    end_time: DateTime<Utc>,
    seller_id: Option<Uuid>,
    status: String,
    winner: Option<String>,
    created_at: DateTime<Utc>,
    seller_name: Option<String>,
    seller_avatar_url: Option<String>,
    seller_created_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRow> for ProductWithSeller {
    type Error = MarketError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category: Category = row.category.parse().map_err(decode_error)?;
        let status: ProductStatus = row.status.parse().map_err(decode_error)?;
        let seller = row.seller_name.map(|name| SellerSummary {
            id: row.seller_id,
            name,
            avatar_url: row.seller_avatar_url,
            created_at: row.seller_created_at,
        });
        Ok(ProductWithSeller {
            product: Product {
                id: row.id,
                title: row.title,
                description: row.description,
                image_url: row.image_url,
                category,
                starting_price: row.starting_price,
                current_price: row.current_price,
                end_time: row.end_time,
                seller_id: row.seller_id,
                status,
                winner: row.winner,
                created_at: row.created_at,
            },
            seller,
        })
    }
}

// 입찰 + 입찰자 조인 행
#[derive(sqlx::FromRow)]
struct BidRow {
    #[sqlx(flatten)]
    bid: Bid,
    bidder_name: Option<String>,
    bidder_avatar_url: Option<String>,
}

impl From<BidRow> for BidWithBidder {
    fn from(row: BidRow) -> Self {
        BidWithBidder {
            bid: row.bid,
            bidder: row.bidder_name.map(|name| BidderSummary {
                name,
                avatar_url: row.bidder_avatar_url,
            }),
        }
    }
}

fn decode_error(message: String) -> MarketError {
    MarketError::Database(sqlx::Error::Decode(message.into()))
}

// endregion: --- Rows

// region:    --- Postgres Backend
/// PostgreSQL + 파일 스토리지 백엔드
pub struct PostgresBackend {
    db_manager: Arc<DatabaseManager>,
    storage: FileStorage,
}

impl PostgresBackend {
    pub fn new(db_manager: Arc<DatabaseManager>, storage: FileStorage) -> Self {
        Self {
            db_manager,
            storage,
        }
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn list_products(
        &self,
        category: Option<Category>,
    ) -> MarketResult<Vec<ProductWithSeller>> {
        info!("{:<12} --> 상품 목록 조회: {:?}", "Query", category);
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, ProductRow>(queries::LIST_PRODUCTS_BY_CATEGORY)
                    .bind(category.as_str())
                    .fetch_all(self.db_manager.pool())
                    .await?
            }
            None => {
                sqlx::query_as::<_, ProductRow>(queries::LIST_PRODUCTS)
                    .fetch_all(self.db_manager.pool())
                    .await?
            }
        };
        rows.into_iter().map(ProductWithSeller::try_from).collect()
    }

    async fn get_product(&self, id: Uuid) -> MarketResult<Option<ProductWithSeller>> {
        info!("{:<12} --> 상품 조회 id: {}", "Query", id);
        sqlx::query_as::<_, ProductRow>(queries::GET_PRODUCT)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?
            .map(ProductWithSeller::try_from)
            .transpose()
    }

    async fn insert_product(&self, product: NewProduct) -> MarketResult<Product> {
        info!("{:<12} --> 상품 등록: {}", "Command", product.title);
        let row = sqlx::query_as::<_, ProductRow>(queries::INSERT_PRODUCT)
            .bind(Uuid::new_v4())
            .bind(&product.title)
            .bind(&product.description)
            .bind(&product.image_url)
            .bind(product.category.as_str())
            .bind(product.starting_price)
            .bind(product.end_time)
            .bind(product.seller_id)
            .bind(product.created_at)
            .fetch_one(self.db_manager.pool())
            .await?;
        Ok(ProductWithSeller::try_from(row)?.product)
    }

    async fn list_bids(&self, product_id: Uuid) -> MarketResult<Vec<BidWithBidder>> {
        info!("{:<12} --> 입찰 이력 조회 id: {}", "Query", product_id);
        let rows = sqlx::query_as::<_, BidRow>(queries::LIST_BIDS)
            .bind(product_id)
            .fetch_all(self.db_manager.pool())
            .await?;
        Ok(rows.into_iter().map(BidWithBidder::from).collect())
    }

    async fn record_bid(&self, bid: NewBid, min_increment: i64) -> MarketResult<BidWrite> {
        info!(
            "{:<12} --> 입찰 기록 트랜잭션 시작: product={}, amount={}",
            "Command", bid.product_id, bid.amount
        );
        let result = self
            .db_manager
            .transaction::<_, BidWrite, sqlx::Error>(|tx| {
                Box::pin(async move {
                    // 현재가 확인 및 갱신
                    let raised = sqlx::query_scalar::<_, i64>(queries::RAISE_CURRENT_PRICE)
                        .bind(bid.amount)
                        .bind(bid.product_id)
                        .bind(bid.created_at)
                        .bind(min_increment)
                        .fetch_optional(&mut **tx)
                        .await?;

                    if raised.is_none() {
                        // 갱신 실패 사유 판별
                        let state = sqlx::query(queries::GET_BID_STATE)
                            .bind(bid.product_id)
                            .fetch_optional(&mut **tx)
                            .await?;
                        let outcome = match state {
                            None => BidWrite::NotFound,
                            Some(row) => {
                                let status: String = row.get("status");
                                let end_time: DateTime<Utc> = row.get("end_time");
                                if status == ProductStatus::Completed.as_str()
                                    || end_time <= bid.created_at
                                {
                                    BidWrite::Ended
                                } else {
                                    BidWrite::Outbid {
                                        current_price: row.get("current_price"),
                                    }
                                }
                            }
                        };
                        return Ok(outcome);
                    }

                    // 입찰 기록 추가
                    let stored = sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                        .bind(Uuid::new_v4())
                        .bind(bid.product_id)
                        .bind(bid.bidder_id)
                        .bind(bid.amount)
                        .bind(bid.created_at)
                        .fetch_one(&mut **tx)
                        .await?;
                    Ok(BidWrite::Accepted(stored))
                })
            })
            .await?;

        match &result {
            BidWrite::Accepted(stored) => info!(
                "{:<12} --> 입찰 성공: 현재 가격 {}",
                "Command", stored.amount
            ),
            other => warn!("{:<12} --> 입찰 거절: {:?}", "Command", other),
        }
        Ok(result)
    }

    async fn get_profile(&self, id: Uuid) -> MarketResult<Option<Profile>> {
        info!("{:<12} --> 프로필 조회 id: {}", "Query", id);
        Ok(sqlx::query_as::<_, Profile>(queries::GET_PROFILE)
            .bind(id)
            .fetch_optional(self.db_manager.pool())
            .await?)
    }

    async fn insert_profile(&self, profile: Profile) -> MarketResult<Profile> {
        info!("{:<12} --> 프로필 생성 id: {}", "Command", profile.id);
        let inserted = sqlx::query_as::<_, Profile>(queries::INSERT_PROFILE)
            .bind(profile.id)
            .bind(&profile.name)
            .bind(&profile.avatar_url)
            .bind(&profile.bio)
            .bind(&profile.location)
            .bind(&profile.phone)
            .bind(&profile.interests)
            .bind(profile.created_at)
            .bind(profile.updated_at)
            .fetch_optional(self.db_manager.pool())
            .await?;
        match inserted {
            Some(profile) => Ok(profile),
            // 동시에 먼저 생성된 행
            None => Ok(sqlx::query_as::<_, Profile>(queries::GET_PROFILE)
                .bind(profile.id)
                .fetch_one(self.db_manager.pool())
                .await?),
        }
    }

    async fn save_profile(
        &self,
        id: Uuid,
        fields: &ProfileFields,
        now: DateTime<Utc>,
    ) -> MarketResult<Profile> {
        info!("{:<12} --> 프로필 저장 id: {}", "Command", id);
        Ok(sqlx::query_as::<_, Profile>(queries::UPSERT_PROFILE_FIELDS)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.bio)
            .bind(&fields.location)
            .bind(&fields.phone)
            .bind(&fields.interests)
            .bind(now)
            .fetch_one(self.db_manager.pool())
            .await?)
    }

    async fn set_profile_avatar(
        &self,
        id: Uuid,
        avatar_url: &str,
        now: DateTime<Utc>,
    ) -> MarketResult<Profile> {
        info!("{:<12} --> 아바타 변경 id: {}", "Command", id);
        Ok(sqlx::query_as::<_, Profile>(queries::UPSERT_PROFILE_AVATAR)
            .bind(id)
            .bind(avatar_url)
            .bind(now)
            .fetch_one(self.db_manager.pool())
            .await?)
    }

    async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
        upsert: bool,
    ) -> MarketResult<()> {
        self.storage.upload(bucket, path, &bytes, upsert).await
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        self.storage.public_url(bucket, path)
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> MarketResult<AuthUser> {
        let email = email.trim().to_lowercase();
        info!("{:<12} --> 회원 가입: {}", "Auth", email);
        let credential = password::new_credential_blocking(password.to_string()).await?;
        let id = Uuid::new_v4();
        let name = name.trim().to_string();
        let now = Utc::now();

        let tx_email = email.clone();
        let tx_name = name.clone();
        self.db_manager
            .transaction::<_, (), MarketError>(|tx| {
                Box::pin(async move {
                    let inserted = sqlx::query_scalar::<_, Uuid>(queries::INSERT_USER)
                        .bind(id)
                        .bind(&tx_email)
                        .bind(&tx_name)
                        .bind(&credential.hash)
                        .bind(&credential.salt)
                        .bind(now)
                        .fetch_optional(&mut **tx)
                        .await?;
                    if inserted.is_none() {
                        return Err(MarketError::AlreadyRegistered);
                    }

                    sqlx::query(queries::INSERT_SIGNUP_PROFILE)
                        .bind(id)
                        .bind(&tx_name)
                        .bind(now)
                        .execute(&mut **tx)
                        .await?;
                    Ok(())
                })
            })
            .await?;

        Ok(AuthUser {
            id,
            email,
            name: Some(name),
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> MarketResult<AuthUser> {
        let email = email.trim().to_lowercase();
        info!("{:<12} --> 로그인: {}", "Auth", email);
        let row = sqlx::query(queries::GET_USER_BY_EMAIL)
            .bind(&email)
            .fetch_optional(self.db_manager.pool())
            .await?
            .ok_or(MarketError::InvalidCredentials)?;

        let credential = PasswordCredential {
            hash: row.get("password_hash"),
            salt: row.get("password_salt"),
        };
        if !password::verify_password_blocking(password.to_string(), credential).await? {
            return Err(MarketError::InvalidCredentials);
        }

        let name: String = row.get("name");
        Ok(AuthUser {
            id: row.get("id"),
            email: row.get("email"),
            name: Some(name).filter(|n| !n.is_empty()),
        })
    }
}

// endregion: --- Postgres Backend
