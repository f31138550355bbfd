//! 메모리 백엔드
//! DATABASE_URL 없이 실행할 때(데모 모드)와 테스트에서 사용한다.
//! 입찰 기록은 하나의 쓰기 잠금 안에서 처리되어 Postgres 트랜잭션과 같은 원자성을 갖는다.

// region:    --- Imports
use super::{Backend, Bucket};
use crate::auth::password::{self, PasswordCredential};
use crate::bidding::model::{
    Bid, BidWithBidder, BidWrite, BidderSummary, Category, NewBid, NewProduct, Product,
    ProductStatus, ProductWithSeller, SellerSummary,
};
use crate::error::{MarketError, MarketResult};
use crate::profile::model::{AuthUser, Profile, ProfileFields};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

struct Account {
    id: Uuid,
    email: String,
    name: String,
    credential: PasswordCredential,
}

/// 저장된 파일
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
struct Tables {
    accounts: HashMap<String, Account>,
    profiles: HashMap<Uuid, Profile>,
    products: Vec<Product>,
    bids: Vec<Bid>,
    objects: HashMap<(Bucket, String), StoredObject>,
}

impl Tables {
    fn seller_of(&self, product: &Product) -> Option<SellerSummary> {
        let seller_id = product.seller_id?;
        self.profiles.get(&seller_id).map(|p| SellerSummary {
            id: Some(p.id),
            name: p.name.clone(),
            avatar_url: p.avatar_url.clone(),
            created_at: Some(p.created_at),
        })
    }

    fn with_seller(&self, product: &Product) -> ProductWithSeller {
        ProductWithSeller {
            product: product.clone(),
            seller: self.seller_of(product),
        }
    }
}

pub struct MemoryBackend {
    tables: RwLock<Tables>,
    public_base_url: String,
}

impl MemoryBackend {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 저장된 입찰 수
    pub async fn bid_count(&self) -> usize {
        self.tables.read().await.bids.len()
    }

    pub async fn product_count(&self) -> usize {
        self.tables.read().await.products.len()
    }

    pub async fn object(&self, bucket: Bucket, path: &str) -> Option<StoredObject> {
        self.tables
            .read()
            .await
            .objects
            .get(&(bucket, path.to_string()))
            .cloned()
    }

    pub async fn object_count(&self) -> usize {
        self.tables.read().await.objects.len()
    }

    /// 테스트/시드용 상품 직접 삽입
    pub async fn seed_product(&self, product: Product) {
        self.tables.write().await.products.push(product);
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new("memory://storage")
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn list_products(
        &self,
        category: Option<Category>,
    ) -> MarketResult<Vec<ProductWithSeller>> {
        let tables = self.tables.read().await;
        let mut products: Vec<&Product> = tables
            .products
            .iter()
            .filter(|p| category.map_or(true, |c| p.category == c))
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products.into_iter().map(|p| tables.with_seller(p)).collect())
    }

    async fn get_product(&self, id: Uuid) -> MarketResult<Option<ProductWithSeller>> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.with_seller(p)))
    }

    async fn insert_product(&self, product: NewProduct) -> MarketResult<Product> {
        let stored = Product {
            id: Uuid::new_v4(),
            title: product.title,
            description: product.description,
            image_url: product.image_url,
            category: product.category,
            starting_price: product.starting_price,
            current_price: product.starting_price,
            end_time: product.end_time,
            seller_id: Some(product.seller_id),
            status: ProductStatus::Ongoing,
            winner: None,
            created_at: product.created_at,
        };
        self.tables.write().await.products.push(stored.clone());
        Ok(stored)
    }

    async fn list_bids(&self, product_id: Uuid) -> MarketResult<Vec<BidWithBidder>> {
        let tables = self.tables.read().await;
        let mut bids: Vec<BidWithBidder> = tables
            .bids
            .iter()
            .filter(|b| b.product_id == product_id)
            .map(|b| BidWithBidder {
                bid: b.clone(),
                bidder: tables.profiles.get(&b.bidder_id).map(|p| BidderSummary {
                    name: p.name.clone(),
                    avatar_url: p.avatar_url.clone(),
                }),
            })
            .collect();
        bids.sort_by(|a, b| b.bid.created_at.cmp(&a.bid.created_at));
        Ok(bids)
    }

    async fn record_bid(&self, bid: NewBid, min_increment: i64) -> MarketResult<BidWrite> {
        let mut tables = self.tables.write().await;
        let Some(product) = tables.products.iter_mut().find(|p| p.id == bid.product_id) else {
            return Ok(BidWrite::NotFound);
        };
        if product.is_expired_at(bid.created_at) {
            return Ok(BidWrite::Ended);
        }
        let accepted = product
            .current_price
            .checked_add(min_increment)
            .is_some_and(|min_bid| bid.amount >= min_bid);
        if !accepted {
            return Ok(BidWrite::Outbid {
                current_price: product.current_price,
            });
        }

        product.current_price = bid.amount;
        let stored = Bid {
            id: Uuid::new_v4(),
            product_id: bid.product_id,
            bidder_id: bid.bidder_id,
            amount: bid.amount,
            created_at: bid.created_at,
        };
        tables.bids.push(stored.clone());
        Ok(BidWrite::Accepted(stored))
    }

    async fn get_profile(&self, id: Uuid) -> MarketResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&id).cloned())
    }

    async fn insert_profile(&self, profile: Profile) -> MarketResult<Profile> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .profiles
            .entry(profile.id)
            .or_insert(profile)
            .clone())
    }

    async fn save_profile(
        &self,
        id: Uuid,
        fields: &ProfileFields,
        now: DateTime<Utc>,
    ) -> MarketResult<Profile> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .entry(id)
            .or_insert_with(|| Profile::new(id, "", now));
        profile.name = fields.name.clone();
        profile.bio = fields.bio.clone();
        profile.location = fields.location.clone();
        profile.phone = fields.phone.clone();
        profile.interests = fields.interests.clone();
        profile.updated_at = Some(now);
        Ok(profile.clone())
    }

    async fn set_profile_avatar(
        &self,
        id: Uuid,
        avatar_url: &str,
        now: DateTime<Utc>,
    ) -> MarketResult<Profile> {
        let mut tables = self.tables.write().await;
        let profile = tables
            .profiles
            .entry(id)
            .or_insert_with(|| Profile::new(id, "", now));
        profile.avatar_url = Some(avatar_url.to_string());
        profile.updated_at = Some(now);
        Ok(profile.clone())
    }

    async fn upload(
        &self,
        bucket: Bucket,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        upsert: bool,
    ) -> MarketResult<()> {
        let mut tables = self.tables.write().await;
        let key = (bucket, path.to_string());
        if !upsert && tables.objects.contains_key(&key) {
            return Err(MarketError::Storage(format!(
                "The resource already exists: {}/{}",
                bucket.as_str(),
                path
            )));
        }
        tables.objects.insert(
            key,
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, bucket: Bucket, path: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, bucket.as_str(), path)
    }

    async fn sign_up(&self, email: &str, password: &str, name: &str) -> MarketResult<AuthUser> {
        let email = email.trim().to_lowercase();
        info!("{:<12} --> 회원 가입: {}", "Auth", email);
        if self.tables.read().await.accounts.contains_key(&email) {
            return Err(MarketError::AlreadyRegistered);
        }
        let credential = password::new_credential_blocking(password.to_string()).await?;

        let mut tables = self.tables.write().await;
        // 해시 계산 중 같은 이메일이 먼저 가입했을 수 있음
        if tables.accounts.contains_key(&email) {
            return Err(MarketError::AlreadyRegistered);
        }
        let id = Uuid::new_v4();
        let name = name.trim().to_string();
        tables.accounts.insert(
            email.clone(),
            Account {
                id,
                email: email.clone(),
                name: name.clone(),
                credential,
            },
        );
        tables
            .profiles
            .entry(id)
            .or_insert_with(|| Profile::new(id, name.clone(), Utc::now()));

        Ok(AuthUser {
            id,
            email,
            name: Some(name),
        })
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> MarketResult<AuthUser> {
        let email = email.trim().to_lowercase();
        info!("{:<12} --> 로그인: {}", "Auth", email);
        let (user, credential) = {
            let tables = self.tables.read().await;
            let account = tables
                .accounts
                .get(&email)
                .ok_or(MarketError::InvalidCredentials)?;
            (
                AuthUser {
                    id: account.id,
                    email: account.email.clone(),
                    name: Some(account.name.clone()).filter(|n| !n.is_empty()),
                },
                account.credential.clone(),
            )
        };

        if !password::verify_password_blocking(password.to_string(), credential).await? {
            return Err(MarketError::InvalidCredentials);
        }
        Ok(user)
    }
}

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    pub fn ongoing_product(current_price: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            title: "Georgian Silver Teapot".to_string(),
            description: "Hallmarked London 1790".to_string(),
            image_url: "memory://storage/products/teapot.png".to_string(),
            category: Category::Collectibles,
            starting_price: current_price,
            current_price,
            end_time: now + Duration::days(2),
            seller_id: None,
            status: ProductStatus::Ongoing,
            winner: None,
            created_at: now,
        }
    }

    fn new_bid(product_id: Uuid, amount: i64) -> NewBid {
        NewBid {
            product_id,
            bidder_id: Uuid::new_v4(),
            amount,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_bid_is_conditional() {
        let backend = MemoryBackend::default();
        let product = ongoing_product(1000);
        let id = product.id;
        backend.seed_product(product).await;

        let write = backend.record_bid(new_bid(id, 1000), 1).await.unwrap();
        assert_eq!(write, BidWrite::Outbid { current_price: 1000 });
        assert_eq!(backend.bid_count().await, 0);

        let write = backend.record_bid(new_bid(id, 1001), 1).await.unwrap();
        assert!(matches!(write, BidWrite::Accepted(ref b) if b.amount == 1001));

        let stored = backend.get_product(id).await.unwrap().unwrap();
        assert_eq!(stored.product.current_price, 1001);
        assert_eq!(backend.bid_count().await, 1);
    }

    #[tokio::test]
    async fn test_record_bid_on_ended_or_missing() {
        let backend = MemoryBackend::default();
        let mut product = ongoing_product(1000);
        product.end_time = Utc::now() - Duration::minutes(1);
        let id = product.id;
        backend.seed_product(product).await;

        assert_eq!(
            backend.record_bid(new_bid(id, 5000), 1).await.unwrap(),
            BidWrite::Ended
        );
        assert_eq!(
            backend.record_bid(new_bid(Uuid::new_v4(), 5000), 1).await.unwrap(),
            BidWrite::NotFound
        );
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in() {
        let backend = MemoryBackend::default();
        let user = backend
            .sign_up("Collector@Gmail.com", "Sup3r$ecret", "Ada")
            .await
            .unwrap();
        assert_eq!(user.email, "collector@gmail.com");
        assert!(backend.get_profile(user.id).await.unwrap().is_some());

        let again = backend
            .sign_up("collector@gmail.com", "Sup3r$ecret", "Ada")
            .await
            .unwrap_err();
        assert!(matches!(again, MarketError::AlreadyRegistered));

        let signed_in = backend
            .sign_in_with_password("collector@gmail.com", "Sup3r$ecret")
            .await
            .unwrap();
        assert_eq!(signed_in.id, user.id);

        let wrong = backend
            .sign_in_with_password("collector@gmail.com", "nope")
            .await
            .unwrap_err();
        assert!(matches!(wrong, MarketError::InvalidCredentials));
    }
}
// endregion: --- Tests
