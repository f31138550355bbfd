use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// 상품 카테고리
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Jewelry,
    Furniture,
    Art,
    Books,
    Coins,
    Collectibles,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Jewelry,
        Category::Furniture,
        Category::Art,
        Category::Books,
        Category::Coins,
        Category::Collectibles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Jewelry => "Jewelry",
            Category::Furniture => "Furniture",
            Category::Art => "Art",
            Category::Books => "Books",
            Category::Coins => "Coins",
            Category::Collectibles => "Collectibles",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Jewelry => "💍",
            Category::Furniture => "🪑",
            Category::Art => "🎨",
            Category::Books => "📚",
            Category::Coins => "🪙",
            Category::Collectibles => "🏺",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// 홈 화면 링크는 소문자를 쓰므로 대소문자 무시
impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

// 경매 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Ongoing,
    Completed,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Ongoing => "ongoing",
            ProductStatus::Completed => "completed",
        }
    }
}

impl FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ongoing" => Ok(ProductStatus::Ongoing),
            "completed" => Ok(ProductStatus::Completed),
            other => Err(format!("Unknown product status: {}", other)),
        }
    }
}

// 상품 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub category: Category,
    pub starting_price: i64,
    pub current_price: i64,
    pub end_time: DateTime<Utc>,
    pub seller_id: Option<Uuid>,
    pub status: ProductStatus,
    pub winner: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// 종료 시각이 지났거나 완료 상태면 입찰 불가
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status == ProductStatus::Completed || self.end_time <= now
    }
}

// 판매자 요약 (profiles 조인 결과)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerSummary {
    pub id: Option<Uuid>,
    pub name: String,
    pub avatar_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductWithSeller {
    #[serde(flatten)]
    pub product: Product,
    pub seller: Option<SellerSummary>,
}

// 입찰 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: Uuid,
    pub product_id: Uuid,
    pub bidder_id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

// 입찰자 요약 (profiles 조인 결과)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidderSummary {
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidWithBidder {
    #[serde(flatten)]
    pub bid: Bid,
    pub bidder: Option<BidderSummary>,
}

// 신규 상품
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub category: Category,
    pub starting_price: i64,
    pub end_time: DateTime<Utc>,
    pub seller_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// 신규 입찰
#[derive(Debug, Clone)]
pub struct NewBid {
    pub product_id: Uuid,
    pub bidder_id: Uuid,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// 입찰 기록 트랜잭션 결과
#[derive(Debug, Clone, PartialEq)]
pub enum BidWrite {
    /// 입찰 기록과 현재가 갱신이 함께 커밋됨
    Accepted(Bid),
    /// 저장된 현재가가 이미 입찰가 이상
    Outbid { current_price: i64 },
    Ended,
    NotFound,
}
