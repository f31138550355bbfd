//! 빈 환경에서 보여줄 고정 샘플 상품
//! 캐시가 아니라 데모용 데이터이며 입찰 대상이 아니다.

use crate::bidding::model::{Category, Product, ProductStatus, ProductWithSeller, SellerSummary};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

struct Sample {
    id: &'static str,
    category: Category,
    title: &'static str,
    description: &'static str,
    image_url: &'static str,
    current_price: i64,
    starting_price: i64,
    // 현재 시각 기준 종료까지 남은 일수 (음수면 이미 종료)
    ends_in_days: i64,
    seller: &'static str,
    winner: Option<&'static str>,
}

const SAMPLES: [Sample; 8] = [
    Sample {
        id: "123e4567-e89b-12d3-a456-426614174000",
        category: Category::Jewelry,
        title: "Victorian Diamond Necklace",
        description: "Exquisite 19th century diamond necklace with intricate filigree work",
        image_url: "https://images.unsplash.com/photo-1515562141207-7a88fb7ce338",
        current_price: 5000,
        starting_price: 3000,
        ends_in_days: 3,
        seller: "Victoria Antiques",
        winner: None,
    },
    Sample {
        id: "123e4567-e89b-12d3-a456-426614174001",
        category: Category::Jewelry,
        title: "Art Deco Ruby Ring",
        description: "1920s art deco ring featuring a natural ruby",
        image_url: "https://images.unsplash.com/photo-1605100804763-247f67b3557e",
        current_price: 2800,
        starting_price: 1500,
        ends_in_days: -1,
        seller: "Vintage Gems",
        winner: Some("Anonymous Bidder"),
    },
    Sample {
        id: "123e4567-e89b-12d3-a456-426614174002",
        category: Category::Furniture,
        title: "Queen Anne Writing Desk",
        description: "18th century mahogany writing desk in excellent condition",
        image_url: "https://images.unsplash.com/photo-1517705008128-361805f42e86",
        current_price: 8500,
        starting_price: 5000,
        ends_in_days: 5,
        seller: "Heritage Furniture",
        winner: None,
    },
    Sample {
        id: "123e4567-e89b-12d3-a456-426614174003",
        category: Category::Furniture,
        title: "French Provincial Armoire",
        description: "Late 19th century armoire with original brass fittings",
        image_url: "https://images.unsplash.com/photo-1505693416388-ac5ce068fe85",
        current_price: 6200,
        starting_price: 4000,
        ends_in_days: -2,
        seller: "Antique Masters",
        winner: Some("Classic Collector"),
    },
    Sample {
        id: "123e4567-e89b-12d3-a456-426614174004",
        category: Category::Art,
        title: "19th Century Oil Painting",
        description: "Pastoral landscape by renowned artist",
        image_url: "https://images.unsplash.com/photo-1578301978693-85fa9c0320b9",
        current_price: 12000,
        starting_price: 8000,
        ends_in_days: 4,
        seller: "Fine Arts Gallery",
        winner: None,
    },
    Sample {
        id: "123e4567-e89b-12d3-a456-426614174005",
        category: Category::Books,
        title: "First Edition Dickens",
        description: "First edition of Great Expectations, 1861",
        image_url: "https://images.unsplash.com/photo-1544947950-fa07a98d237f",
        current_price: 15000,
        starting_price: 10000,
        ends_in_days: 2,
        seller: "Rare Books Ltd",
        winner: None,
    },
    Sample {
        id: "123e4567-e89b-12d3-a456-426614174006",
        category: Category::Coins,
        title: "1804 Silver Dollar",
        description: "Extremely rare Class I Original 1804 Silver Dollar",
        image_url: "https://images.unsplash.com/photo-1621778455241-2aa5b2f8c20b",
        current_price: 25000,
        starting_price: 20000,
        ends_in_days: 1,
        seller: "Numismatic Treasures",
        winner: None,
    },
    Sample {
        id: "123e4567-e89b-12d3-a456-426614174007",
        category: Category::Collectibles,
        title: "1950s Coca-Cola Machine",
        description: "Fully restored vintage Coca-Cola vending machine",
        image_url: "https://images.unsplash.com/photo-1534073828943-f801091bb18c",
        current_price: 4500,
        starting_price: 3000,
        ends_in_days: 6,
        seller: "Vintage Collectibles",
        winner: None,
    },
];

impl Sample {
    fn to_product(&self, now: DateTime<Utc>) -> ProductWithSeller {
        let status = if self.winner.is_some() {
            ProductStatus::Completed
        } else {
            ProductStatus::Ongoing
        };
        ProductWithSeller {
            product: Product {
                id: Uuid::parse_str(self.id).unwrap_or_default(),
                title: self.title.to_string(),
                description: self.description.to_string(),
                image_url: self.image_url.to_string(),
                category: self.category,
                starting_price: self.starting_price,
                current_price: self.current_price,
                end_time: now + Duration::days(self.ends_in_days),
                seller_id: None,
                status,
                winner: self.winner.map(str::to_string),
                created_at: now,
            },
            seller: Some(SellerSummary {
                id: None,
                name: self.seller.to_string(),
                avatar_url: None,
                created_at: Some(now),
            }),
        }
    }
}

/// 샘플 상품 id인지 확인
pub fn is_sample_id(id: &str) -> bool {
    SAMPLES.iter().any(|s| s.id.eq_ignore_ascii_case(id.trim()))
}

/// 샘플 상품 목록 (카테고리 필터 가능)
pub fn sample_products(category: Option<Category>, now: DateTime<Utc>) -> Vec<ProductWithSeller> {
    SAMPLES
        .iter()
        .filter(|s| category.map_or(true, |c| s.category == c))
        .map(|s| s.to_product(now))
        .collect()
}

pub fn sample_product(id: &str, now: DateTime<Utc>) -> Option<ProductWithSeller> {
    SAMPLES
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(id.trim()))
        .map(|s| s.to_product(now))
}
