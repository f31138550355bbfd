// region:    --- Imports
use super::samples;
use crate::backend::Backend;
use crate::bidding::model::{BidWithBidder, Category, ProductWithSeller};
use crate::error::{MarketError, MarketResult};
use crate::format::format_time_left;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Views
/// 상품 목록 결과
#[derive(Debug, Clone, Serialize)]
pub struct ProductListing {
    pub category: Option<Category>,
    pub products: Vec<ProductWithSeller>,
    /// 샘플 데이터로 대체되었는지
    pub from_samples: bool,
}

/// 상품 상세 결과
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: ProductWithSeller,
    pub bids: Vec<BidWithBidder>,
    pub is_expired: bool,
    pub time_left: String,
    pub is_sample: bool,
}

// endregion: --- Views

// region:    --- Query Handlers

/// 상품 목록 조회
/// 결과가 없거나 조회에 실패하면 샘플 데이터로 대체
pub async fn list_products(
    backend: &dyn Backend,
    category: Option<Category>,
    now: DateTime<Utc>,
) -> ProductListing {
    info!("{:<12} --> 상품 목록 조회: {:?}", "Query", category);
    let products = match backend.list_products(category).await {
        Ok(products) => products,
        Err(e) => {
            error!("{:<12} --> 상품 목록 조회 실패: {}", "Query", e);
            Vec::new()
        }
    };

    if products.is_empty() {
        return ProductListing {
            category,
            products: samples::sample_products(category, now),
            from_samples: true,
        };
    }
    ProductListing {
        category,
        products,
        from_samples: false,
    }
}

/// 상품 상세 조회
/// 샘플 id면 샘플을, 아니면 백엔드에서 조회한다.
pub async fn product_details(
    backend: &dyn Backend,
    id: &str,
    now: DateTime<Utc>,
) -> MarketResult<ProductDetails> {
    info!("{:<12} --> 상품 상세 조회 id: {}", "Query", id);
    if let Some(sample) = samples::sample_product(id, now) {
        return Ok(details(sample, Vec::new(), now, true));
    }

    let product_id = Uuid::parse_str(id.trim()).map_err(|_| MarketError::NotFound)?;
    let product = backend
        .get_product(product_id)
        .await?
        .ok_or(MarketError::NotFound)?;

    // 입찰 이력 실패는 상세 화면을 막지 않는다
    let bids = match backend.list_bids(product_id).await {
        Ok(bids) => bids,
        Err(e) => {
            warn!("{:<12} --> 입찰 이력 조회 실패: {}", "Query", e);
            Vec::new()
        }
    };
    Ok(details(product, bids, now, false))
}

fn details(
    product: ProductWithSeller,
    bids: Vec<BidWithBidder>,
    now: DateTime<Utc>,
    is_sample: bool,
) -> ProductDetails {
    let is_expired = product.product.is_expired_at(now);
    let time_left = if is_expired {
        "Auction ended".to_string()
    } else {
        format_time_left(product.product.end_time, now)
    };
    ProductDetails {
        product,
        bids,
        is_expired,
        time_left,
        is_sample,
    }
}

// endregion: --- Query Handlers

// endregion: --- Tests
