use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum MarketEvent {
    // 입찰 이벤트
    BidPlaced {
        product_id: Uuid,
        bidder_id: Uuid,
        amount: i64,
        timestamp: DateTime<Utc>,
    },
    // 상품 등록 이벤트
    ListingCreated {
        product_id: Uuid,
        seller_id: Uuid,
        starting_price: i64,
        end_time: DateTime<Utc>,
    },
}

impl MarketEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            MarketEvent::BidPlaced { .. } => "BidPlaced",
            MarketEvent::ListingCreated { .. } => "ListingCreated",
        }
    }

    /// 메시지 키로 쓰는 상품 id
    pub fn aggregate_id(&self) -> Uuid {
        match self {
            MarketEvent::BidPlaced { product_id, .. }
            | MarketEvent::ListingCreated { product_id, .. } => *product_id,
        }
    }
}
