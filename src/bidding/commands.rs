/// 입찰 관련 커맨드 처리
/// 1. 입찰 (검증 -> 낙관적 갱신 -> 트랜잭션 기록 -> 정합 -> 세션 캐시 -> 이벤트 발행)
// region:    --- Imports
use super::model::{Bid, BidWrite, NewBid, Product, ProductWithSeller};
use crate::auction::events::MarketEvent;
use crate::backend::Backend;
use crate::error::{MarketError, MarketResult};
use crate::format::format_price;
use crate::listing::ensure_profile;
use crate::message_broker::{notify, Notifier};
use crate::query::samples;
use crate::session::{BidProductSummary, CachedBid, SessionStore};
use crate::validation::{FieldErrors, MAX_PRICE};
use crate::widgets::Notice;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
// endregion: --- Imports

// region:    --- Rules
/// 입찰 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BidRules {
    pub min_increment: i64,
}

impl Default for BidRules {
    fn default() -> Self {
        BidRules { min_increment: 1 }
    }
}

impl BidRules {
    pub fn new(min_increment: i64) -> Self {
        BidRules {
            min_increment: min_increment.max(1),
        }
    }

    /// 현재가 기준 최소 입찰가 (오버플로 시 i64::MAX)
    pub fn min_bid(&self, current_price: i64) -> i64 {
        current_price.saturating_add(self.min_increment)
    }
}

// endregion: --- Rules

// region:    --- Optimistic Update
/// 기록 전 화면에 먼저 반영한 입찰가
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBid {
    product_id: Uuid,
    last_known_price: i64,
    optimistic_price: i64,
}

/// 확정된 현재가와의 정합 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Reconciliation {
    Confirmed { current_price: i64 },
    /// 기록 직후 다른 입찰이 더 높은 가격을 만듦
    Superseded {
        optimistic_price: i64,
        current_price: i64,
    },
}

impl PendingBid {
    pub fn new(product: &Product, amount: i64) -> Self {
        PendingBid {
            product_id: product.id,
            last_known_price: product.current_price,
            optimistic_price: amount,
        }
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn optimistic_price(&self) -> i64 {
        self.optimistic_price
    }

    pub fn reconcile(self, current_price: i64) -> Reconciliation {
        if current_price == self.optimistic_price {
            Reconciliation::Confirmed { current_price }
        } else {
            Reconciliation::Superseded {
                optimistic_price: self.optimistic_price,
                current_price,
            }
        }
    }

    /// 기록 실패 시 마지막으로 알던 가격으로 복원
    pub fn revert(self) -> i64 {
        self.last_known_price
    }
}

// endregion: --- Optimistic Update

// region:    --- Commands
/// 입찰 명령
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub amount: i64,
}

/// 입찰 결과
#[derive(Debug, Clone, Serialize)]
pub struct BidPlacement {
    pub bid: Bid,
    pub current_price: i64,
    pub reconciliation: Reconciliation,
    pub notice: Notice,
}

/// 1. 입찰
pub async fn place_bid(
    backend: &dyn Backend,
    session: &mut SessionStore,
    notifier: &dyn Notifier,
    rules: BidRules,
    product_ref: &str,
    amount: i64,
    now: DateTime<Utc>,
) -> MarketResult<BidPlacement> {
    info!(
        "{:<12} --> 입찰 요청 처리 시작: product={}, amount={}",
        "Command", product_ref, amount
    );

    // 로그인 확인
    let bidder = session.user().cloned().ok_or(MarketError::Unauthenticated)?;
    let bidder_id = bidder.id;

    // 샘플 상품은 입찰 불가
    if samples::is_sample_id(product_ref) {
        return Err(MarketError::SampleListing);
    }

    // 상품 조회
    let product_id = Uuid::parse_str(product_ref.trim()).map_err(|_| MarketError::NotFound)?;
    let listing = backend
        .get_product(product_id)
        .await?
        .ok_or(MarketError::NotFound)?;

    // 경매 상태 및 금액 검증
    if listing.product.is_expired_at(now) {
        return Err(MarketError::AuctionEnded);
    }
    if amount > MAX_PRICE {
        let mut errors = FieldErrors::new();
        errors.add(
            "amount",
            format!("Bid cannot exceed {}", format_price(MAX_PRICE)),
        );
        return Err(MarketError::Validation(errors));
    }
    let min_bid = rules.min_bid(listing.product.current_price);
    if amount < min_bid {
        return Err(MarketError::LowBid {
            min_bid,
            current_price: listing.product.current_price,
        });
    }

    // 입찰 기록은 입찰자 프로필을 참조한다
    ensure_profile(backend, &bidder, now).await?;

    let pending = PendingBid::new(&listing.product, amount);

    // 입찰 기록 + 현재가 갱신 (하나의 트랜잭션)
    let write = backend
        .record_bid(
            NewBid {
                product_id,
                bidder_id,
                amount: pending.optimistic_price(),
                created_at: now,
            },
            rules.min_increment,
        )
        .await;

    let bid = match write {
        Ok(BidWrite::Accepted(bid)) => bid,
        Ok(BidWrite::Outbid { current_price }) => {
            let reverted = pending.revert();
            warn!(
                "{:<12} --> 동시 입찰로 인한 충돌: {} -> {}",
                "Command", reverted, current_price
            );
            return Err(MarketError::Outbid { current_price });
        }
        Ok(BidWrite::Ended) => {
            pending.revert();
            return Err(MarketError::AuctionEnded);
        }
        Ok(BidWrite::NotFound) => {
            pending.revert();
            return Err(MarketError::NotFound);
        }
        Err(e) => {
            pending.revert();
            return Err(e);
        }
    };

    // 확정된 현재가 재조회 후 정합
    let current_price = match backend.get_product(product_id).await {
        Ok(Some(stored)) => stored.product.current_price,
        Ok(None) => bid.amount,
        Err(e) => {
            warn!("{:<12} --> 현재가 재조회 실패: {}", "Command", e);
            bid.amount
        }
    };
    let reconciliation = pending.reconcile(current_price);

    // 본인 입찰 캐시에 추가 (저장 실패는 기록된 입찰에 영향 없음)
    let cached = CachedBid {
        id: bid.id,
        product_id,
        amount: bid.amount,
        timestamp: bid.created_at,
        product: Some(summary_of(&listing, current_price)),
    };
    if let Err(e) = session.add_bid(cached).await {
        warn!("{:<12} --> 입찰 캐시 저장 실패: {}", "Command", e);
    }

    notify(
        notifier,
        MarketEvent::BidPlaced {
            product_id,
            bidder_id,
            amount: bid.amount,
            timestamp: bid.created_at,
        },
    )
    .await;

    info!(
        "{:<12} --> 입찰 성공: product={}, amount={}",
        "Command", product_id, bid.amount
    );
    Ok(BidPlacement {
        notice: Notice::bid_placed(bid.amount),
        current_price,
        reconciliation,
        bid,
    })
}

fn summary_of(listing: &ProductWithSeller, current_price: i64) -> BidProductSummary {
    let product = &listing.product;
    BidProductSummary {
        title: product.title.clone(),
        image_url: product.image_url.clone(),
        seller: listing
            .seller
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| "Unknown Seller".to_string()),
        end_time: product.end_time,
        status: product.status,
        winner: product.winner.clone(),
        starting_price: product.starting_price,
        current_price,
    }
}

// endregion: --- Commands

// endregion: --- Tests
