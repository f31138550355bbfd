//! 화면 공용 위젯의 데이터 모델
//! 알림(토스트), 입찰 모달, 본인 입찰 내역, 내비게이션

// region:    --- Imports
use crate::bidding::commands::BidRules;
use crate::bidding::model::{Product, ProductStatus};
use crate::format::format_price;
use crate::session::{CachedBid, SessionStore};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- Notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// 토스트 알림
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: Option<String>,
    pub message: String,
    /// 축하 연출 여부
    pub celebrate: bool,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            title: None,
            message: message.into(),
            celebrate: false,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            title: None,
            message: message.into(),
            celebrate: false,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Info,
            title: None,
            message: message.into(),
            celebrate: false,
        }
    }

    /// 입찰 성공 축하 알림
    pub fn bid_placed(amount: i64) -> Self {
        Notice {
            kind: NoticeKind::Success,
            title: Some("Congratulations! 🎉".to_string()),
            message: format!(
                "Your bid of {} has been placed successfully!",
                format_price(amount)
            ),
            celebrate: true,
        }
    }
}

// endregion: --- Notice

// region:    --- Bid Modal
/// 입찰 모달 초기값
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidModalView {
    pub product_id: Uuid,
    pub current_price: i64,
    pub current_price_label: String,
    pub min_bid: i64,
    pub min_bid_label: String,
    /// 입력 증감 단위
    pub step: i64,
    pub can_bid: bool,
}

impl BidModalView {
    pub fn new(product: &Product, rules: BidRules, now: DateTime<Utc>) -> Self {
        let min_bid = rules.min_bid(product.current_price);
        BidModalView {
            product_id: product.id,
            current_price: product.current_price,
            current_price_label: format_price(product.current_price),
            min_bid,
            min_bid_label: format!("Minimum bid: {}", format_price(min_bid)),
            step: rules.min_increment,
            can_bid: !product.is_expired_at(now),
        }
    }
}

// endregion: --- Bid Modal

// region:    --- Bid History
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BidOutcome {
    Won,
    Lost,
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidHistoryEntry {
    #[serde(flatten)]
    pub bid: CachedBid,
    pub amount_label: String,
    pub outcome: BidOutcome,
    /// 낙찰자 (없으면 "Auction in progress")
    pub winner_label: String,
}

/// 본인 입찰 내역
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidHistoryView {
    pub title: String,
    pub entries: Vec<BidHistoryEntry>,
    pub empty_message: Option<String>,
}

impl BidHistoryView {
    pub fn from_session(session: &SessionStore) -> Self {
        let user_name = session.user().map(|u| u.name.as_str());
        let mut bids: Vec<&CachedBid> = session.bids().iter().collect();
        bids.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let entries: Vec<BidHistoryEntry> = bids
            .into_iter()
            .map(|bid| BidHistoryEntry {
                bid: bid.clone(),
                amount_label: format_price(bid.amount),
                outcome: outcome_of(bid, user_name),
                winner_label: bid
                    .product
                    .as_ref()
                    .and_then(|p| p.winner.clone())
                    .unwrap_or_else(|| "Auction in progress".to_string()),
            })
            .collect();

        BidHistoryView {
            title: format!("Bid History ({})", entries.len()),
            empty_message: entries.is_empty().then(|| "No bids yet".to_string()),
            entries,
        }
    }
}

fn outcome_of(bid: &CachedBid, user_name: Option<&str>) -> BidOutcome {
    let Some(product) = bid.product.as_ref() else {
        return BidOutcome::InProgress;
    };
    if product.status != ProductStatus::Completed {
        return BidOutcome::InProgress;
    }
    match product.winner.as_deref() {
        Some("You") => BidOutcome::Won,
        Some(winner) if Some(winner) == user_name => BidOutcome::Won,
        _ => BidOutcome::Lost,
    }
}

// endregion: --- Bid History

// region:    --- Navigation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
}

const fn link(label: &'static str, href: &'static str) -> NavLink {
    NavLink { label, href }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Footer {
    pub about: &'static str,
    pub quick_links: Vec<NavLink>,
    pub email: &'static str,
    pub phone: &'static str,
    pub copyright: String,
}

/// 공통 레이아웃 (헤더/푸터)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Navigation {
    pub brand: &'static str,
    pub links: Vec<NavLink>,
    /// 로그인 여부에 따라 Profile/Logout 또는 Login/Sign Up
    pub account: Vec<NavLink>,
    pub is_authenticated: bool,
    pub footer: Footer,
}

impl Navigation {
    pub fn new(is_authenticated: bool, now: DateTime<Utc>) -> Self {
        let account = if is_authenticated {
            vec![link("Profile", "/profile"), link("Logout", "/logout")]
        } else {
            vec![link("Login", "/login"), link("Sign Up", "/register")]
        };
        Navigation {
            brand: "MayaBazaar",
            links: vec![
                link("Auctions", "/auctions"),
                link("Sell", "/sell"),
                link("About", "/about"),
                link("Contact", "/contact"),
            ],
            account,
            is_authenticated,
            footer: Footer {
                about: "Reviving the glory of the past through carefully curated antiques and artifacts.",
                quick_links: vec![
                    link("Terms & Conditions", "/terms"),
                    link("Privacy Policy", "/privacy"),
                    link("FAQ", "/faq"),
                ],
                email: "info@mayabazaar.com",
                phone: "+91 8309790949",
                copyright: format!(
                    "© {} MayaBazaar. All rights reserved.",
                    now.format("%Y")
                ),
            },
        }
    }
}

// endregion: --- Navigation

// endregion: --- Tests
