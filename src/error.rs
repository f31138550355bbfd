// region:    --- Imports
use crate::validation::FieldErrors;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

// endregion: --- Imports

// region:    --- Market Error
/// 마켓 서비스 에러
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Validation failed")]
    Validation(FieldErrors),

    #[error("Please login to continue")]
    Unauthenticated,

    #[error("Invalid login credentials")]
    InvalidCredentials,

    #[error("{0}")]
    Auth(String),

    #[error("User already registered")]
    AlreadyRegistered,

    #[error("Product not found")]
    NotFound,

    #[error("Bid must be at least {min_bid}")]
    LowBid { min_bid: i64, current_price: i64 },

    #[error("Auction has already ended")]
    AuctionEnded,

    #[error("Sample listings are read-only")]
    SampleListing,

    #[error("You were outbid, the current price is {current_price}")]
    Outbid { current_price: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type MarketResult<T> = Result<T, MarketError>;

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        MarketError::Storage(err.to_string())
    }
}

impl MarketError {
    /// 클라이언트가 분기할 수 있는 에러 코드
    pub fn code(&self) -> &'static str {
        match self {
            MarketError::Validation(_) => "VALIDATION",
            MarketError::Unauthenticated => "UNAUTHENTICATED",
            MarketError::InvalidCredentials => "INVALID_CREDENTIALS",
            MarketError::Auth(_) => "AUTH",
            MarketError::AlreadyRegistered => "ALREADY_REGISTERED",
            MarketError::NotFound => "NOT_FOUND",
            MarketError::LowBid { .. } => "LOW_BID",
            MarketError::AuctionEnded => "ALREADY_ENDED",
            MarketError::SampleListing => "SAMPLE_LISTING",
            MarketError::Outbid { .. } => "OUTBID",
            MarketError::Database(_)
            | MarketError::Storage(_)
            | MarketError::Session(_)
            | MarketError::Config(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            MarketError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            MarketError::Unauthenticated
            | MarketError::InvalidCredentials
            | MarketError::Auth(_) => StatusCode::UNAUTHORIZED,
            MarketError::NotFound => StatusCode::NOT_FOUND,
            MarketError::LowBid { .. }
            | MarketError::AuctionEnded
            | MarketError::SampleListing => StatusCode::BAD_REQUEST,
            MarketError::Outbid { .. } | MarketError::AlreadyRegistered => StatusCode::CONFLICT,
            MarketError::Database(_)
            | MarketError::Storage(_)
            | MarketError::Session(_)
            | MarketError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// endregion: --- Market Error

// region:    --- Into Response
impl IntoResponse for MarketError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let body = match &self {
            MarketError::Validation(fields) => serde_json::json!({
                "error": "Please fix the highlighted fields",
                "code": code,
                "fields": fields,
            }),
            MarketError::Unauthenticated => serde_json::json!({
                "error": self.to_string(),
                "code": code,
                "redirect": "/login",
            }),
            MarketError::NotFound => serde_json::json!({
                "error": self.to_string(),
                "code": code,
                "redirect": "/auctions",
            }),
            MarketError::LowBid {
                min_bid,
                current_price,
            } => serde_json::json!({
                "error": format!(
                    "Bid must be at least {}",
                    crate::format::format_price(*min_bid)
                ),
                "code": code,
                "min_bid": min_bid,
                "current_price": current_price,
            }),
            MarketError::AlreadyRegistered => serde_json::json!({
                "error": self.to_string(),
                "code": code,
                "fields": { "email": self.to_string() },
            }),
            MarketError::Outbid { current_price } => serde_json::json!({
                "error": format!(
                    "Someone outbid you, the current price is {}",
                    crate::format::format_price(*current_price)
                ),
                "code": code,
                "current_price": current_price,
            }),
            MarketError::Database(_)
            | MarketError::Storage(_)
            | MarketError::Session(_)
            | MarketError::Config(_) => {
                // 내부 에러 상세는 로그로만 남긴다
                error!("{:<12} --> 내부 오류: {}", "Response", self);
                serde_json::json!({
                    "error": "Something went wrong. Please try again.",
                    "code": code,
                })
            }
            _ => serde_json::json!({
                "error": self.to_string(),
                "code": code,
            }),
        };

        (status, Json(body)).into_response()
    }
}

// endregion: --- Into Response
