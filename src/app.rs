// region:    --- Imports
use crate::backend::Backend;
use crate::bidding::commands::BidRules;
use crate::handlers;
use crate::message_broker::Notifier;
use crate::session::SessionRegistry;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

// endregion: --- Imports

/// 핸들러 공유 상태
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn Backend>,
    pub sessions: Arc<SessionRegistry>,
    pub notifier: Arc<dyn Notifier>,
    pub rules: BidRules,
}

/// 라우터 설정
pub fn router(state: AppState, body_limit: usize) -> Router {
    // 브라우저 클라이언트를 위한 cors 설정
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::handle_home))
        .route("/layout", get(handlers::handle_layout))
        .route("/login", post(handlers::handle_login))
        .route("/register", post(handlers::handle_register))
        .route("/logout", post(handlers::handle_logout))
        .route("/session", get(handlers::handle_session))
        .route("/auctions", get(handlers::handle_list_auctions))
        .route("/auctions/:id", get(handlers::handle_product_details))
        .route("/auctions/:id/bids", post(handlers::handle_place_bid))
        .route(
            "/sell",
            get(handlers::handle_sell_page).post(handlers::handle_create_listing),
        )
        .route(
            "/profile",
            get(handlers::handle_get_profile).put(handlers::handle_update_profile),
        )
        .route("/profile/avatar", post(handlers::handle_upload_avatar))
        .route("/about", get(handlers::handle_about))
        .route(
            "/contact",
            get(handlers::handle_contact_page).post(handlers::handle_contact),
        )
        .route("/faq", get(handlers::handle_faq))
        .route("/terms", get(handlers::handle_terms))
        .route("/privacy", get(handlers::handle_privacy))
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
