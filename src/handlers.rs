// region:    --- Imports
use crate::app::AppState;
use crate::auth::{self, AuthSession, LoginForm, RegisterForm};
use crate::bidding::commands::{place_bid, BidPlacement, PlaceBidCommand};
use crate::bidding::model::Category;
use crate::error::{MarketError, MarketResult};
use crate::listing::{self, ListingCreated, SellForm, SellPage};
use crate::pages::{self, ContactForm, ContactPage, FaqPage, HomePage, InfoPage};
use crate::profile::{self, ProfileForm, ProfilePage, ProfileUpdated};
use crate::query::handlers::{self as queries, ProductDetails, ProductListing};
use crate::session::registry::SessionHandle;
use crate::session::SessionSnapshot;
use crate::validation::ImageUpload;
use crate::widgets::{BidModalView, Navigation, Notice};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Session Resolution

/// `Authorization: Bearer <token>` 헤더의 토큰
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<SessionHandle> {
    let token = bearer_token(headers)?;
    state.sessions.get(token).await
}

/// 로그인 세션 필수
async fn require_session(state: &AppState, headers: &HeaderMap) -> MarketResult<SessionHandle> {
    current_session(state, headers)
        .await
        .ok_or(MarketError::Unauthenticated)
}

// endregion: --- Session Resolution

// region:    --- Auth Handlers

/// 로그인
pub async fn handle_login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> MarketResult<Json<AuthSession>> {
    info!("{:<12} --> 로그인 요청", "Handler");
    let session = auth::login(state.backend.as_ref(), &state.sessions, &form).await?;
    Ok(Json(session))
}

/// 회원 가입
pub async fn handle_register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> MarketResult<(StatusCode, Json<AuthSession>)> {
    info!("{:<12} --> 회원 가입 요청", "Handler");
    let session = auth::register(state.backend.as_ref(), &state.sessions, &form).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// 로그아웃
pub async fn handle_logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> MarketResult<Json<Notice>> {
    let notice = match bearer_token(&headers) {
        Some(token) => auth::logout(&state.sessions, token).await?,
        None => Notice::info("You have been logged out."),
    };
    Ok(Json(notice))
}

/// 현재 세션 스냅샷 (토큰이 없으면 빈 세션)
pub async fn handle_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<SessionSnapshot> {
    match current_session(&state, &headers).await {
        Some(handle) => Json(handle.lock().await.snapshot().clone()),
        None => Json(SessionSnapshot::default()),
    }
}

// endregion: --- Auth Handlers

// region:    --- Auction Handlers

#[derive(Debug, Deserialize)]
pub struct AuctionQuery {
    pub category: Option<String>,
}

/// 경매 목록 조회
pub async fn handle_list_auctions(
    State(state): State<AppState>,
    Query(query): Query<AuctionQuery>,
) -> Json<ProductListing> {
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .and_then(|raw| match raw.parse::<Category>() {
            Ok(category) => Some(category),
            Err(e) => {
                // 알 수 없는 카테고리는 필터 없이 전체 조회
                warn!("{:<12} --> {}", "Handler", e);
                None
            }
        });
    Json(queries::list_products(state.backend.as_ref(), category, Utc::now()).await)
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    #[serde(flatten)]
    pub details: ProductDetails,
    pub bid_modal: BidModalView,
}

/// 상품 상세 조회
pub async fn handle_product_details(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> MarketResult<Json<ProductPage>> {
    let now = Utc::now();
    let details = queries::product_details(state.backend.as_ref(), &id, now).await?;
    let bid_modal = BidModalView::new(&details.product.product, state.rules, now);
    Ok(Json(ProductPage { details, bid_modal }))
}

/// 입찰 요청 처리
pub async fn handle_place_bid(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(cmd): Json<PlaceBidCommand>,
) -> MarketResult<Json<BidPlacement>> {
    info!("{:<12} --> 입찰 요청: {} {:?}", "Handler", id, cmd);
    let handle = require_session(&state, &headers).await?;
    let mut session = handle.lock().await;

    let placement = place_bid(
        state.backend.as_ref(),
        &mut session,
        state.notifier.as_ref(),
        state.rules,
        &id,
        cmd.amount,
        Utc::now(),
    )
    .await?;
    Ok(Json(placement))
}

// endregion: --- Auction Handlers

// region:    --- Sell Handlers

pub async fn handle_sell_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> MarketResult<Json<SellPage>> {
    let handle = require_session(&state, &headers).await?;
    let session = handle.lock().await;
    Ok(Json(
        listing::sell_page(state.backend.as_ref(), &session).await?,
    ))
}

/// 상품 등록
pub async fn handle_create_listing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<SellForm>,
) -> MarketResult<(StatusCode, Json<ListingCreated>)> {
    info!("{:<12} --> 상품 등록 요청: {}", "Handler", form.title);
    let handle = require_session(&state, &headers).await?;
    let session = handle.lock().await;

    let created = listing::create_listing(
        state.backend.as_ref(),
        &session,
        state.notifier.as_ref(),
        &form,
        Utc::now(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// endregion: --- Sell Handlers

// region:    --- Profile Handlers

pub async fn handle_get_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> MarketResult<Json<ProfilePage>> {
    let handle = require_session(&state, &headers).await?;
    let mut session = handle.lock().await;
    Ok(Json(
        profile::load_profile(state.backend.as_ref(), &mut session, Utc::now()).await?,
    ))
}

pub async fn handle_update_profile(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<ProfileForm>,
) -> MarketResult<Json<ProfileUpdated>> {
    let handle = require_session(&state, &headers).await?;
    let mut session = handle.lock().await;
    Ok(Json(
        profile::update_profile(state.backend.as_ref(), &mut session, &form, Utc::now()).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct AvatarForm {
    #[serde(default)]
    pub image: Option<ImageUpload>,
}

pub async fn handle_upload_avatar(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<AvatarForm>,
) -> MarketResult<Json<ProfileUpdated>> {
    let handle = require_session(&state, &headers).await?;
    let mut session = handle.lock().await;
    Ok(Json(
        profile::upload_avatar(
            state.backend.as_ref(),
            &mut session,
            form.image.as_ref(),
            Utc::now(),
        )
        .await?,
    ))
}

// endregion: --- Profile Handlers

// region:    --- Page Handlers

pub async fn handle_home() -> Json<HomePage> {
    Json(pages::home(Utc::now()))
}

/// 공통 레이아웃 (로그인 여부 반영)
pub async fn handle_layout(State(state): State<AppState>, headers: HeaderMap) -> Json<Navigation> {
    let is_authenticated = match current_session(&state, &headers).await {
        Some(handle) => handle.lock().await.is_authenticated(),
        None => false,
    };
    Json(Navigation::new(is_authenticated, Utc::now()))
}

pub async fn handle_about() -> Json<InfoPage> {
    Json(pages::about())
}

pub async fn handle_faq() -> Json<FaqPage> {
    Json(pages::faq())
}

pub async fn handle_terms() -> Json<InfoPage> {
    Json(pages::terms())
}

pub async fn handle_privacy() -> Json<InfoPage> {
    Json(pages::privacy())
}

pub async fn handle_contact_page() -> Json<ContactPage> {
    Json(pages::contact())
}

pub async fn handle_contact(Json(form): Json<ContactForm>) -> MarketResult<Json<Notice>> {
    Ok(Json(pages::submit_contact(&form)?))
}

// endregion: --- Page Handlers
