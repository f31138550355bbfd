use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use maya_bazaar::app::{self, AppState};
use maya_bazaar::backend::{Backend, MemoryBackend};
use maya_bazaar::bidding::commands::BidRules;
use maya_bazaar::message_broker::LogNotifier;
use maya_bazaar::session::{MemorySnapshotStorage, SessionRegistry, SnapshotStorage};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use std::sync::{Arc, Once};
use tokio::net::TcpListener;
use uuid::Uuid;

static TRACING: Once = Once::new();

/// 트레이싱 초기화
fn init_tracing() {
    TRACING.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .without_time()
            .with_target(false)
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

struct TestApp {
    base_url: String,
    backend: Arc<MemoryBackend>,
    client: Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// 메모리 백엔드로 서버를 임시 포트에 띄운다
async fn spawn_app() -> TestApp {
    init_tracing();
    let backend = Arc::new(MemoryBackend::default());
    let storage: Arc<dyn SnapshotStorage> = Arc::new(MemorySnapshotStorage::default());
    let sessions = SessionRegistry::hydrate(storage).await.unwrap();

    let state = AppState {
        backend: Arc::clone(&backend) as Arc<dyn Backend>,
        sessions: Arc::new(sessions),
        notifier: Arc::new(LogNotifier),
        rules: BidRules::default(),
    };
    let router = app::router(state, 1024 * 1024 * 20);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service()).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        backend,
        client: Client::new(),
    }
}

/// 가입 후 토큰 반환
async fn register(app: &TestApp, name: &str) -> String {
    let response = app
        .client
        .post(app.url("/register"))
        .json(&json!({
            "name": name,
            "email": format!("{}@gmail.com", name.to_lowercase()),
            "password": "Heirl00m!",
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// 상품 등록 후 id 반환
async fn sell(app: &TestApp, token: &str, starting_price: i64) -> String {
    let response = app
        .client
        .post(app.url("/sell"))
        .bearer_auth(token)
        .json(&json!({
            "title": "Edwardian Pocket Watch",
            "description": "Gold hunter case, keyless wind, running",
            "starting_price": starting_price,
            "category": "Jewelry",
            "duration_days": 5,
            "image": {
                "file_name": "watch.jpg",
                "content_type": "image/jpeg",
                "data": STANDARD.encode([0xffu8, 0xd8, 0xff, 0xe0]),
            },
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirect"], "/auctions?category=Jewelry");
    body["product"]["id"].as_str().unwrap().to_string()
}

/// 등록 -> 목록 -> 입찰 -> 상세 흐름 테스트
#[tokio::test]
async fn test_sell_list_and_bid() {
    let app = spawn_app().await;
    let seller = register(&app, "Sellar").await;
    let bidder = register(&app, "Bidwell").await;
    let product_id = sell(&app, &seller, 500).await;

    // 목록에는 등록한 상품만 (샘플 대체 없음)
    let listing: Value = app
        .client
        .get(app.url("/auctions?category=jewelry"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["from_samples"], false);
    assert_eq!(listing["products"][0]["id"], product_id.as_str());
    assert_eq!(listing["products"][0]["seller"]["name"], "Sellar");

    // 현재가 이하 입찰은 거절
    let response = app
        .client
        .post(app.url(&format!("/auctions/{}/bids", product_id)))
        .bearer_auth(&bidder)
        .json(&json!({ "amount": 500 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "LOW_BID");
    assert_eq!(body["min_bid"], 501);

    // 입찰 성공
    let response = app
        .client
        .post(app.url(&format!("/auctions/{}/bids", product_id)))
        .bearer_auth(&bidder)
        .json(&json!({ "amount": 650 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["current_price"], 650);
    assert_eq!(body["notice"]["celebrate"], true);

    // 상세 화면에 입찰 이력과 최소 입찰가 반영
    let details: Value = app
        .client
        .get(app.url(&format!("/auctions/{}", product_id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details["current_price"], 650);
    assert_eq!(details["bids"][0]["amount"], 650);
    assert_eq!(details["bids"][0]["bidder"]["name"], "Bidwell");
    assert_eq!(details["bid_modal"]["min_bid_label"], "Minimum bid: $651");

    // 세션 캐시에도 기록
    let session: Value = app
        .client
        .get(app.url("/session"))
        .bearer_auth(&bidder)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["is_authenticated"], true);
    assert_eq!(session["bids"][0]["amount"], 650);
}

/// 로그인하지 않은 입찰은 로그인 화면으로
#[tokio::test]
async fn test_unauthenticated_bid_redirects_to_login() {
    let app = spawn_app().await;
    let seller = register(&app, "Sellar").await;
    let product_id = sell(&app, &seller, 100).await;

    let response = app
        .client
        .post(app.url(&format!("/auctions/{}/bids", product_id)))
        .json(&json!({ "amount": 1000 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirect"], "/login");
    assert_eq!(app.backend.bid_count().await, 0);
}

/// 동시 입찰: 최종 현재가는 최고 입찰가, 기록된 입찰과 일치
#[tokio::test]
async fn test_concurrent_bids_keep_price_consistent() {
    let app = spawn_app().await;
    let seller = register(&app, "Sellar").await;
    let bidders = [
        register(&app, "Bidwell").await,
        register(&app, "Hammond").await,
    ];
    let product_id = sell(&app, &seller, 100).await;

    let mut tasks = Vec::new();
    for (i, amount) in (1..=12i64).map(|i| 100 + i * 10).enumerate() {
        let client = app.client.clone();
        let url = app.url(&format!("/auctions/{}/bids", product_id));
        let token = bidders[i % 2].clone();
        tasks.push(tokio::spawn(async move {
            let response = client
                .post(url)
                .bearer_auth(token)
                .json(&json!({ "amount": amount }))
                .send()
                .await
                .unwrap();
            (amount, response.status())
        }));
    }

    let mut accepted = Vec::new();
    for task in tasks {
        let (amount, status) = task.await.unwrap();
        assert!(
            status == StatusCode::OK
                || status == StatusCode::CONFLICT
                || status == StatusCode::BAD_REQUEST,
            "unexpected status {}",
            status
        );
        if status == StatusCode::OK {
            accepted.push(amount);
        }
    }

    let id = Uuid::parse_str(&product_id).unwrap();
    let stored = app.backend.get_product(id).await.unwrap().unwrap();
    let bids = app.backend.list_bids(id).await.unwrap();
    assert_eq!(bids.len(), accepted.len());
    assert_eq!(stored.product.current_price, 220);
    assert_eq!(accepted.iter().max(), Some(&220));

    // 기록된 입찰은 수락된 입찰과 정확히 일치
    let mut amounts: Vec<i64> = bids.iter().map(|b| b.bid.amount).collect();
    amounts.sort();
    accepted.sort();
    assert_eq!(amounts, accepted);
}

/// 없는 상품과 샘플 상품
#[tokio::test]
async fn test_missing_and_sample_products() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/auctions/not-a-real-id"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirect"], "/auctions");

    // 빈 저장소에서는 샘플 상품을 보여준다
    let listing: Value = app
        .client
        .get(app.url("/auctions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing["from_samples"], true);
    assert_eq!(listing["products"].as_array().unwrap().len(), 8);

    let sample: Value = app
        .client
        .get(app.url("/auctions/123e4567-e89b-12d3-a456-426614174006"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sample["title"], "1804 Silver Dollar");
    assert_eq!(sample["is_sample"], true);
}

/// 프로필 수정 검증과 레이아웃
#[tokio::test]
async fn test_profile_and_layout() {
    let app = spawn_app().await;
    let token = register(&app, "Ada").await;

    let response = app
        .client
        .put(app.url("/profile"))
        .bearer_auth(&token)
        .json(&json!({ "name": "A" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["fields"]["name"], "Name must be at least 2 characters");

    let response = app
        .client
        .put(app.url("/profile"))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ada Lovelace", "location": "London" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let layout: Value = app
        .client
        .get(app.url("/layout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(layout["is_authenticated"], true);

    let response = app
        .client
        .post(app.url("/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .get(app.url("/profile"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// 같은 이메일로 다시 가입하면 충돌
#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = spawn_app().await;
    register(&app, "Ada").await;

    let response = app
        .client
        .post(app.url("/register"))
        .json(&json!({
            "name": "Ada Again",
            "email": "ada@gmail.com",
            "password": "Heirl00m!",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "ALREADY_REGISTERED");
    assert_eq!(body["fields"]["email"], "User already registered");
}
