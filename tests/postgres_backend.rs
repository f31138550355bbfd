//! PostgreSQL 백엔드 테스트
//! DATABASE_URL 이 없으면 건너뛴다.

use chrono::{Duration, Utc};
use maya_bazaar::backend::{Backend, FileStorage, PostgresBackend};
use maya_bazaar::bidding::model::{BidWrite, Category, NewBid, NewProduct, Product};
use maya_bazaar::database::DatabaseManager;
use maya_bazaar::error::MarketError;
use maya_bazaar::profile::model::{AuthUser, Profile};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::OnceCell;
use uuid::Uuid;

static SCHEMA: OnceCell<()> = OnceCell::const_new();

struct TestDb {
    backend: PostgresBackend,
    _storage: TempDir,
}

/// 스키마를 한 번만 만들고 테스트마다 새 풀로 연결
async fn connect() -> Option<TestDb> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL 없음: PostgreSQL 테스트 건너뜀");
        return None;
    };
    SCHEMA
        .get_or_init(|| async {
            let db = DatabaseManager::new(&url, 1).await.unwrap();
            db.initialize_database().await.unwrap();
        })
        .await;

    let db_manager = Arc::new(DatabaseManager::new(&url, 10).await.unwrap());
    let storage = tempfile::tempdir().unwrap();
    let files = FileStorage::new(storage.path(), "http://localhost:3000/storage");
    Some(TestDb {
        backend: PostgresBackend::new(db_manager, files),
        _storage: storage,
    })
}

async fn member(backend: &PostgresBackend, name: &str) -> AuthUser {
    let email = format!("{}-{}@gmail.com", name.to_lowercase(), Uuid::new_v4().simple());
    backend.sign_up(&email, "Heirl00m!", name).await.unwrap()
}

async fn listed(backend: &PostgresBackend, seller: &AuthUser, price: i64, days: i64) -> Product {
    let now = Utc::now();
    backend
        .insert_product(NewProduct {
            title: "Georgian Silver Teapot".to_string(),
            description: "Hallmarked London 1790, bright cut engraving".to_string(),
            image_url: "http://localhost:3000/storage/products/teapot.jpg".to_string(),
            category: Category::Collectibles,
            starting_price: price,
            end_time: now + Duration::days(days),
            seller_id: seller.id,
            created_at: now,
        })
        .await
        .unwrap()
}

fn bid(product: &Product, bidder: &AuthUser, amount: i64) -> NewBid {
    NewBid {
        product_id: product.id,
        bidder_id: bidder.id,
        amount,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_accepted_and_outbid_bids() {
    let Some(db) = connect().await else { return };
    let seller = member(&db.backend, "Sellar").await;
    let bidder = member(&db.backend, "Bidwell").await;
    let product = listed(&db.backend, &seller, 100, 2).await;
    assert_eq!(product.current_price, 100);

    let write = db.backend.record_bid(bid(&product, &bidder, 200), 1).await.unwrap();
    let BidWrite::Accepted(stored) = write else {
        panic!("expected accepted bid, got {:?}", write);
    };
    assert_eq!(stored.amount, 200);

    // 현재가 이하 입찰은 아무것도 쓰지 않음
    let write = db.backend.record_bid(bid(&product, &bidder, 150), 1).await.unwrap();
    assert!(matches!(write, BidWrite::Outbid { current_price: 200 }));

    let current = db.backend.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(current.product.current_price, 200);
    assert_eq!(current.seller.unwrap().name, "Sellar");

    let bids = db.backend.list_bids(product.id).await.unwrap();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].bid.amount, 200);
    assert_eq!(bids[0].bidder.as_ref().unwrap().name, "Bidwell");
}

#[tokio::test]
async fn test_extreme_price_does_not_overflow() {
    let Some(db) = connect().await else { return };
    let seller = member(&db.backend, "Sellar").await;
    let bidder = member(&db.backend, "Bidwell").await;
    let product = listed(&db.backend, &seller, 100, 2).await;

    let write = db
        .backend
        .record_bid(bid(&product, &bidder, i64::MAX), 1)
        .await
        .unwrap();
    assert!(matches!(write, BidWrite::Accepted(_)));

    let write = db.backend.record_bid(bid(&product, &bidder, 5), 1).await.unwrap();
    assert!(matches!(write, BidWrite::Outbid { current_price: i64::MAX }));
}

#[tokio::test]
async fn test_ended_and_missing_auctions() {
    let Some(db) = connect().await else { return };
    let seller = member(&db.backend, "Sellar").await;
    let bidder = member(&db.backend, "Bidwell").await;
    let ended = listed(&db.backend, &seller, 100, -1).await;

    let write = db.backend.record_bid(bid(&ended, &bidder, 500), 1).await.unwrap();
    assert!(matches!(write, BidWrite::Ended));
    assert!(db.backend.list_bids(ended.id).await.unwrap().is_empty());

    let mut missing = ended.clone();
    missing.id = Uuid::new_v4();
    let write = db.backend.record_bid(bid(&missing, &bidder, 500), 1).await.unwrap();
    assert!(matches!(write, BidWrite::NotFound));
}

#[tokio::test]
async fn test_concurrent_bids_commit_atomically() {
    let Some(db) = connect().await else { return };
    let backend = Arc::new(db.backend);
    let seller = member(&backend, "Sellar").await;
    let bidder = member(&backend, "Bidwell").await;
    let product = listed(&backend, &seller, 100, 2).await;

    let mut tasks = Vec::new();
    for amount in (1..=10i64).map(|i| 100 + i * 25) {
        let backend = Arc::clone(&backend);
        let new_bid = bid(&product, &bidder, amount);
        tasks.push(tokio::spawn(async move {
            (amount, backend.record_bid(new_bid, 1).await.unwrap())
        }));
    }

    let mut accepted = Vec::new();
    for task in tasks {
        if let (amount, BidWrite::Accepted(_)) = task.await.unwrap() {
            accepted.push(amount);
        }
    }

    let current = backend.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(current.product.current_price, 350);
    let mut stored: Vec<i64> = backend
        .list_bids(product.id)
        .await
        .unwrap()
        .iter()
        .map(|b| b.bid.amount)
        .collect();
    stored.sort();
    accepted.sort();
    assert_eq!(stored, accepted);
}

#[tokio::test]
async fn test_sign_up_twice_and_sign_in() {
    let Some(db) = connect().await else { return };
    let email = format!("ada-{}@gmail.com", Uuid::new_v4().simple());
    let user = db.backend.sign_up(&email, "Heirl00m!", "Ada").await.unwrap();
    assert!(db.backend.get_profile(user.id).await.unwrap().is_some());

    let err = db
        .backend
        .sign_up(&email.to_uppercase(), "Heirl00m!", "Ada")
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::AlreadyRegistered));

    let signed_in = db
        .backend
        .sign_in_with_password(&email, "Heirl00m!")
        .await
        .unwrap();
    assert_eq!(signed_in.id, user.id);

    let err = db
        .backend
        .sign_in_with_password(&email, "Wr0ng!pass")
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::InvalidCredentials));
}

#[tokio::test]
async fn test_insert_profile_keeps_existing_row() {
    let Some(db) = connect().await else { return };
    let user = member(&db.backend, "Ada").await;

    let again = db
        .backend
        .insert_profile(Profile::new(user.id, "Someone Else", Utc::now()))
        .await
        .unwrap();
    assert_eq!(again.id, user.id);
    assert_eq!(again.name, "Ada");
}
