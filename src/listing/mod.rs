//! 상품 등록(판매) 처리
//! 검증이 모두 통과한 뒤에만 업로드와 저장이 일어난다.

// region:    --- Imports
use crate::auction::events::MarketEvent;
use crate::backend::{Backend, Bucket};
use crate::bidding::model::{Category, NewProduct, Product};
use crate::error::{MarketError, MarketResult};
use crate::message_broker::{notify, Notifier};
use crate::profile::model::{Profile, User};
use crate::session::SessionStore;
use crate::format::format_price;
use crate::validation::{validate_image, FieldErrors, ImageFile, ImageUpload, MAX_PRICE};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

// endregion: --- Imports

pub const MIN_DURATION_DAYS: i64 = 1;
pub const MAX_DURATION_DAYS: i64 = 30;

// region:    --- Sell Form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "starting_bid")]
    pub starting_price: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default, alias = "duration")]
    pub duration_days: i64,
    #[serde(default)]
    pub image: Option<ImageUpload>,
}

/// 검증을 통과한 등록 요청
#[derive(Debug, Clone)]
pub struct ValidSellForm {
    pub title: String,
    pub description: String,
    pub starting_price: i64,
    pub category: Category,
    pub duration_days: i64,
    pub image: ImageFile,
}

impl SellForm {
    pub fn validate(&self) -> MarketResult<ValidSellForm> {
        let mut errors = FieldErrors::new();
        errors.min_chars("title", &self.title, 3, "Title must be at least 3 characters");
        errors.min_chars(
            "description",
            &self.description,
            10,
            "Description must be at least 10 characters",
        );
        if self.starting_price < 1 {
            errors.add("starting_price", "Starting bid must be at least 1");
        } else if self.starting_price > MAX_PRICE {
            errors.add(
                "starting_price",
                format!("Starting bid cannot exceed {}", format_price(MAX_PRICE)),
            );
        }
        let category = self.category.parse::<Category>();
        if category.is_err() {
            errors.add("category", "Please select a category");
        }
        if self.duration_days < MIN_DURATION_DAYS {
            errors.add("duration_days", "Duration must be at least 1 day");
        } else if self.duration_days > MAX_DURATION_DAYS {
            errors.add("duration_days", "Duration cannot exceed 30 days");
        }
        let image = validate_image(&mut errors, "image", self.image.as_ref());

        match (errors.into_result(), category, image) {
            (Ok(()), Ok(category), Some(image)) => Ok(ValidSellForm {
                title: self.title.trim().to_string(),
                description: self.description.trim().to_string(),
                starting_price: self.starting_price,
                category,
                duration_days: self.duration_days,
                image,
            }),
            (Err(e), _, _) => Err(e),
            // 에러가 없으면 category와 image 모두 존재
            _ => Err(MarketError::Validation(FieldErrors::new())),
        }
    }
}

// endregion: --- Sell Form

// region:    --- Sell Page
/// 판매 화면 초기 정보
#[derive(Debug, Clone, Serialize)]
pub struct SellPage {
    pub categories: Vec<Category>,
    pub min_duration_days: i64,
    pub max_duration_days: i64,
    pub max_image_bytes: usize,
    pub seller: Profile,
}

pub async fn sell_page(backend: &dyn Backend, session: &SessionStore) -> MarketResult<SellPage> {
    let user = session.user().ok_or(MarketError::Unauthenticated)?;
    let seller = ensure_profile(backend, user, Utc::now()).await?;
    Ok(SellPage {
        categories: Category::ALL.to_vec(),
        min_duration_days: MIN_DURATION_DAYS,
        max_duration_days: MAX_DURATION_DAYS,
        max_image_bytes: crate::validation::MAX_IMAGE_BYTES,
        seller,
    })
}

// endregion: --- Sell Page

// region:    --- Listing Commands
/// 판매자 프로필이 없으면 생성
pub async fn ensure_profile(
    backend: &dyn Backend,
    user: &User,
    now: DateTime<Utc>,
) -> MarketResult<Profile> {
    if let Some(profile) = backend.get_profile(user.id).await? {
        return Ok(profile);
    }
    let name = if user.name.trim().is_empty() {
        "Anonymous User".to_string()
    } else {
        user.name.clone()
    };
    info!("{:<12} --> 프로필 생성: {}", "Listing", user.id);
    backend.insert_profile(Profile::new(user.id, name, now)).await
}

/// 등록 결과
#[derive(Debug, Clone, Serialize)]
pub struct ListingCreated {
    pub product: Product,
    /// 등록 카테고리 목록으로 이동
    pub redirect: String,
}

pub async fn create_listing(
    backend: &dyn Backend,
    session: &SessionStore,
    notifier: &dyn Notifier,
    form: &SellForm,
    now: DateTime<Utc>,
) -> MarketResult<ListingCreated> {
    let user = session.user().ok_or(MarketError::Unauthenticated)?;
    let form = form.validate()?;
    ensure_profile(backend, user, now).await?;

    // 이미지 업로드
    let path = format!(
        "products/{}.{}",
        Uuid::new_v4().simple(),
        form.image.extension()
    );
    backend
        .upload(
            Bucket::Products,
            &path,
            form.image.bytes,
            &form.image.content_type,
            false,
        )
        .await?;
    let image_url = backend.public_url(Bucket::Products, &path);

    let product = backend
        .insert_product(NewProduct {
            title: form.title,
            description: form.description,
            image_url,
            category: form.category,
            starting_price: form.starting_price,
            end_time: now + Duration::days(form.duration_days),
            seller_id: user.id,
            created_at: now,
        })
        .await?;
    info!(
        "{:<12} --> 상품 등록 완료: {} ({})",
        "Listing", product.id, product.category
    );

    notify(
        notifier,
        MarketEvent::ListingCreated {
            product_id: product.id,
            seller_id: user.id,
            starting_price: product.starting_price,
            end_time: product.end_time,
        },
    )
    .await;

    Ok(ListingCreated {
        redirect: format!("/auctions?category={}", product.category),
        product,
    })
}

// endregion: --- Listing Commands

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::bidding::model::ProductStatus;
    use crate::message_broker::tests::RecordingNotifier;
    use crate::session::tests::{anonymous_session, signed_in_session};
    use crate::validation::MAX_IMAGE_BYTES;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    fn form(image: Option<ImageUpload>) -> SellForm {
        SellForm {
            title: "Meissen Porcelain Figurine".to_string(),
            description: "Hand painted shepherdess, crossed swords mark".to_string(),
            starting_price: 750,
            category: "collectibles".to_string(),
            duration_days: 7,
            image,
        }
    }

    fn png(len: usize) -> ImageUpload {
        ImageUpload {
            file_name: "figurine.PNG".to_string(),
            content_type: "image/png".to_string(),
            data: STANDARD.encode(vec![1u8; len]),
        }
    }

    #[tokio::test]
    async fn test_create_listing() {
        let backend = MemoryBackend::default();
        let session = signed_in_session("Ada").await;
        let notifier = RecordingNotifier::default();
        let now = Utc::now();

        let created = create_listing(&backend, &session, &notifier, &form(Some(png(64))), now)
            .await
            .unwrap();
        let product = created.product;
        assert_eq!(product.current_price, product.starting_price);
        assert_eq!(product.end_time, product.created_at + Duration::days(7));
        assert_eq!(product.status, ProductStatus::Ongoing);
        assert_eq!(product.category, Category::Collectibles);
        assert_eq!(created.redirect, "/auctions?category=Collectibles");

        // 업로드 경로와 공개 URL
        let path = product
            .image_url
            .strip_prefix("memory://storage/products/")
            .unwrap();
        assert!(path.starts_with("products/") && path.ends_with(".png"));
        let stored = backend.object(Bucket::Products, path).await.unwrap();
        assert_eq!(stored.bytes.len(), 64);

        // 판매자 프로필 자동 생성
        let seller = session.user().unwrap();
        let profile = backend.get_profile(seller.id).await.unwrap().unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(notifier.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_bad_images_rejected_before_any_write() {
        let backend = MemoryBackend::default();
        let session = signed_in_session("Ada").await;
        let notifier = RecordingNotifier::default();

        let mut pdf = png(64);
        pdf.content_type = "application/pdf".to_string();
        for image in [None, Some(png(MAX_IMAGE_BYTES + 1)), Some(pdf)] {
            let err = create_listing(&backend, &session, &notifier, &form(image), Utc::now())
                .await
                .unwrap_err();
            match err {
                MarketError::Validation(fields) => assert!(fields.contains("image")),
                other => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(backend.object_count().await, 0);
        assert_eq!(backend.product_count().await, 0);
        assert!(backend
            .get_profile(session.user().unwrap().id)
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_field_rules() {
        let invalid = SellForm {
            title: "ab".to_string(),
            description: "short".to_string(),
            starting_price: 0,
            category: "Vehicles".to_string(),
            duration_days: 31,
            image: Some(png(8)),
        };
        let Err(MarketError::Validation(fields)) = invalid.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(fields.get("title"), Some("Title must be at least 3 characters"));
        assert_eq!(
            fields.get("description"),
            Some("Description must be at least 10 characters")
        );
        assert_eq!(fields.get("starting_price"), Some("Starting bid must be at least 1"));
        assert!(fields.contains("category"));
        assert_eq!(fields.get("duration_days"), Some("Duration cannot exceed 30 days"));
        assert!(!fields.contains("image"));

        let mut pricey = form(Some(png(8)));
        pricey.starting_price = i64::MAX;
        let Err(MarketError::Validation(fields)) = pricey.validate() else {
            panic!("expected validation error");
        };
        assert_eq!(
            fields.get("starting_price"),
            Some("Starting bid cannot exceed $1,000,000,000")
        );
        pricey.starting_price = MAX_PRICE;
        assert!(pricey.validate().is_ok());
    }

    #[tokio::test]
    async fn test_requires_login() {
        let backend = MemoryBackend::default();
        let session = anonymous_session().await;
        let err = create_listing(
            &backend,
            &session,
            &RecordingNotifier::default(),
            &form(Some(png(8))),
            Utc::now(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MarketError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_ensure_profile_keeps_existing() {
        let backend = MemoryBackend::default();
        let session = signed_in_session("Ada").await;
        let user = session.user().unwrap();
        let now = Utc::now();

        let created = ensure_profile(&backend, user, now).await.unwrap();
        let again = ensure_profile(&backend, user, now).await.unwrap();
        assert_eq!(created, again);

        let mut nameless = user.clone();
        nameless.id = Uuid::new_v4();
        nameless.name = String::new();
        let profile = ensure_profile(&backend, &nameless, now).await.unwrap();
        assert_eq!(profile.name, "Anonymous User");
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_share_one_profile() {
        let backend = MemoryBackend::default();
        let session = signed_in_session("Ada").await;
        let user = session.user().unwrap();
        let now = Utc::now();

        let (first, second) = tokio::join!(
            ensure_profile(&backend, user, now),
            ensure_profile(&backend, user, now + Duration::seconds(1)),
        );
        let (first, second) = (first.unwrap(), second.unwrap());
        assert_eq!(first, second);

        // 이미 있는 프로필 생성 요청은 기존 행을 돌려준다
        let again = backend
            .insert_profile(Profile::new(user.id, "Someone Else", now))
            .await
            .unwrap();
        assert_eq!(again, first);
        assert_eq!(again.name, "Ada");
    }
}
// endregion: --- Tests
