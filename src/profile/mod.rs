//! 프로필 조회/수정/아바타 업로드

// region:    --- Imports
use crate::backend::{Backend, Bucket};
use crate::error::{MarketError, MarketResult};
use crate::session::SessionStore;
use crate::validation::{non_blank, validate_image, FieldErrors, ImageUpload};
use crate::widgets::{BidHistoryView, Notice};
use chrono::{DateTime, Utc};
use model::{Profile, ProfileFields, User, UserPatch};
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

pub mod model;

// region:    --- Profile Form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
}

impl ProfileForm {
    /// 빈 선택 항목은 없는 값으로 정리한 뒤 검증
    pub fn validate(&self) -> MarketResult<ProfileFields> {
        let fields = ProfileFields {
            name: self.name.trim().to_string(),
            bio: non_blank(self.bio.clone()),
            location: non_blank(self.location.clone()),
            phone: non_blank(self.phone.clone()),
            interests: non_blank(self.interests.clone()),
        };

        let mut errors = FieldErrors::new();
        errors.min_chars("name", &fields.name, 2, "Name must be at least 2 characters");
        if let Some(bio) = &fields.bio {
            errors.max_chars("bio", bio, 500, "Bio must not exceed 500 characters");
        }
        if let Some(location) = &fields.location {
            errors.min_chars(
                "location",
                location,
                2,
                "Location must be at least 2 characters",
            );
        }
        if let Some(phone) = &fields.phone {
            errors.min_chars("phone", phone, 10, "Please enter a valid phone number");
        }
        if let Some(interests) = &fields.interests {
            errors.min_chars("interests", interests, 2, "Please enter your interests");
        }
        errors.into_result()?;
        Ok(fields)
    }
}

// endregion: --- Profile Form

// region:    --- Profile Page
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub profile: Profile,
    pub user: User,
    pub bid_history: BidHistoryView,
}

/// 로그인 사용자 확인
fn signed_in(session: &SessionStore) -> MarketResult<User> {
    session.user().cloned().ok_or(MarketError::Unauthenticated)
}

/// 프로필 조회 (없으면 생성) 후 세션 사용자 갱신
pub async fn load_profile(
    backend: &dyn Backend,
    session: &mut SessionStore,
    now: DateTime<Utc>,
) -> MarketResult<ProfilePage> {
    let user = signed_in(session)?;
    let profile = match backend.get_profile(user.id).await? {
        Some(profile) => profile,
        None => {
            info!("{:<12} --> 프로필 생성: {}", "Profile", user.id);
            backend
                .insert_profile(Profile::new(user.id, user.name.clone(), now))
                .await?
        }
    };

    session.update_profile(UserPatch::from(&profile)).await?;
    Ok(ProfilePage {
        user: signed_in(session)?,
        bid_history: BidHistoryView::from_session(session),
        profile,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdated {
    pub profile: Profile,
    pub notice: Notice,
}

/// 프로필 수정
pub async fn update_profile(
    backend: &dyn Backend,
    session: &mut SessionStore,
    form: &ProfileForm,
    now: DateTime<Utc>,
) -> MarketResult<ProfileUpdated> {
    let user = signed_in(session)?;
    let fields = form.validate()?;

    let profile = backend.save_profile(user.id, &fields, now).await?;
    session.update_profile(UserPatch::from(&fields)).await?;
    info!("{:<12} --> 프로필 수정: {}", "Profile", user.id);

    Ok(ProfileUpdated {
        profile,
        notice: Notice::success("Profile updated successfully!"),
    })
}

/// 아바타 업로드 (`<user_id>/avatar.<ext>`, 덮어쓰기)
pub async fn upload_avatar(
    backend: &dyn Backend,
    session: &mut SessionStore,
    upload: Option<&ImageUpload>,
    now: DateTime<Utc>,
) -> MarketResult<ProfileUpdated> {
    let user = signed_in(session)?;
    let mut errors = FieldErrors::new();
    let image = validate_image(&mut errors, "avatar", upload);
    errors.into_result()?;
    let image = image.ok_or_else(|| MarketError::Validation(FieldErrors::new()))?;

    let path = format!("{}/avatar.{}", user.id, image.extension());
    backend
        .upload(Bucket::Avatars, &path, image.bytes, &image.content_type, true)
        .await?;
    let avatar_url = backend.public_url(Bucket::Avatars, &path);

    let profile = backend
        .set_profile_avatar(user.id, &avatar_url, now)
        .await?;
    session
        .update_profile(UserPatch {
            avatar_url: Some(Some(avatar_url)),
            ..Default::default()
        })
        .await?;
    info!("{:<12} --> 아바타 변경: {}", "Profile", user.id);

    Ok(ProfileUpdated {
        profile,
        notice: Notice::success("Profile picture updated successfully!"),
    })
}

// endregion: --- Profile Page

// endregion: --- Tests
