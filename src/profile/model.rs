use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// 사용자 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[serde(alias = "user")]
    Buyer,
    Seller,
    Admin,
}

// 세션에 담기는 사용자
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<String>,
}

impl User {
    /// 프로필 변경분 병합
    pub fn merge(&mut self, patch: UserPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(avatar_url) = patch.avatar_url {
            self.avatar_url = avatar_url;
        }
        if let Some(bio) = patch.bio {
            self.bio = bio;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(interests) = patch.interests {
            self.interests = interests;
        }
    }
}

/// 세션 사용자 부분 갱신. 바깥 None은 "변경 없음".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub avatar_url: Option<Option<String>>,
    pub bio: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub interests: Option<Option<String>>,
}

impl From<&Profile> for UserPatch {
    fn from(profile: &Profile) -> Self {
        UserPatch {
            name: Some(profile.name.clone()),
            avatar_url: Some(profile.avatar_url.clone()),
            bio: Some(profile.bio.clone()),
            location: Some(profile.location.clone()),
            phone: Some(profile.phone.clone()),
            interests: Some(profile.interests.clone()),
        }
    }
}

// 프로필 모델
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub interests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn new(id: Uuid, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Profile {
            id,
            name: name.into(),
            avatar_url: None,
            bio: None,
            location: None,
            phone: None,
            interests: None,
            created_at,
            updated_at: None,
        }
    }
}

// 프로필 편집 폼에서 저장하는 필드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub interests: Option<String>,
}

impl From<&ProfileFields> for UserPatch {
    fn from(fields: &ProfileFields) -> Self {
        UserPatch {
            name: Some(fields.name.clone()),
            avatar_url: None,
            bio: Some(fields.bio.clone()),
            location: Some(fields.location.clone()),
            phone: Some(fields.phone.clone()),
            interests: Some(fields.interests.clone()),
        }
    }
}

// 인증 서비스가 돌려주는 계정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl AuthUser {
    /// 세션 사용자로 변환 (이름이 없으면 "User")
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name.unwrap_or_else(|| "User".to_string()),
            email: self.email,
            role: Role::Buyer,
            avatar_url: None,
            bio: None,
            location: None,
            phone: None,
            interests: None,
        }
    }
}
