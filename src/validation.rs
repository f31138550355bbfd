//! 폼 검증 공용 도구
//! 필드별 에러 메시지를 모아 한 번에 돌려준다.

// region:    --- Imports
use crate::error::MarketError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// endregion: --- Imports

/// 이미지 최대 크기(5MB)
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// 시작가와 입찰가의 상한
pub const MAX_PRICE: i64 = 1_000_000_000;

/// 가입/로그인에 허용되는 이메일 도메인
pub const ALLOWED_EMAIL_DOMAINS: [&str; 4] =
    ["gmail.com", "yahoo.com", "outlook.com", "hotmail.com"];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$").expect("valid regex")
});

// region:    --- Field Errors
/// 필드 이름 -> 에러 메시지
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 필드당 첫 번째 에러만 유지
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 에러가 하나라도 있으면 Validation 에러로 변환
    pub fn into_result(self) -> Result<(), MarketError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MarketError::Validation(self))
        }
    }

    pub fn min_chars(&mut self, field: &str, value: &str, min: usize, message: &str) {
        if value.trim().chars().count() < min {
            self.add(field, message);
        }
    }

    pub fn max_chars(&mut self, field: &str, value: &str, max: usize, message: &str) {
        if value.chars().count() > max {
            self.add(field, message);
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        if !is_email(value) {
            self.add(field, "Invalid email address");
        }
    }

    /// 허용된 도메인의 이메일인지 검사
    pub fn allowed_email(&mut self, field: &str, value: &str) {
        self.email(field, value);
        if self.contains(field) {
            return;
        }
        let domain = value.rsplit('@').next().unwrap_or_default().to_lowercase();
        if !ALLOWED_EMAIL_DOMAINS.contains(&domain.as_str()) {
            self.add(
                field,
                "Please use a valid email from Gmail, Yahoo, Outlook, or Hotmail",
            );
        }
    }
}

// endregion: --- Field Errors

// region:    --- Helpers
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// 공백뿐인 선택 입력은 없는 값으로 취급
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// endregion: --- Helpers

// region:    --- Images
/// 클라이언트가 올리는 이미지 (본문은 base64)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

/// 디코딩된 이미지 파일
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// 파일 확장자 (없으면 MIME 서브타입)
    pub fn extension(&self) -> String {
        match self.file_name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() => ext.to_lowercase(),
            _ => self
                .content_type
                .split_once('/')
                .map(|(_, sub)| sub.to_string())
                .unwrap_or_else(|| "bin".to_string()),
        }
    }
}

impl ImageUpload {
    pub fn decode(&self) -> Result<ImageFile, String> {
        let bytes = STANDARD
            .decode(self.data.trim())
            .map_err(|_| "Image data is not valid base64".to_string())?;
        Ok(ImageFile {
            file_name: self.file_name.clone(),
            content_type: self.content_type.clone(),
            bytes,
        })
    }
}

/// 이미지 업로드 제약 (크기, MIME 타입) 검사
pub fn check_image(file: &ImageFile) -> Result<(), String> {
    if file.bytes.len() > MAX_IMAGE_BYTES {
        return Err("Image size must be less than 5MB".to_string());
    }
    if !file.content_type.starts_with("image/") {
        return Err("Please upload an image file".to_string());
    }
    Ok(())
}

/// 업로드 요청을 디코딩하고 검사한다. 실패 시 `field`에 에러 기록.
pub fn validate_image(
    errors: &mut FieldErrors,
    field: &str,
    upload: Option<&ImageUpload>,
) -> Option<ImageFile> {
    let Some(upload) = upload else {
        errors.add(field, "Please upload an image");
        return None;
    };
    match upload.decode().and_then(|file| check_image(&file).map(|_| file)) {
        Ok(file) => Some(file),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

// endregion: --- Images

// region:    --- Tests
#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, len: usize) -> ImageUpload {
        ImageUpload {
            file_name: "photo.png".to_string(),
            content_type: content_type.to_string(),
            data: STANDARD.encode(vec![7u8; len]),
        }
    }

    #[test]
    fn test_allowed_email_domains() {
        let mut errors = FieldErrors::new();
        errors.allowed_email("email", "collector@gmail.com");
        assert!(errors.is_empty());

        errors.allowed_email("email", "collector@example.com");
        assert_eq!(
            errors.get("email"),
            Some("Please use a valid email from Gmail, Yahoo, Outlook, or Hotmail")
        );

        let mut errors = FieldErrors::new();
        errors.allowed_email("email", "not-an-email");
        assert_eq!(errors.get("email"), Some("Invalid email address"));
    }

    #[test]
    fn test_first_error_per_field_wins() {
        let mut errors = FieldErrors::new();
        errors.add("name", "first");
        errors.add("name", "second");
        assert_eq!(errors.get("name"), Some("first"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_image_limits() {
        let mut errors = FieldErrors::new();
        assert!(validate_image(&mut errors, "image", Some(&upload("image/png", 1024))).is_some());
        assert!(errors.is_empty());

        validate_image(&mut errors, "image", Some(&upload("image/png", MAX_IMAGE_BYTES + 1)));
        assert_eq!(errors.get("image"), Some("Image size must be less than 5MB"));

        let mut errors = FieldErrors::new();
        validate_image(&mut errors, "image", Some(&upload("application/pdf", 10)));
        assert_eq!(errors.get("image"), Some("Please upload an image file"));

        let mut errors = FieldErrors::new();
        validate_image(&mut errors, "image", None);
        assert_eq!(errors.get("image"), Some("Please upload an image"));
    }

    #[test]
    fn test_extension_falls_back_to_mime() {
        let file = ImageFile {
            file_name: "scan".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![],
        };
        assert_eq!(file.extension(), "jpeg");
    }
}
// endregion: --- Tests
