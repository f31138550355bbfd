//! 회원 가입/로그인/로그아웃
//! 성공하면 새 세션 토큰을 발급한다.

// region:    --- Imports
use crate::backend::Backend;
use crate::error::{MarketError, MarketResult};
use crate::profile::model::User;
use crate::session::SessionRegistry;
use crate::validation::FieldErrors;
use crate::widgets::Notice;
use serde::{Deserialize, Serialize};
use tracing::info;

// endregion: --- Imports

pub mod password;

// region:    --- Forms
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> MarketResult<()> {
        let mut errors = FieldErrors::new();
        errors.min_chars("name", &self.name, 2, "Name must be at least 2 characters");
        errors.allowed_email("email", &self.email);
        check_password(&mut errors, &self.password);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> MarketResult<()> {
        let mut errors = FieldErrors::new();
        errors.allowed_email("email", &self.email);
        if self.password.chars().count() < 8 {
            errors.add("password", "Password must be at least 8 characters");
        }
        errors.into_result()
    }
}

/// 가입 비밀번호 규칙 (8자 이상, 대/소문자, 숫자, 특수문자)
fn check_password(errors: &mut FieldErrors, password: &str) {
    let rules: [(bool, &str); 5] = [
        (
            password.chars().count() >= 8,
            "Password must be at least 8 characters",
        ),
        (
            password.chars().any(|c| c.is_ascii_uppercase()),
            "Password must contain at least one uppercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_lowercase()),
            "Password must contain at least one lowercase letter",
        ),
        (
            password.chars().any(|c| c.is_ascii_digit()),
            "Password must contain at least one number",
        ),
        (
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
            "Password must contain at least one special character",
        ),
    ];
    if let Some((_, message)) = rules.iter().find(|(ok, _)| !ok) {
        errors.add("password", *message);
    }
}

// endregion: --- Forms

// region:    --- Auth Commands
/// 로그인된 세션
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
    pub notice: Notice,
    pub redirect: &'static str,
}

pub async fn register(
    backend: &dyn Backend,
    sessions: &SessionRegistry,
    form: &RegisterForm,
) -> MarketResult<AuthSession> {
    form.validate()?;
    let account = backend
        .sign_up(&form.email, &form.password, form.name.trim())
        .await?;
    let (token, handle) = sessions.open(account.into_user()).await?;
    let user = handle.lock().await.user().cloned();
    info!("{:<12} --> 가입 및 로그인 완료", "Auth");

    Ok(AuthSession {
        token,
        user: user.ok_or(MarketError::Unauthenticated)?,
        notice: Notice::success("Registration successful! Welcome to MayaBazaar."),
        redirect: "/",
    })
}

pub async fn login(
    backend: &dyn Backend,
    sessions: &SessionRegistry,
    form: &LoginForm,
) -> MarketResult<AuthSession> {
    form.validate()?;
    let account = backend
        .sign_in_with_password(&form.email, &form.password)
        .await?;

    // 프로필이 있으면 세션 사용자에 반영
    let mut user = account.into_user();
    if let Some(profile) = backend.get_profile(user.id).await? {
        user.merge((&profile).into());
    }
    let (token, _) = sessions.open(user.clone()).await?;
    info!("{:<12} --> 로그인 완료: {}", "Auth", user.id);

    Ok(AuthSession {
        token,
        user,
        notice: Notice::success("Welcome back!"),
        redirect: "/",
    })
}

/// 로그아웃 (세션이 없어도 성공)
pub async fn logout(sessions: &SessionRegistry, token: &str) -> MarketResult<Notice> {
    if sessions.close(token).await? {
        info!("{:<12} --> 로그아웃", "Auth");
    }
    Ok(Notice::info("You have been logged out."))
}

// endregion: --- Auth Commands

// endregion: --- Tests
