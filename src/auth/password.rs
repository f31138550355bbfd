use crate::error::MarketError;
use argon2::Argon2;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::Rng;
use subtle::ConstantTimeEq;

/// 저장용 비밀번호 자격 증명 (base64 인코딩)
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordCredential {
    pub hash: String,
    pub salt: String,
}

/// 랜덤 솔트 생성
pub fn generate_salt() -> [u8; 32] {
    rand::thread_rng().gen()
}

/// Argon2id 해시
pub fn hash_password(password: &str, salt: &[u8]) -> Result<[u8; 32], MarketError> {
    let argon2 = Argon2::default();
    let mut hash = [0u8; 32];

    argon2
        .hash_password_into(password.as_bytes(), salt, &mut hash)
        .map_err(|e| MarketError::Auth(format!("Password hashing failed: {}", e)))?;

    Ok(hash)
}

/// 새 솔트로 해시해서 저장 형태로 반환
pub fn new_credential(password: &str) -> Result<PasswordCredential, MarketError> {
    let salt = generate_salt();
    let hash = hash_password(password, &salt)?;
    Ok(PasswordCredential {
        hash: STANDARD.encode(hash),
        salt: STANDARD.encode(salt),
    })
}

/// 저장된 자격 증명과 비교
pub fn verify_password(password: &str, credential: &PasswordCredential) -> Result<bool, MarketError> {
    let salt = STANDARD
        .decode(&credential.salt)
        .map_err(|e| MarketError::Auth(format!("Corrupt password salt: {}", e)))?;
    let stored = STANDARD
        .decode(&credential.hash)
        .map_err(|e| MarketError::Auth(format!("Corrupt password hash: {}", e)))?;
    let computed = hash_password(password, &salt)?;
    Ok(computed.as_slice().ct_eq(stored.as_slice()).into())
}

/// 해시 계산은 블로킹 풀에서 수행
pub async fn new_credential_blocking(password: String) -> Result<PasswordCredential, MarketError> {
    tokio::task::spawn_blocking(move || new_credential(&password))
        .await
        .map_err(|e| MarketError::Auth(format!("Password hashing task failed: {}", e)))?
}

pub async fn verify_password_blocking(
    password: String,
    credential: PasswordCredential,
) -> Result<bool, MarketError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &credential))
        .await
        .map_err(|e| MarketError::Auth(format!("Password hashing task failed: {}", e)))?
}
