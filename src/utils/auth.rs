use anyhow::{Result, anyhow};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub username: String,
    pub exp: usize,
    pub jti: String, // session id
}

impl Claims {
    pub fn user_id(&self) -> Result<i32> {
        self.sub
            .parse()
            .map_err(|_| anyhow!("malformed subject claim: {}", self.sub))
    }
}

pub fn create_jwt(
    user_id: i32,
    username: &str,
    session_id: &str,
    expires_at: DateTime<Utc>,
    secret: &str,
) -> Result<String> {
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_owned(),
        exp: expires_at.timestamp() as usize,
        jti: session_id.to_owned(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("password hashing failed: {}", e))?
        .to_string();
    Ok(hash)
}

/// `Ok(false)` on a wrong password; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| anyhow!("invalid stored hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
