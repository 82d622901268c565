//! Signed session tokens.
//!
//! A login issues an HS256 JWT carrying the user's id, role, and branch;
//! the extractor verifies it on every request. This is the verified-session
//! boundary in front of the membership checks — request bodies and query
//! strings never carry identity.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id.
    pub sub: i64,
    pub role: String,
    pub branch_id: Option<i64>,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue(
    secret: &str,
    user_id: i64,
    role: &str,
    branch_id: Option<i64>,
    ttl_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id,
        role: role.to_string(),
        branch_id,
        iat: now,
        exp: now + ttl_secs as i64,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify(secret: &str, token: &str) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}
