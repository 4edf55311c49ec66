use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::Error, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{config::Config, models::role::Role};

/// Only access tokens open authenticated routes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignedDetails {
    pub email: String,
    pub user_id: String,
    pub role: Role,
    pub kind: TokenKind,
    pub exp: usize,
}

pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

pub fn sign_token(claims: &SignedDetails, secret: &str) -> Result<String, Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_all_tokens(
    email: &str,
    user_id: &str,
    role: Role,
    config: &Config,
) -> Result<TokenPair, Error> {
    let now = Utc::now();
    let claims = |kind: TokenKind, ttl: Duration| SignedDetails {
        email: email.to_string(),
        user_id: user_id.to_string(),
        role,
        kind,
        exp: (now + ttl).timestamp() as usize,
    };

    let token = sign_token(
        &claims(TokenKind::Access, config.access_token_ttl),
        &config.secret_key,
    )?;
    let refresh_token = sign_token(
        &claims(TokenKind::Refresh, config.refresh_token_ttl),
        &config.secret_key,
    )?;

    Ok(TokenPair {
        token,
        refresh_token,
    })
}

/// Checks signature and expiry.
pub fn validate_token(token: &str, secret: &str) -> Result<SignedDetails, Error> {
    let data = decode::<SignedDetails>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
