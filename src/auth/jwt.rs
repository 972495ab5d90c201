//! JWT Token Codec
//! Mission: Mint and validate signed, self-contained access/refresh tokens

use crate::auth::models::{Claims, TokenKind, UserRole};
use crate::auth::service::AuthError;
use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;
use uuid::Uuid;

/// Token codec holding the process-wide signing secret and per-kind TTLs.
///
/// Tokens are stateless and self-verifying: validating one never needs a
/// store round-trip. Only the revocation check does.
pub struct JwtHandler {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtHandler {
    /// Create a codec with the default TTLs: 30-minute access tokens,
    /// 7-day refresh tokens.
    pub fn new(secret: String) -> Self {
        Self::with_ttls(secret, 30, 7)
    }

    /// Create a codec with explicit TTLs.
    pub fn with_ttls(secret: String, access_ttl_minutes: i64, refresh_ttl_days: i64) -> Self {
        Self {
            secret,
            access_ttl: Duration::minutes(access_ttl_minutes),
            refresh_ttl: Duration::days(refresh_ttl_days),
        }
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Mint a token of the given kind for a subject, returning the
    /// serialized token and its fresh jti.
    pub fn issue(&self, subject: &Uuid, role: UserRole, kind: TokenKind) -> Result<(String, String)> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl(kind))
            .context("Invalid timestamp")?;

        let jti = Uuid::new_v4().to_string();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            jti: jti.clone(),
            kind,
            iat: now.timestamp() as usize,
            exp: expires_at.timestamp() as usize,
        };

        debug!(
            "Issuing {} token for subject {}, jti {}",
            kind.as_str(),
            subject,
            jti
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign token")?;

        Ok((token, jti))
    }

    /// Verify signature and expiry, returning the embedded claims.
    ///
    /// Expiry is reported separately from every other failure so callers
    /// can surface it distinctly.
    pub fn parse(&self, token: &str) -> Result<Claims, AuthError> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        Ok(decoded.claims)
    }
}
