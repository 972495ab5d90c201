//! Auth Core
//! Mission: Orchestrate registration, login, refresh, logout, and the
//! authorization guards over the codec, stores, and ledger

use crate::auth::jwt::JwtHandler;
use crate::auth::models::{Claims, TokenKind, User, UserRole};
use crate::auth::password;
use crate::auth::revocation::RevocationLedger;
use crate::auth::user_store::{is_unique_violation, UserStore};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Auth flow errors, mapped to HTTP statuses in the API layer.
#[derive(Debug)]
pub enum AuthError {
    Validation(&'static str),
    DuplicateUsername,
    InvalidCredentials,
    InvalidToken,
    ExpiredToken,
    Unauthenticated,
    Forbidden,
    UserNotFound,
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        AuthError::Internal(err)
    }
}

/// Authentication core: credential verification, token issuance, and
/// revocation-aware authorization.
///
/// A token is usable only while valid: signature ok, not past expiry, and
/// its jti absent from the revocation ledger.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<UserStore>,
    codec: Arc<JwtHandler>,
    ledger: Arc<RevocationLedger>,
}

impl AuthService {
    pub fn new(users: Arc<UserStore>, codec: Arc<JwtHandler>, ledger: Arc<RevocationLedger>) -> Self {
        Self {
            users,
            codec,
            ledger,
        }
    }

    pub fn users(&self) -> &UserStore {
        &self.users
    }

    /// Register a new account with the default `user` role.
    pub fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "username and password are required.",
            ));
        }

        let password_hash = password::hash(password)?;

        match self.users.create_user(username, &password_hash, UserRole::User) {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(AuthError::DuplicateUsername),
            Err(e) => Err(AuthError::Internal(e)),
        }
    }

    /// Verify credentials and issue one access and one refresh token.
    ///
    /// Unknown username and wrong password are deliberately
    /// indistinguishable to resist username enumeration.
    pub fn login(&self, username: &str, password: &str) -> Result<(String, String, User), AuthError> {
        let user = match self.users.find_by_username(username)? {
            Some(user) => user,
            None => {
                warn!("❌ Failed login attempt: unknown user");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !password::verify(password, &user.password_hash)? {
            warn!("❌ Failed login attempt: {}", user.username);
            return Err(AuthError::InvalidCredentials);
        }

        let (access_token, _) = self.codec.issue(&user.id, user.role, TokenKind::Access)?;
        let (refresh_token, _) = self.codec.issue(&user.id, user.role, TokenKind::Refresh)?;

        info!("✅ Login successful: {} ({})", user.username, user.role.as_str());

        Ok((access_token, refresh_token, user))
    }

    /// Mint a new access token from a valid refresh token.
    ///
    /// The role is taken from the refresh token's claims, not re-fetched
    /// from the store: a role change takes effect on refreshed access
    /// tokens only after the refresh token itself is reissued at next
    /// login. That staleness is intentional.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.authorize(refresh_token, TokenKind::Refresh)?;
        let subject = parse_subject(&claims)?;

        let (access_token, _) = self.codec.issue(&subject, claims.role, TokenKind::Access)?;
        Ok(access_token)
    }

    /// Revoke a token of the expected kind.
    ///
    /// Skips the revocation lookup so a repeated logout of the same token
    /// succeeds; the ledger write itself is a no-op the second time.
    pub fn logout(&self, token: &str, kind: TokenKind) -> Result<(), AuthError> {
        let claims = self.codec.parse(token)?;

        if claims.kind != kind {
            return Err(AuthError::InvalidToken);
        }

        self.ledger.revoke(&claims.jti, kind)?;
        Ok(())
    }

    /// The guard used by every protected operation: returns the claims of
    /// a valid token of the matching kind.
    pub fn authorize(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.codec.parse(token)?;

        if claims.kind != kind {
            return Err(AuthError::InvalidToken);
        }

        if self.ledger.is_revoked(&claims.jti)? {
            return Err(AuthError::Unauthenticated);
        }

        Ok(claims)
    }

    /// Fetch the caller's current identity from the store.
    pub fn current_user(&self, claims: &Claims) -> Result<User, AuthError> {
        let subject = parse_subject(claims)?;
        self.users
            .find_by_id(&subject)?
            .ok_or(AuthError::UserNotFound)
    }

    /// Promote a user to admin. Only admins may promote.
    pub fn promote(&self, acting: &Claims, target_id: &Uuid) -> Result<User, AuthError> {
        if acting.role != UserRole::Admin {
            return Err(AuthError::Forbidden);
        }

        if !self.users.set_role(target_id, UserRole::Admin)? {
            return Err(AuthError::UserNotFound);
        }

        let user = self
            .users
            .find_by_id(target_id)?
            .ok_or(AuthError::UserNotFound)?;

        info!("⬆️  User {} promoted to admin", user.username);
        Ok(user)
    }
}

/// Owner-or-admin rule consumed by inventory mutation handlers: allow iff
/// the caller owns the resource or holds the admin role.
pub fn authorize_owner_or_admin(claims: &Claims, owner_id: &Uuid) -> Result<(), AuthError> {
    if claims.role == UserRole::Admin {
        return Ok(());
    }

    let subject = parse_subject(claims)?;
    if subject == *owner_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

fn parse_subject(claims: &Claims) -> Result<Uuid, AuthError> {
    // The subject was minted from a Uuid at issuance; a non-uuid value
    // means the token did not come from this codec.
    Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)
}
