//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs whose only claim is `exp`. The [`TokenAuthority`]
//! owns the signing secret and the login credential pair; [`Gate`] is the
//! verdict handed to the HTTP middleware.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bookshelf_kernel::settings::AuthSettings;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("system clock is outside the range of UNIX timestamps")]
    Clock,

    #[error("token lifetime does not fit in an expiry timestamp")]
    TtlOutOfRange,

    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Why a request was turned away by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MissingToken,
    Malformed,
    InvalidSignature,
    Expired,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MissingToken => "missing_token",
            RejectReason::Malformed => "malformed_token",
            RejectReason::InvalidSignature => "invalid_signature",
            RejectReason::Expired => "token_expired",
        }
    }

    /// Client-facing message for the 401 envelope.
    pub fn message(&self) -> &'static str {
        match self {
            RejectReason::MissingToken => "Authorization token required",
            RejectReason::Malformed => "Invalid token",
            RejectReason::InvalidSignature => "Invalid token",
            RejectReason::Expired => "Token expired",
        }
    }
}

/// Verdict for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allow,
    Reject(RejectReason),
}

/// Issues and verifies access tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    username: String,
    password: String,
}

impl TokenAuthority {
    pub fn new(
        secret: &[u8],
        ttl: Duration,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn from_settings(settings: &AuthSettings) -> Self {
        Self::new(
            settings.jwt_secret.as_bytes(),
            Duration::from_secs(settings.token_ttl_secs),
            settings.username.clone(),
            settings.password.clone(),
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check the login pair and mint a token valid from `now` for the TTL.
    pub fn issue(
        &self,
        username: &str,
        password: &str,
        now: SystemTime,
    ) -> Result<String, TokenError> {
        if username != self.username || password != self.password {
            return Err(TokenError::InvalidCredentials);
        }
        self.mint(now)
    }

    /// Mint a token without checking credentials.
    pub fn mint(&self, now: SystemTime) -> Result<String, TokenError> {
        let issued = unix_seconds(now)?;
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| issued.checked_add(ttl))
            .ok_or(TokenError::TtlOutOfRange)?;
        let token = encode(&Header::new(Algorithm::HS256), &Claims { exp }, &self.encoding)?;
        Ok(token)
    }

    /// Verify signature and expiry. A token is expired once `now >= exp`.
    pub fn verify(&self, token: &str, now: SystemTime) -> Gate {
        // Expiry is checked below against the caller's clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        let claims = match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                return Gate::Reject(match e.kind() {
                    ErrorKind::InvalidSignature => RejectReason::InvalidSignature,
                    _ => RejectReason::Malformed,
                })
            }
        };

        match unix_seconds(now) {
            Ok(now) if now < claims.exp => Gate::Allow,
            _ => Gate::Reject(RejectReason::Expired),
        }
    }

    /// Verify the raw value of an `Authorization` header.
    pub fn check_header(&self, header: Option<&str>, now: SystemTime) -> Gate {
        let Some(header) = header else {
            return Gate::Reject(RejectReason::MissingToken);
        };
        match parse_bearer(header) {
            Some(token) => self.verify(token, now),
            None => Gate::Reject(RejectReason::Malformed),
        }
    }
}

/// Extract the token from `Bearer <token>`; the scheme is case-insensitive.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

fn unix_seconds(at: SystemTime) -> Result<i64, TokenError> {
    let elapsed = at.duration_since(UNIX_EPOCH).ok();
    elapsed
        .and_then(|since| i64::try_from(since.as_secs()).ok())
        .ok_or(TokenError::Clock)
}
