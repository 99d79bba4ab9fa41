//! API tokens
//!
//! Callers of the REST API authenticate with HMAC-SHA256 signed JWTs issued
//! by this service. GitHub itself is reached with a PAT, see
//! [`crate::credentials`].

use std::collections::HashSet;
use std::sync::RwLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::JwtConfig;
use crate::{Error, Result};

/// Shortest accepted signing secret, in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Claims carried by an API token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    /// Token id, used for revocation
    pub jti: String,
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub claims: Claims,
}

/// Issues and validates API tokens
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    expiry: Duration,
    revoked: RwLock<HashSet<String>>,
}

impl std::fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

/// Generate a random signing secret
///
/// Tokens signed with it do not survive a restart.
pub fn generate_secret() -> String {
    format!(
        "{}{}",
        uuid::Uuid::new_v4().simple(),
        uuid::Uuid::new_v4().simple()
    )
}

impl JwtIssuer {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        expiry: Duration,
    ) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "JWT secret must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            audience: audience.into(),
            expiry,
            revoked: RwLock::new(HashSet::new()),
        })
    }

    /// Build an issuer from configuration, generating a secret if none is set
    pub fn from_config(config: &JwtConfig) -> Result<Self> {
        let secret = match config.secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                tracing::warn!("No JWT secret configured, generated a random one; tokens will not survive a restart");
                generate_secret()
            }
        };
        Self::new(
            secret.as_bytes(),
            config.issuer.clone(),
            config.audience.clone(),
            config.expiry,
        )
    }

    /// Sign a token for the given user
    pub fn issue(&self, user_id: &str, email: &str, roles: &[String]) -> Result<IssuedToken> {
        if user_id.trim().is_empty() || email.trim().is_empty() {
            return Err(Error::Validation("UserId and Email are required".to_string()));
        }

        let now = Utc::now();
        let expiry = chrono::Duration::from_std(self.expiry)
            .map_err(|e| Error::Config(format!("Invalid token expiry: {}", e)))?;
        let expires_at = now + expiry;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            roles: roles.to_vec(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = self.sign(&claims)?;
        info!(user_id, jti = %claims.jti, "Issued API token");

        Ok(IssuedToken {
            token,
            expires_at,
            claims,
        })
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Verify signature, issuer, audience, expiry and revocation
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)?;

        if self.is_revoked(&data.claims.jti) {
            debug!(jti = %data.claims.jti, "Rejected revoked token");
            return Err(Error::Token("Token has been revoked".to_string()));
        }

        Ok(data.claims)
    }

    pub fn is_valid(&self, token: &str) -> bool {
        self.validate(token).is_ok()
    }

    /// Reject any future use of the token with this id
    pub fn revoke(&self, jti: &str) {
        let mut revoked = self
            .revoked
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if revoked.insert(jti.to_string()) {
            info!(jti, "Revoked API token");
        }
    }

    fn is_revoked(&self, jti: &str) -> bool {
        self.revoked
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(jti)
    }
}

/// Strip a `Bearer ` prefix from an `Authorization` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
