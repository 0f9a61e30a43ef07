//! Authentication Module
//!
//! Verifies the bearer credential of an analysis request and checks that its
//! principal matches the user the request acts for. Two verifiers exist:
//! - Supabase: asks the hosted auth backend who owns the token
//! - JWT: validates the token signature locally with the project secret

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::config::{AuthConfig, StoreConfig};
use crate::error::{AppError, Result};

/// Extract the bearer token from an Authorization header value
pub fn bearer_token(auth_header: Option<&str>) -> Option<&str> {
    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            let token = header[7..].trim();
            (!token.is_empty()).then_some(token)
        }
        _ => None,
    }
}

/// Authenticated principal
///
/// The bearer credential is not retained once the principal is proven.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    /// Principal id in the external identity system
    pub user_id: String,
}

impl UserIdentity {
    pub fn new(user_id: String) -> Self {
        Self { user_id }
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Audience
    pub aud: String,
    /// Token expiration timestamp
    pub exp: usize,
}

/// Identity verification trait
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Resolve a bearer token to its principal id
    async fn verify(&self, token: &str) -> Result<String>;
    /// Get the verifier type
    fn verifier_type(&self) -> &'static str;
}

/// Run the authentication stage of a request.
///
/// Fails with `Authentication` when the header is missing or malformed, when
/// the verifier rejects the token, or when the principal is not `user_id`.
pub async fn authenticate(
    verifier: &dyn IdentityVerifier,
    auth_header: Option<&str>,
    user_id: &str,
) -> Result<UserIdentity> {
    let token = bearer_token(auth_header).ok_or_else(|| {
        AppError::Authentication("Invalid or missing Authorization header".to_string())
    })?;

    let principal = verifier.verify(token).await.map_err(|e| {
        tracing::warn!("Authentication failed: {}", e);
        AppError::Authentication("Authentication failed".to_string())
    })?;

    if principal != user_id {
        tracing::warn!("User ID mismatch for authenticated principal");
        return Err(AppError::Authentication("Unauthorized user".to_string()));
    }

    Ok(UserIdentity::new(principal))
}

#[derive(Debug, Deserialize)]
struct SupabaseUser {
    id: String,
}

/// Hosted auth backend verifier (`GET {url}/auth/v1/user`)
#[derive(Debug, Clone)]
pub struct SupabaseIdentityVerifier {
    client: reqwest::Client,
    user_url: String,
    api_key: String,
}

impl SupabaseIdentityVerifier {
    pub fn new(url: &str, api_key: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("auth client: {}", e)))?;

        Ok(Self {
            client,
            user_url: format!("{}/auth/v1/user", url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl IdentityVerifier for SupabaseIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Authentication(format!("auth backend unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Authentication(format!(
                "auth backend rejected token ({})",
                response.status().as_u16()
            )));
        }

        let user: SupabaseUser = response
            .json()
            .await
            .map_err(|e| AppError::Authentication(format!("invalid auth response: {}", e)))?;

        Ok(user.id)
    }

    fn verifier_type(&self) -> &'static str {
        "supabase"
    }
}

/// Local JWT verifier
#[derive(Clone)]
pub struct JwtIdentityVerifier {
    decoding_key: DecodingKey,
    audience: String,
}

impl JwtIdentityVerifier {
    pub fn new(secret: &str, audience: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            audience: audience.to_string(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.audience.clone()]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims.sub)
            .map_err(|e| AppError::Authentication(format!("Invalid JWT token: {}", e)))
    }

    fn verifier_type(&self) -> &'static str {
        "jwt"
    }
}

/// Create the verifier selected by `auth.backend`
pub fn create_identity_verifier(
    auth: &AuthConfig,
    store: &StoreConfig,
) -> Result<Box<dyn IdentityVerifier>> {
    match auth.backend.as_str() {
        "supabase" => Ok(Box::new(SupabaseIdentityVerifier::new(
            &store.url,
            &store.key,
            auth.timeout_secs,
        )?)),
        "jwt" => Ok(Box::new(JwtIdentityVerifier::new(
            &auth.jwt_secret,
            &auth.jwt_audience,
        ))),
        other => Err(AppError::Config(format!("unknown auth backend: {}", other))),
    }
}
