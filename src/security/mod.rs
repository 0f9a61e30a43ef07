//! Security Module
//!
//! Provides the security features of the analysis API:
//! - Bearer credential verification (Supabase or local JWT)
//! - Security headers and CORS middleware

pub mod auth;
pub mod middleware;

pub use auth::{
    IdentityVerifier, JwtIdentityVerifier, SupabaseIdentityVerifier, UserIdentity, authenticate,
    create_identity_verifier,
};
pub use middleware::{cors_layer, security_headers_middleware};
