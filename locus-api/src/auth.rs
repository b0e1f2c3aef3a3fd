//! Bearer Token Issuing and Validation
//!
//! Tokens are HS256 JWTs carrying `user_id`, `email`, `iat` and `exp`.
//! `jsonwebtoken` only verifies the signature; expiry is checked here against
//! an injectable clock so tests are deterministic.
//!
//! Validation never fails loudly: any problem with a token yields
//! `TokenValidation { valid: false, user_id: "" }`.

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use locus_core::{
    env_parse, env_var, strip_bearer, ConfigError, TokenValidation, TokenValidator,
    ValidatorError, DEFAULT_TOKEN_TTL_SECS,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const INSECURE_DEFAULT_SECRET: &str = "INSECURE_DEFAULT_SECRET_CHANGE_IN_PRODUCTION";

// ============================================================================
// CLOCK ABSTRACTION
// ============================================================================

/// Clock abstraction for token time checks.
pub trait JwtClock: Send + Sync {
    /// Current time as Unix epoch seconds.
    fn now_epoch_secs(&self) -> i64;
}

/// Production clock using system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl JwtClock for SystemClock {
    fn now_epoch_secs(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// Fixed clock for deterministic tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl JwtClock for FixedClock {
    fn now_epoch_secs(&self) -> i64 {
        self.0
    }
}

/// Test clock helpers for common scenarios.
pub mod test_clocks {
    use super::FixedClock;

    /// 2024-01-01 00:00:00 UTC
    pub fn valid() -> FixedClock {
        FixedClock(1704067200)
    }

    /// Two days after [`valid`], past the default token lifetime.
    pub fn two_days_later() -> FixedClock {
        FixedClock(1704067200 + 2 * 24 * 60 * 60)
    }
}

// ============================================================================
// JWT SECRET (TYPE-SAFE)
// ============================================================================

/// Signing secret that never shows up in logs.
#[derive(Clone)]
pub struct JwtSecret(SecretString);

impl JwtSecret {
    /// # Errors
    /// Returns error if the secret is empty.
    pub fn new(secret: String) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "JWT_SECRET".to_string(),
            });
        }
        Ok(Self(SecretString::new(secret.into_boxed_str())))
    }

    /// Expose the secret value (only for cryptographic operations).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    pub fn is_insecure_default(&self) -> bool {
        self.0.expose_secret() == INSECURE_DEFAULT_SECRET
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.len())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Token issuing configuration, loaded once at startup.
#[derive(Clone)]
pub struct TokenConfig {
    pub jwt_secret: JwtSecret,
    pub jwt_algorithm: Algorithm,
    /// Lifetime of issued tokens (default: 24 hours)
    pub jwt_expiration_secs: i64,
    /// Tolerance applied to the expiry check
    pub jwt_clock_skew_secs: i64,
    pub clock: Arc<dyn JwtClock>,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("jwt_secret", &self.jwt_secret)
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("jwt_expiration_secs", &self.jwt_expiration_secs)
            .field("jwt_clock_skew_secs", &self.jwt_clock_skew_secs)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(secret: JwtSecret) -> Self {
        Self {
            jwt_secret: secret,
            jwt_algorithm: Algorithm::HS256,
            jwt_expiration_secs: DEFAULT_TOKEN_TTL_SECS,
            jwt_clock_skew_secs: 0,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn JwtClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create token configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: signing secret (insecure default when unset)
    /// - `JWT_EXPIRATION_SECS`: token lifetime (default: 86400)
    /// - `JWT_CLOCK_SKEW_SECS`: expiry tolerance (default: 0)
    pub fn from_env() -> ApiResult<Self> {
        let secret = env_var("JWT_SECRET").unwrap_or_else(|| INSECURE_DEFAULT_SECRET.to_string());
        let mut config = Self::new(JwtSecret::new(secret)?);
        config.jwt_expiration_secs =
            env_parse("JWT_EXPIRATION_SECS").unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        config.jwt_clock_skew_secs = env_parse("JWT_CLOCK_SKEW_SECS").unwrap_or(0);
        Ok(config)
    }

    /// Refuse the insecure default secret in production; warn elsewhere.
    pub fn validate_for_production(&self) -> ApiResult<()> {
        if !self.jwt_secret.is_insecure_default() {
            return Ok(());
        }
        if crate::config::is_production() {
            return Err(ApiError::internal_error(
                "Cannot start in production with the insecure default JWT secret. \
                 Set JWT_SECRET to a secure value.",
            ));
        }
        tracing::warn!("Using the insecure default JWT secret; set JWT_SECRET before deploying");
        Ok(())
    }
}

// ============================================================================
// CLAIMS
// ============================================================================

/// JWT claims embedded in every bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        expiration_secs: i64,
        clock: &dyn JwtClock,
    ) -> Self {
        let now = clock.now_epoch_secs();
        Self {
            user_id: user_id.into(),
            email: email.into(),
            iat: now,
            exp: now + expiration_secs,
        }
    }

    pub fn is_expired(&self, clock: &dyn JwtClock, leeway_secs: i64) -> bool {
        self.exp < clock.now_epoch_secs() - leeway_secs
    }
}

// ============================================================================
// ISSUE / VALIDATE
// ============================================================================

/// Sign a token for an account.
pub fn issue_token(config: &TokenConfig, user_id: &str, email: &str) -> ApiResult<String> {
    let claims = Claims::new(user_id, email, config.jwt_expiration_secs, &*config.clock);
    let encoding_key = EncodingKey::from_secret(config.jwt_secret.expose().as_bytes());
    let header = Header::new(config.jwt_algorithm);

    encode(&header, &claims, &encoding_key)
        .map_err(|e| ApiError::internal_error(format!("Failed to generate token: {}", e)))
}

/// Decode and verify a token, returning its claims when it is currently valid.
pub fn decode_token(config: &TokenConfig, token: &str) -> Option<Claims> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.expose().as_bytes());

    // Signature only; time checks below use the injected clock.
    let mut validation = Validation::new(config.jwt_algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let claims = match decode::<Claims>(strip_bearer(token), &decoding_key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!(error_kind = ?e.kind(), "Token rejected");
            return None;
        }
    };

    if config.clock.now_epoch_secs() < 0 {
        tracing::error!("System clock returned pre-epoch time - server time is broken");
        return None;
    }

    if claims.is_expired(&*config.clock, config.jwt_clock_skew_secs) {
        tracing::debug!(exp = claims.exp, "Token expired");
        return None;
    }

    Some(claims)
}

/// Validate a token. Never errors.
pub fn validate_token(config: &TokenConfig, token: &str) -> TokenValidation {
    match decode_token(config, token) {
        Some(claims) if !claims.user_id.is_empty() => TokenValidation::valid(claims.user_id),
        _ => TokenValidation::invalid(),
    }
}

/// In-process validator, used where the signing secret is local.
#[derive(Debug, Clone)]
pub struct LocalTokenValidator {
    config: TokenConfig,
}

impl LocalTokenValidator {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TokenValidator for LocalTokenValidator {
    async fn validate(
        &self,
        token: &str,
        _timeout: Option<Duration>,
    ) -> Result<TokenValidation, ValidatorError> {
        Ok(validate_token(&self.config, token))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ApiResult<TokenConfig> {
        Ok(TokenConfig::new(JwtSecret::new("test_secret".to_string())?)
            .with_clock(Arc::new(test_clocks::valid())))
    }

    #[test]
    fn test_issue_and_validate() -> ApiResult<()> {
        let config = test_config()?;
        let token = issue_token(&config, "0b7c", "user@example.com")?;

        let claims = decode_token(&config, &token);
        assert_eq!(claims.as_ref().map(|c| c.email.as_str()), Some("user@example.com"));
        assert_eq!(
            claims.map(|c| c.exp - c.iat),
            Some(DEFAULT_TOKEN_TTL_SECS)
        );
        assert_eq!(validate_token(&config, &token), TokenValidation::valid("0b7c"));
        Ok(())
    }

    #[test]
    fn test_bearer_prefix_is_tolerated() -> ApiResult<()> {
        let config = test_config()?;
        let token = issue_token(&config, "u1", "a@b.c")?;
        let verdict = validate_token(&config, &format!("Bearer {}", token));
        assert_eq!(verdict, TokenValidation::valid("u1"));
        Ok(())
    }

    #[test]
    fn test_expired_token_is_invalid() -> ApiResult<()> {
        let config = test_config()?;
        let token = issue_token(&config, "u1", "a@b.c")?;

        let later = config.clone().with_clock(Arc::new(test_clocks::two_days_later()));
        assert_eq!(validate_token(&later, &token), TokenValidation::invalid());
        Ok(())
    }

    #[test]
    fn test_wrong_secret_is_invalid() -> ApiResult<()> {
        let config = test_config()?;
        let token = issue_token(&config, "u1", "a@b.c")?;

        let other = TokenConfig::new(JwtSecret::new("other_secret".to_string())?)
            .with_clock(Arc::new(test_clocks::valid()));
        assert_eq!(validate_token(&other, &token), TokenValidation::invalid());
        Ok(())
    }

    #[test]
    fn test_garbage_and_empty_tokens_are_invalid() -> ApiResult<()> {
        let config = test_config()?;
        assert_eq!(validate_token(&config, ""), TokenValidation::invalid());
        assert_eq!(validate_token(&config, "not-a-jwt"), TokenValidation::invalid());
        assert_eq!(validate_token(&config, "Bearer "), TokenValidation::invalid());
        Ok(())
    }

    #[test]
    fn test_missing_user_id_is_invalid() -> ApiResult<()> {
        let config = test_config()?;
        let token = issue_token(&config, "", "a@b.c")?;
        assert_eq!(validate_token(&config, &token), TokenValidation::invalid());
        Ok(())
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(JwtSecret::new(String::new()).is_err());
    }

    #[test]
    fn test_secret_debug_is_redacted() -> Result<(), ConfigError> {
        let secret = JwtSecret::new("super-secret-value".to_string())?;
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("REDACTED"));
        Ok(())
    }

    #[tokio::test]
    async fn test_local_validator_never_errors() -> ApiResult<()> {
        let validator = LocalTokenValidator::new(test_config()?);
        let verdict = validator.validate("junk", None).await;
        assert_eq!(verdict, Ok(TokenValidation::invalid()));
        Ok(())
    }
}
