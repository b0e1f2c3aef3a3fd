//! Bearer token validation seam.

use crate::constants::BEARER_PREFIX;
use crate::error::ValidatorError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Verdict on a bearer token.
///
/// `user_id` is empty whenever `valid` is false.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenValidation {
    pub valid: bool,
    pub user_id: String,
}

impl TokenValidation {
    pub fn valid(user_id: impl Into<String>) -> Self {
        Self {
            valid: true,
            user_id: user_id.into(),
        }
    }

    pub fn invalid() -> Self {
        Self::default()
    }
}

/// Anything that can decide whether a bearer token is currently valid.
///
/// `Err` means no verdict could be obtained (transport failure, timeout);
/// a rejected token is `Ok` with `valid == false`.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(
        &self,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<TokenValidation, ValidatorError>;
}

#[async_trait]
impl<T: TokenValidator + ?Sized> TokenValidator for Arc<T> {
    async fn validate(
        &self,
        token: &str,
        timeout: Option<Duration>,
    ) -> Result<TokenValidation, ValidatorError> {
        (**self).validate(token, timeout).await
    }
}

/// Drop a leading `Bearer ` scheme, if present.
pub fn strip_bearer(token: &str) -> &str {
    token.strip_prefix(BEARER_PREFIX).unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc.def"), "abc.def");
        assert_eq!(strip_bearer("abc.def"), "abc.def");
        assert_eq!(strip_bearer("bearer abc"), "bearer abc");
    }

    #[test]
    fn test_invalid_verdict_has_no_user() {
        let verdict = TokenValidation::invalid();
        assert!(!verdict.valid);
        assert!(verdict.user_id.is_empty());
    }
}
