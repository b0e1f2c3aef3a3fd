//! Error types for Locus operations

use thiserror::Error;

/// Geocoding provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request to {provider} failed: {reason}")]
    Transport { provider: String, reason: String },

    #[error("{provider} returned status {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("invalid request: {reason}")]
    InvalidRequest { reason: String },
}

/// Key-value cache errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache connection failed: {reason}")]
    Connection { reason: String },

    #[error("cache command failed: {reason}")]
    Command { reason: String },
}

/// Account store errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error("user already exists")]
    AlreadyExists,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {reason}")]
    Hashing { reason: String },

    #[error("database error: {reason}")]
    Database { reason: String },
}

/// Failure to obtain a validity verdict for a token.
///
/// A token that was checked and rejected is not an error; see
/// [`crate::TokenValidation`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidatorError {
    #[error("token validator unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("token validation timed out")]
    Timeout,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}
