//! Per-call context carried from an inbound RPC into the lookup path.

use locus_core::AUTHORIZATION_METADATA_KEY;
use std::time::Duration;
use tokio::time::Instant;

/// Caller credentials and deadline for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    token: Option<String>,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a bearer token. An empty token counts as no token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = (!token.is_empty()).then_some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Build the context from request metadata: the `authorization` entry
    /// and the `grpc-timeout` header.
    pub fn from_request<T>(request: &tonic::Request<T>) -> Self {
        let metadata = request.metadata();
        let mut ctx = Self::new();

        if let Some(token) = metadata
            .get(AUTHORIZATION_METADATA_KEY)
            .and_then(|value| value.to_str().ok())
        {
            ctx = ctx.with_token(token);
        }

        if let Some(timeout) = metadata
            .get("grpc-timeout")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_grpc_timeout)
        {
            ctx = ctx.with_timeout(timeout);
        }

        ctx
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; zero once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

/// Parse a `grpc-timeout` header value: up to eight ASCII digits followed by
/// one unit character (`H`, `M`, `S`, `m`, `u`, `n`).
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    if value.len() < 2 || value.len() > 9 || !value.is_ascii() {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    match unit {
        "H" => Some(Duration::from_secs(amount * 60 * 60)),
        "M" => Some(Duration::from_secs(amount * 60)),
        "S" => Some(Duration::from_secs(amount)),
        "m" => Some(Duration::from_millis(amount)),
        "u" => Some(Duration::from_micros(amount)),
        "n" => Some(Duration::from_nanos(amount)),
        _ => None,
    }
}
