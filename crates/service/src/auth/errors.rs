use thiserror::Error;

/// Errors from issuing or verifying tokens
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid claims: {0}")]
    InvalidClaims(String),
    #[error("token encoding failed: {0}")]
    Encode(String),
    #[error("invalid token: {0}")]
    Invalid(String),
}

impl TokenError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            TokenError::InvalidClaims(_) => 1001,
            TokenError::Encode(_) => 1101,
            TokenError::Invalid(_) => 1102,
        }
    }
}
