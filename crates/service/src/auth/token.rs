use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::claims::Claims;
use super::errors::TokenError;

/// Signs and verifies HS256 bearer tokens with one process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 { self.ttl_secs }

    /// Sign whatever claims the client submitted; no credential check happens here.
    #[instrument(skip(self, submitted), fields(claims = submitted.len()))]
    pub fn issue(&self, submitted: Map<String, Value>) -> Result<String, TokenError> {
        let claims = Claims::from_submitted(submitted, now_secs(), self.ttl_secs)?;
        let token = self.sign(&claims)?;
        debug!(email = claims.email.as_deref().unwrap_or("-"), exp = claims.exp, "token_issued");
        Ok(token)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Check signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}

pub(crate) fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let svc = TokenService::new("secret", 3600);
        let token = svc.issue(obj(json!({"email": "a@x.com", "name": "Ann"}))).unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.extra["name"], "Ann");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = TokenService::new("secret", 3600).issue(obj(json!({"email": "a@x.com"}))).unwrap();
        assert!(matches!(TokenService::new("other", 3600).verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let svc = TokenService::new("secret", 3600);
        let now = now_secs();
        let claims = Claims { email: Some("a@x.com".into()), iat: now - 7200, exp: now - 60, extra: Map::new() };
        let token = svc.sign(&claims).unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        let svc = TokenService::new("secret", 3600);
        assert!(svc.verify("not.a.token").is_err());
        assert!(svc.verify("").is_err());
    }
}
