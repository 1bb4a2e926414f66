use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::TokenError;

/// Decoded token payload.
///
/// `email` is the identity used for order ownership. Whatever else the client
/// submitted at issuance rides along in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub iat: u64,
    pub exp: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Claims {
    /// Build claims from a client-submitted object, stamping `iat`/`exp` over
    /// any values the client sent.
    pub fn from_submitted(mut submitted: Map<String, Value>, now: u64, ttl_secs: u64) -> Result<Self, TokenError> {
        submitted.remove("iat");
        submitted.remove("exp");
        let email = match submitted.remove("email") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(TokenError::InvalidClaims("email must be a string".into())),
        };
        Ok(Self { email, iat: now, exp: now.saturating_add(ttl_secs), extra: submitted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn stamps_expiry_over_client_values() {
        let c = Claims::from_submitted(obj(json!({"email": "a@x.com", "exp": 1, "iat": 2})), 1_000, 3_600).unwrap();
        assert_eq!(c.email.as_deref(), Some("a@x.com"));
        assert_eq!(c.iat, 1_000);
        assert_eq!(c.exp, 4_600);
        assert!(c.extra.is_empty());
    }

    #[test]
    fn keeps_unknown_claims() {
        let c = Claims::from_submitted(obj(json!({"email": "a@x.com", "name": "Ann"})), 0, 60).unwrap();
        assert_eq!(c.extra["name"], "Ann");
        let wire = serde_json::to_value(&c).unwrap();
        assert_eq!(wire["name"], "Ann");
        assert_eq!(wire["email"], "a@x.com");
    }

    #[test]
    fn email_is_optional_but_typed() {
        let c = Claims::from_submitted(obj(json!({"role": "guest"})), 0, 60).unwrap();
        assert!(c.email.is_none());
        assert!(Claims::from_submitted(obj(json!({"email": 42})), 0, 60).is_err());
    }
}
