use std::fmt;

use super::claims::Claims;
use super::token::TokenService;

/// Why a request was turned away before reaching its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No `Authorization` header was presented.
    Unauthorized,
    /// A header was presented but is not a bearer token that verifies.
    Forbidden,
}

impl fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthRejection::Unauthorized => f.write_str("missing authorization header"),
            AuthRejection::Forbidden => f.write_str("invalid bearer token"),
        }
    }
}

/// Resolve an `Authorization` header value to verified claims.
///
/// Only a missing (or blank) header is `Unauthorized`. Anything else that is
/// not a `Bearer <token>` credential (scheme is case-insensitive) verifying
/// against `tokens` is `Forbidden`.
pub fn authenticate(header: Option<&str>, tokens: &TokenService) -> Result<Claims, AuthRejection> {
    let header = header
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(AuthRejection::Unauthorized)?;

    let token = header
        .split_once(' ')
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            tracing::debug!("authorization header is not a bearer credential");
            AuthRejection::Forbidden
        })?;

    tokens.verify(token).map_err(|e| {
        tracing::debug!(err = %e, "token verification failed");
        AuthRejection::Forbidden
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn svc() -> TokenService { TokenService::new("gate-secret", 3600) }

    fn token_for(email: &str) -> String {
        svc().issue(json!({"email": email}).as_object().cloned().unwrap()).unwrap()
    }

    #[test]
    fn missing_header_is_unauthorized() {
        assert_eq!(authenticate(None, &svc()), Err(AuthRejection::Unauthorized));
    }

    #[test]
    fn blank_header_is_unauthorized() {
        assert_eq!(authenticate(Some(""), &svc()), Err(AuthRejection::Unauthorized));
        assert_eq!(authenticate(Some("   "), &svc()), Err(AuthRejection::Unauthorized));
    }

    #[test]
    fn malformed_credential_is_forbidden() {
        let token = token_for("a@x.com");
        assert_eq!(authenticate(Some("Basic abc"), &svc()), Err(AuthRejection::Forbidden));
        assert_eq!(authenticate(Some(&format!("Token {token}")), &svc()), Err(AuthRejection::Forbidden));
        assert_eq!(authenticate(Some("Bearer"), &svc()), Err(AuthRejection::Forbidden));
        assert_eq!(authenticate(Some("Bearer   "), &svc()), Err(AuthRejection::Forbidden));
        assert_eq!(authenticate(Some(&token), &svc()), Err(AuthRejection::Forbidden));
    }

    #[test]
    fn bad_token_is_forbidden() {
        assert_eq!(authenticate(Some("Bearer nope"), &svc()), Err(AuthRejection::Forbidden));
        let foreign = TokenService::new("other", 3600)
            .issue(json!({"email": "a@x.com"}).as_object().cloned().unwrap())
            .unwrap();
        assert_eq!(authenticate(Some(&format!("Bearer {foreign}")), &svc()), Err(AuthRejection::Forbidden));
    }

    #[test]
    fn valid_token_yields_claims() {
        let header = format!("bearer {}", token_for("a@x.com"));
        let claims = authenticate(Some(&header), &svc()).unwrap();
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
    }
}
