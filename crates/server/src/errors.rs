use axum::async_trait;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::Envelope;
use service::auth::AuthRejection;
use service::auth::errors::TokenError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::{error, warn};

/// Every failure a handler can report. Rendered as an [`Envelope`] with
/// `success: false`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized access")]
    Unauthorized,
    #[error("Forbidden access")]
    Forbidden,
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String, detail: Option<String> },
    /// Store failures keep the default 200 status; only the envelope signals failure.
    #[error("Operation failed")]
    Store(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest { status, .. } => *status,
            ApiError::Store(_) => StatusCode::OK,
        }
    }

    pub fn bad_request(message: &str, detail: impl Into<String>) -> Self {
        ApiError::BadRequest { status: StatusCode::BAD_REQUEST, message: message.into(), detail: Some(detail.into()) }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let detail = match self {
            ApiError::Store(err) => {
                error!(error = %err, "store operation failed");
                Some(err)
            }
            ApiError::BadRequest { detail, .. } => detail,
            _ => None,
        };
        (status, Json(Envelope::failure(message, detail))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Forbidden => ApiError::Forbidden,
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Validation(msg) => ApiError::bad_request("Invalid request", msg),
            ServiceError::Store(err) => ApiError::Store(err.to_string()),
        }
    }
}

impl From<AuthRejection> for ApiError {
    fn from(r: AuthRejection) -> Self {
        match r {
            AuthRejection::Unauthorized => ApiError::Unauthorized,
            AuthRejection::Forbidden => ApiError::Forbidden,
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InvalidClaims(msg) => ApiError::bad_request("Invalid claims", msg),
            other => {
                error!(code = other.code(), err = %other, "token issuing failed");
                ApiError::Store(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(r: JsonRejection) -> Self {
        warn!(status = %r.status(), err = %r.body_text(), "rejected request body");
        ApiError::BadRequest { status: r.status(), message: "Invalid request body".into(), detail: Some(r.body_text()) }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(r: QueryRejection) -> Self {
        ApiError::BadRequest { status: r.status(), message: "Invalid query".into(), detail: Some(r.body_text()) }
    }
}

/// `Json` extractor whose rejection is an envelope instead of plain text.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
