use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rating_party_collab::{AuthError, DatabaseError, RatingError};
use rating_party_core::TokenError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Unknown internal error: {0}")]
    Internal(String),
}

/// The JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    /// Correlates the response with the server log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
}

/// Attached to error responses so request tracking can add the request id and log the detail
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
    /// Only set for internal errors, never sent to the client
    pub detail: Option<String>,
}

impl ServerError {
    const INTERNAL_MESSAGE: &'static str = "Internal server error";

    pub fn as_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn report(&self) -> ErrorReport {
        match self {
            Self::Internal(_) => ErrorReport {
                message: Self::INTERNAL_MESSAGE.to_string(),
                detail: Some(self.to_string()),
            },
            _ => ErrorReport {
                message: self.to_string(),
                detail: None,
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let report = self.report();
        let body = ErrorBody {
            error: report.message.clone(),
            request_id: None,
        };

        let mut response = (self.as_status_code(), Json(body)).into_response();
        response.extensions_mut().insert(report);

        response
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Internal(e.to_string()),
        }
    }
}

impl From<TokenError> for ServerError {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Signing(_) => Self::Internal(value.to_string()),
            e => Self::Unauthorized(e.to_string()),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::Unauthorized(value.to_string()),
            AuthError::InvalidUsername(_) => Self::BadRequest(value.to_string()),
            AuthError::Token(e) => e.into(),
            AuthError::Gate(e) if e.is_forbidden() => Self::Forbidden(e.to_string()),
            AuthError::Gate(e) => Self::Internal(e.to_string()),
            AuthError::Db(e) => e.into(),
        }
    }
}

impl From<RatingError> for ServerError {
    fn from(value: RatingError) -> Self {
        match value {
            RatingError::NotAParticipant => Self::Forbidden(value.to_string()),
            RatingError::ScoreOutOfRange => Self::BadRequest(value.to_string()),
            RatingError::Aggregation(e) => Self::Internal(e.to_string()),
            RatingError::Db(e) => e.into(),
        }
    }
}
