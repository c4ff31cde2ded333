// taskboard-service/src/models/mod.rs
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::json;

pub mod attachment;
pub use attachment::*;

pub mod invitations;
pub use invitations::*;

pub mod task;
pub use task::*;

pub mod team;
pub use team::*;

// Who is calling. Resolved once per request and passed to every service call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Anonymous,
    User(String),
}

impl Identity {
    pub fn user(id: impl Into<String>) -> Self {
        Identity::User(id.into())
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Identity::Anonymous => None,
            Identity::User(id) => Some(id),
        }
    }

    // Write paths require a resolved user
    pub fn require_user(&self) -> Result<&str, ServiceError> {
        self.user_id().ok_or(ServiceError::Unauthenticated)
    }
}

// Public profile kept in the `users` collection
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

// Profile without the id, as returned by `GET /users/{id}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PublicUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserLookupRequest {
    pub user_ids: Vec<String>,
}

// JWT claims issued by the external identity provider
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued at
}

// Custom error types
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[display(fmt = "Not authenticated")]
    Unauthenticated,
    #[display(fmt = "Unauthorized")]
    Unauthorized,
    #[display(fmt = "Not Found")]
    NotFound,
    #[display(fmt = "Invalid invite token")]
    InvalidToken,
    #[display(fmt = "Invite token has expired")]
    TokenExpired,
    #[display(fmt = "Already a member of this team")]
    AlreadyMember,
    #[display(fmt = "BadRequest: {}", _0)]
    BadRequest(String),
    #[display(fmt = "Internal Server Error")]
    InternalServerError,
}

impl ServiceError {
    // Stable machine-readable kind used in response bodies
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Unauthenticated => "unauthenticated",
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::NotFound => "not_found",
            ServiceError::InvalidToken => "invalid_token",
            ServiceError::TokenExpired => "token_expired",
            ServiceError::AlreadyMember => "already_member",
            ServiceError::BadRequest(_) => "bad_request",
            ServiceError::InternalServerError => "internal",
        }
    }
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ServiceError::Unauthorized => StatusCode::FORBIDDEN,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::InvalidToken => StatusCode::BAD_REQUEST,
            ServiceError::TokenExpired => StatusCode::GONE,
            ServiceError::AlreadyMember => StatusCode::CONFLICT,
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}
