use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{Request, Response};
use std::io::Cursor;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error")]
    Db {
        message: String,
        #[source]
        source: sqlx::error::Error,
    },
    #[error("User not found")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Access token missing")]
    MissingToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Internal server error")]
    PasswordHash { message: String },
    #[error("User already exists. Please login.")]
    UserAlreadyExists(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{message}")]
    UuidError {
        message: String,
        #[source]
        source: uuid::Error,
    },
    #[error("Internal server error")]
    TokenSigning {
        message: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
    #[error("Internal server error")]
    ConfigurationError {
        message: String,
        #[source]
        source: figment::Error,
    },
}

impl AppError {
    pub fn db(message: impl Into<String>, source: sqlx::error::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn uuid(message: impl Into<String>, source: uuid::Error) -> Self {
        Self::UuidError {
            message: message.into(),
            source,
        }
    }

    pub fn token_signing(message: impl Into<String>, source: jsonwebtoken::errors::Error) -> Self {
        Self::TokenSigning {
            message: message.into(),
            source,
        }
    }

    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    pub fn password_hash(message: impl Into<String>, source: password_hash::Error) -> Self {
        Self::PasswordHash {
            message: format!("{}: {}", message.into(), source),
        }
    }
}

impl From<password_hash::Error> for AppError {
    fn from(e: password_hash::Error) -> Self {
        AppError::password_hash("Password hashing failed", e)
    }
}

impl From<figment::Error> for AppError {
    fn from(e: figment::Error) -> Self {
        AppError::ConfigurationError {
            message: "Failed to read configuration".to_string(),
            source: e,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            _ => AppError::db("Database error", e),
        }
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::Db { .. } => Status::InternalServerError,
            AppError::UserNotFound => Status::NotFound,
            AppError::InvalidCredentials => Status::Unauthorized,
            AppError::MissingToken => Status::Unauthorized,
            AppError::TokenExpired => Status::Forbidden,
            AppError::InvalidToken => Status::Forbidden,
            AppError::PasswordHash { .. } => Status::InternalServerError,
            AppError::UserAlreadyExists(_) => Status::Conflict,
            AppError::BadRequest(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::UuidError { .. } => Status::BadRequest,
            AppError::TokenSigning { .. } => Status::InternalServerError,
            AppError::Io { .. } => Status::InternalServerError,
            AppError::ValidationError(_) => Status::BadRequest,
            AppError::ConfigurationError { .. } => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        let method = req.method();
        let uri = req.uri();

        let request_id = req
            .local_cache(|| None::<crate::middleware::RequestId>)
            .as_ref()
            .map(|r| r.0.as_str())
            .unwrap_or("unknown");

        let user_id = req
            .local_cache(|| None::<crate::auth::CurrentUser>)
            .as_ref()
            .map(|u| u.id.to_string())
            .unwrap_or_else(|| "anonymous".to_string());

        error!(
            error = ?self,
            request_id = %request_id,
            user_id = %user_id,
            method = %method,
            uri = %uri,
            "request failed"
        );

        let status = Status::from(&self);
        let body = serde_json::json!({
            "error": true,
            "message": self.to_string(),
        })
        .to_string();

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_error_taxonomy() {
        assert_eq!(Status::from(&AppError::MissingToken), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::TokenExpired), Status::Forbidden);
        assert_eq!(Status::from(&AppError::InvalidToken), Status::Forbidden);
        assert_eq!(Status::from(&AppError::UserNotFound), Status::NotFound);
        assert_eq!(Status::from(&AppError::InvalidCredentials), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::UserAlreadyExists("a@x.com".into())), Status::Conflict);
        assert_eq!(Status::from(&AppError::NotFound("gone".into())), Status::NotFound);
        assert_eq!(Status::from(&AppError::BadRequest("bad".into())), Status::BadRequest);
    }

    #[test]
    fn row_not_found_folds_into_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(Status::from(&err), Status::NotFound);
    }

    #[test]
    fn conflict_message_does_not_leak_the_email() {
        let err = AppError::UserAlreadyExists("private@example.com".into());
        assert!(!err.to_string().contains("private@example.com"));
    }
}
