use crate::Config;
use crate::config::AuthConfig;
use crate::error::app_error::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in every access token issued by the server.
///
/// The token is self-contained: signature and expiry are everything that
/// determines validity at verification time, so no session state is kept
/// server-side.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id of the token holder.
    pub sub: Uuid,
    /// Issued-at (Unix timestamp, seconds).
    pub iat: i64,
    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,
}

/// The authenticated caller, extracted from a verified bearer token.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Which way bearer verification failed. Cached on the request so the
/// 401/403 catchers can emit a cause-specific message: clients redirect
/// to login on an expired token but surface invalid ones differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    Missing,
    Expired,
    Invalid,
}

impl AuthFailure {
    pub fn status(self) -> Status {
        match self {
            AuthFailure::Missing => Status::Unauthorized,
            AuthFailure::Expired | AuthFailure::Invalid => Status::Forbidden,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AuthFailure::Missing => "Access token missing",
            AuthFailure::Expired => "Token expired",
            AuthFailure::Invalid => "Invalid token",
        }
    }
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        match failure {
            AuthFailure::Missing => AppError::MissingToken,
            AuthFailure::Expired => AppError::TokenExpired,
            AuthFailure::Invalid => AppError::InvalidToken,
        }
    }
}

pub(crate) fn parse_bearer(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

/// Sign a fresh access token for `user_id`, valid for the configured TTL.
pub fn issue_token(user_id: &Uuid, auth: &AuthConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: *user_id,
        iat: now.timestamp(),
        exp: (now + Duration::hours(auth.token_ttl_hours)).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::token_signing("Failed to sign access token", e))
}

/// Verify signature and expiry against the server secret.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AuthFailure> {
    let mut validation = Validation::new(Algorithm::HS256);
    // A token issued at T is accepted up to T+TTL and rejected strictly after.
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthFailure::Expired,
            _ => AuthFailure::Invalid,
        })
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let config = match req.rocket().state::<Config>() {
            Some(config) => config,
            None => return Outcome::Error((Status::InternalServerError, AppError::InvalidToken)),
        };

        let failure = match req.headers().get_one("Authorization").and_then(parse_bearer) {
            Some(token) => match decode_token(token, &config.auth.secret) {
                Ok(claims) => {
                    let current_user = CurrentUser { id: claims.sub };
                    req.local_cache(|| Some(current_user.clone()));
                    return Outcome::Success(current_user);
                }
                Err(failure) => failure,
            },
            None => AuthFailure::Missing,
        };

        req.local_cache(|| Some(failure));
        Outcome::Error((failure.status(), failure.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            secret: "unit-test-secret".to_string(),
            token_ttl_hours: 72,
        }
    }

    #[test]
    fn parse_bearer_valid() {
        assert_eq!(parse_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
    }

    #[test]
    fn parse_bearer_wrong_scheme() {
        assert_eq!(parse_bearer("Basic abc"), None);
    }

    #[test]
    fn parse_bearer_empty_token() {
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("Bearer    "), None);
    }

    #[test]
    fn issued_token_round_trips() {
        let config = auth_config();
        let user_id = Uuid::new_v4();

        let token = issue_token(&user_id, &config).expect("token should sign");
        let claims = decode_token(&token, &config.secret).expect("token should verify");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.exp - claims.iat, 72 * 3600);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        let config = auth_config();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 73 * 3600,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(decode_token(&token, &config.secret), Err(AuthFailure::Expired));
    }

    #[test]
    fn expiry_has_no_leeway() {
        let config = auth_config();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 3600,
            exp: now - 2,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        // Two seconds past expiry is already "expired", not within a grace window.
        assert_eq!(decode_token(&token, &config.secret), Err(AuthFailure::Expired));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let config = auth_config();
        let token = issue_token(&Uuid::new_v4(), &config).unwrap();

        assert_eq!(decode_token(&token, "a-different-secret"), Err(AuthFailure::Invalid));
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert_eq!(decode_token("not-a-jwt", "secret"), Err(AuthFailure::Invalid));
    }

    #[test]
    fn failure_statuses_match_taxonomy() {
        assert_eq!(AuthFailure::Missing.status(), Status::Unauthorized);
        assert_eq!(AuthFailure::Expired.status(), Status::Forbidden);
        assert_eq!(AuthFailure::Invalid.status(), Status::Forbidden);
    }
}
