use crate::auth::AuthFailure;
use rocket::serde::json::Json;
use rocket::{Request, catch};
use serde::Serialize;

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub message: String,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            error: true,
            message: message.into(),
        })
    }
}

/// The token gate records how verification failed; surface that cause so
/// clients can tell "log in again" apart from "this token is garbage".
fn auth_failure_message(req: &Request, fallback: &str) -> String {
    (*req.local_cache(|| None::<AuthFailure>))
        .map(AuthFailure::message)
        .unwrap_or(fallback)
        .to_string()
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<ErrorBody> {
    ErrorBody::new("Bad request")
}

#[catch(401)]
pub fn unauthorized(req: &Request) -> Json<ErrorBody> {
    ErrorBody::new(auth_failure_message(req, "Unauthorized"))
}

#[catch(403)]
pub fn forbidden(req: &Request) -> Json<ErrorBody> {
    ErrorBody::new(auth_failure_message(req, "Forbidden"))
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorBody> {
    ErrorBody::new("Not found")
}

#[catch(409)]
pub fn conflict(_: &Request) -> Json<ErrorBody> {
    ErrorBody::new("Conflict")
}

#[catch(422)]
pub fn unprocessable(_: &Request) -> Json<ErrorBody> {
    ErrorBody::new("Bad request")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorBody> {
    ErrorBody::new("Internal server error")
}
