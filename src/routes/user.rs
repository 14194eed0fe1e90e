use crate::Config;
use crate::auth::{CurrentUser, issue_token};
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::user::{AuthResponse, CreateAccountRequest, LoginRequest, ProfileResponse, UserResponse};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, routes};
use sqlx::PgPool;
use validator::Validate;

#[rocket::post("/create-account", data = "<payload>")]
pub async fn create_account(
    pool: &State<PgPool>,
    config: &State<Config>,
    payload: JsonBody<CreateAccountRequest>,
) -> Result<(Status, Json<AuthResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    if repo.get_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::UserAlreadyExists(payload.email.clone()));
    }

    let user = repo.create_user(&payload.full_name, &payload.email, &payload.password).await?;
    let access_token = issue_token(&user.id, &config.auth)?;

    Ok((
        Status::Created,
        Json(AuthResponse {
            error: false,
            message: "Signup successful".to_string(),
            user: UserResponse::from(&user),
            access_token,
        }),
    ))
}

#[rocket::post("/login", data = "<payload>")]
pub async fn login(pool: &State<PgPool>, config: &State<Config>, payload: JsonBody<LoginRequest>) -> Result<Json<AuthResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let user = match repo.get_user_by_email(&payload.email).await? {
        Some(user) => user,
        None => {
            // Keep response latency flat for unknown emails.
            PostgresRepository::dummy_verify(&payload.password);
            return Err(AppError::UserNotFound);
        }
    };

    repo.verify_password(&user, &payload.password).await?;
    let access_token = issue_token(&user.id, &config.auth)?;

    Ok(Json(AuthResponse {
        error: false,
        message: "Login successful".to_string(),
        user: UserResponse::from(&user),
        access_token,
    }))
}

#[rocket::get("/get-user")]
pub async fn get_user(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<ProfileResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let user = repo.get_user_by_id(&current_user.id).await?.ok_or(AppError::UserNotFound)?;

    Ok(Json(ProfileResponse {
        error: false,
        message: "User fetched successfully".to_string(),
        user: UserResponse::from(&user),
    }))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![create_account, login, get_user]
}
