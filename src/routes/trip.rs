use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::trip::TripRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::story::DeletedEnvelope;
use crate::models::trip::{TripEnvelope, TripRequest, TripResponse, TripUpdateRequest, TripsEnvelope};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, routes};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TRIP_NOT_FOUND: &str = "Future trip not found or not authorized";

#[rocket::get("/future-trips")]
pub async fn get_future_trips(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<TripsEnvelope>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let trips = repo.list_trips(&current_user.id).await?;

    Ok(Json(TripsEnvelope {
        error: false,
        message: "Fetched future trips successfully".to_string(),
        trips: trips.iter().map(TripResponse::from).collect(),
    }))
}

#[rocket::post("/future-trips", data = "<payload>")]
pub async fn add_future_trip(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: JsonBody<TripRequest>,
) -> Result<(Status, Json<TripEnvelope>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let trip = repo.create_trip(&current_user.id, &payload).await?;

    Ok((
        Status::Created,
        Json(TripEnvelope {
            error: false,
            message: "Future trip added successfully".to_string(),
            trip: TripResponse::from(&trip),
        }),
    ))
}

#[rocket::put("/future-trips/<id>", data = "<payload>")]
pub async fn edit_future_trip(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    id: &str,
    payload: JsonBody<TripUpdateRequest>,
) -> Result<Json<TripEnvelope>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid trip id", e))?;
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let trip = repo
        .update_trip(&uuid, &current_user.id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound(TRIP_NOT_FOUND.to_string()))?;

    Ok(Json(TripEnvelope {
        error: false,
        message: "Future trip updated successfully".to_string(),
        trip: TripResponse::from(&trip),
    }))
}

#[rocket::delete("/future-trips/<id>")]
pub async fn delete_future_trip(pool: &State<PgPool>, current_user: CurrentUser, id: &str) -> Result<Json<DeletedEnvelope>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid trip id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let deleted_id = repo
        .delete_trip(&uuid, &current_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(TRIP_NOT_FOUND.to_string()))?;

    Ok(Json(DeletedEnvelope {
        error: false,
        message: "Future trip deleted successfully".to_string(),
        deleted_id,
    }))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![get_future_trips, add_future_trip, edit_future_trip, delete_future_trip]
}
