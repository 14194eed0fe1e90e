use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::story::StoryRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::story::{DeletedEnvelope, FavouriteRequest, StoriesEnvelope, StoryEnvelope, StoryRequest, StoryResponse, StoryUpdateRequest};
use chrono::{DateTime, Utc};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{FromForm, State, routes};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const STORY_NOT_FOUND: &str = "Travel story not found or not authorized";

#[rocket::post("/add-travel-story", data = "<payload>")]
pub async fn add_travel_story(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: JsonBody<StoryRequest>,
) -> Result<(Status, Json<StoryEnvelope>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let story = repo.create_story(&current_user.id, &payload).await?;

    Ok((
        Status::Created,
        Json(StoryEnvelope {
            error: false,
            message: "Travel story added successfully".to_string(),
            story: StoryResponse::from(&story),
        }),
    ))
}

#[rocket::get("/get-all-stories")]
pub async fn get_all_stories(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<StoriesEnvelope>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let stories = repo.list_stories(&current_user.id).await?;

    Ok(Json(StoriesEnvelope {
        error: false,
        message: "Fetched all travel stories successfully".to_string(),
        stories: stories.iter().map(StoryResponse::from).collect(),
    }))
}

#[rocket::put("/edit-travel-story/<id>", data = "<payload>")]
pub async fn edit_travel_story(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    id: &str,
    payload: JsonBody<StoryUpdateRequest>,
) -> Result<Json<StoryEnvelope>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid story id", e))?;
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let story = repo
        .update_story(&uuid, &current_user.id, &payload)
        .await?
        .ok_or_else(|| AppError::NotFound(STORY_NOT_FOUND.to_string()))?;

    Ok(Json(StoryEnvelope {
        error: false,
        message: "Travel story updated successfully".to_string(),
        story: StoryResponse::from(&story),
    }))
}

#[rocket::delete("/delete-travel-story/<id>")]
pub async fn delete_travel_story(pool: &State<PgPool>, current_user: CurrentUser, id: &str) -> Result<Json<DeletedEnvelope>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid story id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let deleted_id = repo
        .delete_story(&uuid, &current_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(STORY_NOT_FOUND.to_string()))?;

    Ok(Json(DeletedEnvelope {
        error: false,
        message: "Travel story deleted successfully".to_string(),
        deleted_id,
    }))
}

#[rocket::put("/update-favourite/<id>", data = "<payload>")]
pub async fn update_favourite(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    id: &str,
    payload: JsonBody<FavouriteRequest>,
) -> Result<Json<StoryEnvelope>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid story id", e))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let story = repo
        .set_favourite(&uuid, &current_user.id, payload.is_favourite)
        .await?
        .ok_or_else(|| AppError::NotFound(STORY_NOT_FOUND.to_string()))?;

    Ok(Json(StoryEnvelope {
        error: false,
        message: "isFavourite updated successfully".to_string(),
        story: StoryResponse::from(&story),
    }))
}

#[rocket::get("/search/filter?<query>")]
pub async fn search_stories(pool: &State<PgPool>, current_user: CurrentUser, query: Option<&str>) -> Result<Json<StoriesEnvelope>, AppError> {
    let query = query.map(str::trim).filter(|q| !q.is_empty());
    let query = query.ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let stories = repo.search_stories(&current_user.id, query).await?;

    let noun = if stories.len() == 1 { "story" } else { "stories" };
    let message = format!("Found {} {} matching \"{}\"", stories.len(), noun, query);

    Ok(Json(StoriesEnvelope {
        error: false,
        message,
        stories: stories.iter().map(StoryResponse::from).collect(),
    }))
}

#[derive(FromForm)]
pub struct DateRangeParams<'r> {
    #[field(name = "startDate")]
    pub start_date: Option<&'r str>,
    #[field(name = "endDate")]
    pub end_date: Option<&'r str>,
}

#[rocket::get("/travel-stories/filter?<range..>")]
pub async fn filter_stories_by_date(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    range: DateRangeParams<'_>,
) -> Result<Json<StoriesEnvelope>, AppError> {
    let start = parse_epoch_millis(range.start_date, "startDate")?;
    let end = parse_epoch_millis(range.end_date, "endDate")?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let stories = repo.filter_stories_by_date(&current_user.id, start, end).await?;

    Ok(Json(StoriesEnvelope {
        error: false,
        message: "Fetched filtered travel stories successfully".to_string(),
        stories: stories.iter().map(StoryResponse::from).collect(),
    }))
}

/// Date-range bounds come in as epoch milliseconds, matching the client's
/// date picker output.
fn parse_epoch_millis(value: Option<&str>, name: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{name} is required")))?;
    let millis: i64 = raw
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{name} must be a millisecond timestamp")))?;

    DateTime::from_timestamp_millis(millis).ok_or_else(|| AppError::BadRequest(format!("{name} is out of range")))
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        add_travel_story,
        get_all_stories,
        edit_travel_story,
        delete_travel_story,
        update_favourite,
        search_stories,
        filter_stories_by_date
    ]
}
