use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TravelStory {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub story: String,
    pub visited_locations: Vec<String>,
    pub image_url: String,
    pub visited_date: DateTime<Utc>,
    pub is_favourite: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Story text is required"))]
    pub story: String,
    #[validate(custom(function = "validate_locations"))]
    pub visited_location: Vec<String>,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    pub visited_date: DateTime<Utc>,
}

/// Partial update: only provided fields are applied, each still subject to
/// the creation constraints.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StoryUpdateRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Story text must not be empty"))]
    pub story: Option<String>,
    #[validate(custom(function = "validate_locations"))]
    pub visited_location: Option<Vec<String>>,
    #[validate(length(min = 1, message = "Image URL must not be empty"))]
    pub image_url: Option<String>,
    pub visited_date: Option<DateTime<Utc>>,
    pub is_favourite: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteRequest {
    pub is_favourite: bool,
}

fn validate_locations(locations: &Vec<String>) -> Result<(), ValidationError> {
    if locations.is_empty() {
        let mut error = ValidationError::new("visited_location");
        error.message = Some("At least one visited location is required".into());
        return Err(error);
    }
    if locations.iter().any(|location| location.trim().is_empty()) {
        let mut error = ValidationError::new("visited_location");
        error.message = Some("Visited locations must not be empty".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryResponse {
    pub id: Uuid,
    pub title: String,
    pub story: String,
    pub visited_location: Vec<String>,
    pub image_url: String,
    pub visited_date: DateTime<Utc>,
    pub is_favourite: bool,
    pub created_on: DateTime<Utc>,
}

impl From<&TravelStory> for StoryResponse {
    fn from(story: &TravelStory) -> Self {
        Self {
            id: story.id,
            title: story.title.clone(),
            story: story.story.clone(),
            visited_location: story.visited_locations.clone(),
            image_url: story.image_url.clone(),
            visited_date: story.visited_date,
            is_favourite: story.is_favourite,
            created_on: story.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryEnvelope {
    pub error: bool,
    pub message: String,
    pub story: StoryResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoriesEnvelope {
    pub error: bool,
    pub message: String,
    pub stories: Vec<StoryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedEnvelope {
    pub error: bool,
    pub message: String,
    pub deleted_id: Uuid,
}
