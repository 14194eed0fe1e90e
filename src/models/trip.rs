use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FutureTrip {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub destination: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub accommodation: Option<String>,
    pub activities: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Destination is required"))]
    pub destination: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub accommodation: Option<String>,
    #[serde(default)]
    pub activities: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TripUpdateRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Destination must not be empty"))]
    pub destination: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    pub accommodation: Option<String>,
    pub activities: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripResponse {
    pub id: Uuid,
    pub title: String,
    pub destination: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
    pub activities: Vec<String>,
    pub created_on: DateTime<Utc>,
}

impl From<&FutureTrip> for TripResponse {
    fn from(trip: &FutureTrip) -> Self {
        Self {
            id: trip.id,
            title: trip.title.clone(),
            destination: trip.destination.clone(),
            start_date: trip.start_date,
            end_date: trip.end_date,
            description: trip.description.clone(),
            budget: trip.budget,
            accommodation: trip.accommodation.clone(),
            activities: trip.activities.clone(),
            created_on: trip.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripEnvelope {
    pub error: bool,
    pub message: String,
    pub trip: TripResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripsEnvelope {
    pub error: bool,
    pub message: String,
    pub trips: Vec<TripResponse>,
}
