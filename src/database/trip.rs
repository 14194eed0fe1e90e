use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::trip::{FutureTrip, TripRequest, TripUpdateRequest};
use uuid::Uuid;

const TRIP_COLUMNS: &str = "id, user_id, title, destination, start_date, end_date, description, budget, accommodation, activities, created_at";

#[async_trait::async_trait]
pub trait TripRepository {
    async fn create_trip(&self, user_id: &Uuid, request: &TripRequest) -> Result<FutureTrip, AppError>;
    /// Soonest trip first.
    async fn list_trips(&self, user_id: &Uuid) -> Result<Vec<FutureTrip>, AppError>;
    async fn update_trip(&self, id: &Uuid, user_id: &Uuid, request: &TripUpdateRequest) -> Result<Option<FutureTrip>, AppError>;
    async fn delete_trip(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Uuid>, AppError>;
}

#[async_trait::async_trait]
impl TripRepository for PostgresRepository {
    async fn create_trip(&self, user_id: &Uuid, request: &TripRequest) -> Result<FutureTrip, AppError> {
        let trip = sqlx::query_as::<_, FutureTrip>(&format!(
            r#"
            INSERT INTO future_trips (user_id, title, destination, start_date, end_date, description, budget, accommodation, activities)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.title)
        .bind(&request.destination)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.description)
        .bind(request.budget)
        .bind(&request.accommodation)
        .bind(&request.activities)
        .fetch_one(&self.pool)
        .await?;

        Ok(trip)
    }

    async fn list_trips(&self, user_id: &Uuid) -> Result<Vec<FutureTrip>, AppError> {
        let trips = sqlx::query_as::<_, FutureTrip>(&format!(
            r#"
            SELECT {TRIP_COLUMNS}
            FROM future_trips
            WHERE user_id = $1
            ORDER BY start_date ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(trips)
    }

    async fn update_trip(&self, id: &Uuid, user_id: &Uuid, request: &TripUpdateRequest) -> Result<Option<FutureTrip>, AppError> {
        let trip = sqlx::query_as::<_, FutureTrip>(&format!(
            r#"
            UPDATE future_trips
            SET title = COALESCE($3, title),
                destination = COALESCE($4, destination),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                description = COALESCE($7, description),
                budget = COALESCE($8, budget),
                accommodation = COALESCE($9, accommodation),
                activities = COALESCE($10, activities)
            WHERE id = $1 AND user_id = $2
            RETURNING {TRIP_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&request.title)
        .bind(&request.destination)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(&request.description)
        .bind(request.budget)
        .bind(&request.accommodation)
        .bind(&request.activities)
        .fetch_optional(&self.pool)
        .await?;

        Ok(trip)
    }

    async fn delete_trip(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Uuid>, AppError> {
        let deleted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            DELETE FROM future_trips
            WHERE id = $1 AND user_id = $2
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(deleted.map(|(id,)| id))
    }
}
