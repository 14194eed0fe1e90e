use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::story::{StoryRequest, StoryUpdateRequest, TravelStory};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const STORY_COLUMNS: &str = "id, user_id, title, story, visited_locations, image_url, visited_date, is_favourite, created_at";

#[async_trait::async_trait]
pub trait StoryRepository {
    async fn create_story(&self, user_id: &Uuid, request: &StoryRequest) -> Result<TravelStory, AppError>;
    async fn list_stories(&self, user_id: &Uuid) -> Result<Vec<TravelStory>, AppError>;
    /// Ownership-scoped partial update: `None` when no record matches both
    /// the id and the caller, which is indistinguishable from "does not
    /// exist".
    async fn update_story(&self, id: &Uuid, user_id: &Uuid, request: &StoryUpdateRequest) -> Result<Option<TravelStory>, AppError>;
    async fn set_favourite(&self, id: &Uuid, user_id: &Uuid, is_favourite: bool) -> Result<Option<TravelStory>, AppError>;
    async fn delete_story(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Uuid>, AppError>;
    async fn search_stories(&self, user_id: &Uuid, query: &str) -> Result<Vec<TravelStory>, AppError>;
    async fn filter_stories_by_date(&self, user_id: &Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TravelStory>, AppError>;
}

#[async_trait::async_trait]
impl StoryRepository for PostgresRepository {
    async fn create_story(&self, user_id: &Uuid, request: &StoryRequest) -> Result<TravelStory, AppError> {
        let story = sqlx::query_as::<_, TravelStory>(&format!(
            r#"
            INSERT INTO travel_stories (user_id, title, story, visited_locations, image_url, visited_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&request.title)
        .bind(&request.story)
        .bind(&request.visited_location)
        .bind(&request.image_url)
        .bind(request.visited_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(story)
    }

    async fn list_stories(&self, user_id: &Uuid) -> Result<Vec<TravelStory>, AppError> {
        let stories = sqlx::query_as::<_, TravelStory>(&format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM travel_stories
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(stories)
    }

    async fn update_story(&self, id: &Uuid, user_id: &Uuid, request: &StoryUpdateRequest) -> Result<Option<TravelStory>, AppError> {
        let story = sqlx::query_as::<_, TravelStory>(&format!(
            r#"
            UPDATE travel_stories
            SET title = COALESCE($3, title),
                story = COALESCE($4, story),
                visited_locations = COALESCE($5, visited_locations),
                image_url = COALESCE($6, image_url),
                visited_date = COALESCE($7, visited_date),
                is_favourite = COALESCE($8, is_favourite)
            WHERE id = $1 AND user_id = $2
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&request.title)
        .bind(&request.story)
        .bind(&request.visited_location)
        .bind(&request.image_url)
        .bind(request.visited_date)
        .bind(request.is_favourite)
        .fetch_optional(&self.pool)
        .await?;

        Ok(story)
    }

    async fn set_favourite(&self, id: &Uuid, user_id: &Uuid, is_favourite: bool) -> Result<Option<TravelStory>, AppError> {
        let story = sqlx::query_as::<_, TravelStory>(&format!(
            r#"
            UPDATE travel_stories
            SET is_favourite = $3
            WHERE id = $1 AND user_id = $2
            RETURNING {STORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(is_favourite)
        .fetch_optional(&self.pool)
        .await?;

        Ok(story)
    }

    async fn delete_story(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Uuid>, AppError> {
        let deleted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            DELETE FROM travel_stories
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

    async fn search_stories(&self, user_id: &Uuid, query: &str) -> Result<Vec<TravelStory>, AppError> {
        let pattern = format!("%{}%", like_escape(query));

        let stories = sqlx::query_as::<_, TravelStory>(&format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM travel_stories
            WHERE user_id = $1
              AND (title ILIKE $2
                   OR story ILIKE $2
                   OR EXISTS (SELECT 1 FROM unnest(visited_locations) AS location WHERE location ILIKE $2))
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(stories)
    }

    async fn filter_stories_by_date(&self, user_id: &Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TravelStory>, AppError> {
        let stories = sqlx::query_as::<_, TravelStory>(&format!(
            r#"
            SELECT {STORY_COLUMNS}
            FROM travel_stories
            WHERE user_id = $1 AND visited_date >= $2 AND visited_date <= $3
            ORDER BY is_favourite DESC, visited_date DESC
            "#
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(stories)
    }
}

/// Escape LIKE metacharacters so user input always matches literally:
/// a `%` in a search query is a percent sign, not a wildcard.
pub(crate) fn like_escape(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn like_escape_leaves_plain_text_alone() {
        assert_eq!(like_escape("Paris"), "Paris");
    }

    #[test]
    fn like_escape_escapes_wildcards() {
        assert_eq!(like_escape("100%_done"), "100\\%\\_done");
        assert_eq!(like_escape("back\\slash"), "back\\\\slash");
    }

    proptest! {
        #[test]
        fn like_escape_never_leaves_a_bare_wildcard(query in ".*") {
            let escaped = like_escape(&query);
            let mut chars = escaped.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    // Consumes the escaped character, whatever it is.
                    prop_assert!(chars.next().is_some());
                } else {
                    prop_assert!(c != '%' && c != '_');
                }
            }
        }
    }
}
