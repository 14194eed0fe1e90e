use crate::Config;
use crate::models::story::TravelStory;
use crate::models::trip::FutureTrip;
use crate::models::user::User;
use chrono::{TimeZone, Utc};
use uuid::Uuid;

/// Config for in-process tests: a fixed signing secret, a short database
/// acquire timeout (most tests never reach the database), quiet logs.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.auth.secret = "test-signing-secret".to_string();
    config.database.acquire_timeout = 1;
    config.logging.level = "error".to_string();
    config.uploads.dir = std::env::temp_dir().join("triply-test-uploads").to_string_lossy().into_owned();
    config
}

pub fn sample_user() -> User {
    User {
        id: Uuid::new_v4(),
        full_name: "Ada Wanderer".to_string(),
        email: "ada@example.com".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$f2ZcZnqFMJhqYxBB4Zu7gVXIzxDK0d0lSnWmqBzGQ1o".to_string(),
        created_at: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
    }
}

pub fn sample_story(user_id: Uuid) -> TravelStory {
    TravelStory {
        id: Uuid::new_v4(),
        user_id,
        title: "A week in Kyoto".to_string(),
        story: "Temples, tea houses and a very long walk.".to_string(),
        visited_locations: vec!["Kyoto".to_string(), "Nara".to_string()],
        image_url: "http://localhost:8000/uploads/kyoto.jpg".to_string(),
        visited_date: Utc.with_ymd_and_hms(2025, 4, 10, 0, 0, 0).unwrap(),
        is_favourite: false,
        created_at: Utc.with_ymd_and_hms(2025, 4, 20, 9, 30, 0).unwrap(),
    }
}

pub fn sample_trip(user_id: Uuid) -> FutureTrip {
    FutureTrip {
        id: Uuid::new_v4(),
        user_id,
        title: "Northern lights".to_string(),
        destination: "Tromsø".to_string(),
        start_date: Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap(),
        end_date: Utc.with_ymd_and_hms(2026, 1, 22, 0, 0, 0).unwrap(),
        description: None,
        budget: None,
        accommodation: None,
        activities: vec!["aurora hunting".to_string()],
        created_at: Utc.with_ymd_and_hms(2025, 7, 1, 18, 0, 0).unwrap(),
    }
}
