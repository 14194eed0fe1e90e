use rocket::{Build, Rocket};
use triply_api::{Config, build_rocket};

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    dotenvy::dotenv().ok();

    let config = Config::load().expect("Failed to load configuration");
    build_rocket(config)
}
