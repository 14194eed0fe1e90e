mod auth;
mod config;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use rocket::fs::FileServer;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG environment variable can be used for fine-grained control per module:
    // Examples:
    //   RUST_LOG=debug                    - Set all to debug
    //   RUST_LOG=triply_api=debug         - Set this crate to debug
    //   RUST_LOG=info,triply_api::routes=debug - Global info, routes at debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // try_init: a second Rocket instance in the same process keeps the
    // subscriber that is already installed.
    let result = if json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };
    let _ = result;
}

fn ensure_token_secret(auth_config: &config::AuthConfig) {
    if auth_config.secret.trim().is_empty() {
        panic!(
            "auth.secret is required to sign access tokens. \
            Set ACCESS_TOKEN_SECRET (or TRIPLY_AUTH_SECRET); generate one with: openssl rand -base64 32"
        );
    }
}

fn build_cors(cors_config: &config::CorsConfig) -> CorsOptions {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    // Validate that wildcard origins are not combined with credentials
    if is_wildcard && cors_config.allow_credentials {
        panic!(
            "Invalid CORS configuration: Cannot use wildcard origins (*) with credentials enabled. \
            Either set specific origins or disable credentials."
        );
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Put, Method::Delete, Method::Options, Method::Head]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Authorization", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    }
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);
    ensure_token_secret(&config.auth);

    let cors = build_cors(&config.cors).to_cors().expect("Failed to create CORS fairing");

    // The uploads directory doubles as a static mount point; it has to
    // exist before FileServer validates it.
    if let Err(e) = std::fs::create_dir_all(&config.uploads.dir) {
        tracing::warn!(error = %e, dir = %config.uploads.dir, "Could not create uploads directory");
    }

    let figment = rocket::Config::figment()
        .merge(("port", config.server.port))
        .merge(("address", config.server.address.clone()));

    rocket::custom(figment)
        .attach(cors)
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()))
        .mount("/", app_routes::user::routes())
        .mount("/", app_routes::story::routes())
        .mount("/", app_routes::trip::routes())
        .mount("/", app_routes::upload::routes())
        .mount("/health", app_routes::health::routes())
        .mount("/uploads", FileServer::from(config.uploads.dir.clone()))
        .register(
            "/",
            catchers![
                app_routes::error::bad_request,
                app_routes::error::unauthorized,
                app_routes::error::forbidden,
                app_routes::error::not_found,
                app_routes::error::conflict,
                app_routes::error::unprocessable,
                app_routes::error::internal_error,
            ],
        )
        .manage(config)
}
