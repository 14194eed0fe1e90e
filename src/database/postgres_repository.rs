use sqlx::PgPool;

/// Storage adapter over the shared connection pool. Constructed per
/// request by the route handlers; all durable state lives behind it.
#[derive(Clone)]
pub struct PostgresRepository {
    pub pool: PgPool,
}
