//! Subcommand implementations.

pub mod migrate;
pub mod promo;
pub mod seed;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;

const DATABASE_URL_VAR: &str = "AMORK_DATABASE_URL";
const DATABASE_URL_FALLBACK: &str = "DATABASE_URL";

/// Read the database URL from the environment.
///
/// Returns the name of the primary variable when neither is set.
pub fn database_url() -> Result<SecretString, &'static str> {
    dotenvy::dotenv().ok();

    [DATABASE_URL_VAR, DATABASE_URL_FALLBACK]
        .into_iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
        .map(SecretString::from)
        .ok_or(DATABASE_URL_VAR)
}

/// Connect with a small single-purpose pool.
pub async fn connect(url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(url.expose_secret()).await
}
