pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod person_repo;
pub use person_repo::PersonRepository;
pub mod link_repo;
pub use link_repo::LinkRepository;

use sqlx::{migrate::MigrateError, SqlitePool};

/// Aplica as migrações embutidas de `migrations/`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!().run(pool).await
}
