use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, DbErr, Schema,
};
use tracing::info;

use crate::config::AppConfig;

pub mod entities;
pub mod error;
pub mod task_repo;

pub use error::{StoreError, StoreResult};

const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

pub async fn connect(cfg: &AppConfig) -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(cfg.database_url.clone());
    options
        .max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    if db.get_database_backend() == DatabaseBackend::Sqlite {
        db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
        db.execute_unprepared(&format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS}"))
            .await?;
    }

    info!("creating database schema from entities");
    setup_schema(&db).await?;
    Ok(db)
}

/// Creates the `tasks` and `dones` tables from the entity definitions,
/// including the cascading primary-key foreign key on `dones`.
pub async fn setup_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut tasks = schema.create_table_from_entity(entities::prelude::Task);
    tasks.if_not_exists();
    db.execute(backend.build(&tasks)).await?;

    let mut dones = schema.create_table_from_entity(entities::prelude::Done);
    dones.if_not_exists();
    db.execute(backend.build(&dones)).await?;

    Ok(())
}
