//! Database connection and initialization.

use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr, Statement,
};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;

pub mod migrations;

pub use migrations::Migrator;

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Connect and apply pending migrations.
    pub async fn connect(config: &Config) -> Result<Self, DbErr> {
        let database = Self::connect_without_migrations(config).await?;
        database.run_migrations().await?;

        tracing::info!("Database connected and migrations applied");

        Ok(database)
    }

    /// Connect without running migrations (for CLI commands).
    pub async fn connect_without_migrations(config: &Config) -> Result<Self, DbErr> {
        Self::connect_url(&config.database_url).await
    }

    /// Connect to an explicit URL.
    ///
    /// In-memory SQLite databases live as long as their connection, so the
    /// pool is pinned to a single connection for them.
    pub async fn connect_url(url: &str) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(url.to_string());
        options
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        if url.starts_with("sqlite") && url.contains(":memory:") {
            options.max_connections(1).min_connections(1);
        }

        let connection = SeaDatabase::connect(options).await?;
        Ok(Self { connection })
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Run pending migrations.
    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Rollback the last migration.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Get migration status (list all migrations with applied status).
    pub async fn migration_status(&self) -> Result<Vec<(String, bool)>, DbErr> {
        use sea_orm::{EntityTrait, QueryOrder};
        use sea_orm_migration::{seaql_migrations, SchemaManager};

        // The bookkeeping table does not exist before the first `up`
        let mut applied = std::collections::HashSet::new();
        if SchemaManager::new(&self.connection)
            .has_table("seaql_migrations")
            .await?
        {
            applied.extend(
                seaql_migrations::Entity::find()
                    .order_by_asc(seaql_migrations::Column::Version)
                    .all(&self.connection)
                    .await?
                    .into_iter()
                    .map(|m| m.version),
            );
        }

        let migrations: Vec<(String, bool)> = Migrator::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                let is_applied = applied.contains(&name);
                (name, is_applied)
            })
            .collect();

        Ok(migrations)
    }

    /// Reset database and run all migrations fresh.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.connection).await
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_on_sqlite_memory() {
        let db = Database::connect_url("sqlite::memory:").await.unwrap();
        let before = db.migration_status().await.unwrap();
        assert!(before.iter().all(|(_, applied)| !applied));

        db.run_migrations().await.unwrap();
        db.ping().await.unwrap();

        let after = db.migration_status().await.unwrap();
        assert_eq!(after.len(), 1);
        assert!(after.iter().all(|(_, applied)| *applied));

        db.rollback_migration().await.unwrap();
        let rolled_back = db.migration_status().await.unwrap();
        assert!(rolled_back.iter().all(|(_, applied)| !applied));
    }

    #[tokio::test]
    async fn test_migration_status_reports_unreadable_history() {
        let db = Database::connect_url("sqlite::memory:").await.unwrap();
        db.get_connection()
            .execute_unprepared("CREATE TABLE seaql_migrations (name TEXT)")
            .await
            .unwrap();

        assert!(db.migration_status().await.is_err());
    }
}
