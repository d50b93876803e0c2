use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the database connection pool.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Owned handle to the storage layer.
///
/// Constructed once at process start and passed by reference into the
/// repositories; closed at shutdown. There is no ambient global connection.
pub struct DbClient {
    conn: DbConn,
}

impl DbClient {
    /// Open the connection pool.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbErr> {
        tracing::info!("connecting to database...");

        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let conn = Database::connect(opts).await?;
        tracing::info!(pool = config.max_connections, "database connected");

        Ok(Self { conn })
    }

    /// Borrow the underlying connection (a cheap-to-clone pool handle).
    pub fn conn(&self) -> &DbConn {
        &self.conn
    }

    /// Close the pool. Call once at shutdown.
    pub async fn close(self) -> Result<(), DbErr> {
        tracing::info!("closing database connection");
        self.conn.close().await
    }
}
