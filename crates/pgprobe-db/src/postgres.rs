//! PostgreSQL connection helpers.

use pgprobe_common::config::DatabaseConfig;
use pgprobe_common::error::{ProbeError, ProbeResult};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection as _;

/// The read-only statement used to check that the server answers queries.
pub const VERSION_QUERY: &str = "SELECT version()";

/// Build connect options from either the URL or the discrete fields.
pub fn connect_options(config: &DatabaseConfig) -> ProbeResult<PgConnectOptions> {
    match &config.url {
        Some(url) => url.parse().map_err(ProbeError::InvalidUrl),
        None => Ok(PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password)),
    }
}

/// A single open session with the server.
pub struct Connection {
    inner: PgConnection,
}

impl Connection {
    /// Open one connection using the configured coordinates.
    pub async fn open(config: &DatabaseConfig) -> ProbeResult<Self> {
        let options = connect_options(config)?;
        tracing::debug!(
            host = %options.get_host(),
            port = options.get_port(),
            database = options.get_database().unwrap_or_default(),
            user = %options.get_username(),
            "Connecting to PostgreSQL..."
        );

        let inner = PgConnection::connect_with(&options)
            .await
            .map_err(ProbeError::Connect)?;
        tracing::debug!("Connected to PostgreSQL");

        Ok(Self { inner })
    }

    /// Run the diagnostic query and return the server's version string.
    pub async fn server_version(&mut self) -> ProbeResult<String> {
        self.fetch_text(VERSION_QUERY).await
    }

    /// Run a single-row, single-column text query.
    pub async fn fetch_text(&mut self, sql: &str) -> ProbeResult<String> {
        sqlx::query_scalar::<_, String>(sql)
            .fetch_one(&mut self.inner)
            .await
            .map_err(ProbeError::Query)
    }

    /// Terminate the session. Close failures are logged, not reported.
    pub async fn close(self) {
        if let Err(e) = self.inner.close().await {
            tracing::warn!("Failed to close PostgreSQL connection cleanly: {e}");
        }
    }
}

/// Connect, report the open connection through `on_connected`, fetch the
/// server version and close.
///
/// Once the connection is open it is closed on every path, including when
/// `on_connected` or the query fails.
pub async fn probe<F>(config: &DatabaseConfig, on_connected: F) -> ProbeResult<String>
where
    F: FnOnce() -> ProbeResult<()>,
{
    probe_with_query(config, VERSION_QUERY, on_connected).await
}

/// Same sequence as [`probe`], running `query` instead of `SELECT version()`.
pub async fn probe_with_query<F>(
    config: &DatabaseConfig,
    query: &str,
    on_connected: F,
) -> ProbeResult<String>
where
    F: FnOnce() -> ProbeResult<()>,
{
    let mut conn = Connection::open(config).await?;

    let result = match on_connected() {
        Ok(()) => conn.fetch_text(query).await,
        Err(e) => Err(e),
    };

    conn.close().await;
    result
}
