//! Renders the probe outcome as the user-facing report lines.

use pgprobe_common::config::DatabaseConfig;
use pgprobe_common::error::ProbeError;
use std::io::{self, Write};

pub const CONNECTED: &str = "✅ Database connection successful!";
pub const VERSION_PREFIX: &str = "✅ PostgreSQL version: ";
pub const FAILURE_PREFIX: &str = "❌ Connection failed: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Reachable { version: String },
    Failed,
}

/// Print the failure line for an error that happened before or during the probe.
pub fn failure(out: &mut impl Write, err: &ProbeError) -> io::Result<Outcome> {
    tracing::debug!(stage = err.stage(), "Probe failed: {err:?}");
    writeln!(out, "{FAILURE_PREFIX}{err}")?;
    out.flush()?;
    Ok(Outcome::Failed)
}

/// Probe the database and write the report to `out`.
///
/// Probe failures become a single failure line; only errors writing to `out`
/// itself are returned.
pub async fn run(config: &DatabaseConfig, out: &mut impl Write) -> io::Result<Outcome> {
    run_query(config, pgprobe_db::VERSION_QUERY, out).await
}

async fn run_query(
    config: &DatabaseConfig,
    query: &str,
    out: &mut impl Write,
) -> io::Result<Outcome> {
    let result = pgprobe_db::probe_with_query(config, query, || {
        writeln!(out, "{CONNECTED}")?;
        out.flush()?;
        Ok(())
    })
    .await;

    match result {
        Ok(version) => {
            writeln!(out, "{VERSION_PREFIX}{version}")?;
            out.flush()?;
            Ok(Outcome::Reachable { version })
        }
        Err(ProbeError::Output(e)) => Err(e),
        Err(e) => failure(out, &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            url: None,
            host: "127.0.0.1".into(),
            port: 1,
            name: "dentist_db".into(),
            user: "postgres".into(),
            password: "postgres".into(),
        }
    }

    fn lines(buf: &[u8]) -> Vec<String> {
        String::from_utf8(buf.to_vec())
            .expect("utf-8 report")
            .lines()
            .map(str::to_owned)
            .collect()
    }

    #[tokio::test]
    async fn test_unreachable_server_prints_one_failure_line() {
        let mut buf = Vec::new();
        let outcome = run(&unreachable_config(), &mut buf).await.expect("report");
        assert_eq!(outcome, Outcome::Failed);

        let lines = lines(&buf);
        assert_eq!(lines.len(), 1);
        let reason = lines[0]
            .strip_prefix(FAILURE_PREFIX)
            .expect("failure prefix");
        assert!(!reason.trim().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported_not_raised() {
        let config = DatabaseConfig {
            url: Some("not a url".into()),
            ..unreachable_config()
        };
        let mut buf = Vec::new();
        let outcome = run(&config, &mut buf).await.expect("report");
        assert_eq!(outcome, Outcome::Failed);
        let lines = lines(&buf);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(FAILURE_PREFIX));
    }

    #[test]
    fn test_failure_line_carries_error_text() {
        let mut buf = Vec::new();
        let err = ProbeError::Query(sqlx::Error::RowNotFound);
        failure(&mut buf, &err).expect("write");
        assert_eq!(
            lines(&buf),
            vec![format!("{FAILURE_PREFIX}{}", sqlx::Error::RowNotFound)]
        );
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL server at PGPROBE_TEST_URL"]
    async fn test_query_failure_after_connect_prints_both_lines() {
        let config = DatabaseConfig {
            url: Some(std::env::var("PGPROBE_TEST_URL").expect("PGPROBE_TEST_URL")),
            ..unreachable_config()
        };
        let mut buf = Vec::new();
        let outcome = run_query(&config, "SELECT version()::int::text", &mut buf)
            .await
            .expect("report");
        assert_eq!(outcome, Outcome::Failed);

        let lines = lines(&buf);
        assert_eq!(lines.len(), 2, "unexpected report: {lines:?}");
        assert_eq!(lines[0], CONNECTED);
        let reason = lines[1].strip_prefix(FAILURE_PREFIX).expect("failure prefix");
        assert!(!reason.trim().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL server at PGPROBE_TEST_URL"]
    async fn test_live_server_prints_two_lines() {
        let config = DatabaseConfig {
            url: Some(std::env::var("PGPROBE_TEST_URL").expect("PGPROBE_TEST_URL")),
            ..unreachable_config()
        };
        let mut buf = Vec::new();
        let outcome = run(&config, &mut buf).await.expect("report");
        assert!(matches!(outcome, Outcome::Reachable { .. }));

        let lines = lines(&buf);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], CONNECTED);
        let version = lines[1].strip_prefix(VERSION_PREFIX).expect("version prefix");
        assert!(!version.is_empty());
    }
}
