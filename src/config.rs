use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Socket address the HTTP server binds to.
    /// Env: `BIND_ADDR`, default `0.0.0.0:3000`.
    pub bind_addr: SocketAddr,

    /// Log filter passed to tracing-subscriber.
    /// Env: `RUST_LOG`, default `debug`.
    pub rust_log: String,

    /// Where to write the JSON state snapshot on shutdown (and restore it
    /// from on startup). Env: `SNAPSHOT_PATH`, unset disables snapshots.
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // A .env file is optional; real environment variables win.
        dotenvy::dotenv().ok();

        let bind_addr = match env::var("BIND_ADDR") {
            Ok(addr) => addr.parse()?,
            Err(_) => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };
        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "debug".into());
        let snapshot_path = env::var("SNAPSHOT_PATH").ok().map(PathBuf::from);

        Ok(Self {
            bind_addr,
            rust_log,
            snapshot_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_env().unwrap();
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(!config.rust_log.is_empty());
    }
}
