use std::{net::SocketAddr, path::PathBuf, time::Duration};

const DEFAULT_DB_PATH: &str = "./data/stashbook.db";
const DEFAULT_TIMEOUT_MS: u64 = 30000;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    /// Directory holding the flat documents left by pre-versioned releases.
    pub legacy_dir: PathBuf,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("STASHBOOK_LISTEN_ADDR")
            .ok()
            .and_then(|raw| {
                raw.parse()
                    .map_err(|e| {
                        tracing::warn!("Ignoring invalid STASHBOOK_LISTEN_ADDR '{}': {}", raw, e)
                    })
                    .ok()
            })
            .unwrap_or_else(default_listen_addr);
        let db_path =
            std::env::var("STASHBOOK_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.into());
        let legacy_dir = std::env::var("STASHBOOK_LEGACY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| database_dir(&db_path));
        let cors_allow = std::env::var("STASHBOOK_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = std::env::var("STASHBOOK_REQUEST_TIMEOUT_MS")
            .ok()
            .and_then(|raw| {
                raw.parse()
                    .map_err(|e| {
                        tracing::warn!(
                            "Ignoring invalid STASHBOOK_REQUEST_TIMEOUT_MS '{}': {}",
                            raw,
                            e
                        )
                    })
                    .ok()
            })
            .unwrap_or(DEFAULT_TIMEOUT_MS);

        Self {
            listen_addr,
            db_path,
            legacy_dir,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8088))
}

fn database_dir(db_path: &str) -> PathBuf {
    std::path::Path::new(db_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_dir_defaults_to_database_directory() {
        assert_eq!(
            database_dir("/var/lib/stashbook/stashbook.db"),
            PathBuf::from("/var/lib/stashbook")
        );
        assert_eq!(database_dir("stashbook.db"), PathBuf::from("."));
    }

    #[test]
    fn default_listen_addr_matches_documented_value() {
        assert_eq!(default_listen_addr().to_string(), "127.0.0.1:8088");
    }
}
