// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::Config;

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "shows-server/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("store.seed", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    use types::{HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig, StoreConfig};

    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            access_log: false,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        },
        performance: PerformanceConfig {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        },
        http: HttpConfig {
            server_name: "shows-server/test".to_string(),
            max_body_size: 1024,
        },
        store: StoreConfig {
            seed: true,
            seed_file: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("/nonexistent/shows-config").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert!(cfg.server.workers.is_none());
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.http.max_body_size, 1_048_576);
        assert!(cfg.store.seed);
        assert!(cfg.store.seed_file.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("shows_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9090\n\n[store]\nseed = false\nseed_file = \"seed.json\"\n",
        )
        .unwrap();

        let cfg = Config::load_from(dir.join("config").to_str().unwrap()).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(cfg.server.port, 9090);
        assert!(!cfg.store.seed);
        assert_eq!(cfg.store.seed_file.as_deref(), Some("seed.json"));
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = test_config();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }

    #[test]
    fn test_debug_level() {
        let mut cfg = test_config();
        assert!(!cfg.logging.is_debug());
        cfg.logging.level = "DEBUG".to_string();
        assert!(cfg.logging.is_debug());
    }
}
