use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    /// Bounds the time until response headers are sent. Streamed bodies may
    /// run longer.
    pub request_timeout: Duration,
    pub static_dir: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub serialize_turns: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db_path: "./db/app.db".into(),
            cors_allow: vec!["*".into()],
            request_timeout: Duration::from_millis(120_000),
            static_dir: "dist".into(),
            openai_api_key: None,
            openai_base_url: None,
            serialize_turns: true,
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match non_empty_var("PD_LISTEN_ADDR") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("Invalid PD_LISTEN_ADDR '{}'", addr))?,
            None => defaults.listen_addr,
        };
        let db_path = non_empty_var("PD_DB_PATH").unwrap_or(defaults.db_path);
        let cors_allow = std::env::var("PD_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout = non_empty_var("PD_REQUEST_TIMEOUT_MS")
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.request_timeout);
        let static_dir = non_empty_var("PD_STATIC_DIR").unwrap_or(defaults.static_dir);
        let serialize_turns = non_empty_var("PD_SERIALIZE_TURNS")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(defaults.serialize_turns);

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout,
            static_dir,
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_base_url: non_empty_var("PD_OPENAI_BASE_URL"),
            serialize_turns,
        })
    }
}
