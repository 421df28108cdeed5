use std::path::PathBuf;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Log filter variable, checked before RUST_LOG
pub const LOG_ENV: &str = "TESTMAGIC_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
}

impl Config {
    /// Explicit values win, otherwise the defaults apply. Environment
    /// variables reach this through clap's `env` fallbacks.
    pub fn resolve(api_url: Option<String>, session_file: Option<PathBuf>) -> Self {
        Self {
            api_url: api_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            session_file: session_file.unwrap_or_else(default_session_path),
        }
    }
}

pub fn default_session_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("testmagic")
        .join("session.json")
}

/// Loads `.env` if present. Must run before clap reads its env fallbacks.
pub fn load_dotenv() {
    if let Err(e) = dotenvy::dotenv()
        && !e.not_found()
    {
        eprintln!("Warning: could not read .env file: {}", e);
    }
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
