use std::env;
use std::path::PathBuf;

use authrs::environment::required_var;

use crate::error::Result;

/// Process-level settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Uploaded images live here, served under `/media`.
    pub media_root: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        dotenv::dotenv().ok();

        let media_root = env::var("MEDIA_ROOT").unwrap_or_else(|_| {
            tracing::info!("MEDIA_ROOT not set, using default: media");
            "media".to_string()
        });

        Ok(Config {
            database_url: required_var("DATABASE_URL")?,
            media_root: PathBuf::from(media_root),
        })
    }
}
