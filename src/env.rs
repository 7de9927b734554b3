use std::env as stdenv;
use std::path::Path;

use dotenvy::dotenv;
use log::{debug, info};

/// Load `.env` from the working directory into the process environment.
/// Variables already set win over the file.
pub fn load_env_file() {
    let current_dir = stdenv::current_dir().unwrap_or_else(|_| Path::new(".").to_path_buf());
    let env_path = current_dir.join(".env");

    match dotenv() {
        Ok(_) => info!(".env loading at: {}", env_path.display()),
        // optional: config and the process environment are enough
        Err(_) => debug!(".env file not found at: {}", env_path.display()),
    }
}

pub fn load_env_var(key: &str, default: &str) -> String {
    stdenv::var(key).unwrap_or_else(|_| default.to_string())
}

/// `None` when the variable is unset or empty.
pub fn env_var_opt(key: &str) -> Option<String> {
    stdenv::var(key).ok().filter(|v| !v.is_empty())
}
