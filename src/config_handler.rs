use serde::{Deserialize, Serialize};
use std::fs;

/// Write credentials for the remote store. Injected via config file or
/// environment, never baked into the client logic.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the remote store API, e.g.
    /// `https://example.com/wp-json/sportspress/v2`.
    pub base_url: String,

    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,

    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Duration of each half in seconds.
    #[serde(default = "default_half_duration_s")]
    pub half_duration_s: u32,
}

fn default_db_path() -> String {
    "./db".to_string()
}

fn default_half_duration_s() -> u32 {
    20 * 60
}

impl Config {
    pub fn credentials(&self) -> Option<Credentials> {
        if self.username.is_empty() || self.password.is_empty() {
            return None;
        }
        Some(Credentials { username: self.username.clone(), password: self.password.clone() })
    }
}

pub fn get_config() -> Config {
    let path = std::env::var("CONFIG_PATH").ok()
        .unwrap_or_else(|| "./deployment/config.json".to_string());
    let data = fs::read_to_string(path.clone())
        .expect("Unable to read file");
    let mut result: Config = serde_json::from_str(&data)
        .unwrap_or_else(|_| panic!("{}", &format!("Could not parse JSON at {path}!")));
    if let Ok(username) = std::env::var("SCORE_USERNAME") {
        result.username = username;
    }
    if let Ok(password) = std::env::var("SCORE_PASSWORD") {
        result.password = password;
    }
    if let Ok(db_path) = std::env::var("DB_PATH") {
        result.db_path = db_path;
        println!("[CONFIG] DB_PATH {}", result.db_path);
    }
    result
}
