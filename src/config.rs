use std::{env, fs::read_to_string};

use tracing::{info, warn};

/// Mounted secret consulted first for the submission password.
const PASSWORD_SECRET: &str = "/run/secrets/SCORES_PASSWORD";

/// Environment variables consulted next, in resolution order. The first
/// non-empty value wins.
const PASSWORD_VARS: [&str; 3] = ["SCORES_PASSWORD", "SCORES_API_PASSWORD", "API_PASSWORD"];

pub struct Config {
    pub port: u16,
    /// Base URL of the remote collection store. Absent means the service
    /// runs read-only on the seed dataset.
    pub store_url: Option<String>,
    /// Resolved submission password. Absent means the gate is unconfigured
    /// and every submission is refused.
    pub api_password: Option<String>,
}

impl Config {
    pub fn load() -> Self {
        Self::from_env(|key| env::var(key).ok())
    }

    fn from_env(get: impl Fn(&str) -> Option<String>) -> Self {
        Self::from_sources(read_secret(PASSWORD_SECRET), get)
    }

    fn from_sources(secret: Option<String>, get: impl Fn(&str) -> Option<String>) -> Self {
        let port = get("PORT")
            .and_then(|v| {
                v.parse()
                    .map_err(|e| warn!("Invalid PORT value {v:?}: {e}, using default"))
                    .ok()
            })
            .unwrap_or(8080);

        let store_url = get("STORE_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        if store_url.is_none() {
            info!("STORE_URL not set; running read-only on seed data");
        }

        let api_password = secret
            .filter(|v| !v.is_empty())
            .or_else(|| resolve_password(&get));
        if api_password.is_none() {
            warn!("No API password configured; score submissions will be refused");
        }

        Self {
            port,
            store_url,
            api_password,
        }
    }
}

fn resolve_password(get: &impl Fn(&str) -> Option<String>) -> Option<String> {
    for key in PASSWORD_VARS {
        if let Some(value) = get(key).filter(|v| !v.trim().is_empty()) {
            return Some(value);
        }
    }
    None
}

fn read_secret(path: &str) -> Option<String> {
    read_to_string(path).ok().map(|s| s.trim().to_string())
}
