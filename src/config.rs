use anyhow::{Context, Result, bail};
use dotenvy::dotenv;
use std::{env, fmt::Display, path::PathBuf, str::FromStr};

#[derive(Clone)]
pub struct Config {
    pub server_addr: String,
    pub data_file: PathBuf,
    pub backup_file: PathBuf,
    pub jwt_secret: String,
    pub access_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: PathBuf,

    /// Browser origins allowed by CORS; empty allows any origin
    pub cors_allowed_origins: Vec<String>,

    /// Admin account created at startup when missing: (username, password)
    pub seed_admin: Option<(String, String)>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET must be set")?;

        let seed_admin = match (lookup("SEED_ADMIN_USERNAME"), lookup("SEED_ADMIN_PASSWORD")) {
            (Some(username), Some(password)) => Some((username, password)),
            (None, None) => None,
            _ => bail!("SEED_ADMIN_USERNAME and SEED_ADMIN_PASSWORD must be set together"),
        };

        let config = Self {
            server_addr: or_default(&lookup, "SERVER_ADDR", "127.0.0.1:5000"),
            data_file: or_default(&lookup, "DATA_FILE", "data/data.json").into(),
            backup_file: or_default(&lookup, "BACKUP_FILE", "data/data.backup.json").into(),
            jwt_secret,
            access_token_ttl: parse_or(&lookup, "ACCESS_TOKEN_TTL", 3600)?, // default 1 hour
            rate_login_per_min: parse_or(&lookup, "RATE_LOGIN_PER_MIN", 60)?,
            rate_protected_per_min: parse_or(&lookup, "RATE_PROTECTED_PER_MIN", 1000)?,
            api_prefix: or_default(&lookup, "API_PREFIX", "/api"),
            log_dir: or_default(&lookup, "LOG_DIR", "logs").into(),
            cors_allowed_origins: origins(&or_default(&lookup, "CORS_ALLOWED_ORIGINS", "*")),
            seed_admin,
        };

        if config.access_token_ttl == 0 {
            bail!("ACCESS_TOKEN_TTL must be greater than zero");
        }
        if config.rate_login_per_min == 0 || config.rate_protected_per_min == 0 {
            bail!("rate limits must be greater than zero");
        }

        Ok(config)
    }
}

// Comma separated; "*" means any origin.
fn origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(String::from)
        .collect()
}

fn or_default(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key).unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key} value {raw:?}: {e}")),
        None => Ok(default),
    }
}
