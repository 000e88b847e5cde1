//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::db::Database;
use crate::jwt::TokenLifetimes;
use crate::password::Passwords;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Upper bounds on token lifetimes: one year of minutes, a hundred years of days.
const MAX_ACCESS_TTL_MINUTES: u64 = 365 * 24 * 60;
const MAX_REFRESH_TTL_DAYS: u64 = 100 * 365;

/// Environment variable holding the signing secret.
pub const SECRET_ENV_VAR: &str = "SECRET_KEY";

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

/// Deployment mode. Production turns on Secure cookies and requires an
/// explicit signing secret.
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "latchkey",
    about = "Username/password login with cookie-based access and refresh tokens"
)]
pub struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8000")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "database.sqlite")]
    pub database: String,

    /// Path to file containing the signing secret. Prefer the SECRET_KEY env var
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Access token lifetime in minutes
    #[arg(long, env = "ACCESS_TOKEN_EXPIRE_MINUTES", default_value = "15",
        value_parser = clap::value_parser!(u64).range(1..=MAX_ACCESS_TTL_MINUTES))]
    pub access_ttl_minutes: u64,

    /// Refresh token lifetime in days
    #[arg(long, env = "REFRESH_TOKEN_EXPIRE_DAYS", default_value = "7",
        value_parser = clap::value_parser!(u64).range(1..=MAX_REFRESH_TTL_DAYS))]
    pub refresh_ttl_days: u64,

    /// Comma-separated origins allowed to call the API with cookies
    #[arg(long, env = "API_ORIGINS", value_delimiter = ',',
        default_value = "http://localhost:3000,http://localhost:3001")]
    pub allowed_origins: Vec<String>,

    /// Deployment mode
    #[arg(long = "env", env = "ENV", default_value = "development")]
    pub environment: Environment,

    /// Front-end build directory, served at / when present
    #[arg(long, default_value = "build")]
    pub static_dir: PathBuf,

    /// Open the app in the system browser once the server is up
    #[arg(long)]
    pub open_browser: bool,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

impl Args {
    pub fn lifetimes(&self) -> TokenLifetimes {
        TokenLifetimes {
            access: Duration::from_secs(self.access_ttl_minutes * 60),
            refresh: Duration::from_secs(self.refresh_ttl_days * 24 * 60 * 60),
        }
    }
}

/// Initialize logging based on the specified format.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logging(format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Load the signing secret from the environment or a file.
///
/// In development a missing secret is replaced by a random per-process one,
/// which invalidates all sessions on restart. Production requires a secret of
/// at least 32 bytes. Returns None and logs an error on failure.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>, environment: Environment) -> Option<Vec<u8>> {
    let secret = if let Ok(secret) = std::env::var(SECRET_ENV_VAR) {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(SECRET_ENV_VAR) };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret file");
                return None;
            }
        }
    } else if environment == Environment::Development {
        warn!(
            "No {} set, using a random signing secret. Sessions end when the server restarts",
            SECRET_ENV_VAR
        );
        return Some(random_secret());
    } else {
        error!(
            "Signing secret is required in production. Set {} environment variable (recommended) or use --jwt-secret-file",
            SECRET_ENV_VAR
        );
        return None;
    };

    if secret.is_empty() {
        error!("Signing secret is empty");
        return None;
    }

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        if environment == Environment::Production {
            error!(
                "Signing secret is shorter than {} characters. Use a longer secret",
                MIN_JWT_SECRET_LENGTH
            );
            return None;
        }
        warn!(
            "Signing secret is shorter than {} characters",
            MIN_JWT_SECRET_LENGTH
        );
    }

    Some(secret.into_bytes())
}

fn random_secret() -> Vec<u8> {
    let mut secret = vec![0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::rng(), &mut secret);
    secret
}

/// Build ServerConfig from validated arguments.
pub fn build_config(args: &Args, db: Database, jwt_secret: Vec<u8>) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret,
        lifetimes: args.lifetimes(),
        secure_cookies: args.environment == Environment::Production,
        allowed_origins: args.allowed_origins.clone(),
        static_dir: Some(args.static_dir.clone()),
        passwords: Passwords::default(),
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
