use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use latchkey::bootstrap::ensure_default_user;
use latchkey::cli::{Args, build_config, init_logging, load_jwt_secret, open_database};
use latchkey::launch::spawn_open_browser;
use latchkey::run_server;
use tracing::{error, info};

/// How long the browser hook waits for the listener before giving up.
const BROWSER_WAIT: Duration = Duration::from_secs(8);

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref(), args.environment)
    else {
        std::process::exit(1);
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    let config = build_config(&args, db, jwt_secret);

    if let Err(e) = ensure_default_user(&config.db, Arc::new(config.passwords.clone())).await {
        error!(error = %e, "Failed to seed default user");
        std::process::exit(1);
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let local_addr = listener.local_addr().unwrap_or_else(|e| {
        error!(error = %e, "Failed to read listen address");
        std::process::exit(1);
    });

    info!(address = %local_addr, environment = ?args.environment, "Listening");

    if args.open_browser {
        spawn_open_browser(format!("http://{}", local_addr), local_addr, BROWSER_WAIT);
    }

    if let Err(e) = run_server(config, listener).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
