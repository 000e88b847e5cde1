//! Set or reset a user's password directly in the database.

use std::sync::Arc;

use clap::Parser;
use latchkey::bootstrap::{DEFAULT_DISPLAY_NAME, DEFAULT_USERNAME, set_password};
use latchkey::db::{Database, PasswordSet};
use latchkey::password::Passwords;

#[derive(Parser, Debug)]
#[command(
    name = "latchkey-set-password",
    about = "Set a user's password in the latchkey database"
)]
struct Args {
    /// New password
    #[arg(env = "NEW_PASSWORD", hide_env_values = true)]
    password: String,

    /// User whose password is set
    #[arg(short, long, default_value = DEFAULT_USERNAME)]
    username: String,

    /// Path to an existing SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "database.sqlite")]
    database: String,

    /// Create the user if it doesn't exist
    #[arg(long)]
    create_missing: bool,

    /// Display name for a newly created user
    #[arg(long, default_value = DEFAULT_DISPLAY_NAME)]
    display_name: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if args.password.is_empty() {
        eprintln!("Password must not be empty");
        std::process::exit(1);
    }

    let db = match Database::open_existing(&args.database).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Database not found: {} ({})", args.database, e);
            std::process::exit(1);
        }
    };

    let create_as = args.create_missing.then_some(args.display_name.as_str());
    let result = set_password(
        &db,
        Arc::new(Passwords::default()),
        &args.username,
        &args.password,
        create_as,
    )
    .await;

    match result {
        Ok(Some(PasswordSet::Updated)) => println!("Password updated for '{}'.", args.username),
        Ok(Some(PasswordSet::Created)) => {
            println!("User '{}' created with the provided password.", args.username)
        }
        Ok(None) => {
            eprintln!(
                "User '{}' not found. Pass --create-missing to create it.",
                args.username
            );
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to set password: {}", e);
            std::process::exit(1);
        }
    }
}
