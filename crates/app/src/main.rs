//! Tessera - membership and events platform
//!
//! Operational command line for the Tessera database: run migrations,
//! seed an administrator, inspect counts, and clean up expired sessions.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessera_core::{AccountService, AppConfig, ContentService, Database, Error, LogNotifier};

const USAGE: &str = "\
Usage: tessera [--config <path>] <command>

Commands:
  migrate                              Apply pending schema migrations
  stats                                Print dashboard counts
  seed-admin <username> <email> <pw>   Create an administrator account
  cleanup                              Delete expired login sessions
";

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let mut args = std::env::args().skip(1).collect::<Vec<_>>();

    let config_path = match args.first().map(String::as_str) {
        Some("--config") => {
            if args.len() < 2 {
                return usage_error();
            }
            args.remove(0);
            PathBuf::from(args.remove(0))
        }
        _ => default_config_path(),
    };

    let config = AppConfig::load(&config_path)?;
    let db_path = config.resolve_database_path()?;

    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path)?;

    match args.first().map(String::as_str) {
        Some("migrate") => {
            // Database::open already migrates; report where things stand
            println!(
                "Database at {} is at schema version {}",
                db_path.display(),
                db.schema_version()
            );
            Ok(())
        }
        Some("stats") => {
            let stats = ContentService::new(&db).dashboard_stats()?;
            println!("Users:         {}", stats.users);
            println!("Active clubs:  {}", stats.clubs);
            println!("Events:        {}", stats.events);
            println!("Registrations: {}", stats.registrations);
            Ok(())
        }
        Some("seed-admin") => {
            let [username, email, password] = &args[1..] else {
                return usage_error();
            };
            let notifier = LogNotifier::new(config.base_url.clone());
            let accounts = AccountService::new(&db, &notifier);
            let admin = accounts.create_admin(username, email, password)?;
            println!("Created admin '{}' ({})", admin.username, admin.id);
            Ok(())
        }
        Some("cleanup") => {
            let removed = db.users().cleanup_expired_sessions()?;
            println!("Removed {removed} expired session(s)");
            Ok(())
        }
        _ => usage_error(),
    }
}

fn usage_error() -> Result<(), Error> {
    eprint!("{USAGE}");
    Err(Error::Config("invalid arguments".into()))
}

fn default_config_path() -> PathBuf {
    std::env::var_os("TESSERA_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tessera.toml"))
}
