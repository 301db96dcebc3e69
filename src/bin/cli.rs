use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use folio::cli::{check_config, cli_cache, migrate_database};
use folio::folio_config::ConfigManager;
use folio::folio_core::hash_password;

#[derive(Parser)]
#[command(name = "folio-cli")]
#[command(about = "Folio CLI - Maintenance tools for the portfolio server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and clean the file cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
    /// Print the bcrypt hash of a password, for seeding the users table
    HashPassword {
        /// Password to hash
        password: String,
    },
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Remove expired and unreadable entries
    CleanExpired,
    /// Remove every entry, or only those whose key starts with a prefix
    Clear {
        /// Key prefix, e.g. `user_permissions_12_`
        #[arg(short, long)]
        prefix: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Report which configuration variables are set
    Check,
}

#[derive(Subcommand)]
enum DbCommands {
    /// Apply pending migrations from `migrations/`
    Migrate,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let manager = ConfigManager::global();

    match cli.command {
        Commands::Cache { command } => {
            let cache = match cli_cache(manager) {
                Ok(cache) => cache,
                Err(e) => {
                    eprintln!("Error loading cache configuration: {}", e);
                    std::process::exit(1);
                }
            };

            match command {
                CacheCommands::CleanExpired => {
                    let removed = cache.clean_expired().await;
                    println!("Removed {} expired entries from {}", removed, cache.dir().display());
                }
                CacheCommands::Clear { prefix } => {
                    if cache.clear(prefix.as_deref()).await {
                        match prefix {
                            Some(prefix) => println!("Cleared entries starting with '{}'", prefix),
                            None => println!("Cleared {}", cache.dir().display()),
                        }
                    } else {
                        eprintln!("Some cache entries could not be removed");
                        std::process::exit(1);
                    }
                }
            }
        }
        Commands::HashPassword { password } => match hash_password(&password) {
            Ok(hash) => println!("{}", hash),
            Err(e) => {
                eprintln!("Error hashing password: {}", e);
                std::process::exit(1);
            }
        },
        Commands::Config {
            command: ConfigCommands::Check,
        } => {
            let report = check_config(manager);
            for status in &report.variables {
                let mark = if status.present { "set" } else { "missing" };
                let required = if status.required { " (required)" } else { "" };
                println!("{:<22} {}{}", status.key, mark, required);
            }
            println!(
                "{:<22} {}",
                "database",
                if report.database_configured { "configured" } else { "missing (required)" }
            );

            if !report.is_ok() {
                std::process::exit(1);
            }
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => match migrate_database(manager).await {
            Ok(()) => println!("Migrations applied"),
            Err(e) => {
                eprintln!("Error running migrations: {}", e);
                std::process::exit(1);
            }
        },
    }
}
