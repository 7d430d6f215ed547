//! CLI administration tool for linkpool.
//!
//! Inspects and maintains the `urls` table directly, without going through
//! the HTTP API or the worker pool.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Show URL counts
//! cargo run --bin admin -- stats
//!
//! # Inspect or remove a mapping
//! cargo run --bin admin -- url show 3f2a9c1d
//! cargo run --bin admin -- url delete 3f2a9c1d --yes
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL`, or the `DB_*` components (see `linkpool::config`)

use linkpool::config::{Config, mask_connection_string};
use linkpool::domain::repositories::UrlStore;
use linkpool::infrastructure::persistence::PgUrlStore;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;

/// CLI tool for managing linkpool.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show URL counts
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Inspect or remove short URLs
    Url {
        #[command(subcommand)]
        action: UrlAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[derive(Subcommand)]
enum UrlAction {
    /// Print the record behind a short code
    Show {
        /// Short code to look up
        code: String,
    },

    /// Delete a mapping so the code stops resolving
    Delete {
        /// Short code to delete
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database at {}",
                mask_connection_string(&database_url)
            )
        })?;
    let store = PgUrlStore::new(pool.clone());

    match cli.command {
        Commands::Stats => handle_stats(&store).await?,
        Commands::Db { action } => handle_db_action(action, &store).await?,
        Commands::Url { action } => handle_url_action(action, &store).await?,
    }

    pool.close().await;
    Ok(())
}

/// Shows total, active and expired URL counts.
async fn handle_stats(store: &PgUrlStore) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let stats = store
        .stats()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load statistics: {}", e))?;

    println!(
        "  Total URLs:   {}",
        stats.total.to_string().bright_green().bold()
    );
    println!(
        "  Active:       {}",
        (stats.total - stats.expired).to_string().bright_green().bold()
    );
    println!(
        "  Expired:      {}",
        stats.expired.to_string().yellow().bold()
    );
    println!();

    Ok(())
}

async fn handle_db_action(action: DbAction, store: &PgUrlStore) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            store
                .ping()
                .await
                .map_err(|e| anyhow::anyhow!("Database check failed: {}", e))?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
    }

    Ok(())
}

async fn handle_url_action(action: UrlAction, store: &PgUrlStore) -> Result<()> {
    match action {
        UrlAction::Show { code } => show_url(store, &code).await,
        UrlAction::Delete { code, yes } => delete_url(store, &code, yes).await,
    }
}

/// Prints a record, flagging it when expired.
///
/// ```text
/// 🔗 3f2a9c1d
///
///   Long URL:  https://example.com/a
///   Created:   2025-01-15 10:30
///   Expires:   never
///   Status:    ACTIVE
/// ```
async fn show_url(store: &PgUrlStore, code: &str) -> Result<()> {
    let record = store
        .find_by_short_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("Short code '{code}' not found"))?;

    let status = if record.is_expired_at(Utc::now()) {
        "EXPIRED".red()
    } else {
        "ACTIVE".green()
    };
    let expires = record
        .expires_at
        .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());

    println!("{} {}", "🔗".bright_blue(), record.short_code.cyan().bold());
    println!();
    println!("  Long URL:  {}", record.long_url.bright_white());
    println!(
        "  Created:   {}",
        record
            .created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!("  Expires:   {}", expires.bright_black());
    println!("  Status:    {status}");
    println!();

    Ok(())
}

/// Deletes a mapping after confirmation (default: No).
async fn delete_url(store: &PgUrlStore, code: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑  Delete Short URL".bright_blue().bold());
    println!();

    let record = store
        .find_by_short_code(code)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("Short code '{code}' not found"))?;

    println!("  Code:     {}", record.short_code.cyan());
    println!("  Long URL: {}", record.long_url.bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this short URL?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let deleted = store
        .delete(code)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete: {}", e))?;

    if deleted {
        println!("{}", "✅ Short URL deleted".green().bold());
    } else {
        println!("{}", "⚠️  Already gone".yellow());
    }
    println!();

    Ok(())
}
