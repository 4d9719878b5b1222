/// Main entry point for the Habit Insights MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use habit_insights_mcp::{EngineConfig, InsightServer};

/// Get the default database path with robust fallback strategy
fn get_default_database_path() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|mut p| {
            p.push(".habit_insights");
            p
        }),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("habit_insights");
            p
        }),
        // 3. User's config directory
        dirs::config_dir().map(|mut p| {
            p.push("habit_insights");
            p
        }),
        // 4. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".habit_insights");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Make sure the directory is actually writable
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.join("insights.db"));
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("habit_insights");
    std::fs::create_dir_all(&temp_path)?;
    temp_path.push("insights.db");

    tracing::warn!("Using temporary directory for database: {}", temp_path.display());
    Ok(temp_path)
}

/// Parse an engine threshold; it must be a finite number no lower than zero
fn threshold(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.trim().parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("expected a finite number >= 0, got {}", raw))
    }
}

/// Command line arguments for the Habit Insights MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "INSIGHTS_DATABASE")]
    database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,

    /// Percent of the larger average within which sleep/focus counts as flat
    #[arg(long, env = "INSIGHTS_FLAT_BAND_PCT", value_parser = threshold)]
    flat_band_pct: Option<f64>,

    /// Mood point difference within which the mood trend counts as flat
    #[arg(long, env = "INSIGHTS_MOOD_EPSILON", value_parser = threshold)]
    mood_epsilon: Option<f64>,

    /// Hours of sleep from which a night counts as rested
    #[arg(long, env = "INSIGHTS_RESTED_SLEEP_HOURS", value_parser = threshold)]
    rested_sleep_hours: Option<f64>,
}

impl Args {
    /// Default thresholds with any command line overrides applied
    fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            flat_band_pct: self.flat_band_pct.unwrap_or(defaults.flat_band_pct),
            mood_epsilon: self.mood_epsilon.unwrap_or(defaults.mood_epsilon),
            rested_sleep_hours: self.rested_sleep_hours.unwrap_or(defaults.rested_sleep_hours),
            ..defaults
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("habit_insights_mcp={}", log_level))
        .with_writer(std::io::stderr) // Send logs to stderr, not stdout
        .init();

    info!("Starting Habit Insights MCP server");

    let db_path = match args.database.clone() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            path
        }
        None => get_default_database_path()?,
    };

    info!("Using database at: {}", db_path.display());

    let server = InsightServer::with_config(db_path, args.engine_config()).await?;

    // Handles JSON-RPC over stdin/stdout until stdin closes
    server.run().await?;

    info!("Habit Insights MCP server shutdown complete");
    Ok(())
}
