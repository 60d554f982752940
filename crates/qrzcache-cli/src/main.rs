//! qrzcache - look up amateur radio callsigns on QRZ from the terminal.
//!
//! The QRZ session key is cached in `./.qrz_session` and reused for up to
//! an hour. Results can be appended to CSV and JSON files.

mod prompt;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qrzcache_core::api::ApiClient;
use qrzcache_core::auth::{FileTokenStore, MemoryTokenStore, SessionManager, TokenSource, TokenStore};
use qrzcache_core::export::{export_csv, export_json};
use qrzcache_core::{Config, LookupRecord};

use prompt::TerminalPrompt;

#[derive(Parser, Debug)]
#[command(name = "qrzcache", version, about = "QRZ callsign lookup", long_about = None)]
struct Cli {
    /// Callsign to search
    callsign: String,

    /// Export CSV
    #[arg(long)]
    csv: bool,

    /// Export JSON
    #[arg(long)]
    json: bool,

    /// Export both CSV and JSON
    #[arg(long)]
    both: bool,

    /// QRZ username (prompted for when a new session is needed)
    #[arg(short, long, env = "QRZ_USERNAME")]
    username: Option<String>,

    /// Session key file
    #[arg(long, env = "QRZ_SESSION_FILE")]
    session_file: Option<PathBuf>,

    /// CSV export file
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// JSON export file
    #[arg(long)]
    json_file: Option<PathBuf>,

    /// QRZ XML endpoint
    #[arg(long, env = "QRZ_ENDPOINT")]
    endpoint: Option<String>,

    /// Keep the session key in memory only for this run
    #[arg(long)]
    no_cache: bool,
}

impl Cli {
    /// Fold command-line overrides into the stored config.
    fn apply_to(&self, config: &mut Config) {
        if let Some(ref path) = self.session_file {
            config.session_file = Some(path.clone());
        }
        if let Some(ref path) = self.csv_file {
            config.csv_file = Some(path.clone());
        }
        if let Some(ref path) = self.json_file {
            config.json_file = Some(path.clone());
        }
        if let Some(ref endpoint) = self.endpoint {
            config.endpoint = Some(endpoint.clone());
        }
    }

    fn wants_csv(&self) -> bool {
        self.csv || self.both
    }

    fn wants_json(&self) -> bool {
        self.json || self.both
    }
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    cli.apply_to(&mut config);

    if cli.no_cache {
        lookup_and_export(&cli, &mut config, MemoryTokenStore::new()).await
    } else {
        let store = FileTokenStore::new(config.session_file());
        lookup_and_export(&cli, &mut config, store).await
    }
}

async fn lookup_and_export<S: TokenStore>(cli: &Cli, config: &mut Config, store: S) -> Result<()> {
    let client = ApiClient::new(config.endpoint())?;
    let sessions = SessionManager::new(store, client);
    let mut prompt = TerminalPrompt::new(cli.username.clone(), config.last_username.clone());

    let valid = sessions.get_valid_token(&mut prompt).await?;
    match valid.source {
        TokenSource::Cached => println!("✅ Using cached QRZ session."),
        TokenSource::Fresh => {
            println!("🔑 Got new QRZ session key.");
            remember_username(config, prompt.used_username.take());
        }
    }

    let record = match sessions.client().lookup(&valid.token, &cli.callsign).await {
        Ok(record) => record,
        Err(e) => {
            if e.is_session_expired() {
                if let Err(clear_err) = sessions.invalidate() {
                    warn!(error = %clear_err, "Failed to clear expired session key");
                }
            }
            return Err(e.into());
        }
    };
    info!(callsign = %record.call, "Lookup complete");

    print_record(&record);

    if cli.wants_csv() {
        let path = config.csv_file();
        export_csv(&record, &path)?;
        println!("💾 CSV updated: {}", path.display());
    }

    if cli.wants_json() {
        let path = config.json_file();
        export_json(&record, &path)?;
        println!("💾 JSON updated: {}", path.display());
    }

    Ok(())
}

fn remember_username(config: &mut Config, username: Option<String>) {
    if username.is_none() || username == config.last_username {
        return;
    }
    config.last_username = username;
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}

fn print_record(record: &LookupRecord) {
    println!();
    println!("📡 Callsign Lookup Result:");
    println!(" Call:      {}", record.call);
    println!(" Name:      {}", record.full_name());
    println!(" Location:  {}", record.location());
    println!(" Country:   {}", record.country);
    println!();
}
