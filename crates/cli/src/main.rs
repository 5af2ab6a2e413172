//! Zenos CLI - operator tools for the listing storefront.
//!
//! # Usage
//!
//! ```bash
//! # Run the storefront filter over a snapshot file
//! zenos-cli filter --file listings.json --query Civ --country Japan
//!
//! # Check what the dashboard guard decides for an address
//! zenos-cli access --email Admin@Gmail.com
//!
//! # Print the country suggestion list
//! zenos-cli countries
//!
//! # Export the live collection to a snapshot file
//! zenos-cli snapshot --out listings.json
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "zenos-cli")]
#[command(author, version, about = "Zenos CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter a listing snapshot file the way the storefront does
    Filter {
        /// JSON array of listings
        #[arg(short, long)]
        file: PathBuf,

        /// Search text (case-sensitive, matches title, country, description)
        #[arg(short, long, default_value = "")]
        query: String,

        /// Country filter (case-sensitive substring)
        #[arg(short, long, default_value = "")]
        country: String,
    },
    /// Evaluate the dashboard access guard for an address
    Access {
        /// Signed-in address; omit to evaluate a signed-out visitor
        #[arg(short, long)]
        email: Option<String>,

        /// Admin address (defaults to `ZENOS_ADMIN_EMAIL`)
        #[arg(long)]
        admin: Option<String>,
    },
    /// Fetch and print the country suggestion list
    Countries {
        /// Country directory URL
        #[arg(long, default_value = zenos_storefront::config::DEFAULT_COUNTRIES_URL)]
        url: String,
    },
    /// Read the listing collection once and write it as a snapshot file
    Snapshot {
        /// Output path (stdout if omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Filter {
            file,
            query,
            country,
        } => commands::filter::run(&mut out, &file, &query, &country).await,
        Commands::Access { email, admin } => {
            commands::access::run(&mut out, email.as_deref(), admin.as_deref())
        }
        Commands::Countries { url } => commands::countries::run(&mut out, &url).await,
        Commands::Snapshot { out: path } => match path {
            Some(path) => commands::snapshot::to_file(&path).await,
            None => commands::snapshot::run(&mut out).await,
        },
    }
}
