use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use petadmin_api::Server;
use petadmin_core::Settings;
use petadmin_store::{SeedCounts, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "petadmin")]
#[command(about = "PetAdmin CLI - pet-adoption back-office operations", long_about = None)]
#[command(version)]
struct Cli {
    /// Output format (json, pretty)
    #[arg(short, long, global = true, default_value = "pretty")]
    output: OutputFormat,

    /// SQLite database path
    #[arg(long, global = true, env = "PETADMIN_DB")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API server
    Serve {
        /// Bind host (overrides configuration)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides configuration)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create the database and insert demo data
    Seed {
        /// Number of users to create
        #[arg(long, default_value = "12")]
        users: u32,

        /// Number of pets to create
        #[arg(long, default_value = "16")]
        pets: u32,
    },

    /// Print dashboard statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "petadmin=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::load(None, None).context("Failed to load configuration")?;
    if let Some(db) = &cli.db {
        settings.database.path = db.to_string_lossy().into_owned();
    }

    match run(&cli, settings).await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli, settings: Settings) -> Result<()> {
    match &cli.command {
        Commands::Serve { host, port } => {
            let mut settings = settings;
            if let Some(host) = host {
                settings.server.host = host.clone();
            }
            if let Some(port) = port {
                settings.server.port = *port;
            }
            let host: IpAddr = settings
                .server
                .host
                .parse()
                .with_context(|| format!("invalid server.host: {}", settings.server.host))?;
            let addr = SocketAddr::from((host, settings.server.port));
            let server = Server::new(addr, Arc::new(settings)).await?;
            server.run().await?;
            Ok(())
        }

        Commands::Seed { users, pets } => {
            let store = open_store(&settings).await?;
            let counts = SeedCounts {
                users: *users,
                pets: *pets,
            };
            store.seed_demo(&counts).await?;
            println!(
                "{} seeded {} users and {} pets into {}",
                "OK".green().bold(),
                counts.users,
                counts.pets,
                settings.database.path
            );
            Ok(())
        }

        Commands::Stats => {
            let store = open_store(&settings).await?;
            let stats = store.dashboard_stats().await?;
            match cli.output {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&stats)?);
                }
                OutputFormat::Pretty => print_stats(&stats),
            }
            Ok(())
        }
    }
}

async fn open_store(settings: &Settings) -> Result<Store> {
    let store = Store::open(
        Path::new(&settings.database.path),
        settings.database.max_connections,
    )
    .await
    .with_context(|| format!("opening database at {}", settings.database.path))?;
    Ok(store)
}

fn print_stats(stats: &petadmin_store::DashboardStats) {
    println!("{}", "Dashboard".bold().underline());
    println!("  users:             {}", stats.total_users);
    println!("  pets:              {}", stats.total_pets);
    println!("  adoptions:         {}", stats.total_adoptions);
    println!("  vaccinations due:  {}", stats.vaccinations_due_soon);

    if !stats.pets_by_status.is_empty() {
        println!("{}", "Pets by status".bold());
        for entry in &stats.pets_by_status {
            println!("  {:<12} {}", entry.label, entry.count);
        }
    }
    if !stats.applications_by_status.is_empty() {
        println!("{}", "Applications by status".bold());
        for entry in &stats.applications_by_status {
            println!("  {:<12} {}", entry.label, entry.count);
        }
    }
    if !stats.adoptions_by_month.is_empty() {
        println!("{}", "Adoptions by month".bold());
        for entry in &stats.adoptions_by_month {
            println!("  {:<8} {}", entry.month, entry.count);
        }
    }
}
