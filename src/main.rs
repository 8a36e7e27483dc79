use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use idea2code::app::App;
use idea2code::auth::AuthGate;
use idea2code::catalog::{Catalog, ALL_CATEGORIES};
use idea2code::config::Config;
use idea2code::draft::DraftStore;
use idea2code::logging;
use idea2code::storage::{FileStore, KeyValueStore};
use idea2code::tracking::RequestHistory;

#[derive(Parser)]
#[command(name = "idea2code")]
#[command(about = "Browse software and request custom builds from the terminal")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long)]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog products
    Catalog {
        /// Only show this category
        #[arg(short, long)]
        category: Option<String>,

        /// Case-insensitive search text
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one product with its features
    Product {
        /// Product id
        id: u32,
    },

    /// List tracked requests with their timelines
    Track,

    /// Inspect or discard the saved request draft
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Sign in
    Login,

    /// Sign out
    Logout,

    /// Show whether a session is active
    Whoami,

    /// Inspect or write the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum DraftAction {
    /// Print the saved draft and step as JSON
    Show,
    /// Discard the saved draft and step
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write the effective configuration to the user config file
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (needed for logging setup)
    let config = Config::load(cli.config.as_deref())?;

    // Determine if we're running in TUI mode (no subcommand)
    let is_tui_mode = cli.command.is_none();

    // File-based for TUI, stderr for CLI
    let logging_handle = logging::init_logging(&config, is_tui_mode, cli.debug)?;

    match cli.command {
        Some(Commands::Catalog { category, search }) => cmd_catalog(category, search)?,
        Some(Commands::Product { id }) => cmd_product(id)?,
        Some(Commands::Track) => cmd_track(&config),
        Some(Commands::Draft { action }) => cmd_draft(&config, action)?,
        Some(Commands::Login) => cmd_login(&config)?,
        Some(Commands::Logout) => cmd_logout(&config)?,
        Some(Commands::Whoami) => cmd_whoami(&config),
        Some(Commands::Config { action }) => cmd_config(&config, action)?,
        None => run_tui(config, logging_handle.log_file_path).await?,
    }

    Ok(())
}

async fn run_tui(config: Config, log_file_path: Option<PathBuf>) -> Result<()> {
    let mut app = App::new(config)?;
    let result = app.run().await;

    // Print log file path on exit if logs were written
    if let Some(log_path) = log_file_path {
        if let Ok(metadata) = log_path.metadata() {
            if metadata.len() > 0 {
                eprintln!("Session log: {}", log_path.display());
            }
        }
    }

    result
}

fn open_store(config: &Config) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(config.storage_path()))
}

fn cmd_catalog(category: Option<String>, search: Option<String>) -> Result<()> {
    let catalog = Catalog::builtin()?;
    let category = category.as_deref().unwrap_or(ALL_CATEGORIES);
    let products = catalog.filter(category, search.as_deref().unwrap_or(""));

    if products.is_empty() {
        println!("No products match your search.");
        return Ok(());
    }

    println!("Catalog ({} products)", products.len());
    println!("{}", "─".repeat(60));
    for product in products {
        println!(
            "{:>3}  {:<28} {:<14} {}",
            product.id, product.title, product.category, product.subtitle
        );
    }
    Ok(())
}

fn cmd_product(id: u32) -> Result<()> {
    let catalog = Catalog::builtin()?;
    let Some(product) = catalog.get(id) else {
        bail!("No product with id {id}");
    };

    println!("{} ({})", product.title, product.category);
    println!("{}", product.subtitle);
    println!();
    println!("{}", product.description);
    println!();
    println!("Key features:");
    for feature in &product.features {
        println!("  ✓ {feature}");
    }
    Ok(())
}

fn cmd_track(config: &Config) {
    let requests = RequestHistory::new(open_store(config)).all_with_samples();

    println!("Tracked requests ({})", requests.len());
    println!("{}", "─".repeat(60));
    for request in requests {
        println!(
            "#{}  {}  [{}]  {}",
            request.id, request.title, request.status, request.date
        );
        println!("    cost: {}  duration: {}", request.cost, request.duration);
        for entry in &request.timeline {
            let mark = if entry.completed { "●" } else { "○" };
            println!("    {mark} {:<20} {}", entry.state, entry.date);
        }
    }
}

fn cmd_draft(config: &Config, action: DraftAction) -> Result<()> {
    let drafts = DraftStore::new(open_store(config));
    match action {
        DraftAction::Show => {
            if !drafts.has_draft() {
                println!("No saved draft");
                return Ok(());
            }
            let draft = serde_json::to_string_pretty(&drafts.load())
                .context("Failed to serialize draft")?;
            match drafts.load_step() {
                Some(step) => println!("Saved at step {step}"),
                None => println!("No saved step"),
            }
            println!("{draft}");
        }
        DraftAction::Clear => {
            drafts.clear();
            drafts.clear_step();
            println!("Draft discarded");
        }
    }
    Ok(())
}

fn cmd_login(config: &Config) -> Result<()> {
    AuthGate::new(open_store(config))
        .login()
        .context("Failed to save session")?;
    println!("Signed in");
    Ok(())
}

fn cmd_logout(config: &Config) -> Result<()> {
    AuthGate::new(open_store(config))
        .logout()
        .context("Failed to clear session")?;
    println!("Signed out");
    Ok(())
}

fn cmd_whoami(config: &Config) {
    if AuthGate::new(open_store(config)).is_authenticated() {
        println!("Signed in");
    } else {
        println!("Guest User (not signed in)");
    }
}

fn cmd_config(config: &Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(config).context("Failed to render config")?;
            print!("{rendered}");
        }
        ConfigAction::Init => {
            let path = config.save()?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
