mod app;
mod currency;
mod document;
mod errors;
mod export;
mod history;
mod items;
mod model;
mod pricing;
mod settings;
mod storage;
mod ui;
mod wizard;

use clap::{CommandFactory, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::app::{App, delete_quote, register_item, unregister_item};
use crate::errors::{Error, Result};
use crate::export::Exporter;
use crate::history::QuoteHistory;
use crate::items::ItemCatalog;
use crate::settings::Workspace;
use crate::storage::FileStore;
use crate::wizard::AppState;

#[derive(Parser)]
#[command(name = "quote-maker", about = "Orçamentos de impressão 3D e projetos")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new quote
    New,
    /// Browse saved quotes
    History,
    /// Print the chat message for a saved quote
    Share {
        /// Quote id, e.g. ORC-123456
        id: String,
    },
    /// Delete a saved quote
    Delete,
    /// List registered add-on items
    Items,
    /// Register a new add-on item
    AddItem,
    /// Remove a registered add-on item
    RemoveItem,
    /// Configure data directory
    Config,
    /// Open output folder
    Open,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        if e.is_cancelled() {
            return;
        }
        tracing::error!("{}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    if let Commands::Config = command {
        settings::setup_config_wizard()?;
        return Ok(());
    }

    let settings = match settings::load_settings() {
        Some(s) => s,
        None => settings::setup_config_wizard()?,
    };
    let workspace = Workspace::new(PathBuf::from(settings::expand_home_dir(&settings.data_root)));
    let mut app = open_app(&workspace)?;

    match command {
        Commands::New => app.run(AppState::Welcome),
        Commands::History => app.run(AppState::History),
        Commands::Share { id } => {
            let record = app
                .history()
                .get(&id)
                .ok_or_else(|| Error::NotFound(format!("quote {}", id)))?;
            println!("{}", document::share_message(record, &app.company().name));
            Ok(())
        }
        Commands::Delete => delete_quote(app.history_mut()),
        Commands::Items => {
            println!("{}", ui::items_table(app.catalog().list()));
            Ok(())
        }
        Commands::AddItem => register_item(app.catalog_mut()),
        Commands::RemoveItem => unregister_item(app.catalog_mut()),
        Commands::Open => {
            let output = workspace.output_dir();
            fs::create_dir_all(&output)?;
            println!("🚀 Abrindo: {:?}", output);
            export::open_path(&output);
            Ok(())
        }
        Commands::Config => Ok(()),
    }
}

fn open_app(workspace: &Workspace) -> Result<App<FileStore>> {
    let config = settings::load_company_config(workspace)?;
    let store = FileStore::new(workspace.data_dir());
    let tera = document::load_templates(&workspace.templates_dir())?;
    let exporter = Exporter::new(workspace.output_dir(), tera, config.company.clone());

    Ok(App::new(
        QuoteHistory::load(store.clone()),
        ItemCatalog::load(store),
        config,
        exporter,
    ))
}
