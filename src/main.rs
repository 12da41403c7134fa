use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter};

mod chat;
mod cli;
mod client;
mod config;
mod detect;
mod error;
mod recipe;
mod sensor;
mod store;
mod templates;
mod ui;
mod utils;
mod version;

#[cfg(test)]
mod tests;

use cli::CliHandler;
use version::CURRENT_VERSION;

#[derive(Parser)]
#[command(
    name = "fridge",
    about = "Fridge monitor and recipe assistant",
    long_about = "Fridge Assistant - keep an eye on the fridge and cook with what is inside

OVERVIEW:
  Reads the fridge temperature sensor, keeps the list of food in the fridge
  and talks to a local LLM chat endpoint for recipes, food recognition and
  free-form questions.

QUICK START:
  fridge status                          # Temperature and a glance at the fridge
  fridge history                         # Recent temperature chart
  fridge items add \"🧀 Fromage\"          # Track a new item
  fridge recipe                          # Pick items and get a recipe idea
  fridge detect photo.jpg                # Recognise food on a photo
  fridge chat                            # Talk with the assistant",
    version = CURRENT_VERSION,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the default one
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show fridge temperature and inventory overview
    #[command(aliases = &["st", "home"])]
    Status,

    /// Print the current fridge temperature
    #[command(aliases = &["temperature"])]
    Temp,

    /// Chart the recent temperature history
    #[command(aliases = &["analyse", "hist"])]
    History(HistoryArgs),

    /// Chat with the assistant
    Chat(ChatArgs),

    /// Generate a short recipe from fridge items
    Recipe(RecipeArgs),

    /// Recognise the food on a photo and add it to the inventory
    Detect(DetectArgs),

    /// Manage the food inventory
    Items(ItemsArgs),

    /// Configure settings
    #[command(aliases = &["cfg"])]
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct HistoryArgs {
    /// Chart height in rows
    #[arg(long, default_value_t = 11)]
    pub height: usize,
}

#[derive(Args)]
pub struct ChatArgs {
    /// Send a single message instead of starting an interactive session
    pub message: Option<String>,

    /// Attach an image to the message
    #[arg(short, long)]
    pub image: Option<PathBuf>,
}

#[derive(Args)]
pub struct RecipeArgs {
    /// Items to cook with; pick from the inventory when omitted
    pub items: Vec<String>,
}

#[derive(Args)]
pub struct DetectArgs {
    /// Photo of the food
    pub image: PathBuf,

    /// Only print the detected food, do not add it to the inventory
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct ItemsArgs {
    #[command(subcommand)]
    pub command: ItemsCommand,
}

#[derive(Subcommand)]
pub enum ItemsCommand {
    /// List all items
    #[command(aliases = &["ls"])]
    List,
    /// Add an item
    Add { name: String },
    /// Remove an item
    #[command(aliases = &["rm"])]
    Remove { name: String },
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    Show,
    SetChatEndpoint { url: String },
    SetSensorEndpoint { url: String },
    SetModel { name: String },
    SetVisionModel { name: String },
    SetTimeout { seconds: u64 },
    SetVerbose { enabled: String },
    Reset,
}

/// Log filter for this crate at `debug` when verbose, `info` otherwise
fn log_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { "debug" } else { "info" };
    EnvFilter::new(format!("fridge_assistant={}", level))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Installed before the config loads so a reset config is still reported
    let (filter, reload_handle) = reload::Layer::new(log_filter(cli.verbose));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let handler = CliHandler::with_config_path(cli.config);

    let config = match handler.load_config().await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if config.verbose && !cli.verbose {
        if let Err(e) = reload_handle.reload(log_filter(true)) {
            eprintln!("Warning: could not raise log level: {}", e);
        }
    }

    if let Err(e) = handler.execute(cli.command, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
