use chrono::Local;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::chat::{Attachment, ChatSession, Models, RequestState};
use crate::client::HttpClient;
use crate::config::{default_config_path, Config, ConfigService};
use crate::detect::FoodDetector;
use crate::error::{FridgeError, Result};
use crate::recipe::{RecipeService, Selection};
use crate::sensor::{ChartGrid, HistoryStats, SensorService};
use crate::store::{Inventory, InventoryStore};
use crate::ui::UI;
use crate::version::format_version_info;
use crate::{ChatArgs, Commands, DetectArgs, HistoryArgs, ItemsCommand, RecipeArgs};

/// Items shown on the status card before eliding the rest
const STATUS_PREVIEW_ITEMS: usize = 3;

/// A line typed in the interactive chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChatInput<'a> {
    Quit,
    Clear,
    /// `/image <path>`; the path is empty when missing
    Attach(&'a str),
    Message(&'a str),
}

impl<'a> ChatInput<'a> {
    fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let (command, argument) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        match command {
            "/quit" | "/exit" if argument.is_empty() => ChatInput::Quit,
            "/clear" if argument.is_empty() => ChatInput::Clear,
            "/image" => ChatInput::Attach(argument.trim()),
            _ => ChatInput::Message(line),
        }
    }
}

/// CLI handler for processing commands
pub struct CliHandler {
    config_path: Option<PathBuf>,
    ui: UI,
}

impl CliHandler {
    /// Create a new CLI handler with a custom config path
    pub fn with_config_path(config_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            ui: UI::new(),
        }
    }

    /// Load configuration using the handler's config path
    pub async fn load_config(&self) -> Result<Config> {
        if let Some(path) = &self.config_path {
            Config::load_from(path).await
        } else {
            Config::load().await
        }
    }

    /// Execute a CLI command
    pub async fn execute(&self, command: Commands, config: Config) -> Result<()> {
        match command {
            Commands::Status => self.handle_status(&config).await,
            Commands::Temp => self.handle_temp(&config).await,
            Commands::History(args) => self.handle_history(&config, args).await,
            Commands::Chat(args) => self.handle_chat(&config, args).await,
            Commands::Recipe(args) => self.handle_recipe(&config, args).await,
            Commands::Detect(args) => self.handle_detect(&config, args).await,
            Commands::Items(args) => self.handle_items(&config, args.command),
            Commands::Config(args) => {
                let path = self.config_path.clone().unwrap_or_else(default_config_path);
                ConfigService::with_config_path(config, path)
                    .handle_config(args.command)
                    .await
            }
        }
    }

    fn client(&self, config: &Config) -> Result<HttpClient> {
        HttpClient::new(config.to_client_config()?)
    }

    /// Handle status command
    async fn handle_status(&self, config: &Config) -> Result<()> {
        let client = self.client(config)?;
        let inventory = InventoryStore::new(config.inventory_path()).load()?;

        let spinner = self.ui.spinner("Reading fridge sensor...");
        let temperature = SensorService::new(&client).current().await;
        spinner.finish_and_clear();

        let (shown, more) = inventory.preview(STATUS_PREVIEW_ITEMS);
        let mut items = shown.join(", ");
        if more {
            items.push_str(", ...");
        }
        if items.is_empty() {
            items = "(empty)".to_string();
        }

        self.ui.card(
            "Fridge",
            vec![
                ("Version", format_version_info()),
                ("Temperature", self.ui.format_temperature(&temperature)),
                ("Items", items),
                ("Chat endpoint", client.config().chat_url()),
                ("Sensor endpoint", client.config().sensor_url("").trim_end_matches('/').to_string()),
            ],
        );
        Ok(())
    }

    async fn handle_temp(&self, config: &Config) -> Result<()> {
        let client = self.client(config)?;
        let temperature = SensorService::new(&client).current().await;
        println!("{}", self.ui.format_temperature(&temperature));
        Ok(())
    }

    /// Handle history command
    async fn handle_history(&self, config: &Config, args: HistoryArgs) -> Result<()> {
        let client = self.client(config)?;

        let spinner = self.ui.spinner("Fetching temperature history...");
        let history = SensorService::new(&client).history().await;
        spinner.finish_and_clear();
        let samples = history?;

        let (Some(stats), Some(grid)) = (
            HistoryStats::from_samples(&samples),
            ChartGrid::render(&samples, args.height),
        ) else {
            self.ui.warning("No temperature data available");
            return Ok(());
        };

        self.ui.card(
            "Temperature history",
            vec![
                ("Samples", stats.samples.to_string()),
                ("Latest", format!("{:.1}°C", stats.latest)),
                ("Average", format!("{:.1}°C", stats.average)),
                ("Range", format!("{:.1}°C .. {:.1}°C", stats.min, stats.max)),
                ("Humidity", format!("{:.0}%", stats.average_humidity)),
            ],
        );
        self.ui.chart(&grid);
        Ok(())
    }

    /// Handle chat command, one-shot when a message is given
    async fn handle_chat(&self, config: &Config, args: ChatArgs) -> Result<()> {
        let client = self.client(config)?;
        let models = Models::from(client.config());

        let image = match &args.image {
            Some(path) => Some(Attachment::from_path(path).await?),
            None => None,
        };

        if let Some(text) = args.message {
            let mut session = ChatSession::new(&client, models);
            let spinner = self.ui.spinner("Thinking...");
            let reply = session.send(&text, image).await;
            spinner.finish_and_clear();
            self.ui.message_bubble(reply?);
            return Ok(());
        }

        self.chat_loop(&client, models, image).await
    }

    async fn chat_loop(
        &self,
        client: &HttpClient,
        models: Models,
        mut pending_image: Option<Attachment>,
    ) -> Result<()> {
        let theme = ColorfulTheme::default();
        let mut session = ChatSession::new(client, models.clone());

        self.ui.header("Chat");
        self.ui
            .info("Type a message. /image <path> attaches a photo, /clear starts over, /quit leaves.");
        if let Some(image) = &pending_image {
            self.ui.info(&format!("Attached {}", image.file_name()));
        }

        loop {
            let line = match Input::<String>::with_theme(&theme)
                .with_prompt("You")
                .allow_empty(true)
                .interact_text()
            {
                Ok(line) => line,
                Err(e) => {
                    debug!(error = %e, "chat input closed");
                    break;
                }
            };

            let text = match ChatInput::parse(&line) {
                ChatInput::Quit => break,
                ChatInput::Clear => {
                    if session.conversation().is_empty() && pending_image.is_none() {
                        self.ui.info("Nothing to clear");
                    } else {
                        let count = session.conversation().len();
                        session = ChatSession::new(client, models.clone());
                        pending_image = None;
                        self.ui.success(&format!("Cleared {} messages", count));
                    }
                    continue;
                }
                ChatInput::Attach("") => {
                    self.ui.warning("Usage: /image <path>");
                    continue;
                }
                ChatInput::Attach(path) => {
                    match Attachment::from_path(Path::new(path)).await {
                        Ok(image) => {
                            self.ui.info(&format!("Attached {}", image.file_name()));
                            pending_image = Some(image);
                        }
                        Err(e) => self.ui.error(&e.to_string()),
                    }
                    continue;
                }
                ChatInput::Message(text) => text,
            };

            if text.is_empty() && pending_image.is_none() {
                continue;
            }

            let spinner = self.ui.spinner("Thinking...");
            let reply = session.send(text, pending_image.take()).await.cloned();
            spinner.finish_and_clear();

            match (reply, session.state()) {
                (Ok(message), _) => self.ui.message_bubble(&message),
                (Err(_), RequestState::Failed(reason)) => self.ui.error(&format!("Error: {}", reason)),
                (Err(e), _) => self.ui.error(&format!("Error: {}", e)),
            }
        }

        Ok(())
    }

    /// Handle recipe command, picking from the inventory when no items are given
    async fn handle_recipe(&self, config: &Config, args: RecipeArgs) -> Result<()> {
        let client = self.client(config)?;

        let selection: Selection = if args.items.is_empty() {
            let inventory = InventoryStore::new(config.inventory_path()).load()?;
            self.pick_items(&inventory)?
        } else {
            args.items.iter().collect()
        };

        let service = RecipeService::new(&client, Models::from(client.config()));
        let spinner = self.ui.spinner("Cooking up a recipe...");
        let recipe = service.generate(&selection).await;
        spinner.finish_and_clear();
        let recipe = recipe?;

        self.ui.header("Recipe");
        println!("{}", self.ui.emphasized(&recipe));
        println!();
        Ok(())
    }

    fn pick_items(&self, inventory: &Inventory) -> Result<Selection> {
        if inventory.is_empty() {
            return Err(FridgeError::invalid_input(
                "The inventory is empty, add items with `fridge items add`",
            ));
        }

        let picked = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt("Pick the items to cook with (space to select, enter to confirm)")
            .items(inventory.items())
            .interact()?;

        let mut selection = Selection::new();
        for index in picked {
            selection.toggle(&inventory.items()[index]);
        }
        Ok(selection)
    }

    /// Handle detect command
    async fn handle_detect(&self, config: &Config, args: DetectArgs) -> Result<()> {
        let client = self.client(config)?;
        let image = Attachment::from_path(&args.image).await?;
        let detector = FoodDetector::new(&client, Models::from(client.config()));

        if args.dry_run {
            let spinner = self.ui.spinner("Looking at the photo...");
            let label = detector.detect(&image).await;
            spinner.finish_and_clear();
            self.ui.success(&format!("Detected: {}", label?));
            return Ok(());
        }

        let store = InventoryStore::new(config.inventory_path());
        let mut inventory = store.load()?;

        let spinner = self.ui.spinner("Looking at the photo...");
        let detection = detector.detect_into(&image, &mut inventory).await;
        spinner.finish_and_clear();
        let detection = detection?;

        if detection.added {
            store.save(&inventory)?;
            self.ui
                .success(&format!("Detected {}, added to the inventory", detection.label));
        } else {
            self.ui
                .info(&format!("Detected {}, already in the inventory", detection.label));
        }
        Ok(())
    }

    /// Handle items command
    fn handle_items(&self, config: &Config, command: ItemsCommand) -> Result<()> {
        let store = InventoryStore::new(config.inventory_path());
        let mut inventory = store.load()?;

        match command {
            ItemsCommand::List => {
                self.ui.list("Fridge items", inventory.items());
                if let Some(updated_at) = inventory.updated_at() {
                    self.ui.info(&format!(
                        "Last changed {}",
                        updated_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
                    ));
                }
            }
            ItemsCommand::Add { name } => {
                if name.trim().is_empty() {
                    return Err(FridgeError::validation_field("Item name cannot be empty", "name"));
                }
                if inventory.add(&name) {
                    store.save(&inventory)?;
                    self.ui.success(&format!("Added {}", name.trim()));
                } else {
                    self.ui.warning(&format!("{} is already in the fridge", name.trim()));
                }
            }
            ItemsCommand::Remove { name } => {
                if inventory.remove(&name) {
                    store.save(&inventory)?;
                    self.ui.success(&format!("Removed {}", name.trim()));
                } else {
                    self.ui.warning(&format!("{} is not in the fridge", name.trim()));
                }
            }
        }
        Ok(())
    }
}
