use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "deck-of-many-things")]
#[command(about = "Shuffle and draw from the Deck of Many Things")]
pub struct CliConfig {
    /// Path to a TOML configuration file (defaults to ./deck.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Pristine deck used for new sessions
    #[arg(long, global = true)]
    pub default_deck: Option<PathBuf>,

    /// Where the in-progress session is saved
    #[arg(long, global = true)]
    pub working_deck: Option<PathBuf>,

    /// Where the remaining-cards report is written on exit
    #[arg(long, global = true)]
    pub report: Option<PathBuf>,

    /// Skip the shuffle animation
    #[arg(long, global = true)]
    pub no_animation: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    #[command(about = "Interactive session: shuffle, then pick cards from the spread")]
    Play,
    #[command(about = "Show which deck would be used and the cards left in it")]
    Status,
    #[command(about = "Shuffle the current deck and save it")]
    Shuffle,
    #[command(about = "Draw a card by name and remove it from the deck")]
    Draw { name: String },
    #[command(about = "Draw the top card of the deck")]
    DrawNext,
    #[command(about = "Save the current deck to another file")]
    Export { path: PathBuf },
    #[command(about = "Write the remaining-cards report and end the session")]
    Report,
    #[command(about = "Discard the saved session")]
    Reset,
}

impl CliConfig {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Play)
    }

    /// 載入配置檔 (指定或自動尋找)，再套用命令列覆蓋設定
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::discover()?,
        };

        if let Some(path) = &self.default_deck {
            config.paths.default_deck = path.clone();
        }
        if let Some(path) = &self.working_deck {
            config.paths.working_deck = path.clone();
        }
        if let Some(path) = &self.report {
            config.paths.report = path.clone();
        }
        if self.no_animation {
            config.shuffle.animation_frames = 0;
        }

        config.validate()?;
        Ok(config)
    }
}
