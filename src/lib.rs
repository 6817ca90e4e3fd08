pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod ui;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::storage::LocalStorage;
pub use crate::core::{lifecycle::DeckManager, query::DeckQuery, session::Session};
pub use domain::model::{Card, Deck, DeckSource};
pub use utils::error::{DeckError, Result};
