pub mod lifecycle;
pub mod query;
pub mod session;

pub use crate::domain::model::{Card, Deck, DeckDocument, DeckSource};
pub use crate::domain::ports::{ConfigProvider, DeckStore};
pub use crate::utils::error::Result;
pub use lifecycle::DeckManager;
