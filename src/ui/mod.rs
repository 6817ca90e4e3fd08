// 展示層：使用者看到的一切，由 core::session::Session 驅動

pub mod animation;
pub mod assets;
pub mod layout;
pub mod terminal;

pub use animation::ShuffleAnimation;
pub use assets::AssetResolver;
pub use terminal::TerminalUi;
