use crate::core::{Card, ConfigProvider, Deck, DeckDocument, DeckSource, DeckStore};
use crate::utils::error::{DeckError, Result};
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const REPORT_HEADER: &str = "Remaining Cards:";

/// [`DeckManager::finalize_and_report`] 的回傳值，拿到後呼叫端應正常結束
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shutdown {
    pub report_path: PathBuf,
    pub remaining: usize,
}

/// 載入、洗牌、抽牌、儲存與報告
///
/// 所有修改操作都以參照接收目前牌堆，新牌堆寫入工作路徑後才回傳，
/// 儲存失敗時呼叫端的牌堆維持原樣。
pub struct DeckManager<S: DeckStore> {
    store: S,
    working_path: PathBuf,
    default_path: PathBuf,
}

impl<S: DeckStore> DeckManager<S> {
    pub fn new(store: S, working_path: impl Into<PathBuf>, default_path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            working_path: working_path.into(),
            default_path: default_path.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(store: S, config: &C) -> Self {
        Self::new(store, config.working_deck(), config.default_deck())
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn working_path(&self) -> &Path {
        &self.working_path
    }

    pub fn default_path(&self) -> &Path {
        &self.default_path
    }

    pub fn load(&self, path: &Path) -> Result<Deck> {
        tracing::debug!("Loading deck from {}", path.display());

        if !self.store.exists(path) {
            return Err(DeckError::load(path, "file not found"));
        }

        let bytes = self
            .store
            .read(path)
            .map_err(|e| DeckError::load(path, e))?;
        let document: DeckDocument =
            serde_json::from_slice(&bytes).map_err(|e| DeckError::load(path, e))?;
        let deck = document.major_arcana;

        let duplicates = deck.duplicate_names();
        if !duplicates.is_empty() {
            tracing::warn!(
                "⚠️ {} contains duplicate card names: {}",
                path.display(),
                duplicates.join(", ")
            );
        }

        tracing::info!("📚 Loaded {} cards from {}", deck.len(), path.display());
        Ok(deck)
    }

    pub fn load_default(&self) -> Result<Deck> {
        self.load(&self.default_path)
    }

    pub fn has_working_deck(&self) -> bool {
        self.store.exists(&self.working_path)
    }

    /// 可供續玩的工作牌堆：能解析且仍有牌
    pub fn has_resumable_deck(&self) -> bool {
        self.has_working_deck()
            && self
                .load(&self.working_path)
                .map(|deck| !deck.is_empty())
                .unwrap_or(false)
    }

    /// 有可用的已存 session 時採用，否則使用預設牌堆
    ///
    /// 無法解析或已無牌的工作牌堆會略過並記錄警告；只有預設牌堆失敗才是錯誤。
    pub fn resolve_startup_deck(&self) -> Result<(Deck, DeckSource)> {
        if self.has_working_deck() {
            match self.load(&self.working_path) {
                Ok(deck) if !deck.is_empty() => {
                    tracing::info!("🔁 Resuming saved session ({} cards left)", deck.len());
                    return Ok((deck, DeckSource::Working));
                }
                Ok(_) => {
                    tracing::info!("Saved session has no cards left, starting a fresh deck");
                }
                Err(e) => {
                    tracing::warn!("⚠️ Ignoring unreadable working deck: {}", e);
                }
            }
        }

        let deck = self.load_default()?;
        Ok((deck, DeckSource::Default))
    }

    pub fn shuffle<R: Rng + ?Sized>(&self, deck: &Deck, rng: &mut R) -> Result<Deck> {
        let shuffled = deck.shuffled(rng);
        self.save(&shuffled)?;
        tracing::info!("🔀 Deck shuffled! ({} cards)", shuffled.len());
        Ok(shuffled)
    }

    pub fn draw_and_remove(&self, deck: &Deck, name: &str) -> Result<(Card, Deck)> {
        if deck.is_empty() {
            return Err(DeckError::EmptyDeckError);
        }

        match deck.positions_of(name).as_slice() {
            [] => Err(DeckError::not_found(name)),
            [position] => self.remove_and_save(deck, *position),
            many => Err(DeckError::AmbiguousCardError {
                name: name.to_string(),
                count: many.len(),
            }),
        }
    }

    /// 抽出牌陣中第 `position` 張 (從 0 開始)
    pub fn draw_at(&self, deck: &Deck, position: usize) -> Result<(Card, Deck)> {
        if deck.is_empty() {
            return Err(DeckError::EmptyDeckError);
        }
        if position >= deck.len() {
            return Err(DeckError::not_found(format!("#{}", position + 1)));
        }
        self.remove_and_save(deck, position)
    }

    pub fn draw_next(&self, deck: &Deck) -> Result<(Card, Deck)> {
        self.draw_at(deck, 0)
    }

    fn remove_and_save(&self, deck: &Deck, position: usize) -> Result<(Card, Deck)> {
        let (card, remaining) = deck
            .without(position)
            .ok_or_else(|| DeckError::not_found(format!("#{}", position + 1)))?;
        self.save(&remaining)?;
        tracing::info!("🃏 Drew {} ({} cards left)", card.name, remaining.len());
        Ok((card, remaining))
    }

    pub fn save(&self, deck: &Deck) -> Result<()> {
        self.save_to(deck, &self.working_path)
    }

    pub fn save_to(&self, deck: &Deck, path: &Path) -> Result<()> {
        let bytes = document_bytes(deck)?;
        self.store.write_atomic(path, &bytes)?;
        tracing::debug!("💾 Saved {} cards to {}", deck.len(), path.display());
        Ok(())
    }

    /// 「另存牌堆」：相同格式，任意目的地
    pub fn export(&self, deck: &Deck, path: &Path) -> Result<()> {
        self.save_to(deck, path)?;
        tracing::info!("💾 Deck saved successfully to {}", path.display());
        Ok(())
    }

    /// 移除已存 session，下次啟動改用預設牌堆
    pub fn reset(&self) -> Result<()> {
        self.store.remove(&self.working_path)?;
        tracing::info!("🧹 Removed working deck {}", self.working_path.display());
        Ok(())
    }

    /// 最後儲存一次牌堆再寫出報告。報告列出仍在牌堆中的牌，而非已抽出的牌。
    pub fn finalize_and_report(&self, deck: &Deck, report_path: &Path) -> Result<Shutdown> {
        self.save(deck)?;
        self.store
            .write_atomic(report_path, render_report(deck).as_bytes())?;

        tracing::info!(
            "📝 Report written to {} ({} cards remaining)",
            report_path.display(),
            deck.len()
        );
        Ok(Shutdown {
            report_path: report_path.to_path_buf(),
            remaining: deck.len(),
        })
    }
}

pub fn render_report(deck: &Deck) -> String {
    let mut report = String::from(REPORT_HEADER);
    report.push('\n');
    for name in deck.names() {
        report.push_str("- ");
        report.push_str(name);
        report.push('\n');
    }
    report
}

fn document_bytes(deck: &Deck) -> Result<Vec<u8>> {
    let document = DeckDocument::new(deck.clone());
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    document.serialize(&mut serializer)?;
    Ok(bytes)
}
