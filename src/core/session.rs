use crate::core::lifecycle::Shutdown;
use crate::core::{Card, Deck, DeckManager, DeckSource, DeckStore};
use crate::utils::error::{DeckError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoDeck,
    Loaded,
    /// 已洗牌並儲存，等待動畫結束
    Shuffling,
    Shuffled,
    Depleted,
    Finalized,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let v = match self {
            SessionState::NoDeck => "without a deck",
            SessionState::Loaded => "loaded",
            SessionState::Shuffling => "shuffling",
            SessionState::Shuffled => "shuffled",
            SessionState::Depleted => "depleted",
            SessionState::Finalized => "finalized",
        };
        write!(f, "{v}")
    }
}

/// 單一使用者 session 的牌堆擁有者，負責動作順序
///
/// 處理器取得 `&mut Session`，牌堆不由其他地方持有。每個操作成功就進入下一個狀態，
/// 失敗則牌堆與狀態都不變。
pub struct Session<S: DeckStore, R: Rng = StdRng> {
    manager: DeckManager<S>,
    report_path: PathBuf,
    deck: Deck,
    source: Option<DeckSource>,
    drawn: Vec<Card>,
    state: SessionState,
    rng: R,
}

impl<S: DeckStore> Session<S, StdRng> {
    pub fn new(manager: DeckManager<S>, report_path: impl Into<PathBuf>) -> Self {
        Self::with_rng(manager, report_path, StdRng::from_entropy())
    }
}

impl<S: DeckStore, R: Rng> Session<S, R> {
    pub fn with_rng(manager: DeckManager<S>, report_path: impl Into<PathBuf>, rng: R) -> Self {
        Self {
            manager,
            report_path: report_path.into(),
            deck: Deck::default(),
            source: None,
            drawn: Vec::new(),
            state: SessionState::NoDeck,
            rng,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn source(&self) -> Option<&DeckSource> {
        self.source.as_ref()
    }

    /// 載入牌堆後抽出的牌，依抽牌順序
    pub fn drawn(&self) -> &[Card] {
        &self.drawn
    }

    pub fn manager(&self) -> &DeckManager<S> {
        &self.manager
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub fn can_resume(&self) -> bool {
        self.state == SessionState::NoDeck && self.manager.has_resumable_deck()
    }

    /// 自動啟動：已存 session 直接進入選牌，新牌堆需先洗牌
    pub fn start(&mut self) -> Result<DeckSource> {
        self.ensure("start a session", &[SessionState::NoDeck])?;
        let (deck, source) = self.manager.resolve_startup_deck()?;
        let next = if source.is_resume() {
            Self::picking_state(&deck)
        } else {
            SessionState::Loaded
        };
        self.replace_deck(deck, source.clone(), next);
        Ok(source)
    }

    pub fn resume(&mut self) -> Result<()> {
        self.ensure("resume", &[SessionState::NoDeck])?;
        let deck = self.manager.load(self.manager.working_path())?;
        let next = Self::picking_state(&deck);
        self.replace_deck(deck, DeckSource::Working, next);
        Ok(())
    }

    pub fn start_fresh(&mut self) -> Result<()> {
        self.ensure("start a new deck", &[SessionState::NoDeck])?;
        let deck = self.manager.load_default()?;
        self.replace_deck(deck, DeckSource::Default, SessionState::Loaded);
        Ok(())
    }

    /// 載入使用者指定的牌堆檔，失敗時保留目前牌堆
    pub fn load_from(&mut self, path: &Path) -> Result<()> {
        self.ensure(
            "load a deck",
            &[
                SessionState::NoDeck,
                SessionState::Loaded,
                SessionState::Shuffled,
                SessionState::Depleted,
            ],
        )?;
        let deck = self.manager.load(path)?;
        self.replace_deck(deck, DeckSource::File(path.to_path_buf()), SessionState::Loaded);
        Ok(())
    }

    /// 洗牌並儲存，接著等待 [`Session::animation_complete`]
    pub fn begin_shuffle(&mut self) -> Result<()> {
        self.ensure("shuffle", &[SessionState::Loaded, SessionState::Shuffled])?;
        if self.deck.is_empty() {
            return Err(DeckError::EmptyDeckError);
        }
        self.deck = self.manager.shuffle(&self.deck, &mut self.rng)?;
        self.state = SessionState::Shuffling;
        Ok(())
    }

    pub fn animation_complete(&mut self) -> Result<()> {
        self.ensure("finish shuffling", &[SessionState::Shuffling])?;
        self.state = Self::picking_state(&self.deck);
        Ok(())
    }

    pub fn draw(&mut self, name: &str) -> Result<Card> {
        self.ensure("draw a card", &[SessionState::Shuffled])?;
        let drawn = self.manager.draw_and_remove(&self.deck, name)?;
        Ok(self.accept_draw(drawn))
    }

    pub fn draw_at(&mut self, position: usize) -> Result<Card> {
        self.ensure("draw a card", &[SessionState::Shuffled])?;
        let drawn = self.manager.draw_at(&self.deck, position)?;
        Ok(self.accept_draw(drawn))
    }

    pub fn draw_next(&mut self) -> Result<Card> {
        self.ensure("draw a card", &[SessionState::Shuffled])?;
        let drawn = self.manager.draw_next(&self.deck)?;
        Ok(self.accept_draw(drawn))
    }

    /// 牌堆耗盡且使用者選擇「新牌堆」：回到選單
    pub fn restart(&mut self) -> Result<()> {
        self.ensure("start over", &[SessionState::Depleted])?;
        self.deck = Deck::default();
        self.source = None;
        self.drawn.clear();
        self.state = SessionState::NoDeck;
        Ok(())
    }

    pub fn finalize(&mut self) -> Result<Shutdown> {
        self.ensure(
            "finish the session",
            &[SessionState::Shuffled, SessionState::Depleted],
        )?;
        let shutdown = self
            .manager
            .finalize_and_report(&self.deck, &self.report_path)?;
        self.state = SessionState::Finalized;
        Ok(shutdown)
    }

    fn accept_draw(&mut self, (card, remaining): (Card, Deck)) -> Card {
        self.deck = remaining;
        self.drawn.push(card.clone());
        self.state = Self::picking_state(&self.deck);
        card
    }

    fn replace_deck(&mut self, deck: Deck, source: DeckSource, next: SessionState) {
        tracing::debug!("Session now using the {} ({} cards)", source, deck.len());
        self.deck = deck;
        self.source = Some(source);
        self.drawn.clear();
        self.state = next;
    }

    fn picking_state(deck: &Deck) -> SessionState {
        if deck.is_empty() {
            SessionState::Depleted
        } else {
            SessionState::Shuffled
        }
    }

    fn ensure(&self, action: &str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(DeckError::InvalidStateError {
                action: action.to_string(),
                state: self.state.to_string(),
            })
        }
    }
}
