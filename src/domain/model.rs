use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub theme: String,
    pub effect: String,
    pub image: String,
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Card: {}\nTheme: {}\nEffect: {}",
            self.name, self.theme, self.effect
        )
    }
}

/// 尚未抽出的牌，牌頂在前
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Deck(Vec<Card>);

impl Deck {
    pub fn new(cards: Vec<Card>) -> Self {
        Self(cards)
    }

    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|card| card.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|card| card.name == name)
    }

    pub fn positions_of(&self, name: &str) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, card)| card.name == name)
            .map(|(i, _)| i)
            .collect()
    }

    /// 出現超過一次的名稱，依首次出現順序
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for name in self.names() {
            let count = counts.entry(name).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(name);
            }
        }
        duplicates
    }

    pub fn shuffled<R: Rng + ?Sized>(&self, rng: &mut R) -> Deck {
        let mut cards = self.0.clone();
        cards.shuffle(rng);
        Deck(cards)
    }

    /// 回傳抽出的牌與剩餘牌堆，`self` 保持不變
    pub fn without(&self, position: usize) -> Option<(Card, Deck)> {
        if position >= self.0.len() {
            return None;
        }
        let mut cards = self.0.clone();
        let card = cards.remove(position);
        Some((card, Deck(cards)))
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&Card> {
        self.0.choose(rng)
    }
}

/// 預設牌堆、工作牌堆與匯出檔共用的檔案格式
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckDocument {
    #[serde(rename = "MajorArcana")]
    pub major_arcana: Deck,
}

impl DeckDocument {
    pub fn new(deck: Deck) -> Self {
        Self { major_arcana: deck }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckSource {
    /// 已儲存、進行到一半的 session
    Working,
    /// 隨應用程式附帶的原始牌堆
    Default,
    File(PathBuf),
}

impl DeckSource {
    pub fn is_resume(&self) -> bool {
        matches!(self, DeckSource::Working)
    }
}

impl Display for DeckSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeckSource::Working => write!(f, "working deck"),
            DeckSource::Default => write!(f, "default deck"),
            DeckSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}
