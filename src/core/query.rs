use crate::core::{Card, Deck, DeckManager, DeckStore};
use crate::utils::error::{DeckError, Result};
use rand::Rng;
use std::sync::Arc;

/// 提供網路用戶端唯讀的隨機抽牌
///
/// 持有自己的牌堆快照，不會拿到 session 正在修改的牌堆，可複製到多個 task。
#[derive(Debug, Clone, Default)]
pub struct DeckQuery {
    snapshot: Arc<Deck>,
}

impl DeckQuery {
    pub fn new(deck: Deck) -> Self {
        Self {
            snapshot: Arc::new(deck),
        }
    }

    /// 載入獨立副本：優先工作牌堆，其次預設牌堆，兩者都讀不到時為空牌堆
    pub fn load<S: DeckStore>(manager: &DeckManager<S>) -> Self {
        let sources = [manager.working_path(), manager.default_path()];
        for path in sources {
            if !manager.store().exists(path) {
                continue;
            }
            match manager.load(path) {
                Ok(deck) => return Self::new(deck),
                Err(e) => tracing::warn!("⚠️ Query service could not use {}: {}", path.display(), e),
            }
        }

        tracing::warn!("⚠️ No deck available, draw requests will be answered with 404");
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    pub fn draw_random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Card> {
        self.snapshot
            .choose(rng)
            .cloned()
            .ok_or(DeckError::EmptyDeckError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::LocalStorage;
    use crate::domain::model::fixtures::deck;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::path::Path;
    use tempfile::TempDir;

    #[test]
    fn test_single_card_deck_always_returns_it() {
        let query = DeckQuery::new(deck(&["Balance"]));
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(query.draw_random(&mut rng).unwrap().name, "Balance");
        }
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_empty_deck_is_error() {
        let query = DeckQuery::new(Deck::default());
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            query.draw_random(&mut rng),
            Err(DeckError::EmptyDeckError)
        ));
    }

    #[test]
    fn test_draw_does_not_consume() {
        let query = DeckQuery::new(deck(&["Comet", "Fates", "Gem"]));
        let mut rng = StdRng::seed_from_u64(9);
        let seen: HashSet<String> = (0..200)
            .map(|_| query.draw_random(&mut rng).unwrap().name)
            .collect();
        assert_eq!(seen.len(), 3);
        assert_eq!(query.len(), 3);
    }

    #[test]
    fn test_load_prefers_working_then_default() {
        let dir = TempDir::new().unwrap();
        let manager = DeckManager::new(LocalStorage::new(dir.path()), "working.json", "default.json");

        assert!(DeckQuery::load(&manager).is_empty());

        manager
            .save_to(&deck(&["Idiot", "Ruin"]), Path::new("default.json"))
            .unwrap();
        assert_eq!(DeckQuery::load(&manager).len(), 2);

        manager.save(&deck(&["Talons"])).unwrap();
        assert_eq!(DeckQuery::load(&manager).len(), 1);
    }
}
