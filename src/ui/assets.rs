use crate::core::{Card, ConfigProvider};
use std::path::{Path, PathBuf};

pub const SHUFFLE_SOUND: &str = "shuffle.wav";

/// 找出卡牌對應的圖片與音效檔。缺少素材不算錯誤，卡牌照常顯示。
#[derive(Debug, Clone)]
pub struct AssetResolver {
    image_folder: PathBuf,
    sound_folder: PathBuf,
}

impl AssetResolver {
    pub fn new(image_folder: impl Into<PathBuf>, sound_folder: impl Into<PathBuf>) -> Self {
        Self {
            image_folder: image_folder.into(),
            sound_folder: sound_folder.into(),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.image_folder(), config.sound_folder())
    }

    /// 優先使用卡牌的 `image`，找不到時改用 `<Name_With_Underscores>.png`
    pub fn image_for(&self, card: &Card) -> Option<PathBuf> {
        let fallback = format!("{}.png", card.name.replace(' ', "_"));
        let found = [card.image.as_str(), fallback.as_str()]
            .into_iter()
            .filter(|name| !name.is_empty())
            .map(|name| self.image_folder.join(name))
            .find(|path| path.is_file());

        if found.is_none() {
            tracing::debug!("Image for {} not found. Skipping image.", card.name);
        }
        found
    }

    pub fn shuffle_sound(&self) -> Option<PathBuf> {
        let path = self.sound_folder.join(SHUFFLE_SOUND);
        if path.is_file() {
            Some(path)
        } else {
            tracing::debug!("Shuffle sound not found. Skipping sound.");
            None
        }
    }

    pub fn image_folder(&self) -> &Path {
        &self.image_folder
    }
}
