use crate::utils::error::Result;
use std::path::Path;

/// 牌堆文件與報告的位元組層級儲存
///
/// `write_atomic` 不可在 `path` 留下寫到一半的檔案：讀取者只會看到舊內容或新內容。
pub trait DeckStore {
    fn exists(&self, path: &Path) -> bool;
    fn read(&self, path: &Path) -> Result<Vec<u8>>;
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()>;
    fn remove(&self, path: &Path) -> Result<()>;
}

pub trait ConfigProvider {
    fn default_deck(&self) -> &Path;
    fn working_deck(&self) -> &Path;
    fn report_path(&self) -> &Path;
    fn image_folder(&self) -> &Path;
    fn sound_folder(&self) -> &Path;
}
