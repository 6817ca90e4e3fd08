// 轉接層：外部系統的具體實作 (檔案系統、http)

pub mod http;
pub mod storage;
