// 領域層：牌卡/牌堆模型與生命週期依賴的介面

pub mod model;
pub mod ports;
