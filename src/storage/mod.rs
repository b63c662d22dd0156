// 存储模块 - 键值存储抽象与历史记录存储

// 子模块
pub mod history;
pub mod kv;

// 重新导出主要类型
pub use history::{HistoryStore, HISTORY_STORAGE_KEY};
pub use kv::{FileKeyValueStore, KeyValueStore};
#[cfg(test)]
pub use kv::MemoryKeyValueStore;
