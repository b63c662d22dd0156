// 历史记录存储
//
// 持久化的有序列表（最新在前），支持连续重复抑制、按时间戳查询和清空。
// 所有操作都是全函数：读取失败退化为空列表，写入失败只记录日志。

use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::kv::KeyValueStore;
use crate::models::HistoryRecord;

/// 历史记录的存储键
pub const HISTORY_STORAGE_KEY: &str = "proteinMeterHistory";

/// 历史记录存储
#[derive(Clone)]
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            key: HISTORY_STORAGE_KEY.to_string(),
        }
    }

    /// 读取历史记录
    ///
    /// 不存在、无法解析或不是数组时返回空列表；数组中无法解析的元素会被跳过。
    pub fn load(&self) -> Vec<HistoryRecord> {
        let stored = match self.storage.get(&self.key) {
            Ok(Some(content)) if !content.is_empty() => content,
            Ok(_) => return Vec::new(),
            Err(e) => {
                error!("读取历史记录失败: {}", e);
                return Vec::new();
            }
        };

        let parsed: Value = match serde_json::from_str(&stored) {
            Ok(value) => value,
            Err(e) => {
                warn!("历史记录内容无法解析，按空列表处理: {}", e);
                return Vec::new();
            }
        };

        let Value::Array(items) = parsed else {
            warn!("历史记录内容不是数组，按空列表处理");
            return Vec::new();
        };

        items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<HistoryRecord>(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("跳过无效的历史记录条目: {}", e);
                    None
                }
            })
            .collect()
    }

    /// 覆盖写入全部历史记录（尽力而为，失败只记录日志）
    pub fn save(&self, records: &[HistoryRecord]) {
        let json = match serde_json::to_string(records) {
            Ok(json) => json,
            Err(e) => {
                error!("序列化历史记录失败: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(&self.key, &json) {
            error!("保存历史记录失败: {}", e);
        }
    }

    /// 添加记录到最前面
    ///
    /// 与当前最新一条构成连续重复时不做任何修改，也不写入存储。
    /// 只与最新一条比较，不做全局去重。
    pub fn add(&self, record: HistoryRecord) -> Vec<HistoryRecord> {
        let mut history = self.load();

        if let Some(most_recent) = history.first() {
            if record.is_consecutive_duplicate(most_recent) {
                debug!("忽略连续重复的历史记录: {}", record.product_name);
                return history;
            }
        }

        history.insert(0, record);
        self.save(&history);
        history
    }

    /// 按时间戳删除记录（无匹配时依然写回）
    pub fn remove(&self, timestamp: &str) -> Vec<HistoryRecord> {
        let mut history = self.load();
        history.retain(|item| item.timestamp != timestamp);
        self.save(&history);
        history
    }

    /// 清空历史
    pub fn clear(&self) {
        self.save(&[]);
    }

    /// 获取指定时间戳的记录，保持存储中的顺序（最新在前）
    pub fn get_by_timestamps<S: AsRef<str>>(&self, timestamps: &[S]) -> Vec<HistoryRecord> {
        let wanted: HashSet<&str> = timestamps.iter().map(|t| t.as_ref()).collect();
        self.load()
            .into_iter()
            .filter(|item| wanted.contains(item.timestamp.as_str()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.load().is_empty()
    }

    pub fn count(&self) -> usize {
        self.load().len()
    }
}
