// 历史领域管理器
//
// 负责历史记录的读写、对比选择和对比图导出
// 所有读-改-写操作在同一把锁内完成，同一进程内的命令不会交错

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::event_bus::{AppEvent, EventBus};
use crate::export::{self, ComparisonLayout};
use crate::models::HistoryRecord;
use crate::storage::HistoryStore;
use crate::utils::validate_comparison_size;

/// 对比图导出结果
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonExport {
    pub data_url: String,
    pub item_count: usize,
    pub saved_path: Option<String>,
}

/// 历史领域管理器
#[derive(Clone)]
pub struct HistoryDomain {
    store: Arc<Mutex<HistoryStore>>,
    event_bus: Arc<EventBus>,
}

impl HistoryDomain {
    /// 创建新的历史领域管理器
    pub fn new(store: HistoryStore, event_bus: Arc<EventBus>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            event_bus,
        }
    }

    /// 全部历史（最新在前）
    pub async fn list(&self) -> Vec<HistoryRecord> {
        self.store.lock().await.load()
    }

    /// 添加记录，连续重复时不改变历史
    pub async fn add(&self, record: HistoryRecord) -> Vec<HistoryRecord> {
        let history = self.store.lock().await.add(record);
        self.publish_updated(history.len());
        history
    }

    /// 按时间戳删除
    pub async fn remove(&self, timestamp: &str) -> Vec<HistoryRecord> {
        let history = self.store.lock().await.remove(timestamp);
        info!("删除历史记录: {}", timestamp);
        self.publish_updated(history.len());
        history
    }

    /// 清空历史
    pub async fn clear(&self) {
        self.store.lock().await.clear();
        info!("历史记录已清空");
        self.publish_updated(0);
    }

    pub async fn count(&self) -> usize {
        self.store.lock().await.count()
    }

    /// 获取对比选择中仍存在于历史里的记录
    pub async fn comparison_items(&self, timestamps: &[String]) -> Vec<HistoryRecord> {
        self.store.lock().await.get_by_timestamps(timestamps)
    }

    /// 生成对比图，可选保存到文件
    pub async fn export_comparison(
        &self,
        timestamps: &[String],
        save_path: Option<&Path>,
    ) -> Result<ComparisonExport, String> {
        let items = self.comparison_items(timestamps).await;
        if items.len() < timestamps.len() {
            warn!(
                "对比选择中有 {} 条记录已不存在",
                timestamps.len() - items.len()
            );
        }
        validate_comparison_size(items.len())?;

        let png = render_png(&items).map_err(|e| format!("Error generating image: {}", e))?;

        let saved_path = match save_path {
            Some(path) => {
                tokio::fs::write(path, &png)
                    .await
                    .map_err(|e| format!("保存对比图失败: {}", e))?;
                info!("对比图已保存: {:?}", path);
                Some(path.to_string_lossy().to_string())
            }
            None => None,
        };

        self.event_bus.publish(AppEvent::ComparisonGenerated {
            item_count: items.len(),
            bytes: png.len(),
        });

        Ok(ComparisonExport {
            data_url: export::to_data_url(&png),
            item_count: items.len(),
            saved_path,
        })
    }

    fn publish_updated(&self, count: usize) {
        self.event_bus.publish(AppEvent::HistoryUpdated { count });
    }
}

fn render_png(items: &[HistoryRecord]) -> Result<Vec<u8>> {
    let img = export::render_comparison(items, &ComparisonLayout::default())?;
    export::encode_png(&img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKeyValueStore;

    fn record(name: &str, timestamp: &str) -> HistoryRecord {
        HistoryRecord {
            barcode: None,
            product_name: name.to_string(),
            protein_actual_percentage: "30.0".to_string(),
            protein_display_percentage: "30.0".to_string(),
            protein_label: "Good".to_string(),
            color_tag: "bg-blue-500".to_string(),
            faded_color_tag: "bg-fade-blue-500".to_string(),
            protein_grams: "7.5".to_string(),
            energy_kcal: "100".to_string(),
            timestamp: timestamp.to_string(),
            error_message: None,
            is_manual: true,
        }
    }

    fn domain() -> (HistoryDomain, Arc<EventBus>) {
        let bus = Arc::new(EventBus::new(32));
        let store = HistoryStore::new(Arc::new(MemoryKeyValueStore::new()));
        (HistoryDomain::new(store, bus.clone()), bus)
    }

    #[tokio::test]
    async fn test_add_remove_publish_events() {
        let (history, bus) = domain();
        let mut receiver = bus.subscribe();

        history.add(record("A", "t1")).await;
        history.add(record("B", "t2")).await;
        assert_eq!(history.count().await, 2);

        history.remove("t1").await;
        assert_eq!(history.list().await[0].product_name, "B");

        history.clear().await;
        assert_eq!(history.count().await, 0);

        let mut counts = Vec::new();
        while let Ok(AppEvent::HistoryUpdated { count }) = receiver.try_recv() {
            counts.push(count);
        }
        assert_eq!(counts, vec![1, 2, 1, 0]);
    }

    #[tokio::test]
    async fn test_export_requires_two_items() {
        let (history, _bus) = domain();
        history.add(record("A", "t1")).await;

        let err = history
            .export_comparison(&["t1".to_string(), "gone".to_string()], None)
            .await
            .unwrap_err();
        assert_eq!(err, "Select at least two items to compare.");
    }

    #[tokio::test]
    async fn test_export_writes_png() {
        let (history, _bus) = domain();
        history.add(record("A", "t1")).await;
        history.add(record("B", "t2")).await;

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("food_comparison.png");
        let export = history
            .export_comparison(&["t1".to_string(), "t2".to_string()], Some(&path))
            .await
            .unwrap();

        assert_eq!(export.item_count, 2);
        assert!(export.data_url.starts_with("data:image/png;base64,"));
        assert!(path.exists());
        assert_eq!(export.saved_path.as_deref(), Some(path.to_string_lossy().as_ref()));
    }
}
