// 扫描领域管理器
//
// 负责条码查询、商品搜索和手动录入，把营养数据转换为展示结果并写入历史

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::history::HistoryDomain;
use crate::calculator::{classify, format_fixed, process_nutrition};
use crate::event_bus::{AppEvent, EventBus};
use crate::food_api::{self, ProductSource};
use crate::models::{
    now_timestamp, HistoryRecord, ManualEntryForm, ProductDisplayData, SearchResult,
    SourceOperation,
};
use crate::utils::{validate_barcode, validate_manual_entry, validate_search_query};

/// 手动录入未填写名称时的默认名称
const MANUAL_ENTRY_NAME: &str = "Manual Entry";

/// 扫描领域管理器
#[derive(Clone)]
pub struct ScanDomain {
    source: Arc<RwLock<Arc<dyn ProductSource>>>,
    history: HistoryDomain,
    event_bus: Arc<EventBus>,
}

impl ScanDomain {
    /// 创建新的扫描领域管理器
    pub fn new(
        source: Arc<dyn ProductSource>,
        history: HistoryDomain,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            source: Arc::new(RwLock::new(source)),
            history,
            event_bus,
        }
    }

    /// 替换商品数据来源（接口配置更新后调用）
    pub async fn replace_source(&self, source: Arc<dyn ProductSource>) {
        *self.source.write().await = source;
        info!("商品数据来源已更新");
    }

    async fn current_source(&self) -> Arc<dyn ProductSource> {
        self.source.read().await.clone()
    }

    /// 商品详情页面地址
    pub async fn product_url(&self, barcode: &str) -> Result<String, String> {
        let barcode = validate_barcode(barcode)?;
        Ok(self.current_source().await.product_url(&barcode))
    }

    /// 按条码查询商品并计算蛋白质占比
    ///
    /// 扫码和从搜索结果中选择都走这里，`source_operation` 区分来源。
    pub async fn lookup_barcode(
        &self,
        barcode: &str,
        source_operation: SourceOperation,
    ) -> Result<ProductDisplayData, String> {
        let barcode = match validate_barcode(barcode) {
            Ok(barcode) => barcode,
            Err(message) => {
                warn!("{}", message);
                self.event_bus.publish(AppEvent::ScanFailed {
                    error: message.clone(),
                    barcode: Some(barcode.trim().to_string()),
                });
                return Err(message);
            }
        };
        self.event_bus.publish(AppEvent::BarcodeScanned {
            barcode: barcode.clone(),
        });

        let source = self.current_source().await;
        let product = match source.get_product(&barcode).await {
            Ok(product) => product,
            Err(e) => {
                error!("查询商品 {} 失败: {}", barcode, e);
                let message = format!("Failed to fetch product data: {}. Please try again.", e);
                self.event_bus.publish(AppEvent::ScanFailed {
                    error: message.clone(),
                    barcode: Some(barcode),
                });
                return Err(message);
            }
        };

        let nutrition = food_api::extract_nutrition(&product);
        let data = build_display_data(
            food_api::extract_product_name(&product),
            nutrition.protein_100g,
            nutrition.energy_kcal_100g,
            Some(barcode.clone()),
            source_operation,
            Some(source.product_url(&barcode)),
        );

        self.finish(data).await
    }

    /// 按名称搜索商品，丢弃没有条码的结果
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, String> {
        let query = validate_search_query(query)?;

        let products = match self.current_source().await.search_products(&query).await {
            Ok(products) => products,
            Err(e) => {
                error!("搜索 \"{}\" 失败: {}", query, e);
                let message = format!("Search failed: {}. Check connection or try again.", e);
                self.event_bus.publish(AppEvent::ScanFailed {
                    error: message.clone(),
                    barcode: None,
                });
                return Err(message);
            }
        };

        let results = products
            .iter()
            .filter_map(|product| {
                let barcode = product.code.clone().filter(|c| !c.is_empty())?;
                let nutrition = food_api::extract_nutrition(product);
                Some(SearchResult {
                    barcode,
                    product_name: food_api::extract_product_name(product),
                    brand: food_api::extract_brand_name(product),
                    protein_100g: nutrition.protein_100g,
                    energy_kcal_100g: nutrition.energy_kcal_100g,
                    has_valid_data: nutrition.has_valid_data,
                })
            })
            .collect();

        Ok(results)
    }

    /// 提交手动录入
    pub async fn submit_manual_entry(
        &self,
        form: ManualEntryForm,
    ) -> Result<ProductDisplayData, String> {
        let (protein, calories) = validate_manual_entry(&form)?;

        let name = form.name.trim();
        let name = if name.is_empty() {
            MANUAL_ENTRY_NAME.to_string()
        } else {
            name.to_string()
        };

        let data = build_display_data(name, protein, calories, None, SourceOperation::Manual, None);
        self.finish(data).await
    }

    /// 发布结果，计算成功时写入历史
    async fn finish(&self, data: ProductDisplayData) -> Result<ProductDisplayData, String> {
        if data.should_record() {
            self.history
                .add(HistoryRecord::from_display(&data, now_timestamp()))
                .await;
            info!(
                "已记录 {}: {}% ({})",
                data.product_name,
                data.protein_info.actual_text(),
                data.protein_info.label
            );
        }

        self.event_bus.publish(AppEvent::ProductResult {
            source_operation: data.source_operation,
            data: data.clone(),
        });

        Ok(data)
    }
}

/// 由营养数据构造展示结果
pub fn build_display_data(
    product_name: String,
    protein_grams: f64,
    calories: f64,
    barcode: Option<String>,
    source_operation: SourceOperation,
    product_url: Option<String>,
) -> ProductDisplayData {
    let outcome = process_nutrition(protein_grams, calories);

    ProductDisplayData {
        product_name,
        protein_info: classify(outcome.percentage),
        protein_grams: format_fixed(protein_grams, 1),
        energy_kcal: format_fixed(calories, 0),
        is_manual: source_operation == SourceOperation::Manual,
        barcode,
        calculation_error: outcome.error_message(),
        source_operation,
        product_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food_api::Product;
    use crate::storage::{HistoryStore, MemoryKeyValueStore};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use serde_json::json;

    /// 固定数据的商品来源
    struct FakeSource {
        products: Vec<Product>,
    }

    #[async_trait]
    impl ProductSource for FakeSource {
        async fn get_product(&self, barcode: &str) -> Result<Product> {
            self.products
                .iter()
                .find(|p| p.code.as_deref() == Some(barcode))
                .cloned()
                .ok_or_else(|| anyhow!("Product not found"))
        }

        async fn search_products(&self, query: &str) -> Result<Vec<Product>> {
            if query == "offline" {
                return Err(anyhow!("Search request timed out"));
            }
            Ok(self.products.clone())
        }

        fn product_url(&self, barcode: &str) -> String {
            format!("https://example.test/product/{}", barcode)
        }
    }

    fn product(value: serde_json::Value) -> Product {
        serde_json::from_value(value).unwrap()
    }

    fn setup() -> (ScanDomain, HistoryDomain, Arc<EventBus>) {
        let bus = Arc::new(EventBus::new(64));
        let history = HistoryDomain::new(
            HistoryStore::new(Arc::new(MemoryKeyValueStore::new())),
            bus.clone(),
        );
        let source = Arc::new(FakeSource {
            products: vec![
                product(json!({
                    "code": "11112222",
                    "product_name": "Skyr",
                    "brands": "Siggi's",
                    "nutriments": { "proteins_100g": 11, "energy-kcal_100g": 63 }
                })),
                product(json!({
                    "code": "33334444",
                    "generic_name": "Cola",
                    "nutriments": { "proteins_100g": 0 }
                })),
                product(json!({ "product_name": "No barcode" })),
            ],
        });
        let scan = ScanDomain::new(source, history.clone(), bus.clone());
        (scan, history, bus)
    }

    #[tokio::test]
    async fn test_lookup_barcode_records_history() {
        let (scan, history, _bus) = setup();

        let data = scan
            .lookup_barcode("11112222", SourceOperation::Scan)
            .await
            .unwrap();
        assert_eq!(data.product_name, "Skyr");
        assert_eq!(data.protein_grams, "11.0");
        assert_eq!(data.energy_kcal, "63");
        assert_eq!(data.protein_info.actual_text(), "69.8");
        assert_eq!(data.protein_info.label.as_str(), "Great");
        assert_eq!(
            data.product_url.as_deref(),
            Some("https://example.test/product/11112222")
        );

        let records = history.list().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].barcode.as_deref(), Some("11112222"));
        assert!(!records[0].is_manual);

        // 连续重复扫描不会产生新记录
        scan.lookup_barcode("11112222", SourceOperation::Scan)
            .await
            .unwrap();
        assert_eq!(history.count().await, 1);
    }

    #[tokio::test]
    async fn test_lookup_with_invalid_nutrition_is_not_recorded() {
        let (scan, history, _bus) = setup();

        let data = scan
            .lookup_barcode("33334444", SourceOperation::Search)
            .await
            .unwrap();
        assert_eq!(data.product_name, "Cola");
        assert_eq!(
            data.calculation_error.as_deref(),
            Some("Missing/invalid calories.")
        );
        assert_eq!(data.protein_info.label.as_str(), "N/A");
        assert_eq!(history.count().await, 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_publishes_scan_error() {
        let (scan, _history, bus) = setup();
        let mut receiver = bus.subscribe();

        let err = scan
            .lookup_barcode("99999999", SourceOperation::Scan)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            "Failed to fetch product data: Product not found. Please try again."
        );

        assert!(matches!(receiver.try_recv(), Ok(AppEvent::BarcodeScanned { .. })));
        match receiver.try_recv() {
            Ok(AppEvent::ScanFailed { error, barcode }) => {
                assert_eq!(error, err);
                assert_eq!(barcode.as_deref(), Some("99999999"));
            }
            other => panic!("未收到扫描失败事件: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lookup_rejects_malformed_barcode() {
        let (scan, history, bus) = setup();
        let mut receiver = bus.subscribe();

        let err = scan
            .lookup_barcode(" abc ", SourceOperation::Scan)
            .await
            .unwrap_err();
        assert_eq!(err, "Invalid barcode: abc");

        match receiver.try_recv() {
            Ok(AppEvent::ScanFailed { error, barcode }) => {
                assert_eq!(error, err);
                assert_eq!(barcode.as_deref(), Some("abc"));
            }
            other => panic!("未收到扫描失败事件: {:?}", other),
        }
        assert!(receiver.try_recv().is_err());
        assert_eq!(history.count().await, 0);
    }

    #[tokio::test]
    async fn test_search_drops_products_without_barcode() {
        let (scan, _history, _bus) = setup();

        let results = scan.search("  yogurt ").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].brand, "Siggi's");
        assert!(results[0].has_valid_data);
        assert!(!results[1].has_valid_data);

        let err = scan.search("offline").await.unwrap_err();
        assert_eq!(
            err,
            "Search failed: Search request timed out. Check connection or try again."
        );
        assert!(scan.search("").await.is_err());
    }

    #[tokio::test]
    async fn test_manual_entry() {
        let (scan, history, bus) = setup();
        let mut receiver = bus.subscribe();

        let data = scan
            .submit_manual_entry(ManualEntryForm {
                name: "  ".to_string(),
                calories: Some(200.0),
                protein: Some(25.0),
            })
            .await
            .unwrap();
        assert_eq!(data.product_name, "Manual Entry");
        assert!(data.is_manual);
        assert!(data.barcode.is_none());
        assert_eq!(data.protein_info.actual_text(), "50.0");

        let records = history.list().await;
        assert_eq!(records.len(), 1);
        assert!(records[0].is_manual);

        let mut product_events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            if let AppEvent::ProductResult { .. } = event {
                product_events.push(serde_json::to_value(&event).unwrap());
            }
        }
        assert_eq!(product_events.len(), 1);
        assert_eq!(product_events[0]["type"], "productResult");
        assert_eq!(product_events[0]["sourceOperation"], "manual");
        assert_eq!(product_events[0]["data"]["isManual"], true);

        let err = scan
            .submit_manual_entry(ManualEntryForm {
                name: "Oats".to_string(),
                calories: Some(0.0),
                protein: Some(10.0),
            })
            .await
            .unwrap_err();
        assert_eq!(err, "Please enter valid positive numbers for calories.");
        assert_eq!(history.count().await, 1);
    }

    #[test]
    fn test_build_display_data_formats_numbers() {
        let data = build_display_data(
            "Bar".to_string(),
            20.25,
            252.5,
            None,
            SourceOperation::Manual,
            None,
        );
        assert_eq!(data.protein_grams, "20.3");
        assert_eq!(data.energy_kcal, "253");
        assert!(data.should_record());
    }
}
