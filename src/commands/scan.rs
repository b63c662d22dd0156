//! 扫描相关命令
//!
//! 提供条码查询、商品搜索和手动录入接口

use crate::models::{ManualEntryForm, ProductDisplayData, SearchResult, SourceOperation};
use crate::AppState;

/// 按条码查询商品
///
/// # 参数
/// - `barcode`: 扫描得到或从搜索结果选中的条码
/// - `from_search`: 是否来自搜索结果
#[tauri::command]
pub async fn lookup_barcode(
    state: tauri::State<'_, AppState>,
    barcode: String,
    from_search: Option<bool>,
) -> Result<ProductDisplayData, String> {
    let source_operation = if from_search.unwrap_or(false) {
        SourceOperation::Search
    } else {
        SourceOperation::Scan
    };
    state
        .scan_domain
        .lookup_barcode(&barcode, source_operation)
        .await
}

/// 按名称搜索商品
#[tauri::command]
pub async fn search_products(
    state: tauri::State<'_, AppState>,
    query: String,
) -> Result<Vec<SearchResult>, String> {
    state.scan_domain.search(&query).await
}

/// 提交手动录入
#[tauri::command]
pub async fn submit_manual_entry(
    state: tauri::State<'_, AppState>,
    entry: ManualEntryForm,
) -> Result<ProductDisplayData, String> {
    state.scan_domain.submit_manual_entry(entry).await
}

/// 获取商品详情页面地址
#[tauri::command]
pub async fn get_product_url(
    state: tauri::State<'_, AppState>,
    barcode: String,
) -> Result<String, String> {
    state.scan_domain.product_url(&barcode).await
}
