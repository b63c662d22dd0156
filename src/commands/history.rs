//! 历史记录命令
//!
//! 提供历史记录的查询、删除、清空以及对比图导出

use std::path::PathBuf;
use tracing::info;

use crate::domains::ComparisonExport;
use crate::models::HistoryRecord;
use crate::AppState;

/// 获取全部历史记录（最新在前）
#[tauri::command]
pub async fn get_history(state: tauri::State<'_, AppState>) -> Result<Vec<HistoryRecord>, String> {
    Ok(state.history_domain.list().await)
}

/// 删除一条历史记录
#[tauri::command]
pub async fn remove_history_item(
    state: tauri::State<'_, AppState>,
    timestamp: String,
) -> Result<Vec<HistoryRecord>, String> {
    Ok(state.history_domain.remove(&timestamp).await)
}

/// 清空历史记录
#[tauri::command]
pub async fn clear_history(state: tauri::State<'_, AppState>) -> Result<(), String> {
    info!("清空历史记录");
    state.history_domain.clear().await;
    Ok(())
}

/// 获取对比选择中的记录（保持历史顺序）
#[tauri::command]
pub async fn get_comparison_items(
    state: tauri::State<'_, AppState>,
    timestamps: Vec<String>,
) -> Result<Vec<HistoryRecord>, String> {
    Ok(state.history_domain.comparison_items(&timestamps).await)
}

/// 生成对比图
///
/// # 参数
/// - `timestamps`: 选中记录的时间戳
/// - `save_path`: 可选的保存路径
///
/// # 返回
/// - PNG 的 data URL 及保存位置
#[tauri::command]
pub async fn export_comparison(
    state: tauri::State<'_, AppState>,
    timestamps: Vec<String>,
    save_path: Option<String>,
) -> Result<ComparisonExport, String> {
    let save_path = save_path.map(PathBuf::from);
    state
        .history_domain
        .export_comparison(&timestamps, save_path.as_deref())
        .await
}
