//! 配置管理命令
//!
//! 提供应用配置的读取和更新接口，包括：
//! - 应用配置的获取和更新
//! - 主题切换
//! - 日志推送开关

use crate::models::{AppConfig, PersistedAppConfig, ThemeMode};
use crate::AppState;
use tracing::info;

/// 获取应用配置
#[tauri::command]
pub async fn get_app_config(
    state: tauri::State<'_, AppState>,
) -> Result<PersistedAppConfig, String> {
    Ok(state.system_domain.get_settings().get().await)
}

/// 更新配置
#[tauri::command]
pub async fn update_config(
    state: tauri::State<'_, AppState>,
    config: AppConfig,
) -> Result<PersistedAppConfig, String> {
    state.apply_config(config).await.map_err(|e| e.to_string())
}

/// 获取主题
#[tauri::command]
pub async fn get_theme(state: tauri::State<'_, AppState>) -> Result<ThemeMode, String> {
    Ok(state.system_domain.get_theme().get_theme().await)
}

/// 设置主题
#[tauri::command]
pub async fn set_theme(
    state: tauri::State<'_, AppState>,
    theme: ThemeMode,
) -> Result<ThemeMode, String> {
    state
        .system_domain
        .get_theme()
        .set_theme(theme)
        .await
        .map_err(|e| e.to_string())
}

/// 循环切换主题
#[tauri::command]
pub async fn cycle_theme(state: tauri::State<'_, AppState>) -> Result<ThemeMode, String> {
    state
        .system_domain
        .get_theme()
        .cycle_theme()
        .await
        .map_err(|e| e.to_string())
}

/// 设置日志推送开关
#[tauri::command]
pub async fn set_log_push(
    state: tauri::State<'_, AppState>,
    enabled: bool,
) -> Result<PersistedAppConfig, String> {
    info!("日志推送: {}", if enabled { "开启" } else { "关闭" });
    state
        .apply_config(AppConfig {
            log_to_frontend: Some(enabled),
            ..Default::default()
        })
        .await
        .map_err(|e| e.to_string())
}
