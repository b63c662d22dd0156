//! 存储目录命令
//!
//! 提供数据目录和日志目录的访问

use tauri::Manager;
use tracing::info;

use crate::utils::file_system::{get_log_dir as get_log_dir_impl, open_folder_in_explorer, open_log_folder_impl};

/// 打开数据文件夹
#[tauri::command]
pub async fn open_data_folder(app: tauri::AppHandle) -> Result<(), String> {
    let data_dir = app
        .path()
        .app_data_dir()
        .map_err(|e| format!("获取数据目录失败: {}", e))?;
    info!("打开数据文件夹: {:?}", data_dir);
    open_folder_in_explorer(&data_dir)
}

/// 获取日志目录
#[tauri::command]
pub async fn get_log_dir() -> Result<String, String> {
    Ok(get_log_dir_impl().to_string_lossy().to_string())
}

/// 打开日志文件夹
#[tauri::command]
pub async fn open_log_folder() -> Result<(), String> {
    open_log_folder_impl()
}
