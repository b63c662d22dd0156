//! 文件系统操作工具
//!
//! 提供跨平台的目录定位、文件夹打开等功能

use std::path::{Path, PathBuf};
use tracing::info;

const APP_DIR_NAME: &str = "protein-meter";

/// 在系统文件管理器中打开文件夹
///
/// 根据不同操作系统使用对应的命令：
/// - Windows: explorer
/// - macOS: open
/// - Linux: xdg-open
pub fn open_folder_in_explorer(path: &Path) -> Result<(), String> {
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(|e| format!("创建目录失败: {}", e))?;
    }

    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    std::process::Command::new(program)
        .arg(path)
        .spawn()
        .map_err(|e| format!("无法打开文件夹: {}", e))?;

    Ok(())
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

/// 获取日志目录路径（跨平台）
///
/// - macOS: ~/Library/Logs/protein-meter
/// - Windows: %APPDATA%/protein-meter/logs
/// - Linux: ~/.local/share/protein-meter/logs
pub fn get_log_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        home_dir().join("Library/Logs").join(APP_DIR_NAME)
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join(APP_DIR_NAME).join("logs")
    } else {
        home_dir().join(".local/share").join(APP_DIR_NAME).join("logs")
    }
}

/// 获取数据目录路径（未由 Tauri 提供时使用）
///
/// - macOS: ~/Library/Application Support/protein-meter
/// - Windows: %APPDATA%/protein-meter/data
/// - Linux: ~/.local/share/protein-meter/data
pub fn get_data_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        home_dir()
            .join("Library/Application Support")
            .join(APP_DIR_NAME)
    } else if cfg!(target_os = "windows") {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join(APP_DIR_NAME).join("data")
    } else {
        home_dir().join(".local/share").join(APP_DIR_NAME).join("data")
    }
}

/// 打开日志文件夹
pub fn open_log_folder_impl() -> Result<(), String> {
    let log_dir = get_log_dir();
    info!("打开日志文件夹: {:?}", log_dir);
    open_folder_in_explorer(&log_dir)
}
