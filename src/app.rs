//! 应用程序初始化和启动
//!
//! 负责 Tauri 应用的启动流程，包括：
//! - 日志系统初始化
//! - 各领域模块初始化
//! - 事件与日志转发到前端
//! - 命令注册

use std::sync::Arc;
use tauri::{Emitter, Manager};
use tracing::{info, warn};

use crate::commands::*;
use crate::logger;
use crate::utils::file_system::get_data_dir;
use crate::AppState;

/// 应用程序入口点
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // 创建日志广播器
    let log_broadcaster = Arc::new(logger::LogBroadcaster::new());

    // 初始化日志系统（带前端推送功能）
    logger::init_with_broadcaster(log_broadcaster.clone()).expect("Failed to initialize logger");

    tauri::Builder::default()
        .setup(move |app| {
            info!("初始化蛋白质计量器...");

            let data_dir = match app.path().app_data_dir() {
                Ok(dir) => dir,
                Err(e) => {
                    warn!("无法获取应用数据目录，使用默认目录: {}", e);
                    get_data_dir()
                }
            };
            std::fs::create_dir_all(&data_dir).map_err(|e| e.to_string())?;
            info!("数据目录: {:?}", data_dir);

            let state = tauri::async_runtime::block_on(AppState::initialize(
                &data_dir,
                log_broadcaster.clone(),
            ))
            .map_err(|e| e.to_string())?;

            // 事件总线 -> 前端
            {
                let handle = app.handle().clone();
                let mut events = state.event_bus.subscribe();
                tauri::async_runtime::spawn(async move {
                    loop {
                        match events.recv().await {
                            Ok(event) => {
                                if let Err(e) = handle.emit(event.name(), &event) {
                                    warn!("推送事件失败: {}", e);
                                }
                            }
                            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                                warn!("事件转发落后，丢弃 {} 条", n);
                            }
                            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        }
                    }
                });
            }

            // 日志 -> 前端
            {
                let handle = app.handle().clone();
                let mut logs = log_broadcaster.subscribe();
                tauri::async_runtime::spawn(async move {
                    loop {
                        match logs.recv().await {
                            Ok(log) => {
                                // 这里不能再打日志，否则会循环推送
                                let _ = handle.emit("log-message", &log);
                            }
                            Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => continue,
                            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        }
                    }
                });
            }

            app.manage(state);
            info!("应用初始化完成");
            Ok(())
        })
        .plugin(tauri_plugin_opener::init())
        .invoke_handler(tauri::generate_handler![
            lookup_barcode,
            search_products,
            submit_manual_entry,
            get_product_url,
            get_history,
            remove_history_item,
            clear_history,
            get_comparison_items,
            export_comparison,
            get_app_config,
            update_config,
            get_theme,
            set_theme,
            cycle_theme,
            set_log_push,
            open_data_folder,
            get_log_dir,
            open_log_folder,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
