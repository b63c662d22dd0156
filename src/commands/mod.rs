//! Tauri 命令模块
//!
//! 提供前端调用的所有 Tauri 命令接口，按功能分组：
//! - scan: 条码查询、搜索、手动录入
//! - history: 历史记录与对比图
//! - config: 配置与主题
//! - storage: 数据和日志目录

pub mod config;
pub mod history;
pub mod scan;
pub mod storage;

// 重新导出所有命令
pub use config::*;
pub use history::*;
pub use scan::*;
pub use storage::*;
