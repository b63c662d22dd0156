// 领域模块 - 用于组织应用的业务逻辑
//
// 按业务领域分组,实现单一职责原则
// 包含3个领域:扫描、历史、系统

pub mod history;
pub mod scan;
pub mod system;

pub use history::{ComparisonExport, HistoryDomain};
pub use scan::ScanDomain;
pub use system::SystemDomain;
