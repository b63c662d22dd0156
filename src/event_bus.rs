// 事件总线 - 用于模块间解耦通信
//
// 实现发布/订阅模式,消除模块间的直接依赖关系
// 使用 tokio::sync::broadcast 实现高效的事件分发
// 总线由启动流程显式创建并注入各个组件，不使用全局单例

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::{ProductDisplayData, SourceOperation, ThemeMode};

/// 应用事件枚举 - 定义所有可能的系统事件
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AppEvent {
    // --- 扫描事件 ---

    /// 识别到条码
    BarcodeScanned { barcode: String },

    /// 查询或搜索失败
    ScanFailed {
        error: String,
        barcode: Option<String>,
    },

    /// 商品结果已生成
    #[serde(rename_all = "camelCase")]
    ProductResult {
        data: ProductDisplayData,
        source_operation: SourceOperation,
    },

    // --- 历史事件 ---

    /// 历史记录已变化
    HistoryUpdated { count: usize },

    /// 对比图片已生成
    #[serde(rename_all = "camelCase")]
    ComparisonGenerated { item_count: usize, bytes: usize },

    // --- 系统事件 ---

    /// 主题切换
    #[serde(rename_all = "camelCase")]
    ThemeChanged {
        theme: ThemeMode,
        previous_theme: ThemeMode,
    },

    /// 配置更新事件
    #[serde(rename_all = "camelCase")]
    ConfigUpdated { config_type: String },
}

impl AppEvent {
    /// 推送到前端时使用的事件名
    pub fn name(&self) -> &'static str {
        match self {
            Self::BarcodeScanned { .. } => "barcode-scanned",
            Self::ScanFailed { .. } => "scan-error",
            Self::ProductResult { .. } => "product-result",
            Self::HistoryUpdated { .. } => "history-updated",
            Self::ComparisonGenerated { .. } => "comparison-generated",
            Self::ThemeChanged { .. } => "theme-changed",
            Self::ConfigUpdated { .. } => "config-updated",
        }
    }
}

/// 事件总线 - 用于模块间解耦通信
///
/// 使用 broadcast channel 实现发布/订阅模式
/// 支持多个订阅者同时接收事件
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// 创建新的事件总线
    ///
    /// # 参数
    /// - `capacity`: 事件缓冲区大小,建议 100-1000
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// 发布事件
    ///
    /// 如果没有订阅者,事件会被丢弃(这是正常的)
    pub fn publish(&self, event: AppEvent) {
        match self.sender.send(event) {
            Ok(receiver_count) => {
                tracing::trace!("事件已发布，订阅者数量: {}", receiver_count);
            }
            Err(_) => {
                tracing::trace!("事件已发布但无订阅者");
            }
        }
    }

    /// 订阅事件
    ///
    /// 返回一个接收器,可以用 `.recv().await` 接收事件
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// 获取当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
