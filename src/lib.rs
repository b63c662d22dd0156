// 蛋白质计量器 - 应用主库
//
// 核心逻辑（蛋白质分级、历史记录）与集成部分（商品接口、对比图、设置）
// 都在库中实现，桌面外壳通过 `desktop` feature 启用

// 声明模块
#[cfg(feature = "desktop")]
pub mod app;
pub mod calculator;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod domains;
pub mod event_bus;
pub mod export;
pub mod food_api;
pub mod logger;
pub mod models;
pub mod settings;
pub mod storage;
pub mod theme;
pub mod utils;

use std::path::Path;
use std::sync::Arc;
use tracing::info;

use domains::{HistoryDomain, ScanDomain, SystemDomain};
use event_bus::{AppEvent, EventBus};
use food_api::OpenFoodFactsClient;
use logger::LogBroadcaster;
use models::{AppConfig, PersistedAppConfig};
use settings::SettingsManager;
use storage::{FileKeyValueStore, HistoryStore};
use theme::ThemeManager;

#[cfg(feature = "desktop")]
pub use app::run;

/// 事件总线缓冲区大小
const EVENT_BUS_CAPACITY: usize = 256;

/// 应用状态（按领域分组）
///
/// - 扫描领域：负责条码查询、搜索和手动录入
/// - 历史领域：负责历史记录和对比图导出
/// - 系统领域：负责设置、主题和日志推送
/// - 事件总线：用于领域间解耦通信
#[derive(Clone)]
pub struct AppState {
    /// 扫描领域管理器
    pub scan_domain: Arc<ScanDomain>,
    /// 历史领域管理器
    pub history_domain: Arc<HistoryDomain>,
    /// 系统领域管理器
    pub system_domain: Arc<SystemDomain>,
    /// 事件总线
    pub event_bus: Arc<EventBus>,
}

impl AppState {
    /// 在数据目录下组装所有领域
    pub async fn initialize(
        data_dir: &Path,
        log_broadcaster: Arc<LogBroadcaster>,
    ) -> anyhow::Result<Self> {
        let event_bus = Arc::new(EventBus::new(EVENT_BUS_CAPACITY));

        let settings = Arc::new(SettingsManager::new(data_dir.join("settings.json")).await?);
        let config = settings.get().await;
        log_broadcaster.set_enabled(config.log_to_frontend);

        let kv = Arc::new(FileKeyValueStore::new(data_dir.join("storage"))?);
        let history_domain = HistoryDomain::new(HistoryStore::new(kv), event_bus.clone());
        info!("历史记录已加载: {} 条", history_domain.count().await);

        let client = Arc::new(OpenFoodFactsClient::new(&config.food_api)?);
        info!("商品接口: {}", client.base_url());
        let scan_domain = ScanDomain::new(client, history_domain.clone(), event_bus.clone());

        let theme = Arc::new(ThemeManager::new(settings.clone(), event_bus.clone()));
        let system_domain = SystemDomain::new(settings, theme, log_broadcaster);

        Ok(Self {
            scan_domain: Arc::new(scan_domain),
            history_domain: Arc::new(history_domain),
            system_domain: Arc::new(system_domain),
            event_bus,
        })
    }

    /// 应用配置更新，并让相关组件立即生效
    pub async fn apply_config(&self, update: AppConfig) -> anyhow::Result<PersistedAppConfig> {
        // 先构建客户端，无效的接口设置不会被持久化
        let client = match &update.food_api {
            Some(food_api) => Some(Arc::new(OpenFoodFactsClient::new(food_api)?)),
            None => None,
        };

        // 主题走主题管理器，以便发布 ThemeChanged
        if let Some(theme) = update.theme {
            self.system_domain.get_theme().set_theme(theme).await?;
        }

        let updated = self
            .system_domain
            .get_settings()
            .update(AppConfig {
                theme: None,
                ..update.clone()
            })
            .await?;

        if let Some(client) = client {
            self.scan_domain.replace_source(client).await;
            self.publish_config_updated("food_api");
        }

        if let Some(enabled) = update.log_to_frontend {
            self.system_domain.get_logger().set_enabled(enabled);
            self.publish_config_updated("log_to_frontend");
        }

        Ok(updated)
    }

    fn publish_config_updated(&self, config_type: &str) {
        self.event_bus.publish(AppEvent::ConfigUpdated {
            config_type: config_type.to_string(),
        });
    }
}
