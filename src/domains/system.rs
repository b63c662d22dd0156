// 系统领域管理器
//
// 负责设置、主题和日志推送
// 包含 SettingsManager、ThemeManager 和 LogBroadcaster 三个核心组件

use std::sync::Arc;

use crate::logger::LogBroadcaster;
use crate::settings::SettingsManager;
use crate::theme::ThemeManager;

/// 系统领域管理器 - 负责设置、主题和日志
#[derive(Clone)]
pub struct SystemDomain {
    settings: Arc<SettingsManager>,
    theme: Arc<ThemeManager>,
    log_broadcaster: Arc<LogBroadcaster>,
}

impl SystemDomain {
    /// 创建新的系统领域管理器
    pub fn new(
        settings: Arc<SettingsManager>,
        theme: Arc<ThemeManager>,
        log_broadcaster: Arc<LogBroadcaster>,
    ) -> Self {
        Self {
            settings,
            theme,
            log_broadcaster,
        }
    }

    /// 获取设置管理器
    pub fn get_settings(&self) -> &Arc<SettingsManager> {
        &self.settings
    }

    /// 获取主题管理器
    pub fn get_theme(&self) -> &Arc<ThemeManager> {
        &self.theme
    }

    /// 获取日志广播器
    pub fn get_logger(&self) -> &Arc<LogBroadcaster> {
        &self.log_broadcaster
    }
}
