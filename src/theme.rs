// 主题管理 - 维护主题模式并通知订阅者
//
// 由启动流程创建，注入设置管理器和事件总线

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::event_bus::{AppEvent, EventBus};
use crate::models::{EffectiveTheme, ThemeMode};
use crate::settings::SettingsManager;

/// 主题管理器
pub struct ThemeManager {
    settings: Arc<SettingsManager>,
    event_bus: Arc<EventBus>,
}

impl ThemeManager {
    pub fn new(settings: Arc<SettingsManager>, event_bus: Arc<EventBus>) -> Self {
        Self {
            settings,
            event_bus,
        }
    }

    /// 当前主题模式
    pub async fn get_theme(&self) -> ThemeMode {
        self.settings.get().await.theme
    }

    /// 设置主题，持久化后发布 ThemeChanged 事件
    pub async fn set_theme(&self, theme: ThemeMode) -> Result<ThemeMode> {
        let previous_theme = self.get_theme().await;
        self.settings.set_theme(theme).await?;

        info!("主题切换: {} -> {}", previous_theme.as_str(), theme.as_str());
        self.event_bus.publish(AppEvent::ThemeChanged {
            theme,
            previous_theme,
        });
        Ok(theme)
    }

    /// 按 system -> light -> dark 循环切换
    pub async fn cycle_theme(&self) -> Result<ThemeMode> {
        let next = self.get_theme().await.next();
        self.set_theme(next).await
    }

    /// 实际生效的主题，`prefers_dark` 为系统偏好
    pub async fn effective_theme(&self, prefers_dark: bool) -> EffectiveTheme {
        resolve_theme(self.get_theme().await, prefers_dark)
    }
}

pub fn resolve_theme(mode: ThemeMode, prefers_dark: bool) -> EffectiveTheme {
    match mode {
        ThemeMode::Dark => EffectiveTheme::Dark,
        ThemeMode::Light => EffectiveTheme::Light,
        ThemeMode::System if prefers_dark => EffectiveTheme::Dark,
        ThemeMode::System => EffectiveTheme::Light,
    }
}
