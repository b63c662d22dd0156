use std::path::PathBuf;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{AppConfig, PersistedAppConfig, ThemeMode};

pub struct SettingsManager {
    path: PathBuf,
    data: RwLock<PersistedAppConfig>,
}

impl SettingsManager {
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let initial = match tokio::fs::read(&path).await {
            Ok(bytes) if !bytes.is_empty() => serde_json::from_slice::<PersistedAppConfig>(&bytes)
                .unwrap_or_else(|e| {
                    warn!("配置文件解析失败，使用默认配置: {}", e);
                    PersistedAppConfig::default()
                }),
            _ => {
                let default = PersistedAppConfig::default();
                let json = serde_json::to_string_pretty(&default)?;
                tokio::fs::write(&path, json).await?;
                default
            }
        };

        Ok(Self {
            path,
            data: RwLock::new(initial),
        })
    }

    pub async fn get(&self) -> PersistedAppConfig {
        self.data.read().await.clone()
    }

    pub async fn update(&self, update: AppConfig) -> Result<PersistedAppConfig> {
        let mut config = self.data.write().await;

        if let Some(theme) = update.theme {
            config.theme = theme;
        }
        if let Some(food_api) = update.food_api {
            config.food_api = food_api;
        }
        if let Some(enabled) = update.log_to_frontend {
            config.log_to_frontend = enabled;
        }

        self.save(&config).await?;
        Ok(config.clone())
    }

    /// 只更新主题
    pub async fn set_theme(&self, theme: ThemeMode) -> Result<()> {
        self.update(AppConfig {
            theme: Some(theme),
            ..Default::default()
        })
        .await
        .map(|_| ())
    }

    async fn save(&self, config: &PersistedAppConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoodApiSettings;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_settings_created_with_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config").join("settings.json");

        let settings = SettingsManager::new(path.clone()).await.unwrap();
        assert_eq!(settings.get().await, PersistedAppConfig::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_settings_update_persists() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");

        let settings = SettingsManager::new(path.clone()).await.unwrap();
        settings
            .update(AppConfig {
                food_api: Some(FoodApiSettings {
                    timeout_secs: 10,
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await
            .unwrap();
        settings.set_theme(ThemeMode::Dark).await.unwrap();

        let reopened = SettingsManager::new(path).await.unwrap();
        let config = reopened.get().await;
        assert_eq!(config.theme, ThemeMode::Dark);
        assert_eq!(config.food_api.timeout_secs, 10);
    }

    #[tokio::test]
    async fn test_corrupt_settings_fall_back_to_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let settings = SettingsManager::new(path).await.unwrap();
        assert_eq!(settings.get().await, PersistedAppConfig::default());
    }
}
