// 数据模型模块 - 定义所有的数据结构

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::calculator::ProteinClassification;

/// 历史记录（创建后不可变，以时间戳作为标识）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// 商品条码（手动录入时为空）
    pub barcode: Option<String>,
    pub product_name: String,
    pub protein_actual_percentage: String,
    pub protein_display_percentage: String,
    pub protein_label: String,
    pub color_tag: String,
    pub faded_color_tag: String,
    /// 每100g蛋白质克数（一位小数）
    pub protein_grams: String,
    /// 每100g热量（整数）
    pub energy_kcal: String,
    /// ISO-8601 时间戳
    pub timestamp: String,
    pub error_message: Option<String>,
    pub is_manual: bool,
}

impl HistoryRecord {
    /// 由展示数据构造历史记录
    pub fn from_display(data: &ProductDisplayData, timestamp: String) -> Self {
        Self {
            barcode: data.barcode.clone(),
            product_name: data.product_name.clone(),
            protein_actual_percentage: data.protein_info.actual_text(),
            protein_display_percentage: data.protein_info.display_text(),
            protein_label: data.protein_info.label.to_string(),
            color_tag: data.protein_info.color_tag.to_string(),
            faded_color_tag: data.protein_info.faded_color_tag.to_string(),
            protein_grams: data.protein_grams.clone(),
            energy_kcal: data.energy_kcal.clone(),
            timestamp,
            error_message: data.calculation_error.clone(),
            is_manual: data.is_manual,
        }
    }

    /// 是否与另一条记录构成连续重复
    ///
    /// 不比较时间戳和错误信息。
    pub fn is_consecutive_duplicate(&self, other: &HistoryRecord) -> bool {
        self.barcode == other.barcode
            && self.product_name == other.product_name
            && self.protein_grams == other.protein_grams
            && self.energy_kcal == other.energy_kcal
            && self.is_manual == other.is_manual
            && self.protein_actual_percentage == other.protein_actual_percentage
    }
}

/// 生成当前时间的 ISO-8601 时间戳（毫秒精度，UTC）
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 结果来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceOperation {
    Scan,
    Search,
    Manual,
}

/// 前端展示的商品结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDisplayData {
    pub product_name: String,
    pub protein_info: ProteinClassification,
    pub protein_grams: String,
    pub energy_kcal: String,
    pub barcode: Option<String>,
    pub calculation_error: Option<String>,
    pub is_manual: bool,
    pub source_operation: SourceOperation,
    /// Open Food Facts 商品页面
    pub product_url: Option<String>,
}

impl ProductDisplayData {
    /// 计算成功且等级有效时才写入历史
    pub fn should_record(&self) -> bool {
        self.calculation_error.is_none() && self.protein_info.is_available()
    }
}

/// 手动录入表单
///
/// 前端输入无法解析时传 null。
#[derive(Debug, Clone, Deserialize)]
pub struct ManualEntryForm {
    #[serde(default)]
    pub name: String,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
}

/// 搜索结果条目
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub barcode: String,
    pub product_name: String,
    pub brand: String,
    pub protein_100g: f64,
    pub energy_kcal_100g: f64,
    pub has_valid_data: bool,
}

/// 主题模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemeMode {
    /// 循环顺序：system -> light -> dark -> system
    pub fn next(self) -> Self {
        match self {
            Self::System => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// 实际生效的主题
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveTheme {
    Light,
    Dark,
}

/// 商品数据接口设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodApiSettings {
    /// API基础URL
    pub base_url: String,
    /// 请求超时（秒）
    pub timeout_secs: u64,
    /// 搜索每页数量
    pub search_page_size: u32,
}

impl Default for FoodApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org".to_string(),
            timeout_secs: 30,
            search_page_size: 20,
        }
    }
}

/// 应用配置（部分更新）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 主题
    pub theme: Option<ThemeMode>,
    /// 商品接口设置
    pub food_api: Option<FoodApiSettings>,
    /// 是否推送日志到前端
    pub log_to_frontend: Option<bool>,
}

/// 持久化的应用配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedAppConfig {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default)]
    pub food_api: FoodApiSettings,
    #[serde(default = "default_log_to_frontend")]
    pub log_to_frontend: bool,
}

fn default_log_to_frontend() -> bool {
    true
}

impl Default for PersistedAppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            food_api: FoodApiSettings::default(),
            log_to_frontend: default_log_to_frontend(),
        }
    }
}
