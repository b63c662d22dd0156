// 商品数据模块
// 提供 Open Food Facts 商品查询、搜索以及营养数据提取

pub mod client;

pub use client::OpenFoodFactsClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// 商品营养成分（每100g）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Nutriments {
    #[serde(default, rename = "proteins_100g", deserialize_with = "lenient_number")]
    pub proteins_100g: Option<f64>,
    #[serde(default, rename = "energy-kcal_100g", deserialize_with = "lenient_number")]
    pub energy_kcal_100g: Option<f64>,
}

/// Open Food Facts 商品
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Product {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub nutriments: Option<Nutriments>,
}

/// 营养数据提取结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NutritionFacts {
    /// 每100g蛋白质（无法解析时为 0）
    pub protein_100g: f64,
    /// 每100g热量（无法解析时为 0）
    pub energy_kcal_100g: f64,
    /// 两项均有效
    pub has_valid_data: bool,
}

/// 商品数据来源
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// 按条码获取商品
    async fn get_product(&self, barcode: &str) -> Result<Product>;

    /// 按名称搜索商品
    async fn search_products(&self, query: &str) -> Result<Vec<Product>>;

    /// 商品详情页面地址
    fn product_url(&self, barcode: &str) -> String;
}

/// 提取营养数据
pub fn extract_nutrition(product: &Product) -> NutritionFacts {
    let nutriments = product.nutriments.clone().unwrap_or_default();
    let protein = nutriments.proteins_100g.filter(|v| v.is_finite());
    let energy = nutriments.energy_kcal_100g.filter(|v| v.is_finite());

    let has_valid_data = matches!(
        (protein, energy),
        (Some(p), Some(e)) if p >= 0.0 && e > 0.0
    );

    NutritionFacts {
        protein_100g: protein.unwrap_or(0.0),
        energy_kcal_100g: energy.unwrap_or(0.0),
        has_valid_data,
    }
}

/// 提取商品名称：product_name -> generic_name -> "N/A"
pub fn extract_product_name(product: &Product) -> String {
    [&product.product_name, &product.generic_name]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| "N/A".to_string())
}

/// 提取品牌名称
pub fn extract_brand_name(product: &Product) -> String {
    product.brands.clone().unwrap_or_default()
}

/// 数字字段可能是数字也可能是数字字符串，无法解析时视为缺失
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_leading_float(&s),
        _ => None,
    })
}

/// 解析字符串开头的数字部分（"12.5 g" -> 12.5）
fn parse_leading_float(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .take_while(|(i, c)| {
            c.is_ascii_digit() || *c == '.' || ((*c == '-' || *c == '+') && *i == 0)
        })
        .map(|(i, c)| i + c.len_utf8())
        .last()?;

    // 去掉末尾多余的小数点等非法形式
    let mut candidate = &s[..end];
    while !candidate.is_empty() {
        if let Ok(v) = candidate.parse::<f64>() {
            return Some(v);
        }
        candidate = &candidate[..candidate.len() - 1];
    }
    None
}
