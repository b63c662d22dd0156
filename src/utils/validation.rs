//! 输入验证工具函数
//!
//! 校验前端传入的条码、搜索词、手动录入表单和对比选择

use regex::Regex;
use std::sync::OnceLock;

use crate::models::ManualEntryForm;

/// 对比图至少需要的条目数
pub const MIN_COMPARISON_ITEMS: usize = 2;

fn barcode_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4,32}$").expect("条码正则无效"))
}

/// 验证并规范化条码
///
/// # 返回
/// - `Ok(String)`: 去除首尾空白后的条码
/// - `Err(String)`: 错误信息
pub fn validate_barcode(barcode: &str) -> Result<String, String> {
    let trimmed = barcode.trim();
    if !barcode_pattern().is_match(trimmed) {
        return Err(format!("Invalid barcode: {}", trimmed));
    }
    Ok(trimmed.to_string())
}

/// 验证搜索关键词
pub fn validate_search_query(query: &str) -> Result<String, String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err("Please enter a food name to search.".to_string());
    }
    Ok(trimmed.to_string())
}

/// 验证手动录入表单，先检查热量再检查蛋白质
///
/// # 返回
/// - `Ok((protein, calories))`
pub fn validate_manual_entry(form: &ManualEntryForm) -> Result<(f64, f64), String> {
    let calories = form.calories.unwrap_or(f64::NAN);
    let protein = form.protein.unwrap_or(f64::NAN);

    if !calories.is_finite() || calories <= 0.0 {
        return Err("Please enter valid positive numbers for calories.".to_string());
    }
    if !protein.is_finite() || protein < 0.0 {
        return Err("Please enter valid positive numbers for protein (protein can be 0).".to_string());
    }
    Ok((protein, calories))
}

/// 验证对比选择的条目数
pub fn validate_comparison_size(count: usize) -> Result<(), String> {
    if count < MIN_COMPARISON_ITEMS {
        return Err("Select at least two items to compare.".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(calories: Option<f64>, protein: Option<f64>) -> ManualEntryForm {
        ManualEntryForm {
            name: "Oats".to_string(),
            calories,
            protein,
        }
    }

    #[test]
    fn test_validate_barcode() {
        assert_eq!(validate_barcode(" 3017620422003 ").unwrap(), "3017620422003");
        assert_eq!(
            validate_barcode(" 12a45678 ").unwrap_err(),
            "Invalid barcode: 12a45678"
        );
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("123").is_err());
        assert!(validate_barcode("../../etc").is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  tofu ").unwrap(), "tofu");
        assert_eq!(
            validate_search_query("   ").unwrap_err(),
            "Please enter a food name to search."
        );
    }

    #[test]
    fn test_validate_manual_entry() {
        assert_eq!(validate_manual_entry(&form(Some(380.0), Some(13.0))).unwrap(), (13.0, 380.0));
        assert_eq!(validate_manual_entry(&form(Some(50.0), Some(0.0))).unwrap(), (0.0, 50.0));

        assert_eq!(
            validate_manual_entry(&form(Some(0.0), Some(-1.0))).unwrap_err(),
            "Please enter valid positive numbers for calories."
        );
        assert_eq!(
            validate_manual_entry(&form(Some(100.0), None)).unwrap_err(),
            "Please enter valid positive numbers for protein (protein can be 0)."
        );
        assert!(validate_manual_entry(&form(None, Some(5.0))).is_err());
        assert!(validate_manual_entry(&form(Some(f64::INFINITY), Some(5.0))).is_err());
        assert!(validate_manual_entry(&form(Some(100.0), Some(f64::INFINITY))).is_err());
    }

    #[test]
    fn test_validate_comparison_size() {
        assert!(validate_comparison_size(1).is_err());
        assert!(validate_comparison_size(2).is_ok());
    }
}
