// 蛋白质计算模块 - 计算蛋白质热量占比并进行分级
//
// 纯函数实现，无状态，每次调用重新计算

use serde::{Serialize, Serializer};
use std::fmt;

/// 每克蛋白质的热量（千卡）
pub const CALORIES_PER_GRAM_PROTEIN: f64 = 4.0;

/// 展示用百分比的上限
const DISPLAY_PERCENTAGE_CAP: f64 = 100.0;

/// 蛋白质等级标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProteinLabel {
    NotAvailable,
    Zero,
    Low,
    Okay,
    Good,
    Great,
    Amazing,
    Unreal,
}

impl ProteinLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotAvailable => "N/A",
            Self::Zero => "Zero",
            Self::Low => "Low",
            Self::Okay => "Okay",
            Self::Good => "Good",
            Self::Great => "Great",
            Self::Amazing => "Amazing!",
            Self::Unreal => "Unreal",
        }
    }

    /// 标签对应的颜色
    pub fn color_tag(&self) -> ColorTag {
        match self {
            Self::NotAvailable => ColorTag::Gray400,
            Self::Zero => ColorTag::Gray500,
            Self::Low => ColorTag::Red500,
            Self::Okay => ColorTag::Yellow500,
            Self::Good => ColorTag::Blue500,
            Self::Great => ColorTag::Green500,
            Self::Amazing => ColorTag::Purple600,
            Self::Unreal => ColorTag::Gray700,
        }
    }

    /// 根据百分比选择等级（百分比须为非负数）
    fn from_percentage(percentage: f64) -> Self {
        if percentage == 0.0 {
            Self::Zero
        } else if percentage < 15.0 {
            Self::Low
        } else if percentage < 30.0 {
            Self::Okay
        } else if percentage < 50.0 {
            Self::Good
        } else if percentage < 70.0 {
            Self::Great
        } else if percentage <= 100.0 {
            Self::Amazing
        } else {
            Self::Unreal
        }
    }
}

impl fmt::Display for ProteinLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProteinLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 进度条颜色标记
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTag {
    Gray400,
    Gray500,
    Gray700,
    Red500,
    Yellow500,
    Blue500,
    Green500,
    Purple600,
}

impl ColorTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gray400 => "bg-gray-400",
            Self::Gray500 => "bg-gray-500",
            Self::Gray700 => "bg-gray-700",
            Self::Red500 => "bg-red-500",
            Self::Yellow500 => "bg-yellow-500",
            Self::Blue500 => "bg-blue-500",
            Self::Green500 => "bg-green-500",
            Self::Purple600 => "bg-purple-600",
        }
    }

    /// 背景着色使用的淡色变体
    pub fn faded(&self) -> FadedColorTag {
        FadedColorTag(*self)
    }

    /// 对应的十六进制颜色（导出图片时使用）
    pub fn hex(&self) -> &'static str {
        match self {
            Self::Gray400 => "#9ca3af",
            Self::Gray500 => "#6b7280",
            Self::Gray700 => "#374151",
            Self::Red500 => "#ef4444",
            Self::Yellow500 => "#eab308",
            Self::Blue500 => "#3b82f6",
            Self::Green500 => "#22c55e",
            Self::Purple600 => "#9333ea",
        }
    }

    pub fn rgb(&self) -> [u8; 3] {
        match self {
            Self::Gray400 => [0x9c, 0xa3, 0xaf],
            Self::Gray500 => [0x6b, 0x72, 0x80],
            Self::Gray700 => [0x37, 0x41, 0x51],
            Self::Red500 => [0xef, 0x44, 0x44],
            Self::Yellow500 => [0xea, 0xb3, 0x08],
            Self::Blue500 => [0x3b, 0x82, 0xf6],
            Self::Green500 => [0x22, 0xc5, 0x5e],
            Self::Purple600 => [0x93, 0x33, 0xea],
        }
    }
}

impl fmt::Display for ColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColorTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 淡色标记，与 [`ColorTag`] 一一对应
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FadedColorTag(pub ColorTag);

impl FadedColorTag {
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            ColorTag::Gray400 => "bg-fade-gray-400",
            ColorTag::Gray500 => "bg-fade-gray-500",
            ColorTag::Gray700 => "bg-fade-gray-700",
            ColorTag::Red500 => "bg-fade-red-500",
            ColorTag::Yellow500 => "bg-fade-yellow-500",
            ColorTag::Blue500 => "bg-fade-blue-500",
            ColorTag::Green500 => "bg-fade-green-500",
            ColorTag::Purple600 => "bg-fade-purple-600",
        }
    }
}

impl fmt::Display for FadedColorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FadedColorTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 蛋白质分级结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProteinClassification {
    /// 实际百分比（无上限）
    pub actual_percentage: f64,
    /// 展示百分比（限制在 0-100）
    pub display_percentage: f64,
    pub label: ProteinLabel,
    pub color_tag: ColorTag,
    pub faded_color_tag: FadedColorTag,
}

impl ProteinClassification {
    /// 实际百分比的规范字符串（一位小数）
    pub fn actual_text(&self) -> String {
        format_fixed(self.actual_percentage, 1)
    }

    /// 展示百分比的规范字符串（一位小数）
    pub fn display_text(&self) -> String {
        format_fixed(self.display_percentage, 1)
    }

    pub fn is_available(&self) -> bool {
        self.label != ProteinLabel::NotAvailable
    }
}

// 前端使用字符串形式的百分比
impl Serialize for ProteinClassification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ProteinClassification", 5)?;
        state.serialize_field("actualPercentage", &self.actual_text())?;
        state.serialize_field("displayPercentage", &self.display_text())?;
        state.serialize_field("label", &self.label)?;
        state.serialize_field("colorTag", &self.color_tag)?;
        state.serialize_field("fadedColorTag", &self.faded_color_tag)?;
        state.end()
    }
}

/// 缺失或无效的营养字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingNutrient {
    Protein,
    Calories,
    ProteinAndCalories,
}

impl fmt::Display for MissingNutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 组合消息中字段顺序固定为 "protein & calories"
        let fields = match self {
            Self::Protein => "protein",
            Self::Calories => "calories",
            Self::ProteinAndCalories => "protein & calories",
        };
        write!(f, "Missing/invalid {}.", fields)
    }
}

impl Serialize for MissingNutrient {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 营养数据校验与计算结果
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NutritionOutcome {
    /// 校验失败时为 NaN
    pub percentage: f64,
    pub error: Option<MissingNutrient>,
}

impl NutritionOutcome {
    pub fn error_message(&self) -> Option<String> {
        self.error.map(|e| e.to_string())
    }
}

/// 计算蛋白质热量占总热量的百分比
///
/// 蛋白质为负、热量不大于 0、任一参数不是有限数或结果溢出时返回 NaN。
/// 此处不做舍入，舍入只在展示阶段进行。
pub fn calculate_percentage(protein_grams: f64, total_calories: f64) -> f64 {
    if !is_valid_protein(protein_grams) || !is_valid_calories(total_calories) {
        return f64::NAN;
    }

    let protein_calories = protein_grams * CALORIES_PER_GRAM_PROTEIN;
    let percentage = (protein_calories / total_calories) * 100.0;
    if percentage.is_finite() {
        percentage
    } else {
        f64::NAN
    }
}

fn is_valid_protein(protein_grams: f64) -> bool {
    protein_grams.is_finite() && protein_grams >= 0.0
}

fn is_valid_calories(calories: f64) -> bool {
    calories.is_finite() && calories > 0.0
}

/// 根据百分比生成分级信息
pub fn classify(percentage: f64) -> ProteinClassification {
    if !percentage.is_finite() || percentage < 0.0 {
        let label = ProteinLabel::NotAvailable;
        return ProteinClassification {
            actual_percentage: 0.0,
            display_percentage: 0.0,
            label,
            color_tag: label.color_tag(),
            faded_color_tag: label.color_tag().faded(),
        };
    }

    let label = ProteinLabel::from_percentage(percentage);
    ProteinClassification {
        actual_percentage: percentage,
        display_percentage: percentage.min(DISPLAY_PERCENTAGE_CAP),
        label,
        color_tag: label.color_tag(),
        faded_color_tag: label.color_tag().faded(),
    }
}

/// 校验营养数据并计算蛋白质百分比
pub fn process_nutrition(protein_grams: f64, calories: f64) -> NutritionOutcome {
    let error = match (is_valid_protein(protein_grams), is_valid_calories(calories)) {
        (false, false) => Some(MissingNutrient::ProteinAndCalories),
        (false, true) => Some(MissingNutrient::Protein),
        (true, false) => Some(MissingNutrient::Calories),
        (true, true) => None,
    };
    if let Some(error) = error {
        return NutritionOutcome {
            percentage: f64::NAN,
            error: Some(error),
        };
    }

    let percentage = calculate_percentage(protein_grams, calories);
    if percentage.is_nan() {
        // 两项各自有效但比值溢出，视为整组数据无效
        return NutritionOutcome {
            percentage,
            error: Some(MissingNutrient::ProteinAndCalories),
        };
    }

    NutritionOutcome {
        percentage,
        error: None,
    }
}

/// 精确展开 f64 所需的小数位数（最小次正规数有 1074 位小数）
const EXACT_DIGITS: usize = 1080;

/// 定点格式化
///
/// 按二进制值的精确十进制展开舍入；只有恰好位于两个候选值正中间时取绝对值较大者
/// （12.25 -> "12.3"，而 29.9499... -> "29.9"）。非有限数输出 "NaN" / "Infinity"。
pub fn format_fixed(value: f64, decimals: u32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let decimals = decimals as usize;
    // -0.0 按 0 输出
    let value = if value == 0.0 { 0.0 } else { value };

    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let Some(point) = exact.find('.') else {
        return format!("{:.*}", decimals, value);
    };
    let cut = point + 1 + decimals;
    let mut rest = exact[cut..].chars();
    let is_tie = rest.next() == Some('5') && rest.all(|c| c == '0');
    if !is_tie {
        return format!("{:.*}", decimals, value);
    }

    // 标准格式化对中点取偶，这里改为进位
    let truncated = if decimals == 0 {
        &exact[..point]
    } else {
        &exact[..cut]
    };
    let magnitude = increment_last_digit(truncated);
    if value < 0.0 {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

/// 十进制字符串末位加一（处理连续进位，"9.9" -> "10.0"）
fn increment_last_digit(digits: &str) -> String {
    let mut bytes: Vec<u8> = digits.bytes().collect();
    let mut i = bytes.len();
    loop {
        if i == 0 {
            bytes.insert(0, b'1');
            break;
        }
        i -= 1;
        match bytes[i] {
            b'.' => continue,
            b'9' => bytes[i] = b'0',
            _ => {
                bytes[i] += 1;
                break;
            }
        }
    }
    bytes.into_iter().map(char::from).collect()
}
