// 导出模块 - 生成历史记录对比图

pub mod comparison;

pub use comparison::{encode_png, render_comparison, to_data_url, ComparisonLayout};
