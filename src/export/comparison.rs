// 对比图渲染
//
// 每条记录一行：左侧商品名，中间按展示百分比绘制圆角进度条，右侧为 "百分比% 等级"，
// 行间绘制分隔线。颜色和等级由实际百分比重新分级得到。

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use image::{ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use std::io::Cursor;

use crate::calculator::classify;
use crate::models::HistoryRecord;

const BACKGROUND: Rgba<u8> = Rgba([0xf7, 0xf7, 0xf7, 0xff]);
const SEPARATOR: Rgba<u8> = Rgba([0xdd, 0xdd, 0xdd, 0xff]);
const TEXT_COLOR: Rgba<u8> = Rgba([0x33, 0x33, 0x33, 0xff]);

const NAME_FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");
const PERCENTAGE_FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// 商品名字号（基础尺寸）
const NAME_FONT_SIZE: f32 = 15.0;
/// 百分比文字字号（基础尺寸）
const PERCENTAGE_FONT_SIZE: f32 = 12.0;
/// 截断后至少保留的字符数
const MIN_TRUNCATED_CHARS: usize = 10;

/// 对比图布局（基础尺寸，实际像素再乘以缩放系数）
#[derive(Debug, Clone, Copy)]
pub struct ComparisonLayout {
    pub scale: u32,
    pub row_height: u32,
    pub padding_vertical: u32,
    pub padding_horizontal: u32,
    pub name_left_margin: u32,
    pub name_max_width: u32,
    pub bar_height: u32,
    pub bar_max_length: u32,
    pub percentage_text_width: u32,
}

impl Default for ComparisonLayout {
    fn default() -> Self {
        Self {
            scale: 2,
            row_height: 60,
            padding_vertical: 15,
            padding_horizontal: 20,
            name_left_margin: 10,
            name_max_width: 250,
            bar_height: 25,
            bar_max_length: 300,
            percentage_text_width: 100,
        }
    }
}

impl ComparisonLayout {
    /// 进度条起始横坐标（基础尺寸）
    fn bar_start_x(&self) -> u32 {
        self.name_left_margin + self.name_max_width + 30
    }

    /// 画布尺寸（像素）
    pub fn canvas_size(&self, rows: u32) -> (u32, u32) {
        let width = self.bar_start_x()
            + self.bar_max_length
            + self.percentage_text_width
            + self.padding_horizontal
            + self.name_left_margin;
        let height = rows * self.row_height + (rows + 1) * self.padding_vertical;
        (width * self.scale, height * self.scale)
    }
}

/// 渲染对比图，至少需要一条记录
pub fn render_comparison(items: &[HistoryRecord], layout: &ComparisonLayout) -> Result<RgbaImage> {
    if items.is_empty() {
        return Err(anyhow!("没有可对比的记录"));
    }

    let s = layout.scale;
    let (width, height) = layout.canvas_size(items.len() as u32);
    let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);

    let name_font = load_font(NAME_FONT_DATA)?;
    let percentage_font = load_font(PERCENTAGE_FONT_DATA)?;
    let name_scale = PxScale::from(NAME_FONT_SIZE * s as f32);
    let percentage_scale = PxScale::from(PERCENTAGE_FONT_SIZE * s as f32);
    let name_x = ((layout.padding_horizontal + layout.name_left_margin) * s) as i32;
    let name_max_width = (layout.name_max_width * s) as f32;

    let row_height = layout.row_height * s;
    let padding_vertical = layout.padding_vertical * s;
    let padding_horizontal = layout.padding_horizontal * s;
    let bar_start_x = layout.bar_start_x() * s;
    let bar_height = layout.bar_height * s;
    let bar_max_length = layout.bar_max_length * s;
    let corner_radius = (5 * s).min(bar_height / 2);

    let mut current_y = padding_vertical;
    for (i, item) in items.iter().enumerate() {
        let name = truncate_to_width(
            &name_font,
            name_scale,
            &display_name(item),
            name_max_width,
        );
        draw_text_mut(
            &mut img,
            TEXT_COLOR,
            name_x,
            (current_y + 5 * s) as i32,
            name_scale,
            &name_font,
            &name,
        );

        let actual: f64 = item.protein_actual_percentage.parse().unwrap_or(0.0);
        let display: f64 = item.protein_display_percentage.parse().unwrap_or(0.0);
        let info = classify(actual);
        let color = info.color_tag.rgb();

        let fill_width = ((display / 100.0) * bar_max_length as f64).max(0.0).round() as u32;
        let bar_y = current_y + (row_height - bar_height) / 2;
        if fill_width > 0 {
            fill_rounded_rect(
                &mut img,
                bar_start_x,
                bar_y,
                fill_width.min(bar_max_length),
                bar_height,
                corner_radius,
                Rgba([color[0], color[1], color[2], 0xff]),
            );
        }

        // 文字垂直居中于行
        let percentage_text = format!("{}% {}", item.protein_actual_percentage, info.label);
        let text_height = {
            let scaled = percentage_font.as_scaled(percentage_scale);
            scaled.ascent() - scaled.descent()
        };
        let text_y = (current_y + row_height / 2) as f32 - text_height / 2.0;
        draw_text_mut(
            &mut img,
            TEXT_COLOR,
            (bar_start_x + bar_max_length + 15 * s) as i32,
            text_y.round() as i32,
            percentage_scale,
            &percentage_font,
            &percentage_text,
        );

        // 最后一行不画分隔线
        if i + 1 < items.len() {
            let line_y = current_y + row_height + padding_vertical / 2;
            for y in line_y..(line_y + s).min(height) {
                for x in padding_horizontal..width.saturating_sub(padding_horizontal) {
                    img.put_pixel(x, y, SEPARATOR);
                }
            }
        }

        current_y += row_height + padding_vertical;
    }

    Ok(img)
}

fn load_font(data: &'static [u8]) -> Result<FontRef<'static>> {
    FontRef::try_from_slice(data).map_err(|e| anyhow!("字体加载失败: {}", e))
}

/// 行内显示的名称，名称为空时按来源给出默认值
fn display_name(item: &HistoryRecord) -> String {
    if !item.product_name.is_empty() {
        item.product_name.clone()
    } else if item.is_manual {
        "Manual Entry".to_string()
    } else {
        "N/A".to_string()
    }
}

/// 文本渲染宽度（像素）
fn text_width(font: &impl Font, scale: PxScale, text: &str) -> f32 {
    let scaled = font.as_scaled(scale);
    let mut width = 0.0;
    let mut previous = None;
    for c in text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(previous) = previous {
            width += scaled.kern(previous, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// 超出最大宽度时每次去掉 4 个字符并追加 "..."，直到放得下或只剩 10 个字符
fn truncate_to_width(font: &impl Font, scale: PxScale, name: &str, max_width: f32) -> String {
    let mut chars: Vec<char> = name.chars().collect();
    let mut text = name.to_string();
    while text_width(font, scale, &text) > max_width && chars.len() > MIN_TRUNCATED_CHARS {
        chars.truncate(chars.len() - 4);
        chars.extend("...".chars());
        text = chars.iter().collect();
    }
    text
}

/// 填充圆角矩形，半径超过宽高一半时自动收缩
fn fill_rounded_rect(
    img: &mut RgbaImage,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    radius: u32,
    color: Rgba<u8>,
) {
    let radius = radius.min(width / 2).min(height / 2) as i64;
    let (w, h) = (width as i64, height as i64);

    for dy in 0..h {
        for dx in 0..w {
            // 到最近圆角圆心的距离
            let cx = if dx < radius {
                radius
            } else if dx >= w - radius {
                w - radius - 1
            } else {
                dx
            };
            let cy = if dy < radius {
                radius
            } else if dy >= h - radius {
                h - radius - 1
            } else {
                dy
            };
            let (ox, oy) = (dx - cx, dy - cy);
            if ox * ox + oy * oy > radius * radius {
                continue;
            }

            let (px, py) = (x as i64 + dx, y as i64 + dy);
            if px < img.width() as i64 && py < img.height() as i64 {
                img.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// 编码为 PNG
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

/// 转换为 data URL 供前端直接显示或下载
pub fn to_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(png))
}
