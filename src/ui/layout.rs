//! 半圓形排列的牌陣
//!
//! 牌位沿上半圓由左 (角度 π) 排到右 (角度 0)，第 `i` 個牌位對應牌堆位置 `i`。

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub position: usize,
    /// 弧度，左端為 π，右端為 0
    pub angle: f32,
    pub x: f32,
    /// 距離基線的高度，不會是負數
    pub y: f32,
}

pub fn semicircle_slots(count: usize, radius: f32) -> Vec<Slot> {
    (0..count)
        .map(|position| {
            let angle = if count == 1 {
                PI / 2.0
            } else {
                PI - PI * position as f32 / (count - 1) as f32
            };
            Slot {
                position,
                angle,
                x: radius * angle.cos(),
                y: (radius * angle.sin()).max(0.0),
            }
        })
        .collect()
}

/// 讓從 1 開始的編號不互相重疊所需的欄寬
pub fn spread_width(count: usize) -> usize {
    (count * 4 + 8).clamp(24, 120)
}

/// 把編號牌位 (從 1 開始) 畫到文字格上。終端機字元約為高二寬一，所以垂直半徑減半。
pub fn render_spread(count: usize, width: usize) -> Vec<String> {
    if count == 0 || width < 8 {
        return Vec::new();
    }

    let radius_x = (width as f32 - 4.0) / 2.0;
    let radius_y = (radius_x / 2.0).max(1.0);
    let height = radius_y.ceil() as usize + 1;
    let center = width as f32 / 2.0;
    let mut grid = vec![vec![' '; width]; height];

    for slot in semicircle_slots(count, 1.0) {
        let label = (slot.position + 1).to_string();
        let col = (center + slot.x * radius_x - label.len() as f32 / 2.0).round();
        let row = (height - 1) as f32 - (slot.y * radius_y).round();
        let start = (col.max(0.0) as usize).min(width - label.len());
        let row = row.max(0.0) as usize;
        for (offset, ch) in label.chars().enumerate() {
            grid[row][start + offset] = ch;
        }
    }

    grid.into_iter()
        .map(|line| line.into_iter().collect::<String>().trim_end().to_string())
        .collect()
}
