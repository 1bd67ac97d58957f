// 该文件是 Shougu （手骨） 项目的一部分。
// src/transform.rs - 归一化坐标到像素坐标的转换
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use crate::{
  landmark::{HAND_LANDMARKS, LANDMARK_COUNT},
  model::{HandDetection, NormalizedLandmark},
  skeleton::{PixelPoint, SkeletonRecord},
};

/// 坐标保留的小数位数
pub const COORD_DECIMALS: usize = 2;

/// 四舍五入到 `COORD_DECIMALS` 位小数。
///
/// 先按精确二进制值格式化为十进制（平局取偶），再解析回最接近的 f64，
/// 与十进制 `round(v, 2)` 的结果一致。
pub fn round_coord(value: f64) -> f64 {
  format!("{:.*}", COORD_DECIMALS, value)
    .parse()
    .unwrap_or(value)
}

/// 将 21 个归一化关键点按固定顺序转换为像素坐标
pub fn transform(
  landmarks: &[NormalizedLandmark; LANDMARK_COUNT],
  width: u32,
  height: u32,
) -> [PixelPoint; LANDMARK_COUNT] {
  let (w, h) = (width as f64, height as f64);
  HAND_LANDMARKS.map(|landmark| {
    let lm = landmarks[landmark.index()];
    [round_coord(lm.x * w), round_coord(lm.y * h)]
  })
}

/// 由一只手的检测结果构造骨架记录
pub fn to_skeleton(hand: &HandDetection, width: u32, height: u32) -> SkeletonRecord {
  SkeletonRecord::new(
    Some(hand.handedness),
    transform(&hand.landmarks, width, height),
  )
}
