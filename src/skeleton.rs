// 该文件是 Shougu （手骨） 项目的一部分。
// src/skeleton.rs - 手部骨架记录
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

use crate::landmark::{HAND_LANDMARKS, HandLandmark, LANDMARK_COUNT};
use crate::model::Handedness;

/// 像素坐标 [x, y]
pub type PixelPoint = [f64; 2];

/// 单只手的骨架：按 [`HAND_LANDMARKS`] 顺序排列的 21 个像素坐标
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonRecord {
  handedness: Option<Handedness>,
  points: [PixelPoint; LANDMARK_COUNT],
}

impl SkeletonRecord {
  pub fn new(handedness: Option<Handedness>, points: [PixelPoint; LANDMARK_COUNT]) -> Self {
    Self { handedness, points }
  }

  /// 检测器给出的左右手；从骨架文件读回的记录没有该信息
  pub fn handedness(&self) -> Option<Handedness> {
    self.handedness
  }

  pub fn points(&self) -> &[PixelPoint; LANDMARK_COUNT] {
    &self.points
  }

  pub fn point(&self, landmark: HandLandmark) -> PixelPoint {
    self.points[landmark.index()]
  }

  pub fn iter(&self) -> impl Iterator<Item = (HandLandmark, PixelPoint)> + '_ {
    HAND_LANDMARKS.iter().copied().zip(self.points.iter().copied())
  }
}
