// 该文件是 Shougu （手骨） 项目的一部分。
// src/model.rs - 手部关键点检测模型
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

use std::fmt;

use serde::Deserialize;

use crate::landmark::LANDMARK_COUNT;

/// 外部检测器能力：输入一帧图像，输出检测结果
pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 左右手分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Handedness {
  Left,
  Right,
}

impl fmt::Display for Handedness {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Handedness::Left => f.write_str("Left"),
      Handedness::Right => f.write_str("Right"),
    }
  }
}

/// 归一化关键点，x/y 为相对图像宽高的比例 (0..1)，z 为相对深度
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct NormalizedLandmark {
  pub x: f64,
  pub y: f64,
  #[serde(default)]
  pub z: f64,
}

/// 世界坐标系下的关键点（米），原点位于手的几何中心
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct WorldLandmark {
  pub x: f64,
  pub y: f64,
  pub z: f64,
}

/// 单只手的检测结果
#[derive(Debug, Clone)]
pub struct HandDetection {
  pub handedness: Handedness,
  pub score: f32,
  pub landmarks: [NormalizedLandmark; LANDMARK_COUNT],
  pub world_landmarks: Option<[WorldLandmark; LANDMARK_COUNT]>,
}

/// 单张图像的检测结果
#[derive(Debug, Clone)]
pub struct DetectionResult {
  pub hands: Box<[HandDetection]>,
  pub width: u32,
  pub height: u32,
}

impl DetectionResult {
  pub fn empty(width: u32, height: u32) -> Self {
    Self {
      hands: Box::new([]),
      width,
      height,
    }
  }

  pub fn is_empty(&self) -> bool {
    self.hands.is_empty()
  }

  pub fn len(&self) -> usize {
    self.hands.len()
  }
}

/// 检测器参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorOptions {
  /// 单张图像最多检测的手数
  pub max_hands: usize,
  /// 最低检测置信度
  pub min_detection_confidence: f32,
}

impl Default for DetectorOptions {
  fn default() -> Self {
    Self {
      max_hands: 1,
      min_detection_confidence: 0.5,
    }
  }
}

#[cfg(feature = "process_detector")]
mod process;
#[cfg(feature = "process_detector")]
pub use self::process::{ProcessDetector, ProcessDetectorBuilder, ProcessDetectorError};
