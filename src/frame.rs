// 该文件是 Shougu （手骨） 项目的一部分。
// src/frame.rs - 镜像帧与单帧处理结果
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

use image::{RgbImage, imageops};

use crate::{input::ImageFile, model::DetectionResult, skeleton::SkeletonRecord};

/// 左右翻转后的输入图像。
///
/// 翻转后检测器给出的左右手与观察者视角一致，骨架坐标也位于翻转后的坐标系中。
#[derive(Debug, Clone)]
pub struct MirroredFrame {
  file: ImageFile,
  image: RgbImage,
}

impl MirroredFrame {
  /// 由原始方向的图像构造
  pub fn from_original(file: ImageFile, original: &RgbImage) -> Self {
    Self {
      file,
      image: imageops::flip_horizontal(original),
    }
  }

  pub fn file(&self) -> &ImageFile {
    &self.file
  }

  pub fn image(&self) -> &RgbImage {
    &self.image
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }
}

/// 将镜像坐标系下的图像翻回原始方向
pub fn unmirror(image: &RgbImage) -> RgbImage {
  imageops::flip_horizontal(image)
}

/// 单帧的检测结果及由其构造的骨架，`skeletons[i]` 对应 `detection.hands[i]`
#[derive(Debug, Clone)]
pub struct HandsResult {
  pub detection: DetectionResult,
  pub skeletons: Vec<SkeletonRecord>,
}
