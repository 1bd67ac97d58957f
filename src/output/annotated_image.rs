// 该文件是 Shougu （手骨） 项目的一部分。
// src/output/annotated_image.rs - 保存带骨架标注的图像
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

use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};
use thiserror::Error;
use tracing::info;

use crate::{
  frame::{HandsResult, MirroredFrame, unmirror},
  output::{Render, draw::Draw, ensure_dir},
};

#[derive(Error, Debug)]
pub enum AnnotatedImageError {
  #[error("无法创建目录 {0}: {1}")]
  CreateDir(PathBuf, std::io::Error),
  #[error("无法保存图像 {0}: {1}")]
  Save(PathBuf, image::ImageError),
}

/// 标注图像输出到 `<root>/<category>/<原文件名>`
pub struct AnnotatedImageOutput {
  root: PathBuf,
  draw: Draw,
}

impl AnnotatedImageOutput {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      draw: Draw::default(),
    }
  }

  /// 在镜像图像的副本上绘制全部骨架，再翻回原始方向
  pub fn annotate(&self, frame: &MirroredFrame, result: &HandsResult) -> RgbImage {
    let mut annotated = frame.image().clone();
    for record in &result.skeletons {
      self.draw.draw_skeleton(&mut annotated, record);
    }
    unmirror(&annotated)
  }

  fn save_image(&self, image: &RgbImage, path: &Path) -> Result<(), AnnotatedImageError> {
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
      && !parent.is_dir()
    {
      ensure_dir(parent).map_err(|e| AnnotatedImageError::CreateDir(parent.to_path_buf(), e))?;
    }

    // 文件名只是包含扩展名标记时（如 foo.png.bak）无法推断格式，按 PNG 保存
    let format = ImageFormat::from_path(path).unwrap_or(ImageFormat::Png);
    image
      .save_with_format(path, format)
      .map_err(|e| AnnotatedImageError::Save(path.to_path_buf(), e))?;

    info!("保存标注图像到文件: {}", path.display());
    Ok(())
  }
}

impl Render<MirroredFrame, HandsResult> for AnnotatedImageOutput {
  type Error = AnnotatedImageError;

  fn render_result(&self, frame: &MirroredFrame, result: &HandsResult) -> Result<(), Self::Error> {
    let file = frame.file();
    let path = self
      .root
      .join(file.category().name())
      .join(file.file_name());
    let image = self.annotate(frame, result);
    self.save_image(&image, &path)
  }
}
