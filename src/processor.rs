// 该文件是 Shougu （手骨） 项目的一部分。
// src/processor.rs - 单张图像处理
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

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
  frame::{HandsResult, MirroredFrame},
  input::{ImageFile, InputError},
  model::{DetectionResult, DetectorOptions, Model},
  output::{OutputError, OutputSet, Render, SkeletonWriter},
  transform::to_skeleton,
};

#[derive(Error, Debug)]
pub enum ProcessError {
  #[error(transparent)]
  Input(#[from] InputError),
  #[error("检测器处理 {path} 失败: {source}")]
  DetectorFailure {
    path: PathBuf,
    source: Box<dyn std::error::Error + Send + Sync>,
  },
  #[error("写出 {path} 的结果失败: {source}")]
  Output { path: PathBuf, source: OutputError },
}

impl ProcessError {
  /// 出错的输入文件
  pub fn path(&self) -> Option<&Path> {
    match self {
      ProcessError::Input(InputError::UnreadableImage { path, .. }) => Some(path.as_path()),
      ProcessError::Input(_) => None,
      ProcessError::DetectorFailure { path, .. } | ProcessError::Output { path, .. } => {
        Some(path.as_path())
      }
    }
  }
}

/// 流水线配置，默认值与数据集脚本的默认选项一致
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
  /// 写出骨架文本文件
  pub save_skeleton_data: bool,
  /// 写出带骨架标注的图像
  pub save_annotated_image: bool,
  /// 在终端绘制世界坐标骨架
  pub draw_skeleton_3d: bool,
  pub detector: DetectorOptions,
}

impl Default for PipelineConfig {
  fn default() -> Self {
    Self {
      save_skeleton_data: true,
      save_annotated_image: false,
      draw_skeleton_3d: false,
      detector: DetectorOptions::default(),
    }
  }
}

impl PipelineConfig {
  /// 按开关构造输出集合；未编译对应 feature 的开关会被忽略并给出警告
  pub fn outputs(&self, output_root: &Path) -> OutputSet {
    let mut outputs = OutputSet::default();
    if self.save_skeleton_data {
      outputs.skeleton = Some(SkeletonWriter::new(output_root));
    }

    #[cfg(feature = "annotated_image")]
    if self.save_annotated_image {
      outputs.annotated = Some(crate::output::AnnotatedImageOutput::new(output_root));
    }
    #[cfg(not(feature = "annotated_image"))]
    if self.save_annotated_image {
      warn!("未启用 annotated_image 功能，忽略标注图像输出");
    }

    #[cfg(feature = "plot_3d")]
    if self.draw_skeleton_3d {
      outputs.plot = Some(crate::output::SkeletonPlot::default());
    }
    #[cfg(not(feature = "plot_3d"))]
    if self.draw_skeleton_3d {
      warn!("未启用 plot_3d 功能，忽略 3D 骨架绘制");
    }

    outputs
  }
}

/// 单张图像的处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
  /// 未检测到手，没有任何输出
  NoHands,
  Processed {
    hands: usize,
    skeleton_files: usize,
    annotated_image: bool,
  },
}

pub struct ImageProcessor<M> {
  model: M,
  outputs: OutputSet,
  max_hands: usize,
}

impl<M, ME> ImageProcessor<M>
where
  M: Model<Input = RgbImage, Output = DetectionResult, Error = ME>,
  ME: std::error::Error + Send + Sync + 'static,
{
  pub fn new(model: M, config: &PipelineConfig, output_root: &Path) -> Self {
    Self {
      model,
      outputs: config.outputs(output_root),
      max_hands: config.detector.max_hands,
    }
  }

  /// 解码、镜像、检测，再将每只手的骨架交给已启用的输出
  pub fn process(&self, file: &ImageFile) -> Result<ProcessOutcome, ProcessError> {
    let original = file.load()?;
    let frame = MirroredFrame::from_original(file.clone(), &original);
    let (width, height) = (frame.width(), frame.height());

    let mut detection = self
      .model
      .infer(frame.image())
      .map_err(|e| ProcessError::DetectorFailure {
        path: file.path().to_path_buf(),
        source: Box::new(e),
      })?;

    if detection.len() > self.max_hands {
      warn!(
        "检测器返回 {} 只手，超过上限 {}，只保留前 {} 只",
        detection.len(),
        self.max_hands,
        self.max_hands
      );
      let mut hands = detection.hands.into_vec();
      hands.truncate(self.max_hands);
      detection.hands = hands.into_boxed_slice();
    }

    // 截断后可能为空
    if detection.is_empty() {
      debug!("未检测到手: {}", file.path().display());
      return Ok(ProcessOutcome::NoHands);
    }

    let skeletons = detection
      .hands
      .iter()
      .enumerate()
      .map(|(i, hand)| {
        debug!("第 {} 只手: {} ({:.2})", i, hand.handedness, hand.score);
        to_skeleton(hand, width, height)
      })
      .collect::<Vec<_>>();
    let result = HandsResult {
      detection,
      skeletons,
    };

    self
      .outputs
      .render_result(&frame, &result)
      .map_err(|source| ProcessError::Output {
        path: file.path().to_path_buf(),
        source,
      })?;

    let hands = result.skeletons.len();
    let skeleton_files = if self.outputs.skeleton.is_some() {
      hands
    } else {
      0
    };
    #[cfg(feature = "annotated_image")]
    let annotated_image = self.outputs.annotated.is_some();
    #[cfg(not(feature = "annotated_image"))]
    let annotated_image = false;

    info!("{}: {} 只手", file.file_name(), hands);
    Ok(ProcessOutcome::Processed {
      hands,
      skeleton_files,
      annotated_image,
    })
  }
}
