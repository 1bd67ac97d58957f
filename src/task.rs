// 该文件是 Shougu （手骨） 项目的一部分。
// src/task.rs - 数据集遍历任务
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
use std::path::PathBuf;

use image::RgbImage;
use tracing::{error, info};

use crate::{
  input::{DatasetInput, ensure_root},
  model::{DetectionResult, Model},
  processor::{ImageProcessor, ProcessOutcome},
};

pub trait Task<I, P>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, processor: P) -> Result<Self::Output, Self::Error>;
}

/// 一次运行的统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
  pub categories: usize,
  pub images: usize,
  pub no_hands: usize,
  pub hands: usize,
  pub skeleton_files: usize,
  pub annotated_images: usize,
  pub failed: usize,
}

impl RunSummary {
  fn record(&mut self, outcome: ProcessOutcome) {
    self.images += 1;
    match outcome {
      ProcessOutcome::NoHands => self.no_hands += 1,
      ProcessOutcome::Processed {
        hands,
        skeleton_files,
        annotated_image,
      } => {
        self.hands += hands;
        self.skeleton_files += skeleton_files;
        self.annotated_images += usize::from(annotated_image);
      }
    }
  }
}

impl fmt::Display for RunSummary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "类别 {}, 图像 {}, 未检测到手 {}, 手 {}, 骨架文件 {}, 标注图像 {}, 失败 {}",
      self.categories,
      self.images,
      self.no_hands,
      self.hands,
      self.skeleton_files,
      self.annotated_images,
      self.failed
    )
  }
}

/// 依次处理每个类别中的每张图像，顺序与目录列举顺序一致
#[derive(Debug)]
pub struct DatasetTask {
  output_root: PathBuf,
  continue_on_error: bool,
}

impl DatasetTask {
  pub fn new(output_root: impl Into<PathBuf>) -> Self {
    Self {
      output_root: output_root.into(),
      continue_on_error: false,
    }
  }

  /// 单个文件失败时记录错误并继续，而不是中止整个任务
  pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
    self.continue_on_error = continue_on_error;
    self
  }
}

impl<M, ME> Task<DatasetInput, ImageProcessor<M>> for DatasetTask
where
  M: Model<Input = RgbImage, Output = DetectionResult, Error = ME>,
  ME: std::error::Error + Send + Sync + 'static,
{
  type Output = RunSummary;
  type Error = anyhow::Error;

  fn run_task(
    self,
    input: DatasetInput,
    processor: ImageProcessor<M>,
  ) -> Result<Self::Output, Self::Error> {
    ensure_root(input.root())?;
    ensure_root(&self.output_root)?;

    info!("开始任务...");
    let categories = input.categories()?;
    let mut summary = RunSummary::default();

    for (index, category) in categories.iter().enumerate() {
      info!("{} of {}", index + 1, categories.len());
      info!("Processing folder: {} ...", category);
      summary.categories += 1;

      for file in input.images(category)? {
        info!("Processing file: {} ...", file.file_name());
        match processor.process(&file) {
          Ok(outcome) => summary.record(outcome),
          Err(e) if self.continue_on_error => {
            error!("跳过文件 {}: {}", file.path().display(), e);
            summary.failed += 1;
          }
          Err(e) => return Err(e.into()),
        }
      }
      info!("----------");
    }

    info!("任务完成: {}", summary);
    Ok(summary)
  }
}
