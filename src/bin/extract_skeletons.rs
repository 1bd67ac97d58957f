// 该文件是 Shougu （手骨） 项目的一部分。
// src/bin/extract_skeletons.rs - 数据集骨架提取程序
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

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, builder::TypedValueParser};
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use shougu::{
  FromUrl,
  input::{DatasetInput, ImageFilter, ensure_root},
  model::{DetectorOptions, ProcessDetectorBuilder},
  processor::{ImageProcessor, PipelineConfig},
  task::{DatasetTask, Task},
};

/// Shougu 手部骨架数据集提取
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 检测器地址，如 process:///usr/local/bin/hand-landmarker?arg=--model&arg=hand.task
  #[arg(long, value_name = "MODEL")]
  pub model: Url,
  /// 输入根目录，每个子目录为一个类别
  #[arg(long, default_value = "data/images", value_name = "DIR")]
  pub input: PathBuf,
  /// 输出根目录（需已存在）
  #[arg(long, default_value = "data/skeletons", value_name = "DIR")]
  pub output: PathBuf,
  /// 图像文件名需包含的扩展名标记（区分大小写的子串匹配）
  #[arg(long, default_value = ".png", value_name = "TOKEN")]
  pub extension: String,
  /// 写出骨架文本文件
  #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
  pub save_skeleton_data: bool,
  /// 写出带骨架标注的图像
  #[arg(long, default_value_t = false, action = ArgAction::Set, value_name = "BOOL")]
  pub save_annotated_image: bool,
  /// 在终端绘制世界坐标 3D 骨架
  #[arg(long, default_value_t = false, action = ArgAction::Set, value_name = "BOOL")]
  pub draw_skeleton_3d: bool,
  /// 单张图像最多检测的手数
  #[arg(long, default_value_t = 1, value_name = "COUNT", value_parser = max_hands_parser())]
  pub max_hands: usize,
  /// 最低检测置信度 (0.0 - 1.0)
  #[arg(long, default_value_t = 0.5, value_name = "THRESHOLD")]
  pub min_detection_confidence: f32,
  /// 单个文件失败时跳过并继续
  #[arg(long)]
  pub continue_on_error: bool,
}

/// 手数上限至少为 1
fn max_hands_parser() -> impl TypedValueParser<Value = usize> {
  clap::value_parser!(u64)
    .range(1..)
    .map(|n| n as usize)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();

  info!("检测器地址: {}", args.model);
  info!("输入目录: {}", args.input.display());
  info!("输出目录: {}", args.output.display());

  ensure_root(&args.input)?;
  ensure_root(&args.output)?;

  let config = PipelineConfig {
    save_skeleton_data: args.save_skeleton_data,
    save_annotated_image: args.save_annotated_image,
    draw_skeleton_3d: args.draw_skeleton_3d,
    detector: DetectorOptions {
      max_hands: args.max_hands,
      min_detection_confidence: args.min_detection_confidence,
    },
  };

  let model = ProcessDetectorBuilder::from_url(&args.model)
    .with_context(|| format!("无法解析检测器地址 {}", args.model))?
    .options(config.detector)
    .build()
    .context("无法启动检测器")?;
  let processor = ImageProcessor::new(model, &config, &args.output);
  let input = DatasetInput::new(&args.input, ImageFilter::new(args.extension));

  let summary = DatasetTask::new(&args.output)
    .with_continue_on_error(args.continue_on_error)
    .run_task(input, processor)?;

  println!("{}", summary);
  println!("End of script!");

  Ok(())
}
