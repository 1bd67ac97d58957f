// 该文件是 Shougu （手骨） 项目的一部分。
// tests/pipeline.rs - 数据集流水线集成测试
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

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};
use tempfile::TempDir;
use thiserror::Error;

use shougu::{
  input::{DatasetInput, ImageFilter, InputError},
  landmark::LANDMARK_COUNT,
  model::{DetectionResult, DetectorOptions, HandDetection, Handedness, Model, NormalizedLandmark},
  output::read_skeleton,
  processor::{ImageProcessor, PipelineConfig, ProcessError},
  task::{DatasetTask, RunSummary, Task},
};

#[derive(Debug, Error)]
#[error("unreachable")]
struct Never;

/// 由图像颜色决定手数的假检测器：红色通道值即手数
struct ColorCodedDetector;

impl Model for ColorCodedDetector {
  type Input = RgbImage;
  type Output = DetectionResult;
  type Error = Never;

  fn infer(&self, input: &RgbImage) -> Result<DetectionResult, Never> {
    let count = input.get_pixel(0, 0)[0] as usize;
    let hands = (0..count)
      .map(|h| {
        let mut landmarks = [NormalizedLandmark::default(); LANDMARK_COUNT];
        for (i, lm) in landmarks.iter_mut().enumerate() {
          lm.x = (i as f64 + 1.0) / 23.0;
          lm.y = ((i + h) as f64 * 0.37).fract();
        }
        landmarks[0] = NormalizedLandmark {
          x: 0.5,
          y: 0.5,
          z: 0.0,
        };
        HandDetection {
          handedness: if h % 2 == 0 {
            Handedness::Right
          } else {
            Handedness::Left
          },
          score: 0.95,
          landmarks,
          world_landmarks: None,
        }
      })
      .collect::<Vec<_>>();

    Ok(DetectionResult {
      hands: hands.into_boxed_slice(),
      width: input.width(),
      height: input.height(),
    })
  }
}

struct Dataset {
  _dir: TempDir,
  images: PathBuf,
  skeletons: PathBuf,
}

impl Dataset {
  fn new() -> Self {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("data").join("images");
    let skeletons = dir.path().join("data").join("skeletons");
    fs::create_dir_all(&images).unwrap();
    fs::create_dir_all(&skeletons).unwrap();
    Self {
      _dir: dir,
      images,
      skeletons,
    }
  }

  fn category(&self, name: &str) -> PathBuf {
    let path = self.images.join(name);
    fs::create_dir_all(&path).unwrap();
    path
  }

  /// 写入一张纯色 PNG，红色通道编码手数
  fn image(&self, category: &str, file_name: &str, hands: u8, width: u32, height: u32) {
    let dir = self.category(category);
    let image = RgbImage::from_pixel(width, height, Rgb([hands, 10, 20]));
    image
      .save_with_format(dir.join(file_name), image::ImageFormat::Png)
      .unwrap();
  }

  fn run(&self, config: &PipelineConfig) -> anyhow::Result<RunSummary> {
    self.run_with(config, false)
  }

  fn run_with(&self, config: &PipelineConfig, continue_on_error: bool) -> anyhow::Result<RunSummary> {
    let processor = ImageProcessor::new(ColorCodedDetector, config, &self.skeletons);
    let input = DatasetInput::new(&self.images, ImageFilter::default());
    DatasetTask::new(&self.skeletons)
      .with_continue_on_error(continue_on_error)
      .run_task(input, processor)
  }
}

fn multi_hand(max_hands: usize) -> PipelineConfig {
  PipelineConfig {
    detector: DetectorOptions {
      max_hands,
      ..Default::default()
    },
    ..Default::default()
  }
}

/// 收集 tracing 输出
#[derive(Clone, Default)]
struct Logs(Arc<Mutex<Vec<u8>>>);

impl io::Write for Logs {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    self.0.lock().unwrap().extend_from_slice(buf);
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

impl Logs {
  fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
    let logs = self.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_ansi(false)
      .with_writer(move || logs.clone())
      .finish();
    tracing::subscriber::with_default(subscriber, f)
  }

  fn warnings(&self) -> Vec<String> {
    String::from_utf8_lossy(&self.0.lock().unwrap())
      .lines()
      .filter(|l| l.contains("WARN"))
      .map(str::to_string)
      .collect()
  }
}

fn lines(path: &Path) -> Vec<String> {
  fs::read_to_string(path)
    .unwrap()
    .split('\n')
    .map(str::to_string)
    .collect()
}

#[test]
fn single_hand_produces_unsuffixed_file() {
  let data = Dataset::new();
  data.image("A", "hand.png", 1, 100, 200);

  let summary = data.run(&PipelineConfig::default()).unwrap();
  assert_eq!(summary.images, 1);
  assert_eq!(summary.skeleton_files, 1);

  let path = data.skeletons.join("A").join("hand.txt");
  let lines = lines(&path);
  assert_eq!(lines.len(), 21);
  assert_eq!(lines[0], "50.0 100.0");
  assert!(!fs::read_to_string(&path).unwrap().ends_with('\n'));
  assert!(!data.skeletons.join("A").join("hand0.txt").exists());
}

#[test]
fn multiple_hands_get_numeric_suffixes() {
  let data = Dataset::new();
  data.image("B", "pair.png", 3, 64, 48);

  let summary = data.run(&multi_hand(3)).unwrap();
  assert_eq!(summary.hands, 3);
  assert_eq!(summary.skeleton_files, 3);

  let dir = data.skeletons.join("B");
  for name in ["pair.txt", "pair1.txt", "pair2.txt"] {
    assert_eq!(lines(&dir.join(name)).len(), 21, "{}", name);
  }
  assert!(!dir.join("pair3.txt").exists());
  assert_ne!(
    fs::read_to_string(dir.join("pair.txt")).unwrap(),
    fs::read_to_string(dir.join("pair1.txt")).unwrap()
  );
}

#[test]
fn no_hands_means_no_output() {
  let data = Dataset::new();
  data.image("C", "empty.png", 0, 32, 32);

  let config = PipelineConfig {
    save_annotated_image: true,
    ..Default::default()
  };
  let summary = data.run(&config).unwrap();
  assert_eq!(summary.no_hands, 1);
  assert_eq!(summary.skeleton_files, 0);
  assert!(!data.skeletons.join("C").exists());
}

#[test]
fn reruns_are_byte_identical() {
  let data = Dataset::new();
  data.image("A", "one.png", 2, 123, 77);
  data.image("A", "two.png", 1, 300, 20);

  data.run(&multi_hand(2)).unwrap();
  let first: Vec<(String, Vec<u8>)> = ["one.txt", "one1.txt", "two.txt"]
    .iter()
    .map(|n| (n.to_string(), fs::read(data.skeletons.join("A").join(n)).unwrap()))
    .collect();

  // 已存在的类别目录只产生警告
  let logs = Logs::default();
  logs.capture(|| data.run(&multi_hand(2))).unwrap();
  let category_dir = data.skeletons.join("A");
  let warnings = logs.warnings();
  assert!(
    warnings
      .iter()
      .any(|w| w.contains(&format!("目录 {} 已存在!", category_dir.display()))),
    "{:?}",
    warnings
  );
  for (name, bytes) in first {
    assert_eq!(fs::read(data.skeletons.join("A").join(&name)).unwrap(), bytes, "{}", name);
  }
}

#[test]
fn precreated_category_dir_warns_and_proceeds() {
  let data = Dataset::new();
  data.image("A", "hand.png", 1, 20, 20);
  let category_dir = data.skeletons.join("A");
  fs::create_dir(&category_dir).unwrap();

  let logs = Logs::default();
  let summary = logs.capture(|| data.run(&PipelineConfig::default())).unwrap();
  assert_eq!(summary.skeleton_files, 1);
  assert!(category_dir.join("hand.txt").exists());

  let warnings = logs.warnings();
  assert_eq!(warnings.len(), 1, "{:?}", warnings);
  assert!(warnings[0].contains(&format!("目录 {} 已存在!", category_dir.display())));
}

#[test]
fn written_coordinates_stay_within_image() {
  let data = Dataset::new();
  let (width, height) = (321.0, 123.0);
  data.image("D", "bounds.png", 2, width as u32, height as u32);
  data.run(&multi_hand(2)).unwrap();

  for name in ["bounds.txt", "bounds1.txt"] {
    let record = read_skeleton(&data.skeletons.join("D").join(name)).unwrap();
    for [x, y] in record.points() {
      assert!((-0.01..=width + 0.01).contains(x), "{} x={}", name, x);
      assert!((-0.01..=height + 0.01).contains(y), "{} y={}", name, y);
    }
  }
}

#[test]
fn empty_and_filtered_categories_create_nothing() {
  let data = Dataset::new();
  data.category("Empty");
  let other = data.category("Other");
  fs::write(other.join("readme.txt"), "not an image").unwrap();
  fs::write(other.join("photo.PNG"), "wrong case").unwrap();

  let summary = data.run(&PipelineConfig::default()).unwrap();
  assert_eq!(summary.categories, 2);
  assert_eq!(summary.images, 0);
  assert!(!data.skeletons.join("Empty").exists());
  assert!(!data.skeletons.join("Other").exists());
}

#[test]
fn missing_output_root_aborts_before_processing() {
  let data = Dataset::new();
  data.image("A", "hand.png", 1, 10, 10);
  fs::remove_dir(&data.skeletons).unwrap();

  let err = data.run(&PipelineConfig::default()).unwrap_err();
  assert!(matches!(
    err.downcast_ref::<InputError>(),
    Some(InputError::MissingDirectory(p)) if p == &data.skeletons
  ));
  assert!(!data.skeletons.exists());
}

#[test]
fn unreadable_image_aborts_the_run() {
  let data = Dataset::new();
  let dir = data.category("A");
  fs::write(dir.join("broken.png"), b"definitely not png").unwrap();

  let err = data.run(&PipelineConfig::default()).unwrap_err();
  let err = err.downcast_ref::<ProcessError>().unwrap();
  assert!(matches!(
    err,
    ProcessError::Input(InputError::UnreadableImage { .. })
  ));
  assert_eq!(err.path(), Some(dir.join("broken.png").as_path()));
}

#[test]
fn continue_on_error_skips_unreadable_images() {
  let data = Dataset::new();
  let dir = data.category("A");
  fs::write(dir.join("broken.png"), b"definitely not png").unwrap();
  data.image("A", "good.png", 1, 10, 10);

  let summary = data.run_with(&PipelineConfig::default(), true).unwrap();
  assert_eq!(summary.failed, 1);
  assert_eq!(summary.images, 1);
  assert!(data.skeletons.join("A").join("good.txt").exists());
}

#[cfg(feature = "annotated_image")]
#[test]
fn annotated_image_keeps_original_name() {
  let data = Dataset::new();
  data.image("A", "hand.png", 1, 40, 40);

  let config = PipelineConfig {
    save_skeleton_data: false,
    save_annotated_image: true,
    ..Default::default()
  };
  let summary = data.run(&config).unwrap();
  assert_eq!(summary.annotated_images, 1);
  assert_eq!(summary.skeleton_files, 0);

  let saved = image::open(data.skeletons.join("A").join("hand.png")).unwrap();
  assert_eq!((saved.width(), saved.height()), (40, 40));
  assert!(!data.skeletons.join("A").join("hand.txt").exists());
}
