// 该文件是 Shougu （手骨） 项目的一部分。
// src/output/skeleton_writer.rs - 骨架文本文件输出
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

//! 骨架文件格式：21 行，每行 `<x> <y>`，以单个空格分隔，行间以 `\n` 分隔，
//! 末行之后没有换行，没有表头。
//!
//! 输出路径为 `<root>/<category>/<stem>.txt`，同一图像的第 i (i ≥ 1) 只手为
//! `<root>/<category>/<stem><i>.txt`。

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::{
  frame::{HandsResult, MirroredFrame},
  input::Category,
  landmark::LANDMARK_COUNT,
  output::{Render, ensure_dir},
  skeleton::{PixelPoint, SkeletonRecord},
};

#[derive(Error, Debug)]
pub enum SkeletonWriterError {
  #[error("无法创建目录 {0}: {1}")]
  CreateDir(PathBuf, std::io::Error),
  #[error("无法写入文件 {0}: {1}")]
  Write(PathBuf, std::io::Error),
  #[error("无法读取文件 {0}: {1}")]
  Read(PathBuf, std::io::Error),
  #[error("骨架文件第 {line} 行格式错误: {reason}")]
  Malformed { line: usize, reason: String },
}

pub struct SkeletonWriter {
  root: PathBuf,
}

impl SkeletonWriter {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// 第 0 只手不带序号，其余手在文件名后直接拼接序号
  pub fn skeleton_path(&self, category: &Category, stem: &str, hand_index: usize) -> PathBuf {
    let file_name = if hand_index == 0 {
      format!("{}.txt", stem)
    } else {
      format!("{}{}.txt", stem, hand_index)
    };
    self.root.join(category.name()).join(file_name)
  }

  /// 写入一只手的骨架，已存在的文件直接覆盖
  pub fn write(
    &self,
    record: &SkeletonRecord,
    category: &Category,
    stem: &str,
    hand_index: usize,
  ) -> Result<PathBuf, SkeletonWriterError> {
    let dir = self.root.join(category.name());
    ensure_dir(&dir).map_err(|e| SkeletonWriterError::CreateDir(dir.clone(), e))?;

    let path = self.skeleton_path(category, stem, hand_index);
    std::fs::write(&path, format_skeleton(record))
      .map_err(|e| SkeletonWriterError::Write(path.clone(), e))?;
    debug!("写入骨架文件: {}", path.display());
    Ok(path)
  }
}

impl Render<MirroredFrame, HandsResult> for SkeletonWriter {
  type Error = SkeletonWriterError;

  fn render_result(&self, frame: &MirroredFrame, result: &HandsResult) -> Result<(), Self::Error> {
    let file = frame.file();
    for (hand_index, record) in result.skeletons.iter().enumerate() {
      let path = self.write(record, file.category(), file.stem(), hand_index)?;
      if let Some(handedness) = record.handedness() {
        info!("{} 手骨架 -> {}", handedness, path.display());
      }
    }
    Ok(())
  }
}

/// 最短可往返的十进制表示，整数值也保留小数点，如 `50.0`
pub fn format_coord(value: f64) -> String {
  format!("{:?}", value)
}

pub fn format_skeleton(record: &SkeletonRecord) -> String {
  record
    .points()
    .iter()
    .map(|[x, y]| format!("{} {}", format_coord(*x), format_coord(*y)))
    .collect::<Vec<_>>()
    .join("\n")
}

/// 解析骨架文件内容，必须恰好包含 21 行坐标
pub fn parse_skeleton(text: &str) -> Result<SkeletonRecord, SkeletonWriterError> {
  let malformed = |line: usize, reason: String| SkeletonWriterError::Malformed { line, reason };

  let lines: Vec<&str> = text.split('\n').collect();
  if lines.len() != LANDMARK_COUNT {
    return Err(malformed(
      lines.len(),
      format!("期望 {} 行, 实际 {} 行", LANDMARK_COUNT, lines.len()),
    ));
  }

  let mut points = [PixelPoint::default(); LANDMARK_COUNT];
  for (i, (line, point)) in lines.iter().zip(points.iter_mut()).enumerate() {
    let fields: Vec<&str> = line.split(' ').collect();
    let [x, y] = fields.as_slice() else {
      return Err(malformed(i + 1, format!("期望 2 个数值: {:?}", line)));
    };
    for (field, out) in [x, y].into_iter().zip(point.iter_mut()) {
      *out = field
        .parse()
        .map_err(|e| malformed(i + 1, format!("{:?}: {}", field, e)))?;
    }
  }

  Ok(SkeletonRecord::new(None, points))
}

pub fn read_skeleton(path: &Path) -> Result<SkeletonRecord, SkeletonWriterError> {
  let text = std::fs::read_to_string(path)
    .map_err(|e| SkeletonWriterError::Read(path.to_path_buf(), e))?;
  parse_skeleton(&text)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::Handedness;

  fn record() -> SkeletonRecord {
    let mut points = [[0.0, 0.0]; LANDMARK_COUNT];
    for (i, p) in points.iter_mut().enumerate() {
      *p = [i as f64 + 0.25, 2.0 * i as f64];
    }
    points[0] = [50.0, 100.0];
    SkeletonRecord::new(Some(Handedness::Right), points)
  }

  #[test]
  fn coords_keep_decimal_point() {
    assert_eq!(format_coord(50.0), "50.0");
    assert_eq!(format_coord(123.45), "123.45");
    assert_eq!(format_coord(0.1), "0.1");
    assert_eq!(format_coord(-0.0), "-0.0");
  }

  #[test]
  fn text_has_21_lines_without_trailing_newline() {
    let text = format_skeleton(&record());
    assert!(!text.ends_with('\n'));
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines.len(), 21);
    assert_eq!(lines[0], "50.0 100.0");
    assert_eq!(lines[1], "1.25 2.0");
  }

  #[test]
  fn hand_index_suffix() {
    let writer = SkeletonWriter::new("/out");
    let category = Category::new("A", "/in/A");
    assert_eq!(
      writer.skeleton_path(&category, "img", 0),
      Path::new("/out/A/img.txt")
    );
    assert_eq!(
      writer.skeleton_path(&category, "img", 1),
      Path::new("/out/A/img1.txt")
    );
    assert_eq!(
      writer.skeleton_path(&category, "img", 12),
      Path::new("/out/A/img12.txt")
    );
  }

  #[test]
  fn write_creates_category_and_overwrites() {
    let root = tempfile::tempdir().unwrap();
    let writer = SkeletonWriter::new(root.path());
    let category = Category::new("A", "unused");

    let path = writer.write(&record(), &category, "img", 0).unwrap();
    assert_eq!(path, root.path().join("A").join("img.txt"));

    std::fs::write(&path, "stale").unwrap();
    let again = writer.write(&record(), &category, "img", 0).unwrap();
    assert_eq!(std::fs::read_to_string(again).unwrap(), format_skeleton(&record()));
  }

  #[test]
  fn read_back_matches_written_points() {
    let root = tempfile::tempdir().unwrap();
    let writer = SkeletonWriter::new(root.path());
    let path = writer
      .write(&record(), &Category::new("B", "unused"), "img", 3)
      .unwrap();
    let parsed = read_skeleton(&path).unwrap();
    assert_eq!(parsed.points(), record().points());
    assert_eq!(parsed.handedness(), None);
  }

  #[test]
  fn rejects_trailing_newline_and_bad_fields() {
    let text = format_skeleton(&record());
    assert!(parse_skeleton(&format!("{}\n", text)).is_err());
    let broken = text.replacen("50.0 100.0", "50.0,100.0", 1);
    assert!(matches!(
      parse_skeleton(&broken),
      Err(SkeletonWriterError::Malformed { line: 1, .. })
    ));
  }
}
