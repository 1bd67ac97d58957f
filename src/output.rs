// 该文件是 Shougu （手骨） 项目的一部分。
// src/output.rs - 输出定义
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

use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

mod skeleton_writer;
pub use self::skeleton_writer::{
  SkeletonWriter, SkeletonWriterError, format_coord, format_skeleton, parse_skeleton,
  read_skeleton,
};

#[cfg(feature = "annotated_image")]
pub mod draw;

#[cfg(feature = "annotated_image")]
mod annotated_image;
#[cfg(feature = "annotated_image")]
pub use self::annotated_image::{AnnotatedImageError, AnnotatedImageOutput};

#[cfg(feature = "plot_3d")]
mod plot_3d;
#[cfg(feature = "plot_3d")]
pub use self::plot_3d::SkeletonPlot;

use crate::frame::{HandsResult, MirroredFrame};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("骨架文件输出错误: {0}")]
  SkeletonWriterError(#[from] SkeletonWriterError),
  #[cfg(feature = "annotated_image")]
  #[error("标注图像输出错误: {0}")]
  AnnotatedImageError(#[from] AnnotatedImageError),
  #[cfg(feature = "plot_3d")]
  #[error("3D 骨架绘制错误: {0}")]
  PlotError(#[from] std::io::Error),
}

/// 目录创建结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirStatus {
  Created,
  AlreadyPresent,
}

/// 幂等地创建单层目录，已存在时记录警告并视为成功。父目录必须已存在。
pub fn ensure_dir(path: &Path) -> std::io::Result<DirStatus> {
  match std::fs::create_dir(path) {
    Ok(()) => {
      debug!("创建目录: {}", path.display());
      Ok(DirStatus::Created)
    }
    Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
      warn!("目录 {} 已存在!", path.display());
      Ok(DirStatus::AlreadyPresent)
    }
    Err(e) => Err(e),
  }
}

/// 按配置启用的输出集合
#[derive(Default)]
pub struct OutputSet {
  pub skeleton: Option<SkeletonWriter>,
  #[cfg(feature = "annotated_image")]
  pub annotated: Option<AnnotatedImageOutput>,
  #[cfg(feature = "plot_3d")]
  pub plot: Option<SkeletonPlot>,
}

impl Render<MirroredFrame, HandsResult> for OutputSet {
  type Error = OutputError;

  fn render_result(&self, frame: &MirroredFrame, result: &HandsResult) -> Result<(), Self::Error> {
    if let Some(output) = &self.skeleton {
      output.render_result(frame, result)?;
    }
    #[cfg(feature = "annotated_image")]
    if let Some(output) = &self.annotated {
      output.render_result(frame, result)?;
    }
    #[cfg(feature = "plot_3d")]
    if let Some(output) = &self.plot {
      output.render_result(frame, result)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io;
  use std::sync::{Arc, Mutex};

  /// 收集 tracing 输出的内存缓冲
  #[derive(Clone, Default)]
  struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

  impl CapturedLogs {
    fn contents(&self) -> String {
      String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// 在捕获日志的订阅者下执行 `f`
    fn capture<T>(&self, f: impl FnOnce() -> T) -> T {
      let logs = self.clone();
      let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || logs.clone())
        .finish();
      tracing::subscriber::with_default(subscriber, f)
    }
  }

  impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn existing_dir_logs_warning() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("A");
    std::fs::create_dir(&dir).unwrap();

    let logs = CapturedLogs::default();
    let status = logs.capture(|| ensure_dir(&dir).unwrap());
    assert_eq!(status, DirStatus::AlreadyPresent);

    let logged = logs.contents();
    assert!(logged.contains("WARN"), "{}", logged);
    assert!(logged.contains(&format!("目录 {} 已存在!", dir.display())), "{}", logged);
  }

  #[test]
  fn new_dir_logs_no_warning() {
    let root = tempfile::tempdir().unwrap();
    let logs = CapturedLogs::default();
    logs.capture(|| ensure_dir(&root.path().join("A")).unwrap());
    assert!(!logs.contents().contains("WARN"));
  }

  #[test]
  fn ensure_dir_is_idempotent() {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("A");
    assert_eq!(ensure_dir(&dir).unwrap(), DirStatus::Created);
    assert_eq!(ensure_dir(&dir).unwrap(), DirStatus::AlreadyPresent);
    assert!(dir.is_dir());
  }

  #[test]
  fn ensure_dir_needs_existing_parent() {
    let root = tempfile::tempdir().unwrap();
    assert!(ensure_dir(&root.path().join("missing").join("A")).is_err());
  }
}
