// 该文件是 Shougu （手骨） 项目的一部分。
// src/input.rs - 数据集目录与图像输入
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

//! 输入目录布局为 `<root>/<category>/<image-file>`。
//!
//! 类别与文件均按文件系统返回的顺序枚举，不做排序。

use std::fmt;
use std::path::{Path, PathBuf};

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum InputError {
  #[error("目录不存在: {0}")]
  MissingDirectory(PathBuf),
  #[error("无法读取目录 {0}: {1}")]
  ReadDir(PathBuf, std::io::Error),
  #[error("无法读取图像 {path}: {source}")]
  UnreadableImage {
    path: PathBuf,
    source: image::ImageError,
  },
}

/// 确认根目录存在
pub fn ensure_root(path: &Path) -> Result<(), InputError> {
  if path.is_dir() {
    Ok(())
  } else {
    Err(InputError::MissingDirectory(path.to_path_buf()))
  }
}

/// 类别：输入根目录下的一个子目录，目录名即类别标签
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category {
  name: String,
  path: PathBuf,
}

impl Category {
  pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      name: name.into(),
      path: path.into(),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.name)
  }
}

/// 类别目录中的一张图像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
  category: Category,
  file_name: String,
  stem: String,
  path: PathBuf,
}

impl ImageFile {
  pub fn new(category: Category, file_name: impl Into<String>) -> Self {
    let file_name = file_name.into();
    let path = category.path().join(&file_name);
    let stem = file_stem(&file_name).to_string();
    Self {
      category,
      file_name,
      stem,
      path,
    }
  }

  pub fn category(&self) -> &Category {
    &self.category
  }

  /// 带扩展名的文件名
  pub fn file_name(&self) -> &str {
    &self.file_name
  }

  /// 去掉最后一个扩展名后的文件名
  pub fn stem(&self) -> &str {
    &self.stem
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// 解码为 RGB 图像，格式按文件内容识别
  pub fn load(&self) -> Result<RgbImage, InputError> {
    let unreadable = |source| InputError::UnreadableImage {
      path: self.path.clone(),
      source,
    };

    let image = ImageReader::open(&self.path)
      .map_err(|e| unreadable(image::ImageError::IoError(e)))?
      .with_guessed_format()
      .map_err(|e| unreadable(image::ImageError::IoError(e)))?
      .decode()
      .map_err(unreadable)?;

    Ok(image.to_rgb8())
  }
}

/// 去掉最后一个 `.` 及其后的部分；没有 `.` 时结果为空串
fn file_stem(file_name: &str) -> &str {
  file_name
    .rsplit_once('.')
    .map(|(stem, _)| stem)
    .unwrap_or("")
}

/// 文件名过滤：区分大小写的子串匹配，`foo.png.bak` 同样会被选中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFilter {
  token: String,
}

impl Default for ImageFilter {
  fn default() -> Self {
    Self::new(".png")
  }
}

impl ImageFilter {
  pub fn new(token: impl Into<String>) -> Self {
    Self {
      token: token.into(),
    }
  }

  pub fn token(&self) -> &str {
    &self.token
  }

  pub fn matches(&self, file_name: &str) -> bool {
    file_name.contains(&self.token)
  }
}

/// 数据集输入根目录
#[derive(Debug, Clone)]
pub struct DatasetInput {
  root: PathBuf,
  filter: ImageFilter,
}

impl DatasetInput {
  pub fn new(root: impl Into<PathBuf>, filter: ImageFilter) -> Self {
    Self {
      root: root.into(),
      filter,
    }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// 根目录下的全部子目录
  pub fn categories(&self) -> Result<Vec<Category>, InputError> {
    ensure_root(&self.root)?;
    let mut categories = Vec::new();
    for name in list_dir(&self.root)? {
      let path = self.root.join(&name);
      if path.is_dir() {
        categories.push(Category::new(name, path));
      }
    }
    debug!("发现 {} 个类别", categories.len());
    Ok(categories)
  }

  /// 类别目录中符合过滤条件的普通文件
  pub fn images(&self, category: &Category) -> Result<Vec<ImageFile>, InputError> {
    let mut images = Vec::new();
    for name in list_dir(category.path())? {
      if category.path().join(&name).is_file() && self.filter.matches(&name) {
        images.push(ImageFile::new(category.clone(), name));
      }
    }
    Ok(images)
  }
}

fn list_dir(dir: &Path) -> Result<Vec<String>, InputError> {
  let read_dir = |e| InputError::ReadDir(dir.to_path_buf(), e);
  let mut names = Vec::new();
  for entry in std::fs::read_dir(dir).map_err(read_dir)? {
    let entry = entry.map_err(read_dir)?;
    match entry.file_name().into_string() {
      Ok(name) => names.push(name),
      Err(name) => warn!("跳过非 UTF-8 文件名: {:?}", name),
    }
  }
  Ok(names)
}
