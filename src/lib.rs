// 该文件是 Shougu （手骨） 项目的一部分。
// src/lib.rs - 库主文件
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

//! 手部照片数据集 → 手部骨架关键点数据集。
//!
//! 输入目录的每个子目录是一个类别，类别中的每张图片交给外部手部关键点检测器，
//! 每只检测到的手输出一个 21 点的像素坐标文本文件，输出目录结构与输入一致。

pub mod frame;
pub mod input;
pub mod landmark;
pub mod model;
pub mod output;
pub mod processor;
pub mod skeleton;
pub mod task;
pub mod transform;

pub trait FromUrl {
  type Error;
  fn from_url(url: &url::Url) -> Result<Self, Self::Error>
  where
    Self: Sized;
}

pub trait FromUrlWithScheme: FromUrl {
  const SCHEME: &'static str;
}
