// 该文件是 Shougu （手骨） 项目的一部分。
// src/output/draw.rs - 手部骨架可视化
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

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

use crate::{
  landmark::{HAND_CONNECTIONS, HandLandmark},
  skeleton::SkeletonRecord,
};

// 绘制常量
const CONNECTION_THICKNESS: i32 = 2;
const LANDMARK_RADIUS_RATIO: f32 = 0.006; // 相对图像短边
const LANDMARK_MIN_RADIUS: i32 = 2;
const LANDMARK_OUTLINE: [u8; 3] = [255, 255, 255];

// 各手指的颜色
const PALM_COLOR: [u8; 3] = [255, 48, 48];
const THUMB_COLOR: [u8; 3] = [255, 204, 204];
const INDEX_COLOR: [u8; 3] = [128, 64, 128];
const MIDDLE_COLOR: [u8; 3] = [255, 204, 0];
const RING_COLOR: [u8; 3] = [48, 255, 48];
const PINKY_COLOR: [u8; 3] = [21, 101, 192];

pub struct Draw {
  connection_thickness: i32,
  radius_ratio: f32,
  min_radius: i32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      connection_thickness: CONNECTION_THICKNESS,
      radius_ratio: LANDMARK_RADIUS_RATIO,
      min_radius: LANDMARK_MIN_RADIUS,
    }
  }
}

/// 关键点所属手指的颜色，腕部和掌根使用手掌颜色
fn landmark_color(landmark: HandLandmark) -> [u8; 3] {
  use HandLandmark::*;
  match landmark {
    Wrist | ThumbCmc => PALM_COLOR,
    ThumbMcp | ThumbIp | ThumbTip => THUMB_COLOR,
    IndexFingerMcp | IndexFingerPip | IndexFingerDip | IndexFingerTip => INDEX_COLOR,
    MiddleFingerMcp | MiddleFingerPip | MiddleFingerDip | MiddleFingerTip => MIDDLE_COLOR,
    RingFingerMcp | RingFingerPip | RingFingerDip | RingFingerTip => RING_COLOR,
    PinkyMcp | PinkyPip | PinkyDip | PinkyTip => PINKY_COLOR,
  }
}

/// 连线颜色取终点所属手指，掌内连线使用手掌颜色
fn connection_color(from: HandLandmark, to: HandLandmark) -> [u8; 3] {
  use HandLandmark::*;
  let palm = [
    Wrist,
    ThumbCmc,
    IndexFingerMcp,
    MiddleFingerMcp,
    RingFingerMcp,
    PinkyMcp,
  ];
  if palm.contains(&from) && palm.contains(&to) {
    PALM_COLOR
  } else {
    landmark_color(to)
  }
}

impl Draw {
  fn landmark_radius(&self, image: &RgbImage) -> i32 {
    let short_side = image.width().min(image.height()) as f32;
    ((short_side * self.radius_ratio).round() as i32).max(self.min_radius)
  }

  /// 在图像上绘制一只手的骨架，坐标需与图像处于同一坐标系
  pub fn draw_skeleton(&self, image: &mut RgbImage, record: &SkeletonRecord) {
    for (from, to) in HAND_CONNECTIONS {
      let [ax, ay] = record.point(from);
      let [bx, by] = record.point(to);
      let color = Rgb(connection_color(from, to));

      // 加粗：在法线方向上平移绘制多条线段
      let (dx, dy) = ((bx - ax) as f32, (by - ay) as f32);
      let len = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
      let (nx, ny) = (-dy / len, dx / len);
      let half = self.connection_thickness as f32 / 2.0;
      for step in 0..self.connection_thickness {
        let offset = step as f32 - half + 0.5;
        draw_line_segment_mut(
          image,
          (ax as f32 + nx * offset, ay as f32 + ny * offset),
          (bx as f32 + nx * offset, by as f32 + ny * offset),
          color,
        );
      }
    }

    let radius = self.landmark_radius(image);
    for (landmark, [x, y]) in record.iter() {
      let center = (x.round() as i32, y.round() as i32);
      draw_filled_circle_mut(image, center, radius, Rgb(landmark_color(landmark)));
      draw_hollow_circle_mut(image, center, radius, Rgb(LANDMARK_OUTLINE));
    }
  }
}
