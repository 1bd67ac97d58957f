// 该文件是 Shougu （手骨） 项目的一部分。
// src/output/plot_3d.rs - 终端 3D 骨架绘制
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

use std::io::Write;

use tracing::debug;

use crate::{
  frame::{HandsResult, MirroredFrame},
  landmark::{HAND_CONNECTIONS, LANDMARK_COUNT},
  model::WorldLandmark,
  output::Render,
};

const PLOT_COLS: usize = 64;
const PLOT_ROWS: usize = 32;
const PLOT_AZIMUTH_DEG: f64 = 5.0;
const PLOT_ELEVATION_DEG: f64 = 10.0;
// 终端字符宽高比约为 1:2
const CELL_ASPECT: f64 = 2.0;

/// 将世界坐标关键点以正交投影绘制到终端，不产生文件
pub struct SkeletonPlot {
  cols: usize,
  rows: usize,
  azimuth_deg: f64,
  elevation_deg: f64,
}

impl Default for SkeletonPlot {
  fn default() -> Self {
    Self {
      cols: PLOT_COLS,
      rows: PLOT_ROWS,
      azimuth_deg: PLOT_AZIMUTH_DEG,
      elevation_deg: PLOT_ELEVATION_DEG,
    }
  }
}

impl SkeletonPlot {
  pub fn with_azimuth(mut self, azimuth_deg: f64) -> Self {
    self.azimuth_deg = azimuth_deg;
    self
  }

  pub fn with_size(mut self, cols: usize, rows: usize) -> Self {
    self.cols = cols.max(2);
    self.rows = rows.max(2);
    self
  }

  /// 投影到屏幕平面，返回 (水平, 竖直向上)
  fn project(&self, lm: &WorldLandmark) -> (f64, f64) {
    // 绘图坐标系：深度朝前，图像 x 朝右，图像 y 翻转为向上
    let (px, py, pz) = (-lm.z, lm.x, -lm.y);
    let (az, el) = (
      self.azimuth_deg.to_radians(),
      self.elevation_deg.to_radians(),
    );
    let u = -px * az.sin() + py * az.cos();
    let v = pz * el.cos() - (px * az.cos() + py * az.sin()) * el.sin();
    (u, v)
  }

  pub fn render(&self, landmarks: &[WorldLandmark; LANDMARK_COUNT]) -> String {
    let projected = landmarks.map(|lm| self.project(&lm));

    let (mut min_u, mut max_u, mut min_v, mut max_v) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for (u, v) in projected {
      min_u = min_u.min(u);
      max_u = max_u.max(u);
      min_v = min_v.min(v);
      max_v = max_v.max(v);
    }

    // 保持比例：取两个方向中较小的缩放
    let span_u = (max_u - min_u).max(f64::EPSILON);
    let span_v = (max_v - min_v).max(f64::EPSILON);
    let scale = ((self.cols - 1) as f64 / span_u).min((self.rows - 1) as f64 * CELL_ASPECT / span_v);

    let to_cell = |(u, v): (f64, f64)| -> (usize, usize) {
      let col = ((u - min_u) * scale).round() as usize;
      let row = ((max_v - v) * scale / CELL_ASPECT).round() as usize;
      (col.min(self.cols - 1), row.min(self.rows - 1))
    };

    let mut grid = vec![vec![' '; self.cols]; self.rows];
    for (from, to) in HAND_CONNECTIONS {
      let (c0, r0) = to_cell(projected[from.index()]);
      let (c1, r1) = to_cell(projected[to.index()]);
      let steps = c0.abs_diff(c1).max(r0.abs_diff(r1)).max(1);
      for s in 0..=steps {
        let t = s as f64 / steps as f64;
        let c = (c0 as f64 + (c1 as f64 - c0 as f64) * t).round() as usize;
        let r = (r0 as f64 + (r1 as f64 - r0 as f64) * t).round() as usize;
        grid[r][c] = '.';
      }
    }
    for point in projected.iter().skip(1) {
      let (c, r) = to_cell(*point);
      grid[r][c] = 'o';
    }
    let (c, r) = to_cell(projected[0]);
    grid[r][c] = 'W';

    grid
      .into_iter()
      .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
      .collect::<Vec<_>>()
      .join("\n")
  }
}

impl Render<MirroredFrame, HandsResult> for SkeletonPlot {
  type Error = std::io::Error;

  fn render_result(&self, frame: &MirroredFrame, result: &HandsResult) -> Result<(), Self::Error> {
    let mut stdout = std::io::stdout().lock();
    for (i, hand) in result.detection.hands.iter().enumerate() {
      let Some(world) = &hand.world_landmarks else {
        debug!("{} 第 {} 只手没有世界坐标", frame.file().file_name(), i);
        continue;
      };
      writeln!(
        stdout,
        "{} / {} 第 {} 只手 ({}):",
        frame.file().category(),
        frame.file().file_name(),
        i,
        hand.handedness
      )?;
      writeln!(stdout, "{}", self.render(world))?;
    }
    stdout.flush()
  }
}
