// 该文件是 Shougu （手骨） 项目的一部分。
// src/landmark.rs - 手部关键点定义
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

/// 每只手的关键点数量
pub const LANDMARK_COUNT: usize = 21;

/// 手部关键点名称
///
/// - **CMC**: 腕掌关节，拇指最下方靠近手腕的关节
/// - **MCP**: 掌指关节
/// - **PIP**: 近端指间关节
/// - **DIP**: 远端指间关节
/// - **IP**: 拇指指间关节
/// - **Tip**: 指尖
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
  Wrist,
  ThumbCmc,
  ThumbMcp,
  ThumbIp,
  ThumbTip,
  IndexFingerMcp,
  IndexFingerPip,
  IndexFingerDip,
  IndexFingerTip,
  MiddleFingerMcp,
  MiddleFingerPip,
  MiddleFingerDip,
  MiddleFingerTip,
  RingFingerMcp,
  RingFingerPip,
  RingFingerDip,
  RingFingerTip,
  PinkyMcp,
  PinkyPip,
  PinkyDip,
  PinkyTip,
}

/// 骨架文件中关键点的固定顺序，也是数据集的隐式 schema
pub const HAND_LANDMARKS: [HandLandmark; LANDMARK_COUNT] = {
  use HandLandmark::*;
  [
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
  ]
};

/// 骨架连线 (起点, 终点)
pub const HAND_CONNECTIONS: [(HandLandmark, HandLandmark); 21] = {
  use HandLandmark::*;
  [
    // 手掌
    (Wrist, ThumbCmc),
    (Wrist, IndexFingerMcp),
    (IndexFingerMcp, MiddleFingerMcp),
    (MiddleFingerMcp, RingFingerMcp),
    (RingFingerMcp, PinkyMcp),
    (Wrist, PinkyMcp),
    // 拇指
    (ThumbCmc, ThumbMcp),
    (ThumbMcp, ThumbIp),
    (ThumbIp, ThumbTip),
    // 食指
    (IndexFingerMcp, IndexFingerPip),
    (IndexFingerPip, IndexFingerDip),
    (IndexFingerDip, IndexFingerTip),
    // 中指
    (MiddleFingerMcp, MiddleFingerPip),
    (MiddleFingerPip, MiddleFingerDip),
    (MiddleFingerDip, MiddleFingerTip),
    // 无名指
    (RingFingerMcp, RingFingerPip),
    (RingFingerPip, RingFingerDip),
    (RingFingerDip, RingFingerTip),
    // 小指
    (PinkyMcp, PinkyPip),
    (PinkyPip, PinkyDip),
    (PinkyDip, PinkyTip),
  ]
};

impl HandLandmark {
  /// 关键点在检测器输出中的下标
  pub fn index(self) -> usize {
    self as usize
  }

  pub fn name(self) -> &'static str {
    use HandLandmark::*;
    match self {
      Wrist => "WRIST",
      ThumbCmc => "THUMB_CMC",
      ThumbMcp => "THUMB_MCP",
      ThumbIp => "THUMB_IP",
      ThumbTip => "THUMB_TIP",
      IndexFingerMcp => "INDEX_FINGER_MCP",
      IndexFingerPip => "INDEX_FINGER_PIP",
      IndexFingerDip => "INDEX_FINGER_DIP",
      IndexFingerTip => "INDEX_FINGER_TIP",
      MiddleFingerMcp => "MIDDLE_FINGER_MCP",
      MiddleFingerPip => "MIDDLE_FINGER_PIP",
      MiddleFingerDip => "MIDDLE_FINGER_DIP",
      MiddleFingerTip => "MIDDLE_FINGER_TIP",
      RingFingerMcp => "RING_FINGER_MCP",
      RingFingerPip => "RING_FINGER_PIP",
      RingFingerDip => "RING_FINGER_DIP",
      RingFingerTip => "RING_FINGER_TIP",
      PinkyMcp => "PINKY_MCP",
      PinkyPip => "PINKY_PIP",
      PinkyDip => "PINKY_DIP",
      PinkyTip => "PINKY_TIP",
    }
  }
}
