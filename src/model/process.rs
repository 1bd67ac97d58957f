// 该文件是 Shougu （手骨） 项目的一部分。
// src/model/process.rs - 外部进程手部关键点检测器
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

//! 通过子进程调用外部手部关键点检测器。
//!
//! 子进程启动一次，之后每张图像：
//!
//! 1. 写入一行 ASCII 十进制数，表示随后 PNG 数据的字节数；
//! 2. 写入 PNG 编码的 RGB 图像；
//! 3. 读取一行 JSON 应答 `{"hands": [...]}` 或 `{"error": "..."}`。
//!
//! 关闭 stdin 即结束会话。

use std::io::{BufRead, BufReader, Cursor, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use image::{ImageFormat, RgbImage};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  landmark::LANDMARK_COUNT,
  model::{
    DetectionResult, DetectorOptions, HandDetection, Handedness, Model, NormalizedLandmark,
    WorldLandmark,
  },
};

#[derive(Error, Debug)]
pub enum ProcessDetectorError {
  #[error("URI 方案不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemeMismatch {
    expected: &'static str,
    found: String,
  },
  #[error("检测器程序路径为空")]
  EmptyProgram,
  #[error("无法启动检测器进程 {0}: {1}")]
  Spawn(String, std::io::Error),
  #[error("与检测器进程通信失败: {0}")]
  Io(#[from] std::io::Error),
  #[error("图像编码失败: {0}")]
  Encode(#[from] image::ImageError),
  #[error("检测器进程已退出")]
  Exited,
  #[error("检测器应答无法解析: {0}")]
  Protocol(#[from] serde_json::Error),
  #[error("检测器报告错误: {0}")]
  Remote(String),
  #[error("第 {hand} 只手的关键点数量为 {found}, 期望 21")]
  LandmarkCount { hand: usize, found: usize },
  #[error("第 {hand} 只手的世界坐标关键点数量为 {found}, 期望 21")]
  WorldLandmarkCount { hand: usize, found: usize },
  #[error("检测器会话锁已失效")]
  Poisoned,
}

pub struct ProcessDetectorBuilder {
  program: String,
  args: Vec<String>,
  options: DetectorOptions,
}

impl FromUrlWithScheme for ProcessDetectorBuilder {
  const SCHEME: &'static str = "process";
}

impl FromUrl for ProcessDetectorBuilder {
  type Error = ProcessDetectorError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ProcessDetectorError::SchemeMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }

    let program = url.path().to_string();
    if program.is_empty() || program == "/" {
      return Err(ProcessDetectorError::EmptyProgram);
    }

    let args = url
      .query_pairs()
      .filter(|(k, _)| k == "arg")
      .map(|(_, v)| v.into_owned())
      .collect();

    Ok(ProcessDetectorBuilder {
      program,
      args,
      options: DetectorOptions::default(),
    })
  }
}

impl ProcessDetectorBuilder {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      options: DetectorOptions::default(),
    }
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.args.push(arg.into());
    self
  }

  pub fn options(mut self, options: DetectorOptions) -> Self {
    self.options = options;
    self
  }

  pub fn build(self) -> Result<ProcessDetector, ProcessDetectorError> {
    info!("启动检测器进程: {} {:?}", self.program, self.args);
    let mut child = Command::new(&self.program)
      .args(&self.args)
      .arg("--max-hands")
      .arg(self.options.max_hands.to_string())
      .arg("--min-detection-confidence")
      .arg(self.options.min_detection_confidence.to_string())
      .stdin(Stdio::piped())
      .stdout(Stdio::piped())
      .stderr(Stdio::inherit())
      .spawn()
      .map_err(|e| ProcessDetectorError::Spawn(self.program.clone(), e))?;

    let stdin = child.stdin.take().ok_or(ProcessDetectorError::Exited)?;
    let stdout = child.stdout.take().ok_or(ProcessDetectorError::Exited)?;
    debug!("检测器进程 PID: {}", child.id());

    Ok(ProcessDetector {
      session: Mutex::new(Session {
        child,
        stdin: Some(stdin),
        stdout: BufReader::new(stdout),
      }),
      options: self.options,
    })
  }
}

struct Session {
  child: Child,
  stdin: Option<ChildStdin>,
  stdout: BufReader<ChildStdout>,
}

/// 一帧请求：长度行加 PNG 数据
fn send_frame(stdin: &mut ChildStdin, payload: &[u8]) -> std::io::Result<()> {
  writeln!(stdin, "{}", payload.len())?;
  stdin.write_all(payload)?;
  stdin.flush()
}

/// 关闭 stdin 后等待检测器退出的时间，超时则强制结束
const EXIT_GRACE: Duration = Duration::from_secs(2);
const EXIT_POLL: Duration = Duration::from_millis(20);

impl Session {
  fn round_trip(&mut self, payload: &[u8]) -> Result<String, ProcessDetectorError> {
    let stdin = self.stdin.as_mut().ok_or(ProcessDetectorError::Exited)?;
    if let Err(e) = send_frame(stdin, payload) {
      return Err(match e.kind() {
        std::io::ErrorKind::BrokenPipe => ProcessDetectorError::Exited,
        _ => ProcessDetectorError::Io(e),
      });
    }

    let mut line = String::new();
    if self.stdout.read_line(&mut line)? == 0 {
      return Err(ProcessDetectorError::Exited);
    }
    Ok(line)
  }

  /// 关闭 stdin 并回收子进程；超过 `grace` 仍未退出则强制结束
  fn close(&mut self, grace: Duration) {
    drop(self.stdin.take());
    let deadline = Instant::now() + grace;
    loop {
      match self.child.try_wait() {
        Ok(Some(status)) if !status.success() => {
          warn!("检测器进程退出状态: {}", status);
          return;
        }
        Ok(Some(_)) => {
          debug!("检测器进程已退出");
          return;
        }
        Ok(None) if Instant::now() < deadline => thread::sleep(EXIT_POLL),
        Ok(None) => {
          warn!("检测器进程在 {:?} 内未退出，强制结束", grace);
          if let Err(e) = self.child.kill() {
            warn!("结束检测器进程失败: {}", e);
          }
          if let Err(e) = self.child.wait() {
            warn!("等待检测器进程退出失败: {}", e);
          }
          return;
        }
        Err(e) => {
          warn!("等待检测器进程退出失败: {}", e);
          return;
        }
      }
    }
  }
}

pub struct ProcessDetector {
  session: Mutex<Session>,
  options: DetectorOptions,
}

impl ProcessDetector {
  pub fn options(&self) -> DetectorOptions {
    self.options
  }
}

impl Drop for ProcessDetector {
  fn drop(&mut self) {
    match self.session.get_mut() {
      Ok(session) => session.close(EXIT_GRACE),
      Err(poisoned) => poisoned.into_inner().close(EXIT_GRACE),
    }
  }
}

impl Model for ProcessDetector {
  type Input = RgbImage;
  type Output = DetectionResult;
  type Error = ProcessDetectorError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    let mut payload = Vec::new();
    input.write_to(&mut Cursor::new(&mut payload), ImageFormat::Png)?;
    debug!("发送图像: {}x{}, {} 字节", input.width(), input.height(), payload.len());

    let line = {
      let mut session = self
        .session
        .lock()
        .map_err(|_| ProcessDetectorError::Poisoned)?;
      session.round_trip(&payload)?
    };

    parse_response(&line, input.width(), input.height())
  }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Response {
  Hands { hands: Vec<HandWire> },
  Error { error: String },
}

#[derive(Deserialize)]
struct HandWire {
  handedness: Handedness,
  #[serde(default)]
  score: f32,
  landmarks: Vec<NormalizedLandmark>,
  #[serde(default)]
  world_landmarks: Option<Vec<WorldLandmark>>,
}

/// 解析检测器的一行 JSON 应答
pub(crate) fn parse_response(
  line: &str,
  width: u32,
  height: u32,
) -> Result<DetectionResult, ProcessDetectorError> {
  let hands = match serde_json::from_str::<Response>(line.trim())? {
    Response::Error { error } => return Err(ProcessDetectorError::Remote(error)),
    Response::Hands { hands } => hands,
  };

  let hands = hands
    .into_iter()
    .enumerate()
    .map(|(hand, wire)| {
      let found = wire.landmarks.len();
      let landmarks: [NormalizedLandmark; LANDMARK_COUNT] = wire
        .landmarks
        .try_into()
        .map_err(|_| ProcessDetectorError::LandmarkCount { hand, found })?;

      let world_landmarks = match wire.world_landmarks {
        Some(world) => {
          let found = world.len();
          let world: [WorldLandmark; LANDMARK_COUNT] = world
            .try_into()
            .map_err(|_| ProcessDetectorError::WorldLandmarkCount { hand, found })?;
          Some(world)
        }
        None => None,
      };

      Ok(HandDetection {
        handedness: wire.handedness,
        score: wire.score,
        landmarks,
        world_landmarks,
      })
    })
    .collect::<Result<Vec<_>, ProcessDetectorError>>()?;

  Ok(DetectionResult {
    hands: hands.into_boxed_slice(),
    width,
    height,
  })
}
