//! 后台服务领域模型

use serde::{Deserialize, Serialize};

/// 受管后台服务句柄
///
/// 不持有 PID。进程身份与存活状态在每次检查时通过
/// 模式探测重新推导，因此控制端重启后句柄依然可用。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerHandle {
    /// 启动命令，自身应将真正的服务进程放入后台并立即返回
    pub start_command: String,
    /// 进程匹配模式，交给 `pgrep -f` 使用
    pub liveness_probe: String,
    /// 服务自身的输出日志路径
    pub log_path: String,
}

impl ServerHandle {
    pub fn new(
        start_command: impl Into<String>,
        liveness_probe: impl Into<String>,
        log_path: impl Into<String>,
    ) -> Self {
        Self {
            start_command: start_command.into(),
            liveness_probe: liveness_probe.into(),
            log_path: log_path.into(),
        }
    }
}

/// 监督器状态机
///
/// STOPPED -> STARTING -> RUNNING -> STOPPING -> STOPPED，
/// 无自动重启，RUNNING 之后不做持续健康监测。
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// 启动操作结果
#[derive(Clone, Debug, Serialize)]
pub struct StartResult {
    pub started: bool,
    /// 探测到的第一个匹配 PID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<String>,
    pub message: String,
}

impl StartResult {
    /// 探测确认存活
    pub fn running(pid: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            started: true,
            pid: Some(pid.into()),
            message: message.into(),
        }
    }

    /// 未能确认启动
    pub fn not_started(message: impl Into<String>) -> Self {
        Self {
            started: false,
            pid: None,
            message: message.into(),
        }
    }
}

/// 停止操作结果
#[derive(Clone, Debug, Serialize)]
pub struct StopResult {
    pub stopped: bool,
    pub message: String,
}

impl StopResult {
    /// 探测确认已停止
    pub fn stopped(message: impl Into<String>) -> Self {
        Self {
            stopped: true,
            message: message.into(),
        }
    }

    /// 未能确认停止
    pub fn not_stopped(message: impl Into<String>) -> Self {
        Self {
            stopped: false,
            message: message.into(),
        }
    }
}

/// 服务生命周期意图
///
/// 启动与停止对外是两个独立触发器，归一化为显式枚举。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerIntent {
    Start,
    Stop,
    None,
}

impl ServerIntent {
    /// 由两个独立的触发标志归一化
    ///
    /// 两者同时为真时启动优先，保持既有行为不变
    pub fn from_flags(start_requested: bool, stop_requested: bool) -> Self {
        if start_requested {
            ServerIntent::Start
        } else if stop_requested {
            ServerIntent::Stop
        } else {
            ServerIntent::None
        }
    }

    /// 从字符串解析，无法识别时视为无操作
    pub fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "start" => ServerIntent::Start,
            "stop" => ServerIntent::Stop,
            _ => ServerIntent::None,
        }
    }
}

/// 一次生命周期处理的结果，按实际执行的动作区分
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerActionResult {
    Started(StartResult),
    Stopped(StopResult),
    /// 意图为无操作，什么都没发生
    Idle,
}

impl ServerActionResult {
    /// 人类可读的单行摘要
    pub fn summary(&self) -> &str {
        match self {
            ServerActionResult::Started(r) => &r.message,
            ServerActionResult::Stopped(r) => &r.message,
            ServerActionResult::Idle => "no server action requested",
        }
    }
}
