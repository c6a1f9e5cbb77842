//! 安装阶段领域模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 安装阶段
///
/// 一组按固定顺序执行的 shell 命令。后面的命令依赖前面命令
/// 留下的文件系统副作用，顺序不可调整、不可并行。
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stage {
    /// 阶段标识 (e.g., "system", "venv", "repo", "download")
    pub name: String,
    /// 显示名称 (e.g., "系统依赖安装")
    pub display_name: String,
    /// 待执行的 shell 命令，开始执行后不再变更
    pub commands: Vec<String>,
    /// 开关状态，进入阶段时读取一次
    pub enabled: bool,
}

impl Stage {
    /// 创建阶段
    pub fn new(
        name: &str,
        display_name: &str,
        commands: Vec<String>,
        enabled: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            display_name: display_name.to_string(),
            commands,
            enabled,
        }
    }
}

/// 阶段执行结果状态
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    /// 所有命令执行成功
    Completed,
    /// 某条命令失败，阶段提前终止
    Failed,
    /// 开关未启用，未执行任何命令
    Skipped,
}

impl StageOutcome {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            StageOutcome::Completed => "completed",
            StageOutcome::Failed => "failed",
            StageOutcome::Skipped => "skipped",
        }
    }
}

/// 单条命令的执行结果，创建后不再变更
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CommandResult {
    /// 执行的命令文本
    pub command: String,
    /// 退出码是否为 0
    pub succeeded: bool,
    /// 失败时捕获的 stderr 文本
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_output: Option<String>,
}

impl CommandResult {
    /// 创建成功结果
    pub fn ok(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            succeeded: true,
            error_output: None,
        }
    }

    /// 创建失败结果
    pub fn failed(command: impl Into<String>, error_output: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            succeeded: false,
            error_output: Some(error_output.into()),
        }
    }
}

/// 阶段执行报告
///
/// 提前终止时 `total` 只计入实际尝试过的命令（含失败的那条）；
/// 开关未启用时 `total` 为 0，与"完成了一个空阶段"不同。
#[derive(Clone, Debug, Serialize)]
pub struct StageReport {
    pub stage_name: String,
    pub outcome: StageOutcome,
    /// 实际尝试执行的命令数
    pub total: usize,
    /// 成功的命令数，恒有 succeeded_count <= total
    pub succeeded_count: usize,
    /// 按执行顺序排列的命令结果
    pub results: Vec<CommandResult>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// 持续时间（毫秒）
    pub duration_ms: Option<i64>,
}

impl StageReport {
    /// 开关未启用时的跳过报告
    pub fn skipped(stage_name: &str) -> Self {
        Self {
            stage_name: stage_name.to_string(),
            outcome: StageOutcome::Skipped,
            total: 0,
            succeeded_count: 0,
            results: Vec::new(),
            started_at: None,
            finished_at: None,
            duration_ms: None,
        }
    }

    /// 是否全部成功
    pub fn is_success(&self) -> bool {
        self.outcome == StageOutcome::Completed
    }

    /// 人类可读的单行摘要
    pub fn summary(&self) -> String {
        match self.outcome {
            StageOutcome::Skipped => {
                format!("stage {} skipped: not enabled", self.stage_name)
            }
            StageOutcome::Completed => format!(
                "stage {} completed: {}/{} commands succeeded",
                self.stage_name, self.succeeded_count, self.total
            ),
            StageOutcome::Failed => format!(
                "stage {} failed: {}/{} commands succeeded",
                self.stage_name, self.succeeded_count, self.total
            ),
        }
    }
}
