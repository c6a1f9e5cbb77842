//! 安装/运行编排
//!
//! 对外的调用边界：开关设置、阶段触发、服务启停。
//! 任何有副作用的操作之前都先询问开关控制器。

use std::sync::Arc;
use std::time::Duration;

use crate::config::env::EnvConfig;
use crate::config::tool::{stages, ToolConfig};
use crate::domain::server::{
    ServerActionResult, ServerIntent, StartResult, StopResult,
};
use crate::domain::stage::StageReport;
use crate::infra::command::CommandRunner;
use crate::infra::logger::ExecutionLogger;
use crate::services::gate::StageGateController;
use crate::services::stage_runner::StageRunner;
use crate::services::supervisor::ProcessSupervisor;

/// 安装/运行编排器
pub struct SetupOrchestrator {
    tool: ToolConfig,
    gate: StageGateController,
    stage_runner: StageRunner,
    supervisor: ProcessSupervisor,
}

impl SetupOrchestrator {
    /// 创建编排器
    pub fn new(tool: ToolConfig, log_dir: &str, grace: Duration) -> Self {
        let logger = Arc::new(ExecutionLogger::new(tool.tool.as_str(), log_dir));
        let runner = Arc::new(CommandRunner::new(logger.clone()));
        Self {
            tool,
            gate: StageGateController::new(),
            stage_runner: StageRunner::new(runner.clone()),
            supervisor: ProcessSupervisor::new(runner, logger, grace),
        }
    }

    /// 按环境配置装配编排器
    pub fn from_env(env: &EnvConfig) -> Self {
        let mut tool = ToolConfig::for_tool(env.tool);
        if let Some(ref mirror) = env.pypi_mirror {
            tool.pypi_mirror = mirror.clone();
        }
        if let Some(ref endpoint) = env.hf_endpoint {
            tool.hf_endpoint = endpoint.clone();
        }
        Self::new(tool, &env.log_dir, Duration::from_secs(env.grace_secs))
    }

    /// 设置阶段开关
    pub async fn set_enabled(&self, stage_name: &str, enabled: bool) {
        self.gate.set_enabled(stage_name, enabled).await;
    }

    /// 查询阶段开关
    pub async fn is_enabled(&self, stage_name: &str) -> bool {
        self.gate.is_enabled(stage_name).await
    }

    /// 触发一个安装阶段
    ///
    /// 开关状态在进入阶段时读取一次；开关关闭或阶段名未知时
    /// 返回跳过报告，不产生任何副作用。
    pub async fn invoke(&self, stage_name: &str) -> StageReport {
        let enabled = self.gate.is_enabled(stage_name).await;
        let Some(stage) = self.tool.stage(stage_name, enabled) else {
            tracing::warn!(stage = %stage_name, "unknown stage requested");
            return StageReport::skipped(stage_name);
        };

        // venv 阶段先确保虚拟环境根目录存在
        if enabled && stage_name == stages::VENV {
            if let Err(e) = tokio::fs::create_dir_all(&self.tool.venv_dir).await {
                tracing::warn!(
                    dir = %self.tool.venv_dir,
                    error = %e,
                    "failed to create venv dir"
                );
            }
        }

        self.stage_runner.run_stage(&stage).await
    }

    /// 请求启动受管服务
    ///
    /// `app` 开关关闭时不执行任何启动动作
    pub async fn request_start(&self) -> StartResult {
        if !self.gate.is_enabled(stages::APP).await {
            return StartResult::not_started("run stage not enabled");
        }
        self.supervisor.start(&self.tool.server_handle()).await
    }

    /// 请求停止受管服务
    ///
    /// `app` 开关关闭时不发送任何终止信号
    pub async fn request_stop(&self) -> StopResult {
        if !self.gate.is_enabled(stages::APP).await {
            return StopResult::not_stopped("run stage not enabled");
        }
        self.supervisor.stop(&self.tool.server_handle()).await
    }

    /// 处理服务生命周期意图
    pub async fn handle_server(&self, intent: ServerIntent) -> ServerActionResult {
        match intent {
            ServerIntent::Start => ServerActionResult::Started(self.request_start().await),
            ServerIntent::Stop => ServerActionResult::Stopped(self.request_stop().await),
            ServerIntent::None => ServerActionResult::Idle,
        }
    }

    /// 工具配置
    pub fn tool_config(&self) -> &ToolConfig {
        &self.tool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stage::StageOutcome;
    use crate::domain::tool::ToolKind;

    fn orchestrator_in(dir: &tempfile::TempDir) -> SetupOrchestrator {
        let mut tool = ToolConfig::for_tool(ToolKind::StableDiffusion);
        tool.venv_dir = dir.path().join("venv").display().to_string();
        SetupOrchestrator::new(
            tool,
            &dir.path().join("logs").display().to_string(),
            Duration::from_millis(0),
        )
    }

    #[tokio::test]
    async fn test_invoke_with_closed_gate_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_in(&dir);

        let report = orchestrator.invoke(stages::SYSTEM).await;

        assert_eq!(report.outcome, StageOutcome::Skipped);
        assert_eq!(report.total, 0);
    }

    #[tokio::test]
    async fn test_unknown_stage_is_skipped_even_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_in(&dir);

        orchestrator.set_enabled("bogus", true).await;
        let report = orchestrator.invoke("bogus").await;

        assert_eq!(report.outcome, StageOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_venv_stage_creates_venv_dir() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_in(&dir);

        orchestrator.set_enabled(stages::VENV, true).await;
        let report = orchestrator.invoke(stages::VENV).await;

        // uv 不存在于测试环境，阶段会失败，但目录已经建好
        assert_eq!(report.outcome, StageOutcome::Failed);
        assert!(dir.path().join("venv").is_dir());
    }

    #[tokio::test]
    async fn test_gated_start_launches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut tool = ToolConfig::for_tool(ToolKind::StableDiffusion);
        tool.venv_dir = dir.path().display().to_string();
        let orchestrator = SetupOrchestrator::new(
            tool,
            &dir.path().join("logs").display().to_string(),
            Duration::from_millis(0),
        );

        let result = orchestrator.request_start().await;

        assert!(!result.started);
        assert!(result.message.contains("not enabled"));
        // 启动命令从未执行：目录里没有留下服务日志
        assert!(!dir.path().join("stable-diffusion.log").exists());
    }

    #[tokio::test]
    async fn test_gated_stop_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_in(&dir);

        let result = orchestrator.request_stop().await;

        assert!(!result.stopped);
        assert!(result.message.contains("not enabled"));
    }

    #[tokio::test]
    async fn test_handle_server_idle_intent() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = orchestrator_in(&dir);

        let result = orchestrator.handle_server(ServerIntent::None).await;
        assert!(matches!(result, ServerActionResult::Idle));
        assert_eq!(result.summary(), "no server action requested");
    }
}
