//! 后台服务进程监督
//!
//! 启动后台服务、在宽限期后探测存活、按模式终止并复核。
//! 不保存 PID：进程身份每次都通过 `pgrep -f` 模式重新推导，
//! 因此控制端自身重启后仍可接管既有服务进程。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::sleep;

use crate::domain::server::{ServerHandle, StartResult, StopResult, SupervisorState};
use crate::infra::command::CommandRunner;
use crate::infra::logger::ExecutionLogger;

/// 进程监督器
///
/// 状态机 STOPPED -> STARTING -> RUNNING -> STOPPING -> STOPPED。
/// RUNNING 确认后不再持续监测，也不自动重启。
pub struct ProcessSupervisor {
    runner: Arc<CommandRunner>,
    logger: Arc<ExecutionLogger>,
    /// 启动后到首次探测之间的等待时间
    grace: Duration,
    /// 同一监督器上的 start/stop 互斥，避免探测结果互相干扰
    lifecycle: Mutex<()>,
    state: RwLock<SupervisorState>,
}

impl ProcessSupervisor {
    pub fn new(
        runner: Arc<CommandRunner>,
        logger: Arc<ExecutionLogger>,
        grace: Duration,
    ) -> Self {
        Self {
            runner,
            logger,
            grace,
            lifecycle: Mutex::new(()),
            state: RwLock::new(SupervisorState::Stopped),
        }
    }

    /// 当前状态机状态
    pub async fn state(&self) -> SupervisorState {
        *self.state.read().await
    }

    /// 启动后台服务
    ///
    /// 启动命令自身应把服务进程放到后台并立即返回；
    /// 随后等待宽限期并做一次存活探测确认。
    pub async fn start(&self, handle: &ServerHandle) -> StartResult {
        let _guard = self.lifecycle.lock().await;
        self.set_state(SupervisorState::Starting).await;

        self.logger
            .info(&format!("starting server: {}", handle.start_command));

        match self.runner.output(&handle.start_command).await {
            Ok(output) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr)
                    .trim_end()
                    .to_string();
                self.logger
                    .error(&format!("server launch failed: {}", stderr));
                self.set_state(SupervisorState::Stopped).await;
                return StartResult::not_started(format!("launch command failed: {}", stderr));
            }
            Err(e) => {
                self.logger.error(&format!("server launch failed: {}", e));
                self.set_state(SupervisorState::Stopped).await;
                return StartResult::not_started(format!("launch command failed: {}", e));
            }
            Ok(_) => {}
        }

        // 给后台进程注册到进程表留出时间
        sleep(self.grace).await;

        let pids = self.probe(handle).await;
        match pids.first() {
            Some(pid) => {
                self.logger
                    .info(&format!("server started, pid {}", pid));
                self.set_state(SupervisorState::Running).await;
                StartResult::running(
                    pid,
                    format!("server started, log: tail -f {}", handle.log_path),
                )
            }
            None => {
                self.logger.warn("process may not have started correctly");
                self.set_state(SupervisorState::Stopped).await;
                StartResult::not_started("process may not have started correctly")
            }
        }
    }

    /// 停止后台服务
    ///
    /// 先按模式优雅终止，再对终止后仍存活的 PID 逐个强制终止，
    /// 最后复核一次探测结果。对已停止的服务是无副作用的成功。
    pub async fn stop(&self, handle: &ServerHandle) -> StopResult {
        let _guard = self.lifecycle.lock().await;

        if self.probe(handle).await.is_empty() {
            self.logger.info("server already stopped");
            self.set_state(SupervisorState::Stopped).await;
            return StopResult::stopped("server already stopped");
        }

        self.set_state(SupervisorState::Stopping).await;
        self.logger
            .info(&format!("stopping server: {}", handle.liveness_probe));

        // 优雅终止所有匹配模式的进程
        let _ = self
            .runner
            .output(&format!("pkill -f '{}'", handle.liveness_probe))
            .await;

        // 对仍然存活的 PID 逐个强制终止；此快照之后新出现的匹配不再追击
        let survivors = self.probe(handle).await;
        for pid in &survivors {
            let _ = self
                .runner
                .output(&format!("kill -9 {} 2>/dev/null", pid))
                .await;
        }

        let remaining = self.probe(handle).await;
        if remaining.is_empty() {
            self.logger.info("server stopped");
            self.set_state(SupervisorState::Stopped).await;
            StopResult::stopped("server stopped")
        } else {
            self.logger.warn("server may not be fully stopped");
            StopResult::not_stopped("server may not be fully stopped")
        }
    }

    /// 执行一次存活探测，返回当前匹配的 PID 列表
    ///
    /// pgrep 退出码 1 表示无匹配，不是错误
    async fn probe(&self, handle: &ServerHandle) -> Vec<String> {
        let command = format!("pgrep -f '{}'", handle.liveness_probe);
        match self.runner.output(&command).await {
            Ok(output) if output.status.success() => String::from_utf8_lossy(&output.stdout)
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }

    async fn set_state(&self, next: SupervisorState) {
        let mut state = self.state.write().await;
        *state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supervisor(grace: Duration) -> (ProcessSupervisor, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let logger = Arc::new(ExecutionLogger::new("test", dir.path()));
        let runner = Arc::new(CommandRunner::new(logger.clone()));
        (ProcessSupervisor::new(runner, logger, grace), dir)
    }

    #[tokio::test]
    async fn test_initial_state_is_stopped() {
        let (supervisor, _dir) = supervisor(Duration::from_millis(0));
        assert_eq!(supervisor.state().await, SupervisorState::Stopped);
    }

    #[tokio::test]
    async fn test_start_with_no_match_warns() {
        let (supervisor, _dir) = supervisor(Duration::from_millis(0));
        let handle = ServerHandle::new("true", "no_such_process_marker_977", "app.log");

        let result = supervisor.start(&handle).await;

        assert!(!result.started);
        assert!(result.pid.is_none());
        assert!(!result.message.is_empty());
        assert_eq!(supervisor.state().await, SupervisorState::Stopped);
    }

    #[tokio::test]
    async fn test_start_with_failing_launch_command() {
        let (supervisor, _dir) = supervisor(Duration::from_millis(0));
        let handle = ServerHandle::new(
            "echo cannot launch >&2; exit 1",
            "no_such_process_marker_978",
            "app.log",
        );

        let result = supervisor.start(&handle).await;

        assert!(!result.started);
        assert!(result.message.contains("cannot launch"));
    }

    #[tokio::test]
    async fn test_stop_when_already_stopped_is_noop_success() {
        let (supervisor, _dir) = supervisor(Duration::from_millis(0));
        let handle = ServerHandle::new("true", "no_such_process_marker_979", "app.log");

        let first = supervisor.stop(&handle).await;
        let second = supervisor.stop(&handle).await;

        assert!(first.stopped);
        assert!(second.stopped);
    }

    #[tokio::test]
    async fn test_start_then_stop_round_trip() {
        let (supervisor, _dir) = supervisor(Duration::from_millis(300));
        // 独一无二的参数串，pgrep -f 只会匹配到这里拉起的进程
        let handle = ServerHandle::new(
            "nohup sleep 43211234 >/dev/null 2>&1 &",
            "sleep 43211234",
            "app.log",
        );

        let started = supervisor.start(&handle).await;
        assert!(started.started, "start failed: {}", started.message);
        assert!(started.pid.is_some());
        assert_eq!(supervisor.state().await, SupervisorState::Running);

        let stopped = supervisor.stop(&handle).await;
        assert!(stopped.stopped, "stop failed: {}", stopped.message);
        assert_eq!(supervisor.state().await, SupervisorState::Stopped);

        // 再停一次仍然成功
        let again = supervisor.stop(&handle).await;
        assert!(again.stopped);
    }
}
