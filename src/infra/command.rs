//! 命令执行器
//!
//! 通过宿主 shell 执行单条命令字符串，命令内部的管道、
//! 重定向与 `&&` 链式语法原样生效；阻塞直至退出并捕获 stderr。

use std::process::Output;
use std::sync::Arc;

use thiserror::Error;
use tokio::process::Command;

use crate::domain::stage::CommandResult;
use crate::infra::logger::ExecutionLogger;

/// 命令执行错误
#[derive(Debug, Error)]
pub enum CommandError {
    /// 命令启动失败
    #[error("failed to spawn command: {0}")]
    SpawnFailed(#[from] std::io::Error),
}

/// 命令执行器
pub struct CommandRunner {
    logger: Arc<ExecutionLogger>,
}

impl CommandRunner {
    pub fn new(logger: Arc<ExecutionLogger>) -> Self {
        Self { logger }
    }

    /// 执行单条 shell 命令并归一化结果
    ///
    /// 不重试。命令文本按原样记录，不做脱敏，这是已知并接受的限制。
    pub async fn run(&self, command_text: &str) -> CommandResult {
        self.logger
            .info(&format!("executing command: {}", command_text));

        match self.output(command_text).await {
            Ok(output) if output.status.success() => {
                self.logger.info("command succeeded");
                CommandResult::ok(command_text)
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr)
                    .trim_end()
                    .to_string();
                self.logger.error(&format!("command failed: {}", stderr));
                CommandResult::failed(command_text, stderr)
            }
            Err(e) => {
                self.logger.error(&format!("command failed: {}", e));
                CommandResult::failed(command_text, e.to_string())
            }
        }
    }

    /// 低层执行，返回完整输出，不写审计日志
    ///
    /// 供存活探测等不需要逐条记录的调用方使用
    pub async fn output(&self, command_text: &str) -> Result<Output, CommandError> {
        let output = Command::new("sh")
            .arg("-c")
            .arg(command_text)
            .output()
            .await?;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runner() -> (CommandRunner, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let runner = CommandRunner::new(Arc::new(ExecutionLogger::new("test", dir.path())));
        (runner, dir)
    }

    #[tokio::test]
    async fn test_run_success() {
        let (runner, _dir) = runner();
        let result = runner.run("true").await;
        assert!(result.succeeded);
        assert_eq!(result.command, "true");
        assert!(result.error_output.is_none());
    }

    #[tokio::test]
    async fn test_run_failure_captures_stderr() {
        let (runner, _dir) = runner();
        let result = runner.run("echo oops >&2; exit 3").await;
        assert!(!result.succeeded);
        assert_eq!(result.error_output, Some("oops".to_string()));
    }

    #[tokio::test]
    async fn test_run_failure_with_empty_stderr() {
        let (runner, _dir) = runner();
        let result = runner.run("false").await;
        assert!(!result.succeeded);
        assert_eq!(result.error_output, Some(String::new()));
    }

    #[tokio::test]
    async fn test_shell_syntax_is_honored() {
        let (runner, _dir) = runner();
        let result = runner.run("echo a | grep a && true").await;
        assert!(result.succeeded);
    }

    #[tokio::test]
    async fn test_output_preserves_exit_code() {
        let (runner, _dir) = runner();
        let output = runner.output("exit 7").await.unwrap();
        assert_eq!(output.status.code(), Some(7));
    }
}
