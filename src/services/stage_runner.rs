//! 阶段执行服务
//!
//! 将一个阶段的命令列表作为整体执行：顺序固定，首错即停

use std::sync::Arc;

use chrono::Utc;

use crate::domain::stage::{Stage, StageOutcome, StageReport};
use crate::infra::command::CommandRunner;

/// 阶段执行器
pub struct StageRunner {
    runner: Arc<CommandRunner>,
}

impl StageRunner {
    pub fn new(runner: Arc<CommandRunner>) -> Self {
        Self { runner }
    }

    /// 执行阶段并生成报告
    ///
    /// 开关未启用时立即返回跳过报告，不执行任何命令。
    /// 首条失败命令之后的命令不再执行，报告计入失败的那条。
    pub async fn run_stage(&self, stage: &Stage) -> StageReport {
        if !stage.enabled {
            tracing::info!(stage = %stage.name, "stage skipped: not enabled");
            return StageReport::skipped(&stage.name);
        }

        tracing::info!(
            stage = %stage.name,
            commands = stage.commands.len(),
            "stage started"
        );
        let started_at = Utc::now();

        let mut results = Vec::with_capacity(stage.commands.len());
        let mut succeeded_count = 0;
        for command in &stage.commands {
            let result = self.runner.run(command).await;
            let succeeded = result.succeeded;
            results.push(result);
            if !succeeded {
                break;
            }
            succeeded_count += 1;
        }

        let finished_at = Utc::now();
        let outcome = if succeeded_count == stage.commands.len() {
            StageOutcome::Completed
        } else {
            StageOutcome::Failed
        };

        tracing::info!(
            stage = %stage.name,
            outcome = %outcome.as_str(),
            succeeded = succeeded_count,
            attempted = results.len(),
            "stage finished"
        );

        StageReport {
            stage_name: stage.name.clone(),
            outcome,
            total: results.len(),
            succeeded_count,
            results,
            started_at: Some(started_at),
            finished_at: Some(finished_at),
            duration_ms: Some((finished_at - started_at).num_milliseconds()),
        }
    }
}
