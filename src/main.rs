//! WebUI Setup Agent - 生成式 AI WebUI 安装与运行代理
//!
//! 阶段开关与服务启停全部由环境变量控制：
//! - `WEBUI_TOOL`: comfyui | openwebui | stable-diffusion（默认）
//! - `WEBUI_STAGE_SYSTEM` / `WEBUI_STAGE_VENV` / `WEBUI_STAGE_REPO` /
//!   `WEBUI_STAGE_DOWNLOAD` / `WEBUI_STAGE_APP`: "1" 或 "true" 打开对应阶段
//! - `WEBUI_SERVER`: start | stop，需要 `WEBUI_STAGE_APP` 同时打开
//! - `WEBUI_LOG_DIR` / `WEBUI_GRACE_SECS` / `WEBUI_PYPI_MIRROR` /
//!   `WEBUI_HF_ENDPOINT`: 可选覆盖
//!
//! 未显式打开的阶段一律不执行。

use std::env;

use tracing_subscriber::EnvFilter;

use webui_setup_agent::config::env::{constants, EnvConfig};
use webui_setup_agent::config::tool::stages;
use webui_setup_agent::services::orchestrator::SetupOrchestrator;

fn main() {
    let rt = tokio::runtime::Runtime::new().expect("Failed to create runtime");
    rt.block_on(run());
}

async fn run() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_level(true)
        .init();

    let env_config = EnvConfig::from_env();
    tracing::info!(
        tool = %env_config.tool.as_str(),
        version = constants::VERSION,
        "starting webui-setup-agent"
    );

    let orchestrator = SetupOrchestrator::from_env(&env_config);

    let flags = env_config.stages;
    orchestrator.set_enabled(stages::SYSTEM, flags.system).await;
    orchestrator.set_enabled(stages::VENV, flags.venv).await;
    orchestrator.set_enabled(stages::REPO, flags.repo).await;
    orchestrator
        .set_enabled(stages::DOWNLOAD, flags.download)
        .await;
    orchestrator.set_enabled(stages::APP, flags.app).await;

    // 安装阶段按固定顺序执行，后面的阶段依赖前面的产物
    for stage_name in [stages::SYSTEM, stages::VENV, stages::REPO, stages::DOWNLOAD] {
        let report = orchestrator.invoke(stage_name).await;
        println!("{}", report.summary());
        if !report.is_success() && report.total > 0 {
            // 后续阶段依赖失败阶段的产物，到此为止
            return;
        }
    }

    let result = orchestrator.handle_server(env_config.server_intent).await;
    println!("{}", result.summary());
}
