//! 环境变量配置加载

use std::env;

use crate::domain::server::ServerIntent;
use crate::domain::tool::ToolKind;

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 受管工具
    pub tool: ToolKind,
    /// 审计日志目录
    pub log_dir: String,
    /// 启动宽限期（秒）
    pub grace_secs: u64,
    /// PyPI 镜像覆盖
    pub pypi_mirror: Option<String>,
    /// HuggingFace 端点覆盖
    pub hf_endpoint: Option<String>,
    /// 各阶段开关
    pub stages: StageFlags,
    /// 服务生命周期意图
    pub server_intent: ServerIntent,
}

/// 阶段开关，对应原 UI 的五个功能开关，默认全部关闭
#[derive(Clone, Copy, Debug, Default)]
pub struct StageFlags {
    pub system: bool,
    pub venv: bool,
    pub repo: bool,
    pub app: bool,
    pub download: bool,
}

impl StageFlags {
    /// 从环境变量加载
    pub fn from_env() -> Self {
        Self {
            system: env_flag("WEBUI_STAGE_SYSTEM"),
            venv: env_flag("WEBUI_STAGE_VENV"),
            repo: env_flag("WEBUI_STAGE_REPO"),
            app: env_flag("WEBUI_STAGE_APP"),
            download: env_flag("WEBUI_STAGE_DOWNLOAD"),
        }
    }
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let tool = env::var("WEBUI_TOOL")
            .map(|v| ToolKind::from_str(&v))
            .unwrap_or(ToolKind::StableDiffusion);

        let log_dir =
            env::var("WEBUI_LOG_DIR").unwrap_or_else(|_| constants::DEFAULT_LOG_DIR.to_string());

        let grace_secs = env::var("WEBUI_GRACE_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(constants::STARTUP_GRACE_SECS);

        let pypi_mirror = env::var("WEBUI_PYPI_MIRROR").ok().filter(|s| !s.is_empty());
        let hf_endpoint = env::var("WEBUI_HF_ENDPOINT").ok().filter(|s| !s.is_empty());

        let stages = StageFlags::from_env();

        let server_intent = env::var("WEBUI_SERVER")
            .map(|v| ServerIntent::from_str(&v))
            .unwrap_or(ServerIntent::None);

        Self {
            tool,
            log_dir,
            grace_secs,
            pypi_mirror,
            hf_endpoint,
            stages,
            server_intent,
        }
    }
}

/// 解析布尔开关环境变量
fn env_flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// 常量
pub mod constants {
    /// 启动后到首次存活探测之间的宽限期（秒）
    pub const STARTUP_GRACE_SECS: u64 = 3;

    /// 默认审计日志目录
    pub const DEFAULT_LOG_DIR: &str = "logs";

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_flag_parsing() {
        env::set_var("TEST_WEBUI_FLAG", "1");
        assert!(env_flag("TEST_WEBUI_FLAG"));

        env::set_var("TEST_WEBUI_FLAG", "true");
        assert!(env_flag("TEST_WEBUI_FLAG"));

        env::set_var("TEST_WEBUI_FLAG", "0");
        assert!(!env_flag("TEST_WEBUI_FLAG"));

        env::remove_var("TEST_WEBUI_FLAG");
        assert!(!env_flag("TEST_WEBUI_FLAG"));
    }

    #[test]
    fn test_stage_flags_default_closed() {
        let flags = StageFlags::default();
        assert!(!flags.system);
        assert!(!flags.venv);
        assert!(!flags.repo);
        assert!(!flags.app);
        assert!(!flags.download);
    }
}
