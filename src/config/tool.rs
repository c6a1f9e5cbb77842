//! 工具安装配置
//!
//! 每个受管工具的阶段命令清单与服务启动方式

use crate::domain::command::ShellCommand;
use crate::domain::server::ServerHandle;
use crate::domain::stage::Stage;
use crate::domain::tool::ToolKind;

/// 阶段名称
pub mod stages {
    pub const SYSTEM: &str = "system";
    pub const VENV: &str = "venv";
    pub const REPO: &str = "repo";
    pub const DOWNLOAD: &str = "download";
    /// 服务启停共用的开关名
    pub const APP: &str = "app";
}

/// 工具配置
///
/// 阶段命令以单条 shell 字符串的形式渲染，保留其中的
/// 链式与后台语法。
#[derive(Clone, Debug)]
pub struct ToolConfig {
    pub tool: ToolKind,
    /// 虚拟环境所在目录
    pub venv_dir: String,
    pub repo_url: String,
    pub repo_name: String,
    /// 服务自身的输出日志
    pub server_log: String,
    pub pypi_mirror: String,
    pub hf_endpoint: String,
}

impl ToolConfig {
    /// 按工具生成默认配置
    pub fn for_tool(tool: ToolKind) -> Self {
        Self {
            tool,
            venv_dir: format!("ai_{}", tool.as_str()),
            repo_url: "https://github.com/love9678/stable-diffusion-webui-forge.git".to_string(),
            repo_name: "stable-diffusion-webui-forge".to_string(),
            server_log: format!("{}.log", tool.as_str()),
            pypi_mirror: "http://mirrors.cloud.tencent.com/pypi/simple".to_string(),
            hf_endpoint: "https://hf-mirror.com".to_string(),
        }
    }

    /// 系统依赖安装命令
    pub fn system_commands(&self) -> Vec<String> {
        vec![
            ShellCommand::new("apt-get install sudo -y").render(),
            ShellCommand::new("echo \"Set disable_coredump false\" >> /etc/sudo.conf").render(),
            ShellCommand::new("apt-get update").render(),
            ShellCommand::new(
                "apt install build-essential libgl1 libtcmalloc-minimal4 ffmpeg bc -y",
            )
            .render(),
        ]
    }

    /// 虚拟环境安装命令
    pub fn venv_commands(&self) -> Vec<String> {
        vec![
            ShellCommand::new("uv venv -p 3.10 && . .venv/bin/activate")
                .current_dir(&self.venv_dir)
                .render(),
            ShellCommand::new(". .venv/bin/activate && uv pip install -U pip setuptools wheel")
                .current_dir(&self.venv_dir)
                .render(),
            ShellCommand::new(format!(
                ". .venv/bin/activate && uv pip install -U torch==2.3.1 torchvision torchaudio aria2 -i {}",
                self.pypi_mirror
            ))
            .current_dir(&self.venv_dir)
            .render(),
        ]
    }

    /// 程序文件安装命令
    pub fn repo_commands(&self) -> Vec<String> {
        vec![
            // 清掉可能存在的旧目录再克隆
            ShellCommand::new(format!("rm -rf {}", self.repo_name))
                .current_dir(&self.venv_dir)
                .render(),
            ShellCommand::new(format!("git clone {} {}", self.repo_url, self.repo_name))
                .current_dir(&self.venv_dir)
                .render(),
        ]
    }

    /// 模型下载命令
    pub fn download_commands(&self) -> Vec<String> {
        let model_dir = format!(
            "{}/{}/models/Stable-diffusion/flux",
            self.venv_dir, self.repo_name
        );
        vec![
            ShellCommand::new(format!("mkdir {}", model_dir)).render(),
            ShellCommand::new(format!(
                "aria2c -c -x 16 -s 16 -k 50M \
                 {}/lllyasviel/flux1-dev-bnb-nf4/resolve/main/flux1-dev-bnb-nf4-v2.safetensors \
                 -o flux1-dev-bnb-nf4-v2.safetensors",
                self.hf_endpoint
            ))
            .current_dir(&model_dir)
            .render(),
        ]
    }

    /// 组装指定阶段，未知阶段名返回 None
    pub fn stage(&self, name: &str, enabled: bool) -> Option<Stage> {
        let (display_name, commands) = match name {
            stages::SYSTEM => ("系统依赖安装", self.system_commands()),
            stages::VENV => ("虚拟环境设置", self.venv_commands()),
            stages::REPO => ("程序文件设置", self.repo_commands()),
            stages::DOWNLOAD => ("文件或模型下载", self.download_commands()),
            _ => return None,
        };
        Some(Stage::new(name, display_name, commands, enabled))
    }

    /// 受管服务句柄
    ///
    /// 启动命令把服务放入后台并立即返回；存活探测匹配
    /// WebUI 实际拉起的 python 启动器进程。
    pub fn server_handle(&self) -> ServerHandle {
        let start_command = ShellCommand::new(format!(
            ". .venv/bin/activate && cd {} && nohup ./webui.sh -f > {} 2>&1 &",
            self.repo_name, self.server_log
        ))
        .current_dir(&self.venv_dir)
        .env("HF_ENDPOINT", &self.hf_endpoint)
        .render();

        ServerHandle::new(start_command, "python.*launch.py", &self.server_log)
    }
}
