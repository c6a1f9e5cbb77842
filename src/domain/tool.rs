//! 受管工具领域模型

use serde::{Deserialize, Serialize};

/// 受管的生成式 AI WebUI 工具
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    ComfyUi,
    OpenWebUi,
    StableDiffusion,
}

impl ToolKind {
    /// 转换为字符串，用于日志名与目录名
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::ComfyUi => "comfyui",
            ToolKind::OpenWebUi => "openwebui",
            ToolKind::StableDiffusion => "stable-diffusion",
        }
    }

    /// 从字符串解析，无法识别时回落到 StableDiffusion
    pub fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "comfyui" => ToolKind::ComfyUi,
            "openwebui" => ToolKind::OpenWebUi,
            _ => ToolKind::StableDiffusion,
        }
    }
}
