//! Shell 命令构造器

/// 以单条 shell 字符串执行的命令
///
/// 工作目录与环境变量的拼接收敛到这里，命令主体中的
/// 管道、重定向、`&&` 链式与 `&` 后台语法原样保留。
#[derive(Clone, Debug, Default)]
pub struct ShellCommand {
    work_dir: Option<String>,
    envs: Vec<(String, String)>,
    pipeline: String,
}

impl ShellCommand {
    /// 创建命令，`pipeline` 为命令主体（可含 shell 语法）
    pub fn new(pipeline: impl Into<String>) -> Self {
        Self {
            work_dir: None,
            envs: Vec::new(),
            pipeline: pipeline.into(),
        }
    }

    /// 设置工作目录
    pub fn current_dir(mut self, dir: impl Into<String>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// 添加环境变量
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// 渲染为单条 shell 字符串
    pub fn render(&self) -> String {
        let mut parts = Vec::with_capacity(self.envs.len() + 2);
        if let Some(ref dir) = self.work_dir {
            parts.push(format!("cd {}", dir));
        }
        for (key, value) in &self.envs {
            parts.push(format!("export {}={}", key, value));
        }
        parts.push(self.pipeline.clone());
        parts.join(" && ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_bare_pipeline() {
        let cmd = ShellCommand::new("apt-get update");
        assert_eq!(cmd.render(), "apt-get update");
    }

    #[test]
    fn test_render_with_dir_and_env() {
        let cmd = ShellCommand::new("nohup ./webui.sh -f > app.log 2>&1 &")
            .current_dir("ai_tool/repo")
            .env("HF_ENDPOINT", "https://hf-mirror.com");
        assert_eq!(
            cmd.render(),
            "cd ai_tool/repo && export HF_ENDPOINT=https://hf-mirror.com && \
             nohup ./webui.sh -f > app.log 2>&1 &"
        );
    }

    #[test]
    fn test_render_keeps_pipeline_syntax() {
        let cmd = ShellCommand::new(". .venv/bin/activate && uv pip install -U pip")
            .current_dir("ai_tool");
        assert_eq!(
            cmd.render(),
            "cd ai_tool && . .venv/bin/activate && uv pip install -U pip"
        );
    }
}
