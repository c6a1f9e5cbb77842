//! WebUI Setup Agent - 生成式 AI WebUI 安装与运行代理
//!
//! 把安装过程拆成带开关的阶段（系统依赖、虚拟环境、程序文件、
//! 模型下载），按顺序执行 shell 命令并在首次失败时停止；
//! 随后以进程模式探测的方式启动、确认与停止后台服务。

pub mod config;
pub mod domain;
pub mod infra;
pub mod services;
