//! 基础设施模块
//!
//! 封装外部依赖（shell 执行、日志落盘）

pub mod command;
pub mod logger;

pub use command::{CommandError, CommandRunner};
pub use logger::ExecutionLogger;
