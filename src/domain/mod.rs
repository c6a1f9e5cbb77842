//! 领域模型模块
//!
//! 纯数据结构，不依赖 tokio

pub mod command;
pub mod server;
pub mod stage;
pub mod tool;

// Re-exports for convenience
pub use command::ShellCommand;
pub use server::{
    ServerActionResult, ServerHandle, ServerIntent, StartResult, StopResult, SupervisorState,
};
pub use stage::{CommandResult, Stage, StageOutcome, StageReport};
pub use tool::ToolKind;
