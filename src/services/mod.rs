//! 服务层模块
//!
//! 包含核心业务逻辑

pub mod gate;
pub mod orchestrator;
pub mod stage_runner;
pub mod supervisor;

pub use gate::StageGateController;
pub use orchestrator::SetupOrchestrator;
pub use stage_runner::StageRunner;
pub use supervisor::ProcessSupervisor;
