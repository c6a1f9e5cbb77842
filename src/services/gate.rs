//! 阶段开关控制
//!
//! 所有阶段默认关闭，只有显式启用后才允许执行

use std::collections::HashMap;

use tokio::sync::RwLock;

/// 阶段开关控制器
///
/// 只回答"这个阶段现在允许执行吗"，不了解阶段的内容。
/// 未注册过的阶段名一律视为关闭。
pub struct StageGateController {
    flags: RwLock<HashMap<String, bool>>,
}

impl StageGateController {
    /// 创建控制器，所有开关初始为关闭
    pub fn new() -> Self {
        Self {
            flags: RwLock::new(HashMap::new()),
        }
    }

    /// 查询开关状态
    pub async fn is_enabled(&self, stage_name: &str) -> bool {
        let flags = self.flags.read().await;
        flags.get(stage_name).copied().unwrap_or(false)
    }

    /// 设置开关状态
    pub async fn set_enabled(&self, stage_name: &str, enabled: bool) {
        let mut flags = self.flags.write().await;
        flags.insert(stage_name.to_string(), enabled);
    }
}

impl Default for StageGateController {
    fn default() -> Self {
        Self::new()
    }
}
