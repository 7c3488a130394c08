//! 远端同步模块
//!
//! 负责本地变更到云端的重放，包括：
//! - 远端网关抽象与 HTTP 实现
//! - 出箱排空循环（有界重试）

// ============================================================
// 子模块声明
// ============================================================

pub mod gateway;
pub mod worker;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use gateway::{AckResponse, HttpSyncGateway, ProfileResponse, QuizResponse, SyncGateway};
pub use worker::{DrainReport, SyncWorker};

/// 同步配置
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// API 基础 URL
    pub api_base_url: String,
    /// 单次排空批次大小
    pub batch_size: i32,
    /// 最大重试次数
    pub max_retries: i32,
    /// 排空间隔（毫秒）
    pub drain_interval_ms: u64,
    /// 请求超时（秒）
    pub timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            batch_size: 100,
            max_retries: 3,
            drain_interval_ms: 1000,
            timeout_secs: 30,
        }
    }
}
