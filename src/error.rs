//! 引擎统一错误类型
//!
//! 错误分类遵循"本地状态是临时事实来源"的策略：
//! - 无可练习内容与一般网络失败是两种不同的错误，UI 需要区分处理
//! - 后台同步的失败只做记录与重试，不会从排空循环向外传播

use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 远端没有可练习的单词（与网络失败区分，UI 引导用户添加词表）
    #[error("没有可练习的单词")]
    NoEligibleWords,

    #[error("网络错误: {0}")]
    Network(String),

    /// 服务端返回 success:false 的软失败
    #[error("服务端拒绝: {0}")]
    Gateway(String),

    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("锁获取失败: {0}")]
    Lock(String),

    #[error("迁移失败: {0}")]
    Migration(String),

    /// 会话状态守卫失败（如在反馈阶段重复提交答案）
    #[error("会话状态错误: {0}")]
    SessionState(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        EngineError::Network(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
