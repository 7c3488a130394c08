//! # lexileap-engine - 练习会话与单词掌握度引擎
//!
//! 本 crate 是 LexiLeap 词汇学习应用的客户端核心引擎:
//!
//! - **Session State Machine** - 测验模式与判断模式的练习会话状态机
//! - **Reward / Mastery Policy** - 钻石奖励与掌握度更新的纯函数策略
//! - **Engine Store** - 乐观更新的本地状态编排器
//! - **Sync Outbox** - 待同步变更队列与后台重放循环
//!
//! ## 设计理念
//!
//! - **本地优先** - 所有答题结果先落到本地状态，网络同步永不阻塞练习流程
//! - **合并而非覆盖** - 聚合统计只做字段级合并，避免并发流程互相覆盖
//! - **纯策略函数** - 奖励与掌握度计算无副作用，可独立测试
//!
//! ## 模块结构
//!
//! - [`model`] - 单词、学习进度、用户统计的数据模型
//! - [`policy`] - 钻石奖励与掌握度更新策略
//! - [`session`] - 测验/判断两种模式的会话状态机
//! - [`store`] - 引擎编排器 (乐观更新 + 出箱入队)
//! - [`storage`] - SQLite 本地持久化 (KV 状态 + 同步出箱)
//! - [`sync`] - 远端同步网关与后台排空循环
//! - [`error`] - 统一错误类型

// ============================================================================
// 模块声明
// ============================================================================

pub mod error;
pub mod model;
pub mod policy;
pub mod session;
pub mod storage;
pub mod store;
pub mod sync;

// ============================================================================
// 重新导出主要类型
// ============================================================================

pub use error::{EngineError, EngineResult};
pub use model::{
    DailyProgress, DifficultyLevel, LearningInsights, QuizPayload, UserProfile, UserStats, Word,
    WordProgress,
};
pub use policy::{apply_quiz_answer, apply_swipe_judgment, compute_diamond_reward};
pub use session::quiz::{QuizPhase, QuizSession, QuizStep, QuizSummary};
pub use session::swipe::{SwipeCard, SwipeSession, SwipeSummary};
pub use storage::outbox::{OutboxMutation, OutboxRepository, SessionType};
pub use storage::{DatabaseManager, Storage};
pub use store::EngineStore;
pub use sync::gateway::{HttpSyncGateway, SyncGateway};
pub use sync::worker::SyncWorker;
pub use sync::SyncConfig;
