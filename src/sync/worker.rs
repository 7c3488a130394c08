//! 出箱排空循环
//!
//! 后台任务：周期性地从出箱读取待处理变更，逐条重放到远端网关。
//! 成功标记完成，失败标记失败并计数；超过最大重试次数的项目
//! 停留在失败状态，等待人工干预或下次登录清理。
//!
//! 排空永不向外传播错误——同步失败只影响出箱状态，
//! 本地已应用的乐观更新保持不变。

use crate::error::EngineResult;
use crate::storage::outbox::{OutboxMutation, OutboxRepository};
use crate::sync::gateway::SyncGateway;
use crate::sync::SyncConfig;

// ============================================================
// DrainReport - 单轮排空结果
// ============================================================

/// 单轮排空结果
#[derive(Debug, Clone, Default)]
pub struct DrainReport {
    /// 本轮重放成功的项目数
    pub completed: usize,
    /// 本轮失败的项目数
    pub failed: usize,
    /// 重新入队的失败项目数
    pub retried: i32,
}

impl DrainReport {
    /// 本轮是否有任何处理动作
    pub fn is_idle(&self) -> bool {
        self.completed == 0 && self.failed == 0 && self.retried == 0
    }
}

// ============================================================
// SyncWorker - 排空工作器
// ============================================================

/// 出箱排空工作器
pub struct SyncWorker<G: SyncGateway> {
    gateway: G,
    outbox: OutboxRepository,
    config: SyncConfig,
}

impl<G: SyncGateway> SyncWorker<G> {
    pub fn new(gateway: G, outbox: OutboxRepository, config: SyncConfig) -> Self {
        Self {
            gateway,
            outbox,
            config,
        }
    }

    /// 执行一轮排空
    ///
    /// 1. 将未超限的失败项目重新入队
    /// 2. 按优先级/入箱顺序取一批待处理项目
    /// 3. 逐条重放，成功标记完成，失败标记失败
    pub async fn drain_once(&self) -> EngineResult<DrainReport> {
        let mut report = DrainReport {
            retried: self.outbox.retry_failed(self.config.max_retries)?,
            ..Default::default()
        };

        let items = self.outbox.peek(self.config.batch_size)?;
        if items.is_empty() {
            return Ok(report);
        }

        log::info!("出箱排空开始: {} 个待处理项目", items.len());

        let mut completed_ids = Vec::new();
        for item in items {
            let mutation = match item.mutation() {
                Ok(m) => m,
                Err(e) => {
                    // 载荷损坏的项目无法重放，直接记为失败
                    log::warn!("出箱项目 {} 载荷解析失败: {}", item.id, e);
                    self.outbox.mark_failed(item.id, &e.to_string())?;
                    report.failed += 1;
                    continue;
                }
            };

            match self.dispatch(&mutation).await {
                Ok(()) => {
                    completed_ids.push(item.id);
                    report.completed += 1;
                }
                Err(e) => {
                    log::warn!("出箱项目 {} ({}) 重放失败: {}", item.id, item.kind, e);
                    self.outbox.mark_failed(item.id, &e.to_string())?;
                    report.failed += 1;
                }
            }
        }

        self.outbox.mark_completed(&completed_ids)?;
        Ok(report)
    }

    /// 持续排空循环
    ///
    /// 每轮之间休眠固定间隔。调用方通常将其 spawn 为后台任务。
    pub async fn run(&self) {
        loop {
            if let Err(e) = self.drain_once().await {
                // 本地存储错误，下一轮重试
                log::error!("出箱排空异常: {}", e);
            }
            tokio::time::sleep(std::time::Duration::from_millis(
                self.config.drain_interval_ms,
            ))
            .await;
        }
    }

    /// 将单条变更重放到网关
    async fn dispatch(&self, mutation: &OutboxMutation) -> EngineResult<()> {
        match mutation {
            OutboxMutation::WordProgress { word_id, progress } => {
                self.gateway.put_word_progress(word_id, progress).await
            }
            OutboxMutation::DiamondDelta { amount } => self.gateway.add_diamonds(*amount).await,
            OutboxMutation::StreakTouch => self.gateway.update_streak().await,
            OutboxMutation::PracticeTime {
                minutes,
                session_type,
            } => {
                self.gateway
                    .record_practice_session(*minutes, *session_type)
                    .await
            }
            OutboxMutation::Accuracy { average_accuracy } => {
                self.gateway.put_accuracy(*average_accuracy).await
            }
        }
    }

    /// 出箱仓储句柄（供统计查询）
    pub fn outbox(&self) -> &OutboxRepository {
        &self.outbox
    }
}

// ============================================================
// 单元测试
// ============================================================
