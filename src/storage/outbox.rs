//! 同步出箱模块
//!
//! 乐观更新之后的远端副作用全部走这里：本地变更先追加入箱，
//! 后台排空循环再逐条重放到远端网关，失败计数、有界重试。
//! 入箱失败只记日志，绝不回滚已应用的本地状态。

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::error::{EngineError, EngineResult};
use crate::model::WordProgress;

// ============================================================
// 变更类型
// ============================================================

/// 练习会话类型（用于练习时长打点）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Quiz,
    Swipe,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quiz => "quiz",
            Self::Swipe => "swipe",
        }
    }
}

/// 待重放到远端的本地变更
///
/// 除 `WordProgress` 外全部是增量/触发语义：
/// 钻石发正增量而非绝对值，保证乱序完成仍可交换。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboxMutation {
    /// 整条学习进度上载（merge 语义由服务端保证）
    WordProgress {
        word_id: String,
        progress: WordProgress,
    },
    /// 钻石正增量
    DiamondDelta { amount: u32 },
    /// 触发服务端按最后练习日期重算连胜
    StreakTouch,
    /// 练习时长打点（分钟）
    PracticeTime {
        minutes: u32,
        session_type: SessionType,
    },
    /// 平均正确率覆写
    Accuracy { average_accuracy: f64 },
}

impl OutboxMutation {
    /// 变更种类标识（落库用，便于排查）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::WordProgress { .. } => "word_progress",
            Self::DiamondDelta { .. } => "diamond_delta",
            Self::StreakTouch => "streak_touch",
            Self::PracticeTime { .. } => "practice_time",
            Self::Accuracy { .. } => "accuracy",
        }
    }
}

// ============================================================
// OutboxItem - 出箱记录
// ============================================================

/// 出箱记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxItem {
    pub id: i64,
    pub kind: String,
    /// 变更数据 (JSON)
    pub payload: String,
    /// 优先级 (1-10)
    pub priority: i32,
    pub retry_count: i32,
    pub max_retries: i32,
    pub last_error: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl OutboxItem {
    /// 从数据库行解析
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            kind: row.get("kind")?,
            payload: row.get("payload")?,
            priority: row.get("priority")?,
            retry_count: row.get("retry_count")?,
            max_retries: row.get("max_retries")?,
            last_error: row.get("last_error")?,
            status: row.get("status")?,
            created_at: parse_datetime(row.get::<_, String>("created_at")?),
            updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
            completed_at: row
                .get::<_, Option<String>>("completed_at")?
                .map(parse_datetime),
        })
    }

    /// 解析出变更本体
    pub fn mutation(&self) -> EngineResult<OutboxMutation> {
        Ok(serde_json::from_str(&self.payload)?)
    }
}

/// 出箱统计信息
#[derive(Debug, Clone, Default)]
pub struct OutboxStats {
    /// 待处理数量
    pub pending: i32,
    /// 失败数量
    pub failed: i32,
    /// 已完成数量
    pub completed: i32,
}

// ============================================================
// OutboxRepository - 出箱仓储
// ============================================================

/// 同步出箱仓储
pub struct OutboxRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OutboxRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    // ========== 入箱操作 ==========

    /// 追加一条待重放变更
    ///
    /// # Returns
    /// * `EngineResult<i64>` - 新插入记录的 ID
    pub fn enqueue(&self, mutation: &OutboxMutation) -> EngineResult<i64> {
        let payload = serde_json::to_string(mutation)?;
        let now = format_datetime(Utc::now());
        let conn = self.get_connection()?;

        conn.execute(
            r#"
            INSERT INTO sync_outbox (
                kind, payload, priority, retry_count, max_retries,
                last_error, status, created_at, updated_at, completed_at
            ) VALUES (?1, ?2, 5, 0, 3, NULL, 'pending', ?3, ?3, NULL)
            "#,
            params![mutation.kind(), payload, now],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 批量入箱（在事务中执行）
    pub fn enqueue_batch(&self, mutations: &[OutboxMutation]) -> EngineResult<Vec<i64>> {
        if mutations.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::Lock(e.to_string()))?;

        let tx = conn.transaction()?;
        let now = format_datetime(Utc::now());
        let mut ids = Vec::with_capacity(mutations.len());
        for mutation in mutations {
            let payload = serde_json::to_string(mutation)?;
            tx.execute(
                r#"
                INSERT INTO sync_outbox (
                    kind, payload, priority, retry_count, max_retries,
                    last_error, status, created_at, updated_at, completed_at
                ) VALUES (?1, ?2, 5, 0, 3, NULL, 'pending', ?3, ?3, NULL)
                "#,
                params![mutation.kind(), payload, now],
            )?;
            ids.push(tx.last_insert_rowid());
        }
        tx.commit()?;

        Ok(ids)
    }

    // ========== 排空读取 ==========

    /// 查看待处理的项目（不删除）
    ///
    /// 按优先级降序、创建时间升序排列。
    pub fn peek(&self, limit: i32) -> EngineResult<Vec<OutboxItem>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM sync_outbox
            WHERE status = 'pending'
            ORDER BY priority DESC, created_at ASC
            LIMIT ?1
            "#,
        )?;

        let items: Vec<OutboxItem> = stmt
            .query_map([limit], |row| OutboxItem::from_row(row))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(items)
    }

    // ========== 状态管理 ==========

    /// 标记项目为已完成
    pub fn mark_completed(&self, ids: &[i64]) -> EngineResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.get_connection()?;
        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i + 1)).collect();
        let sql = format!(
            r#"
            UPDATE sync_outbox
            SET status = 'completed',
                completed_at = ?1,
                updated_at = ?1
            WHERE id IN ({})
            "#,
            placeholders.join(", ")
        );

        let now = format_datetime(Utc::now());
        let mut params_vec: Vec<&dyn rusqlite::ToSql> = vec![&now];
        for id in ids {
            params_vec.push(id);
        }

        let affected = conn.execute(&sql, params_vec.as_slice())?;
        Ok(affected)
    }

    /// 标记项目为失败，重试计数 +1
    pub fn mark_failed(&self, id: i64, error: &str) -> EngineResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            r#"
            UPDATE sync_outbox
            SET status = 'failed',
                last_error = ?2,
                retry_count = retry_count + 1,
                updated_at = ?3
            WHERE id = ?1
            "#,
            params![id, error, format_datetime(Utc::now())],
        )?;
        Ok(())
    }

    /// 重试失败的项目
    ///
    /// 将未超过最大重试次数的失败项目重新设为待处理状态。
    ///
    /// # Returns
    /// * `EngineResult<i32>` - 重试的项目数量
    pub fn retry_failed(&self, max_retries: i32) -> EngineResult<i32> {
        let conn = self.get_connection()?;
        let affected = conn.execute(
            r#"
            UPDATE sync_outbox
            SET status = 'pending',
                updated_at = ?1
            WHERE status = 'failed'
              AND retry_count < ?2
            "#,
            params![format_datetime(Utc::now()), max_retries],
        )?;
        Ok(affected as i32)
    }

    /// 清理已完成的项目
    pub fn clear_completed(&self) -> EngineResult<usize> {
        let conn = self.get_connection()?;
        let affected = conn.execute("DELETE FROM sync_outbox WHERE status = 'completed'", [])?;
        Ok(affected)
    }

    // ========== 查询操作 ==========

    /// 获取待处理项目数量
    pub fn pending_count(&self) -> EngineResult<i32> {
        self.count_by_status("pending")
    }

    /// 获取失败项目数量
    pub fn failed_count(&self) -> EngineResult<i32> {
        self.count_by_status("failed")
    }

    /// 获取出箱统计信息
    pub fn stats(&self) -> EngineResult<OutboxStats> {
        Ok(OutboxStats {
            pending: self.count_by_status("pending")?,
            failed: self.count_by_status("failed")?,
            completed: self.count_by_status("completed")?,
        })
    }

    fn count_by_status(&self, status: &str) -> EngineResult<i32> {
        let conn = self.get_connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sync_outbox WHERE status = ?1",
            [status],
            |row| row.get(0),
        )?;
        Ok(count as i32)
    }

    // ========== 辅助方法 ==========

    fn get_connection(&self) -> EngineResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| EngineError::Lock(e.to_string()))
    }
}

// ============================================================
// 辅助函数
// ============================================================

fn parse_datetime(s: String) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S") {
        return DateTime::from_naive_utc_and_offset(dt, Utc);
    }
    Utc::now()
}

fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ============================================================
// 单元测试
// ============================================================
