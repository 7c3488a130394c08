//! 应用状态键值存储
//!
//! 跨重启存活的本地状态：登录用户、认证标记、分类列表、当前分类。
//! 值以 JSON 文本落库，对引擎是不透明的 blob。

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

use crate::error::{EngineError, EngineResult};

// ========== 固定键名 ==========

pub const KEY_USER: &str = "user";
pub const KEY_IS_AUTHENTICATED: &str = "is_authenticated";
pub const KEY_CATEGORIES: &str = "categories";
pub const KEY_SELECTED_CATEGORY: &str = "selected_category";

// ============================================================
// PersistedState - 跨重启存活的应用状态
// ============================================================

/// 跨重启存活的应用状态快照
///
/// 会话作用域字段（测验进度、牌堆状态）不在其中。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    /// 登录用户（对引擎不透明）
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(default)]
    pub is_authenticated: bool,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub selected_category: Option<String>,
}

// ============================================================
// AppStateRepository - 键值仓储
// ============================================================

/// 应用状态仓储
pub struct AppStateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AppStateRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    // ========== 原始字符串操作 ==========

    /// 读取指定键的值，不存在时返回 None
    pub fn get(&self, key: &str) -> EngineResult<Option<String>> {
        let conn = self.get_connection()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM app_state WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 插入或更新指定键的值
    pub fn set(&self, key: &str, value: &str) -> EngineResult<()> {
        let conn = self.get_connection()?;
        set_in(&conn, key, value)
    }

    /// 删除指定键，返回是否删除了记录
    pub fn delete(&self, key: &str) -> EngineResult<bool> {
        let conn = self.get_connection()?;
        delete_in(&conn, key)
    }

    // ========== 类型化 JSON 操作 ==========

    /// 读取并反序列化指定键的 JSON 值
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> EngineResult<Option<T>> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// 序列化并写入指定键的 JSON 值
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> EngineResult<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }

    // ========== 应用状态快照 ==========

    /// 读取完整的持久化应用状态
    pub fn load_persisted(&self) -> EngineResult<PersistedState> {
        Ok(PersistedState {
            user: self.get_json(KEY_USER)?,
            is_authenticated: self.get_json(KEY_IS_AUTHENTICATED)?.unwrap_or(false),
            categories: self.get_json(KEY_CATEGORIES)?.unwrap_or_default(),
            selected_category: self.get_json(KEY_SELECTED_CATEGORY)?,
        })
    }

    /// 写入完整的持久化应用状态
    ///
    /// 四个键在同一事务中写入：中途失败整体回滚，
    /// 不会留下半更新的快照（如 user 已清空但认证标记仍在）。
    pub fn save_persisted(&self, state: &PersistedState) -> EngineResult<()> {
        // 序列化先行，事务内只做数据库写入
        let user_json = state
            .user
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let is_authenticated_json = serde_json::to_string(&state.is_authenticated)?;
        let categories_json = serde_json::to_string(&state.categories)?;
        let selected_json = state
            .selected_category
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let mut conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::Lock(e.to_string()))?;
        let tx = conn.transaction()?;

        match &user_json {
            Some(raw) => set_in(&tx, KEY_USER, raw)?,
            None => {
                delete_in(&tx, KEY_USER)?;
            }
        }
        set_in(&tx, KEY_IS_AUTHENTICATED, &is_authenticated_json)?;
        set_in(&tx, KEY_CATEGORIES, &categories_json)?;
        match &selected_json {
            Some(raw) => set_in(&tx, KEY_SELECTED_CATEGORY, raw)?,
            None => {
                delete_in(&tx, KEY_SELECTED_CATEGORY)?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    // ========== 辅助方法 ==========

    fn get_connection(&self) -> EngineResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| EngineError::Lock(e.to_string()))
    }
}

// ============================================================
// 辅助函数（事务内外共用的写入原语）
// ============================================================

fn set_in(conn: &Connection, key: &str, value: &str) -> EngineResult<()> {
    conn.execute(
        r#"
        INSERT INTO app_state (key, value, updated_at)
        VALUES (?1, ?2, datetime('now'))
        ON CONFLICT(key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
        params![key, value],
    )?;
    Ok(())
}

fn delete_in(conn: &Connection, key: &str) -> EngineResult<bool> {
    let affected = conn.execute("DELETE FROM app_state WHERE key = ?1", [key])?;
    Ok(affected > 0)
}
