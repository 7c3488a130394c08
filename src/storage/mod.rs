//! SQLite 本地存储模块
//!
//! 提供引擎的本地持久化，包括：
//! - 应用级键值状态（登录用户、分类选择等，跨重启存活）
//! - 同步出箱（待重放到远端的本地变更）
//!
//! 会话作用域的状态（测验/牌堆进度）明确不持久化——
//! 应用重启永远从新会话开始。

// ============================================================
// 子模块声明
// ============================================================

pub mod kv;
pub mod migrations;
pub mod outbox;

// ============================================================
// 重新导出主要类型
// ============================================================

pub use kv::{AppStateRepository, PersistedState};
pub use migrations::run_migrations;
pub use outbox::{OutboxItem, OutboxMutation, OutboxRepository, OutboxStats, SessionType};

// ============================================================
// 依赖导入
// ============================================================

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::{EngineError, EngineResult};

// ============================================================
// DatabaseManager - 数据库连接管理器
// ============================================================

/// 数据库连接管理器
///
/// 自动启用 WAL 模式、外键约束，并运行数据库迁移。
pub struct DatabaseManager {
    conn: Arc<Mutex<Connection>>,
    db_path: String,
}

impl DatabaseManager {
    /// 创建新的数据库管理器
    ///
    /// # Arguments
    /// * `db_path` - 数据库文件路径
    pub fn new<P: AsRef<Path>>(db_path: P) -> EngineResult<Self> {
        let path_str = db_path.as_ref().to_string_lossy().to_string();
        let connection = Connection::open(&db_path)?;

        // 启用 WAL 模式以提高并发性能
        connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous=NORMAL;
             PRAGMA foreign_keys=ON;
             PRAGMA cache_size=-64000;",
        )?;

        let manager = Self {
            conn: Arc::new(Mutex::new(connection)),
            db_path: path_str,
        };
        manager.initialize()?;
        Ok(manager)
    }

    /// 创建内存数据库（用于测试）
    ///
    /// 内存数据库不使用 WAL 模式，但启用外键约束。
    pub fn in_memory() -> EngineResult<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch(
            "PRAGMA foreign_keys=ON;
             PRAGMA cache_size=-64000;",
        )?;

        let manager = Self {
            conn: Arc::new(Mutex::new(connection)),
            db_path: ":memory:".to_string(),
        };
        manager.initialize()?;
        Ok(manager)
    }

    /// 初始化数据库（运行迁移）
    pub fn initialize(&self) -> EngineResult<()> {
        let conn = self.get_connection()?;
        migrations::run_migrations(&conn)?;
        Ok(())
    }

    /// 获取数据库连接（共享句柄）
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// 获取数据库连接的锁
    pub fn get_connection(&self) -> EngineResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| EngineError::Lock(e.to_string()))
    }

    /// 获取数据库路径
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// 执行事务
    pub fn transaction<F, T>(&self, f: F) -> EngineResult<T>
    where
        F: FnOnce(&Connection) -> EngineResult<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::Lock(e.to_string()))?;

        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }
}

// ============================================================
// Storage - 统一存储结构体
// ============================================================

/// 统一存储结构体
///
/// 提供对所有 Repository 的便捷访问。
pub struct Storage {
    db: DatabaseManager,
}

impl Storage {
    /// 打开文件数据库
    pub fn new<P: AsRef<Path>>(db_path: P) -> EngineResult<Self> {
        Ok(Self {
            db: DatabaseManager::new(db_path)?,
        })
    }

    /// 创建内存数据库（用于测试）
    pub fn in_memory() -> EngineResult<Self> {
        Ok(Self {
            db: DatabaseManager::in_memory()?,
        })
    }

    /// 获取数据库管理器引用
    pub fn db(&self) -> &DatabaseManager {
        &self.db
    }

    /// 获取应用状态仓储
    pub fn app_state(&self) -> AppStateRepository {
        AppStateRepository::new(self.db.connection())
    }

    /// 获取同步出箱仓储
    pub fn outbox(&self) -> OutboxRepository {
        OutboxRepository::new(self.db.connection())
    }
}

// ============================================================
// 测试
// ============================================================
