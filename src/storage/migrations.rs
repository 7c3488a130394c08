//! 数据库迁移模块
//!
//! 管理 SQLite 数据库的版本迁移。每个迁移在独立事务中执行，
//! 迁移记录存储在 schema_migrations 表中。

use rusqlite::Connection;

use crate::error::{EngineError, EngineResult};

/// 当前数据库 schema 版本
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// 初始化 schema SQL (V1)
const INIT_SCHEMA: &str = include_str!("schema.sql");

/// 迁移记录
#[derive(Debug, Clone)]
pub struct Migration {
    /// 迁移版本号
    pub version: i32,
    /// 迁移名称/描述
    pub name: String,
    /// 迁移 SQL 语句
    pub sql: String,
}

impl Migration {
    pub fn new(version: i32, name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            version,
            name: name.into(),
            sql: sql.into(),
        }
    }
}

/// 获取所有迁移定义，按版本号排序
pub fn get_migrations() -> Vec<Migration> {
    vec![
        // V1: 初始表结构
        Migration::new(1, "初始表结构", INIT_SCHEMA),
        // V2: 出箱失败项查询索引
        Migration::new(
            2,
            "出箱失败项查询索引",
            r#"
            CREATE INDEX IF NOT EXISTS idx_outbox_failed_retry
                ON sync_outbox(status, retry_count);
            "#,
        ),
    ]
}

/// 确保迁移记录表存在
fn ensure_migrations_table(conn: &Connection) -> EngineResult<()> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
        [],
    )?;
    Ok(())
}

/// 获取已应用的迁移版本列表
fn get_applied_versions(conn: &Connection) -> EngineResult<Vec<i32>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version ASC")?;
    let versions: Vec<i32> = stmt
        .query_map([], |row| row.get(0))?
        .filter_map(|r| r.ok())
        .collect();
    Ok(versions)
}

/// 获取当前数据库版本（无迁移记录时为 0）
pub fn get_current_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// 运行数据库迁移
///
/// 检查当前数据库版本并执行必要的迁移脚本，
/// 每个迁移在独立事务中执行，失败时回滚该迁移。
///
/// # Returns
/// * `EngineResult<i32>` - 成功返回最终版本号
pub fn run_migrations(conn: &Connection) -> EngineResult<i32> {
    ensure_migrations_table(conn)?;

    let applied_versions = get_applied_versions(conn)?;
    let mut final_version = get_current_version(conn);

    log::info!(
        "当前数据库版本: {}, 目标版本: {}",
        final_version,
        CURRENT_SCHEMA_VERSION
    );

    for migration in get_migrations() {
        if applied_versions.contains(&migration.version) {
            continue;
        }

        log::info!("运行迁移 v{}: {}", migration.version, migration.name);

        match execute_migration_in_transaction(conn, &migration) {
            Ok(()) => {
                final_version = migration.version;
            }
            Err(e) => {
                log::error!("迁移 v{} 失败: {}", migration.version, e);
                return Err(e);
            }
        }
    }

    Ok(final_version)
}

/// 在事务中执行单个迁移
fn execute_migration_in_transaction(conn: &Connection, migration: &Migration) -> EngineResult<()> {
    conn.execute("BEGIN IMMEDIATE", [])?;

    let apply = || -> EngineResult<()> {
        conn.execute_batch(&migration.sql)?;
        conn.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.name],
        )?;
        Ok(())
    };

    match apply() {
        Ok(()) => {
            conn.execute("COMMIT", [])?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.execute("ROLLBACK", []);
            Err(EngineError::Migration(format!(
                "v{} 执行失败: {}",
                migration.version, e
            )))
        }
    }
}
