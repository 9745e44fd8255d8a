// ==========================================
// 卫星过境排程系统 - 过境数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: 一次逻辑操作 = 一个事务（within_transaction）
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::pass::{PassRequest, PassSchedule, TimeWindow};
use crate::domain::types::{NoradId, PassId, PassStatus};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// PassWriter - 事务内的写操作
// ==========================================

/// 事务内可用的写操作
///
/// 只在 `PassRepository::within_transaction` 的闭包中拿到，
/// 闭包返回 Err 时所有写入一并回滚。
pub trait PassWriter {
    /// 插入过境，返回新ID
    fn insert(&mut self, request: &PassRequest, status: PassStatus) -> RepositoryResult<PassId>;

    /// 更新时间窗口
    fn update_window(&mut self, pass_id: PassId, window: &TimeWindow) -> RepositoryResult<()>;

    /// 更新状态
    fn update_status(&mut self, pass_id: PassId, status: PassStatus) -> RepositoryResult<()>;

    /// 删除过境
    fn delete(&mut self, pass_id: PassId) -> RepositoryResult<()>;
}

// ==========================================
// PassRepository - 过境仓储接口
// ==========================================

/// 过境仓储
///
/// 核心只依赖此接口；持久化细节由实现方负责。
pub trait PassRepository: Send + Sync {
    /// 加载全部过境（start_time 升序，pass_id 升序）
    fn load_all(&self) -> RepositoryResult<Vec<PassSchedule>>;

    /// 按ID查询
    fn find_by_id(&self, pass_id: PassId) -> RepositoryResult<Option<PassSchedule>>;

    /// 在一个事务中执行写操作
    ///
    /// # 返回
    /// - Ok(()): 闭包成功，事务已提交
    /// - Err: 闭包或提交失败，事务已回滚
    fn within_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn PassWriter) -> RepositoryResult<()>,
    ) -> RepositoryResult<()>;

    /// 连通性检查
    fn ping(&self) -> RepositoryResult<()>;

    /// 单条插入（独立事务）
    fn insert(&self, request: &PassRequest, status: PassStatus) -> RepositoryResult<PassId> {
        let mut inserted = None;
        self.within_transaction(&mut |writer: &mut dyn PassWriter| {
            inserted = Some(writer.insert(request, status)?);
            Ok(())
        })?;
        inserted.ok_or_else(|| RepositoryError::InternalError("插入未返回过境ID".to_string()))
    }

    /// 单条窗口更新（独立事务）
    fn update_window(&self, pass_id: PassId, window: &TimeWindow) -> RepositoryResult<()> {
        self.within_transaction(&mut |writer: &mut dyn PassWriter| writer.update_window(pass_id, window))
    }

    /// 单条状态更新（独立事务）
    fn update_status(&self, pass_id: PassId, status: PassStatus) -> RepositoryResult<()> {
        self.within_transaction(&mut |writer: &mut dyn PassWriter| writer.update_status(pass_id, status))
    }

    /// 单条删除（独立事务）
    fn delete(&self, pass_id: PassId) -> RepositoryResult<()> {
        self.within_transaction(&mut |writer: &mut dyn PassWriter| writer.delete(pass_id))
    }
}

// ==========================================
// SqlitePassRepository - SQLite 实现
// ==========================================

/// 过境仓储（SQLite）
/// 职责: 管理 pass_schedule 表的 CRUD 操作
pub struct SqlitePassRepository {
    conn: Arc<Mutex<Connection>>,
}

const SELECT_COLUMNS: &str = r#"
    SELECT pass_id, satellite_norad_id, ground_station, start_time, end_time, status
    FROM pass_schedule
"#;

impl SqlitePassRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 打开数据库文件并创建仓储实例
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按地面站查询（start_time 升序）
    pub fn find_by_station(&self, ground_station: &str) -> RepositoryResult<Vec<PassSchedule>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE ground_station = ?1 ORDER BY start_time, pass_id",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![ground_station], PassRow::from_row)?
            .collect::<SqliteResult<Vec<PassRow>>>()?;
        rows.into_iter().map(PassRow::into_domain).collect()
    }

    /// 统计过境总数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM pass_schedule", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}

impl PassRepository for SqlitePassRepository {
    fn load_all(&self) -> RepositoryResult<Vec<PassSchedule>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY start_time, pass_id", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], PassRow::from_row)?
            .collect::<SqliteResult<Vec<PassRow>>>()?;
        rows.into_iter().map(PassRow::into_domain).collect()
    }

    fn find_by_id(&self, pass_id: PassId) -> RepositoryResult<Option<PassSchedule>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE pass_id = ?1", SELECT_COLUMNS);
        let row = conn
            .query_row(&sql, params![pass_id], PassRow::from_row)
            .optional()?;
        row.map(PassRow::into_domain).transpose()
    }

    fn within_transaction(
        &self,
        work: &mut dyn FnMut(&mut dyn PassWriter) -> RepositoryResult<()>,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        {
            let mut writer = SqlitePassWriter { conn: &*tx };
            // 失败时 tx 在作用域结束被丢弃，自动回滚
            work(&mut writer)?;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    fn ping(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(())
    }
}

// ==========================================
// SqlitePassWriter - 事务内写入
// ==========================================
struct SqlitePassWriter<'c> {
    conn: &'c Connection,
}

impl SqlitePassWriter<'_> {
    fn ensure_affected(affected: usize, pass_id: PassId) -> RepositoryResult<()> {
        if affected == 0 {
            return Err(RepositoryError::not_found("PassSchedule", pass_id));
        }
        Ok(())
    }
}

impl PassWriter for SqlitePassWriter<'_> {
    fn insert(&mut self, request: &PassRequest, status: PassStatus) -> RepositoryResult<PassId> {
        self.conn.execute(
            r#"
            INSERT INTO pass_schedule (
                satellite_norad_id, ground_station, start_time, end_time, status, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                request.satellite_norad_id,
                request.ground_station,
                request.start_time,
                request.end_time,
                status.to_db_str(),
                Utc::now(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_window(&mut self, pass_id: PassId, window: &TimeWindow) -> RepositoryResult<()> {
        let affected = self.conn.execute(
            r#"
            UPDATE pass_schedule
            SET start_time = ?1, end_time = ?2, updated_at = ?3
            WHERE pass_id = ?4
            "#,
            params![window.start, window.end, Utc::now(), pass_id],
        )?;
        Self::ensure_affected(affected, pass_id)
    }

    fn update_status(&mut self, pass_id: PassId, status: PassStatus) -> RepositoryResult<()> {
        let affected = self.conn.execute(
            "UPDATE pass_schedule SET status = ?1, updated_at = ?2 WHERE pass_id = ?3",
            params![status.to_db_str(), Utc::now(), pass_id],
        )?;
        Self::ensure_affected(affected, pass_id)
    }

    fn delete(&mut self, pass_id: PassId) -> RepositoryResult<()> {
        let affected = self
            .conn
            .execute("DELETE FROM pass_schedule WHERE pass_id = ?1", params![pass_id])?;
        Self::ensure_affected(affected, pass_id)
    }
}

// ==========================================
// 行映射
// ==========================================
struct PassRow {
    pass_id: PassId,
    satellite_norad_id: NoradId,
    ground_station: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: String,
}

impl PassRow {
    fn from_row(row: &Row<'_>) -> SqliteResult<Self> {
        Ok(Self {
            pass_id: row.get(0)?,
            satellite_norad_id: row.get(1)?,
            ground_station: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            status: row.get(5)?,
        })
    }

    fn into_domain(self) -> RepositoryResult<PassSchedule> {
        let status = PassStatus::from_str(&self.status).ok_or_else(|| {
            RepositoryError::FieldValueError {
                field: "status".to_string(),
                message: format!("未知过境状态: {} (pass_id={})", self.status, self.pass_id),
            }
        })?;

        Ok(PassSchedule {
            pass_id: self.pass_id,
            satellite_norad_id: self.satellite_norad_id,
            ground_station: self.ground_station,
            start_time: self.start_time,
            end_time: self.end_time,
            status,
        })
    }
}
