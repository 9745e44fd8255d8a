// ==========================================
// 卫星过境排程系统 - 卫星目录仓储
// ==========================================
// 职责: 卫星存在性检查（校验依赖）、目录登记
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::satellite::Satellite;
use crate::domain::types::NoradId;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult};
use std::sync::{Arc, Mutex};

/// 卫星目录查询接口
pub trait SatelliteCatalog: Send + Sync {
    /// 卫星是否已登记
    fn exists(&self, norad_id: NoradId) -> RepositoryResult<bool>;
}

// ==========================================
// SatelliteRepository - 卫星目录仓储 (SQLite)
// ==========================================
pub struct SatelliteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SatelliteRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 打开数据库文件并创建仓储实例
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 按 NORAD 编号登记卫星（存在则更新名称/描述）
    ///
    /// # 返回
    /// - Ok(true): 新登记
    /// - Ok(false): 已存在，已更新
    pub fn upsert(&self, satellite: &Satellite) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let existed: bool = conn
            .query_row(
                "SELECT 1 FROM satellite WHERE norad_id = ?1",
                params![satellite.norad_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

        conn.execute(
            r#"
            INSERT INTO satellite (norad_id, name, description)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(norad_id) DO UPDATE SET name = ?2, description = ?3
            "#,
            params![satellite.norad_id, satellite.name, satellite.description],
        )?;

        Ok(!existed)
    }

    /// 按 NORAD 编号查询
    pub fn find_by_id(&self, norad_id: NoradId) -> RepositoryResult<Option<Satellite>> {
        let conn = self.get_conn()?;
        let satellite = conn
            .query_row(
                "SELECT norad_id, name, description FROM satellite WHERE norad_id = ?1",
                params![norad_id],
                |row| {
                    Ok(Satellite {
                        norad_id: row.get(0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(satellite)
    }

    /// 列出全部卫星
    pub fn list(&self) -> RepositoryResult<Vec<Satellite>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT norad_id, name, description FROM satellite ORDER BY norad_id")?;
        let satellites = stmt
            .query_map([], |row| {
                Ok(Satellite {
                    norad_id: row.get(0)?,
                    name: row.get(1)?,
                    description: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<Satellite>>>()?;
        Ok(satellites)
    }
}

impl SatelliteCatalog for SatelliteRepository {
    fn exists(&self, norad_id: NoradId) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM satellite WHERE norad_id = ?1",
                params![norad_id],
                |_row| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(found)
    }
}
