// ==========================================
// 卫星过境排程系统 - 应用状态
// ==========================================
// 职责: 按数据库路径组装仓储、配置、引擎与 API
// 说明: 共享一个 SQLite 连接；schema 在此初始化（幂等）
// ==========================================

use crate::api::ScheduleApi;
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection};
use crate::engine::{Clock, PassScheduleEngine, SystemClock};
use crate::repository::{SatelliteRepository, SqlitePassRepository};
use std::sync::{Arc, Mutex};

pub use crate::db::get_default_db_path;

pub struct AppState {
    pub db_path: String,
    pub config_manager: Arc<ConfigManager>,
    pub schedule_api: Arc<ScheduleApi>,
}

impl AppState {
    /// 使用系统时钟初始化
    pub fn new(db_path: String) -> Result<Self, String> {
        Self::with_clock(db_path, Arc::new(SystemClock))
    }

    /// 使用指定时钟初始化
    pub fn with_clock(db_path: String, clock: Arc<dyn Clock>) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let pass_repo = Arc::new(SqlitePassRepository::new(conn.clone()));
        let satellite_repo = Arc::new(SatelliteRepository::new(conn.clone()));

        // ==========================================
        // 配置
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let config = config_manager
            .load_scheduler_config()
            .map_err(|e| format!("无法加载排程参数: {}", e))?;

        // ==========================================
        // 引擎与API
        // ==========================================
        let engine = Arc::new(
            PassScheduleEngine::new(pass_repo, satellite_repo.clone(), clock, config)
                .map_err(|e| format!("无法创建排程引擎: {}", e))?,
        );
        let schedule_api = Arc::new(ScheduleApi::new(engine, satellite_repo));

        tracing::info!("AppState初始化成功");
        Ok(Self {
            db_path,
            config_manager,
            schedule_api,
        })
    }
}
