// ==========================================
// 卫星过境排程系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value)
// 规则: 未配置或格式错误的项回退默认值，并记录警告
// ==========================================

use crate::config::scheduler_config::SchedulerConfig;
use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值（存在则覆盖）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(config_key = key, value = value, "配置已更新");
        Ok(())
    }

    /// 读取并解析配置，缺失或格式错误时使用默认值
    fn get_parsed_or<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr + Copy,
    {
        let Some(raw) = self.get_config_value(key)? else {
            return Ok(default);
        };

        match raw.trim().parse::<T>() {
            Ok(v) => Ok(v),
            Err(_) => {
                tracing::warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 加载排程参数（存储值覆盖默认值）
    ///
    /// 整体不合法（如步长为 0）时回退到默认参数。
    pub fn load_scheduler_config(&self) -> Result<SchedulerConfig, Box<dyn Error>> {
        let defaults = SchedulerConfig::default();

        let config = SchedulerConfig {
            min_separation_minutes: self
                .get_parsed_or(config_keys::MIN_SEPARATION_MINUTES, defaults.min_separation_minutes)?,
            slot_step_minutes: self
                .get_parsed_or(config_keys::SLOT_STEP_MINUTES, defaults.slot_step_minutes)?,
            slot_search_horizon_hours: self.get_parsed_or(
                config_keys::SLOT_SEARCH_HORIZON_HOURS,
                defaults.slot_search_horizon_hours,
            )?,
            slot_max_steps: self
                .get_parsed_or(config_keys::SLOT_MAX_STEPS, defaults.slot_max_steps)?,
            upcoming_window_hours: self
                .get_parsed_or(config_keys::UPCOMING_WINDOW_HOURS, defaults.upcoming_window_hours)?,
            suggest_alternatives: self
                .get_parsed_or(config_keys::SUGGEST_ALTERNATIVES, defaults.suggest_alternatives)?,
        };

        if let Err(reason) = config.validate() {
            tracing::warn!(reason = %reason, "排程参数不合法，使用默认参数");
            return Ok(defaults);
        }
        Ok(config)
    }

    /// 获取所有配置的快照（JSON格式，键有序）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 冲突检测
    pub const MIN_SEPARATION_MINUTES: &str = "min_separation_minutes";

    // 空闲时段搜索
    pub const SLOT_STEP_MINUTES: &str = "slot_step_minutes";
    pub const SLOT_SEARCH_HORIZON_HOURS: &str = "slot_search_horizon_hours";
    pub const SLOT_MAX_STEPS: &str = "slot_max_steps";
    pub const SUGGEST_ALTERNATIVES: &str = "suggest_alternatives";

    // 统计
    pub const UPCOMING_WINDOW_HOURS: &str = "upcoming_window_hours";
}
