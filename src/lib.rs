// ==========================================
// 卫星过境排程系统 - 核心库
// ==========================================
// 职责: 地面站过境冲突检测、空闲时段搜索、排程优化
// 技术栈: Rust + SQLite
// 系统定位: 由外部触发调用（无后台线程、无定时任务）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 冲突检测与优化
pub mod engine;

// 导入层 - 候选过境
pub mod importer;

// 配置层 - 排程参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// SQL 性能跟踪
pub mod perf;

// API 层 - 外部调用边界
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域
pub use domain::{
    CommitOutcome, ConflictType, IngestReport, OptimizationReport, OptimizationStatus,
    PassRequest, PassSchedule, PassStatus, Satellite, ScheduleConflict, ScheduleStatistics,
    Severity, TimeWindow, ValidationResult,
};

// 引擎
pub use engine::{
    CancellationFlag, Clock, EngineError, FixedClock, PassScheduleEngine, SystemClock,
};

// 仓储
pub use repository::{
    PassRepository, RepositoryError, SatelliteCatalog, SatelliteRepository, SqlitePassRepository,
};

// 配置
pub use config::{ConfigManager, SchedulerConfig};

// API
pub use api::{ApiError, ScheduleApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "卫星过境排程系统";
