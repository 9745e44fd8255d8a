// ==========================================
// 卫星过境排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、结果值
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod conflict;
pub mod pass;
pub mod report;
pub mod satellite;
pub mod types;

// 重导出核心类型
pub use conflict::{ScheduleConflict, ValidationResult};
pub use pass::{PassCandidate, PassRequest, PassSchedule, TimeWindow};
pub use report::{
    CommitOutcome, IngestItem, IngestOutcome, IngestReport, OptimizationReport,
    RescheduleRecord, ScheduleStatistics,
};
pub use satellite::Satellite;
pub use types::{ConflictType, NoradId, OptimizationStatus, PassId, PassStatus, Severity};
