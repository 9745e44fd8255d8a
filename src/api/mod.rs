// ==========================================
// 卫星过境排程系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口，供命令行与外部集成调用
// ==========================================

pub mod error;
pub mod schedule_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use schedule_api::{build_request, HealthStatus, ScheduleApi};
