// ==========================================
// 卫星过境排程系统 - 引擎层
// ==========================================
// 职责: 冲突检测、空闲时段搜索、排程优化、统计
// 红线: Engine 不拼 SQL，持久化只经 PassRepository
// 红线: 校验不通过 / 找不到时段是结果，不是错误
// ==========================================

pub mod cancel;
pub mod clock;
pub mod conflict_detector;
pub mod error;
pub mod events;
pub mod interval_index;
pub mod optimizer;
pub mod scheduler;
pub mod slot_finder;
pub mod statistics;

// 重导出核心引擎
pub use cancel::CancellationFlag;
pub use clock::{Clock, FixedClock, SystemClock};
pub use conflict_detector::ConflictDetector;
pub use error::{EngineError, EngineResult};
pub use events::{
    NoOpEventPublisher, OptionalEventPublisher, PassEvent, PassEventPublisher, PassEventType,
};
pub use interval_index::IntervalIndex;
pub use optimizer::{ScheduleOptimizer, SweepOutcome};
pub use scheduler::PassScheduleEngine;
pub use slot_finder::{SlotFinder, SlotRequest};
pub use statistics::StatisticsAggregator;
