// ==========================================
// 卫星过境排程系统 - 冲突检测
// ==========================================
// 规则:
// - 同一地面站且时间窗口实际重叠 → ground_station_conflict (high)
// - 开始时间相差小于最小间隔 → minimum_separation_violation (medium)
// - 同一卫星在不同地面站不算冲突
// 校验前置检查（命中即拒绝，不查索引）:
// - start >= end / start 不晚于当前时间 → temporal_overlap (high)
// - 卫星未登记 → satellite_access_conflict (high)
// ==========================================

use crate::domain::conflict::{ScheduleConflict, ValidationResult};
use crate::domain::pass::PassCandidate;
use crate::domain::types::{ConflictType, Severity};
use crate::engine::interval_index::IntervalIndex;
use crate::repository::error::RepositoryResult;
use crate::repository::satellite_repo::SatelliteCatalog;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone)]
pub struct ConflictDetector {
    min_separation: Duration,
}

impl ConflictDetector {
    pub fn new(min_separation: Duration) -> Self {
        Self { min_separation }
    }

    /// 检测候选过境与索引中已有过境的冲突
    ///
    /// 顺序与索引查询顺序一致；同一对过境先报地面站冲突，再报间隔冲突。
    pub fn detect(&self, index: &IntervalIndex, candidate: &PassCandidate) -> Vec<ScheduleConflict> {
        let buffer = self.min_separation;
        let mut conflicts = Vec::new();

        for existing in index.overlapping(&candidate.window, buffer, candidate.pass_id) {
            if existing.ground_station == candidate.ground_station
                && existing.window().overlaps(&candidate.window)
            {
                conflicts.push(
                    ScheduleConflict::new(
                        ConflictType::GroundStationConflict,
                        Severity::High,
                        format!(
                            "地面站 '{}' 已被过境 {} 占用 ({} ~ {})",
                            existing.ground_station,
                            existing.pass_id,
                            existing.start_time.to_rfc3339(),
                            existing.end_time.to_rfc3339()
                        ),
                    )
                    .against(existing.pass_id),
                );
            }

            let gap = (existing.start_time - candidate.window.start).abs();
            if gap < buffer {
                conflicts.push(
                    ScheduleConflict::new(
                        ConflictType::MinimumSeparationViolation,
                        Severity::Medium,
                        format!(
                            "过境 {} 与候选过境开始时间仅相差 {} 秒，小于最小间隔 {} 分钟",
                            existing.pass_id,
                            gap.num_seconds(),
                            buffer.num_minutes()
                        ),
                    )
                    .against(existing.pass_id),
                );
            }
        }

        conflicts
    }

    /// 前置检查，返回第一条拒绝原因
    pub fn precheck(
        &self,
        candidate: &PassCandidate,
        now: DateTime<Utc>,
        catalog: &dyn SatelliteCatalog,
    ) -> RepositoryResult<Option<ScheduleConflict>> {
        let window = &candidate.window;

        if !window.is_well_formed() {
            return Ok(Some(ScheduleConflict::new(
                ConflictType::TemporalOverlap,
                Severity::High,
                format!(
                    "开始时间必须早于结束时间 ({} >= {})",
                    window.start.to_rfc3339(),
                    window.end.to_rfc3339()
                ),
            )));
        }

        if window.start <= now {
            return Ok(Some(ScheduleConflict::new(
                ConflictType::TemporalOverlap,
                Severity::High,
                format!("开始时间必须在未来 (start={})", window.start.to_rfc3339()),
            )));
        }

        if !catalog.exists(candidate.satellite_norad_id)? {
            return Ok(Some(ScheduleConflict::new(
                ConflictType::SatelliteAccessConflict,
                Severity::High,
                format!("卫星 NORAD {} 未登记", candidate.satellite_norad_id),
            )));
        }

        Ok(None)
    }

    /// 完整校验：前置检查 + 冲突检测；无 high 冲突即有效
    pub fn validate(
        &self,
        index: &IntervalIndex,
        candidate: &PassCandidate,
        now: DateTime<Utc>,
        catalog: &dyn SatelliteCatalog,
    ) -> RepositoryResult<ValidationResult> {
        if let Some(rejection) = self.precheck(candidate, now, catalog)? {
            return Ok(ValidationResult::rejected(rejection));
        }
        Ok(ValidationResult::from_conflicts(self.detect(index, candidate)))
    }
}
