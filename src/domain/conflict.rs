// ==========================================
// 卫星过境排程系统 - 冲突与校验结果
// ==========================================
// 红线: 校验失败是数据，不是错误
// ==========================================

use crate::domain::types::{ConflictType, PassId, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ScheduleConflict - 检测到的冲突
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConflict {
    pub conflict_type: ConflictType,
    pub severity: Severity,
    pub description: String,
    pub conflicting_pass_id: Option<PassId>,
    pub suggested_time: Option<DateTime<Utc>>,
}

impl ScheduleConflict {
    pub fn new(conflict_type: ConflictType, severity: Severity, description: String) -> Self {
        Self {
            conflict_type,
            severity,
            description,
            conflicting_pass_id: None,
            suggested_time: None,
        }
    }

    /// 关联冲突对象
    pub fn against(mut self, pass_id: PassId) -> Self {
        self.conflicting_pass_id = Some(pass_id);
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }
}

// ==========================================
// ValidationResult - 校验结果
// ==========================================
// conflicts 顺序 = 检测顺序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub conflicts: Vec<ScheduleConflict>,
    pub total_conflicts: usize,
    pub high_severity_count: usize,
}

impl ValidationResult {
    /// 由冲突列表派生校验结果：无 High 冲突即有效
    pub fn from_conflicts(conflicts: Vec<ScheduleConflict>) -> Self {
        let high_severity_count = conflicts.iter().filter(|c| c.is_blocking()).count();
        Self {
            is_valid: high_severity_count == 0,
            total_conflicts: conflicts.len(),
            high_severity_count,
            conflicts,
        }
    }

    /// 单条拒绝原因（窗口非法 / 卫星不存在等，无需查询索引）
    pub fn rejected(conflict: ScheduleConflict) -> Self {
        Self::from_conflicts(vec![conflict])
    }

    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// 按类型筛选冲突
    pub fn conflicts_of(&self, conflict_type: ConflictType) -> impl Iterator<Item = &ScheduleConflict> {
        self.conflicts
            .iter()
            .filter(move |c| c.conflict_type == conflict_type)
    }

    /// 为所有地面站冲突填入建议时间
    pub fn suggest(&mut self, suggested: DateTime<Utc>) {
        for conflict in self
            .conflicts
            .iter_mut()
            .filter(|c| c.conflict_type == ConflictType::GroundStationConflict)
        {
            conflict.suggested_time = Some(suggested);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_medium_conflicts_do_not_invalidate() {
        let result = ValidationResult::from_conflicts(vec![ScheduleConflict::new(
            ConflictType::MinimumSeparationViolation,
            Severity::Medium,
            "间隔不足".to_string(),
        )
        .against(7)]);

        assert!(result.is_valid);
        assert_eq!(result.total_conflicts, 1);
        assert_eq!(result.high_severity_count, 0);
    }

    #[test]
    fn test_rejected_result_is_invalid() {
        let result = ValidationResult::rejected(ScheduleConflict::new(
            ConflictType::TemporalOverlap,
            Severity::High,
            "开始时间必须早于结束时间".to_string(),
        ));

        assert!(!result.is_valid);
        assert_eq!(result.high_severity_count, 1);
        assert!(result.conflicts[0].conflicting_pass_id.is_none());
    }
}
