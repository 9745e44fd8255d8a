// ==========================================
// 卫星过境排程系统 - 结果报告模型
// ==========================================
// 职责: 提交结果、优化报告、统计汇总、批量导入报告
// ==========================================

use crate::domain::conflict::ValidationResult;
use crate::domain::pass::PassRequest;
use crate::domain::types::{OptimizationStatus, PassId, PassStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ==========================================
// CommitOutcome - 校验并提交的结果
// ==========================================
// pass_id 为 None 表示校验未通过、未写入
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitOutcome {
    pub pass_id: Option<PassId>,
    pub validation: ValidationResult,
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        self.pass_id.is_some()
    }
}

// ==========================================
// RescheduleRecord - 单个过境的调整记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescheduleRecord {
    pub pass_id: PassId,
    pub ground_station: String,
    pub old_start: DateTime<Utc>,
    pub new_start: DateTime<Utc>,
    pub new_end: DateTime<Utc>,
}

// ==========================================
// OptimizationReport - 一次扫描的汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub run_id: Uuid,
    pub total_passes: usize,
    pub passes_rescheduled: usize,
    pub passes_unresolved: usize,
    pub status: OptimizationStatus,
    pub rescheduled: Vec<RescheduleRecord>,
    pub unresolved_pass_ids: Vec<PassId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl OptimizationReport {
    /// 回滚后的报告：不保留任何调整
    pub fn rolled_back(
        run_id: Uuid,
        total_passes: usize,
        status: OptimizationStatus,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id,
            total_passes,
            passes_rescheduled: 0,
            passes_unresolved: 0,
            status,
            rescheduled: Vec::new(),
            unresolved_pass_ids: Vec::new(),
            started_at,
            finished_at,
        }
    }
}

// ==========================================
// ScheduleStatistics - 排程统计
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStatistics {
    pub total_passes: usize,
    pub passes_by_status: BTreeMap<PassStatus, usize>,
    pub passes_by_station: BTreeMap<String, usize>,
    pub upcoming_passes: usize,
    pub upcoming_window_hours: i64,
    pub generated_at: DateTime<Utc>,
}

// ==========================================
// 批量导入候选过境
// ==========================================

/// 单行候选的处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum IngestOutcome {
    Accepted { pass_id: PassId },
    Rejected { validation: ValidationResult },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestItem {
    pub request: PassRequest,
    pub outcome: IngestOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub accepted: usize,
    pub rejected: usize,
    pub failed: usize,
    pub items: Vec<IngestItem>,
}

impl IngestReport {
    pub fn record(&mut self, request: PassRequest, outcome: IngestOutcome) {
        match &outcome {
            IngestOutcome::Accepted { .. } => self.accepted += 1,
            IngestOutcome::Rejected { .. } => self.rejected += 1,
            IngestOutcome::Failed { .. } => self.failed += 1,
        }
        self.items.push(IngestItem { request, outcome });
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }
}
