// ==========================================
// 卫星过境排程系统 - 排程优化
// ==========================================
// 按 (start, id) 升序扫描全部过境:
// 1. 只与“已定位”的过境（扫描中已处理、位于最终位置）比对
// 2. 有冲突 → 从原开始时间起搜索空闲时段
// 3. 新时段与原时段不同 → 写入仓储并记录
// 4. 找不到 → 保持原位，记为未解决
// 较早的过境永远不会被较晚的过境挤开
// 事务边界由调用方负责；本模块只通过 PassWriter 写入
// ==========================================

use crate::domain::pass::PassSchedule;
use crate::domain::report::RescheduleRecord;
use crate::domain::types::PassId;
use crate::engine::cancel::CancellationFlag;
use crate::engine::conflict_detector::ConflictDetector;
use crate::engine::interval_index::IntervalIndex;
use crate::engine::slot_finder::{SlotFinder, SlotRequest};
use crate::repository::error::RepositoryResult;
use crate::repository::pass_repo::PassWriter;

/// 一次扫描的结果
#[derive(Debug)]
pub struct SweepOutcome {
    /// 扫描后的完整索引（所有过境位于最终位置）
    pub settled: IntervalIndex,
    pub rescheduled: Vec<RescheduleRecord>,
    pub unresolved: Vec<PassId>,
    /// 扫描中途被取消
    pub cancelled: bool,
}

pub struct ScheduleOptimizer<'a> {
    detector: &'a ConflictDetector,
    finder: &'a SlotFinder,
}

impl<'a> ScheduleOptimizer<'a> {
    pub fn new(detector: &'a ConflictDetector, finder: &'a SlotFinder) -> Self {
        Self { detector, finder }
    }

    /// 扫描并重排
    ///
    /// # 参数
    /// - passes: 全部过境，需已按 (start, id) 升序
    /// - writer: 事务内写入
    /// - cancel: 每处理一条过境前检查
    pub fn sweep(
        &self,
        passes: &[PassSchedule],
        writer: &mut dyn PassWriter,
        cancel: &CancellationFlag,
    ) -> RepositoryResult<SweepOutcome> {
        let mut settled = IntervalIndex::new();
        let mut rescheduled = Vec::new();
        let mut unresolved = Vec::new();

        for pass in passes {
            if cancel.is_cancelled() {
                tracing::info!(processed = settled.len(), "优化扫描已取消");
                return Ok(SweepOutcome {
                    settled,
                    rescheduled,
                    unresolved,
                    cancelled: true,
                });
            }

            let candidate = pass.as_candidate();
            let conflicts = self.detector.detect(&settled, &candidate);
            if conflicts.is_empty() {
                settled.insert(pass.clone());
                continue;
            }

            let request = SlotRequest::for_candidate(&candidate);
            match self.finder.find_slot(self.detector, &settled, &request) {
                Some(new_start) if new_start != pass.start_time => {
                    let new_window = pass.window().shifted_to(new_start);
                    writer.update_window(pass.pass_id, &new_window)?;

                    tracing::info!(
                        pass_id = pass.pass_id,
                        ground_station = %pass.ground_station,
                        old_start = %pass.start_time,
                        new_start = %new_start,
                        "过境已重排"
                    );
                    rescheduled.push(RescheduleRecord {
                        pass_id: pass.pass_id,
                        ground_station: pass.ground_station.clone(),
                        old_start: pass.start_time,
                        new_start: new_window.start,
                        new_end: new_window.end,
                    });

                    let mut moved = pass.clone();
                    moved.start_time = new_window.start;
                    moved.end_time = new_window.end;
                    settled.insert(moved);
                }
                Some(_) => {
                    // 冲突均为非阻断项，原位即可
                    settled.insert(pass.clone());
                }
                None => {
                    tracing::warn!(
                        pass_id = pass.pass_id,
                        ground_station = %pass.ground_station,
                        conflicts = conflicts.len(),
                        "未找到可用时段，保持原位"
                    );
                    unresolved.push(pass.pass_id);
                    settled.insert(pass.clone());
                }
            }
        }

        Ok(SweepOutcome {
            settled,
            rescheduled,
            unresolved,
            cancelled: false,
        })
    }
}
