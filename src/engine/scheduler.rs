// ==========================================
// 卫星过境排程系统 - 排程引擎
// ==========================================
// 职责: 组合区间索引、冲突检测、时段搜索、优化与统计
// 并发: 索引由一把 RwLock 保护
// - 检测 / 校验 / 搜索 / 统计 / 查询 → 读锁
// - 插入 / 删除 / 状态变更 / 校验并提交 / 整个优化扫描 → 写锁
// 红线: 一次逻辑操作 = 一个仓储事务；事务失败时索引不变
// ==========================================

use crate::config::SchedulerConfig;
use crate::domain::conflict::{ScheduleConflict, ValidationResult};
use crate::domain::pass::{PassCandidate, PassRequest, PassSchedule};
use crate::domain::report::{
    CommitOutcome, IngestOutcome, IngestReport, OptimizationReport, ScheduleStatistics,
};
use crate::domain::types::{ConflictType, OptimizationStatus, PassId, PassStatus};
use crate::engine::cancel::CancellationFlag;
use crate::engine::clock::Clock;
use crate::engine::conflict_detector::ConflictDetector;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::events::{OptionalEventPublisher, PassEvent, PassEventPublisher, PassEventType};
use crate::engine::interval_index::IntervalIndex;
use crate::engine::optimizer::{ScheduleOptimizer, SweepOutcome};
use crate::engine::slot_finder::{SlotFinder, SlotRequest};
use crate::engine::statistics::StatisticsAggregator;
use crate::perf::PerfGuard;
use crate::repository::error::RepositoryError;
use crate::repository::pass_repo::{PassRepository, PassWriter};
use crate::repository::satellite_repo::SatelliteCatalog;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

// ==========================================
// PassScheduleEngine
// ==========================================
pub struct PassScheduleEngine {
    repo: Arc<dyn PassRepository>,
    catalog: Arc<dyn SatelliteCatalog>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    detector: ConflictDetector,
    finder: SlotFinder,
    index: RwLock<IntervalIndex>,
    events: OptionalEventPublisher,
}

impl PassScheduleEngine {
    /// 创建引擎并从仓储加载全部过境
    pub fn new(
        repo: Arc<dyn PassRepository>,
        catalog: Arc<dyn SatelliteCatalog>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> EngineResult<Self> {
        let passes = repo.load_all()?;
        tracing::info!(passes = passes.len(), "排程引擎已加载过境");

        Ok(Self {
            detector: ConflictDetector::new(config.min_separation()),
            finder: SlotFinder::new(
                config.slot_step(),
                config.slot_search_horizon(),
                config.slot_max_steps,
            ),
            index: RwLock::new(IntervalIndex::from_passes(passes)),
            events: OptionalEventPublisher::none(),
            repo,
            catalog,
            clock,
            config,
        })
    }

    /// 配置事件发布者
    pub fn with_event_publisher(mut self, publisher: Arc<dyn PassEventPublisher>) -> Self {
        self.events = OptionalEventPublisher::with_publisher(publisher);
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn read_index(&self) -> EngineResult<RwLockReadGuard<'_, IntervalIndex>> {
        self.index
            .read()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))
    }

    fn write_index(&self) -> EngineResult<RwLockWriteGuard<'_, IntervalIndex>> {
        self.index
            .write()
            .map_err(|e| EngineError::LockPoisoned(e.to_string()))
    }

    /// 从仓储重新加载索引，返回过境数
    pub fn resync(&self) -> EngineResult<usize> {
        let mut index = self.write_index()?;
        let passes = self.repo.load_all()?;
        *index = IntervalIndex::from_passes(passes);
        tracing::info!(passes = index.len(), "索引已与仓储重新同步");
        Ok(index.len())
    }

    // ==========================================
    // 检测 / 校验 / 搜索（读锁）
    // ==========================================

    /// 仅做冲突检测（不做前置检查）
    pub fn detect(&self, request: &PassRequest) -> EngineResult<Vec<ScheduleConflict>> {
        let index = self.read_index()?;
        Ok(self.detector.detect(&index, &request.as_candidate()))
    }

    /// 完整校验；不通过且有地面站冲突时附带建议时间
    pub fn validate(&self, request: &PassRequest) -> EngineResult<ValidationResult> {
        let index = self.read_index()?;
        self.validate_locked(&index, &request.as_candidate())
    }

    /// 从请求的开始时间起搜索空闲时段（保持请求时长）
    pub fn find_slot(&self, request: &PassRequest) -> EngineResult<Option<DateTime<Utc>>> {
        let index = self.read_index()?;
        let slot_request = SlotRequest::for_candidate(&request.as_candidate());
        Ok(self.finder.find_slot(&self.detector, &index, &slot_request))
    }

    fn validate_locked(
        &self,
        index: &IntervalIndex,
        candidate: &PassCandidate,
    ) -> EngineResult<ValidationResult> {
        let now = self.clock.now();
        let mut result = self
            .detector
            .validate(index, candidate, now, self.catalog.as_ref())?;

        if !result.is_valid && self.config.suggest_alternatives {
            let station_blocked = result
                .conflicts_of(ConflictType::GroundStationConflict)
                .next()
                .is_some();
            if station_blocked {
                let slot_request = SlotRequest::for_candidate(candidate);
                if let Some(suggested) = self.finder.find_slot(&self.detector, index, &slot_request) {
                    result.suggest(suggested);
                }
            }
        }
        Ok(result)
    }

    // ==========================================
    // 写操作（写锁）
    // ==========================================

    /// 校验并提交：校验与写入在同一次写锁内完成
    ///
    /// 校验不通过返回 `pass_id = None`；仓储失败返回 Err，索引不变。
    pub fn validate_and_commit(&self, request: &PassRequest) -> EngineResult<CommitOutcome> {
        let _perf = PerfGuard::new("commit_schedule");
        let mut index = self.write_index()?;

        let validation = self.validate_locked(&index, &request.as_candidate())?;
        if !validation.is_valid {
            tracing::info!(
                satellite = request.satellite_norad_id,
                ground_station = %request.ground_station,
                high = validation.high_severity_count,
                "过境申请被拒绝"
            );
            return Ok(CommitOutcome {
                pass_id: None,
                validation,
            });
        }

        let pass_id = self.repo.insert(request, PassStatus::Scheduled)?;
        index.insert(PassSchedule {
            pass_id,
            satellite_norad_id: request.satellite_norad_id,
            ground_station: request.ground_station.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            status: PassStatus::Scheduled,
        });
        drop(index);

        tracing::info!(
            pass_id,
            satellite = request.satellite_norad_id,
            ground_station = %request.ground_station,
            advisory = validation.total_conflicts,
            "过境已登记"
        );
        self.events.publish_logged(PassEvent::for_pass(
            PassEventType::PassCommitted,
            pass_id,
            request.ground_station.clone(),
            self.clock.now(),
        ));

        Ok(CommitOutcome {
            pass_id: Some(pass_id),
            validation,
        })
    }

    /// 删除过境
    pub fn delete_pass(&self, pass_id: PassId) -> EngineResult<PassSchedule> {
        let mut index = self.write_index()?;
        if !index.contains(pass_id) {
            return Err(EngineError::PassNotFound(pass_id));
        }

        self.repo.delete(pass_id)?;
        let removed = index
            .remove(pass_id)
            .ok_or(EngineError::PassNotFound(pass_id))?;
        drop(index);

        tracing::info!(pass_id, ground_station = %removed.ground_station, "过境已删除");
        self.events.publish_logged(PassEvent::for_pass(
            PassEventType::PassDeleted,
            pass_id,
            removed.ground_station.clone(),
            self.clock.now(),
        ));
        Ok(removed)
    }

    /// 变更过境状态
    pub fn update_status(&self, pass_id: PassId, status: PassStatus) -> EngineResult<PassSchedule> {
        let mut index = self.write_index()?;
        if !index.contains(pass_id) {
            return Err(EngineError::PassNotFound(pass_id));
        }

        self.repo.update_status(pass_id, status)?;
        let updated = index
            .set_status(pass_id, status)
            .cloned()
            .ok_or(EngineError::PassNotFound(pass_id))?;
        drop(index);

        tracing::info!(pass_id, status = %status, "过境状态已变更");
        self.events.publish_logged(PassEvent::for_pass(
            PassEventType::PassStatusChanged,
            pass_id,
            updated.ground_station.clone(),
            self.clock.now(),
        ));
        Ok(updated)
    }

    /// 批量登记外部计算出的候选过境
    ///
    /// 逐条校验并提交；单条仓储失败记为 failed，不中断批次。
    pub fn ingest_candidates(&self, requests: Vec<PassRequest>) -> EngineResult<IngestReport> {
        let mut report = IngestReport::default();

        for request in requests {
            let outcome = match self.validate_and_commit(&request) {
                Ok(CommitOutcome {
                    pass_id: Some(pass_id),
                    ..
                }) => IngestOutcome::Accepted { pass_id },
                Ok(CommitOutcome { validation, .. }) => IngestOutcome::Rejected { validation },
                Err(EngineError::Repository(e)) => {
                    tracing::warn!(
                        satellite = request.satellite_norad_id,
                        ground_station = %request.ground_station,
                        "候选过境写入失败: {}",
                        e
                    );
                    IngestOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
                Err(e) => return Err(e),
            };
            report.record(request, outcome);
        }

        tracing::info!(
            accepted = report.accepted,
            rejected = report.rejected,
            failed = report.failed,
            "候选过境批量登记完成"
        );
        Ok(report)
    }

    // ==========================================
    // 优化（写锁覆盖整个扫描）
    // ==========================================

    /// 优化排程
    ///
    /// 整个扫描在一个仓储事务内完成:
    /// - 成功 → 提交，索引替换为扫描结果
    /// - 取消 → 回滚，状态 Cancelled
    /// - 仓储失败 → 回滚，状态 Failed
    /// 回滚时索引保持扫描前的状态。
    pub fn optimize(&self, cancel: &CancellationFlag) -> EngineResult<OptimizationReport> {
        let _perf = PerfGuard::new("optimize_schedule");
        let run_id = Uuid::new_v4();
        let started_at = self.clock.now();

        let mut index = self.write_index()?;
        let passes: Vec<PassSchedule> = index.iter().cloned().collect();
        let total_passes = passes.len();
        tracing::info!(%run_id, total_passes, "开始优化排程");

        let optimizer = ScheduleOptimizer::new(&self.detector, &self.finder);
        let mut swept: Option<SweepOutcome> = None;
        let result = self
            .repo
            .within_transaction(&mut |writer: &mut dyn PassWriter| {
                let outcome = optimizer.sweep(&passes, writer, cancel)?;
                if outcome.cancelled {
                    return Err(RepositoryError::TransactionAborted("优化已取消".to_string()));
                }
                swept = Some(outcome);
                Ok(())
            });

        let outcome = match (result, swept) {
            (Ok(()), Some(outcome)) => outcome,
            (Ok(()), None) => {
                return Err(EngineError::Repository(RepositoryError::InternalError(
                    "优化事务已提交但无扫描结果".to_string(),
                )))
            }
            (Err(RepositoryError::TransactionAborted(reason)), _) if cancel.is_cancelled() => {
                tracing::info!(%run_id, "优化已取消并回滚: {}", reason);
                return Ok(OptimizationReport::rolled_back(
                    run_id,
                    total_passes,
                    OptimizationStatus::Cancelled,
                    started_at,
                    self.clock.now(),
                ));
            }
            (Err(e), _) => {
                tracing::warn!(%run_id, "优化失败并回滚: {}", e);
                return Ok(OptimizationReport::rolled_back(
                    run_id,
                    total_passes,
                    OptimizationStatus::Failed(e.to_string()),
                    started_at,
                    self.clock.now(),
                ));
            }
        };

        *index = outcome.settled;
        drop(index);

        let finished_at = self.clock.now();
        for record in &outcome.rescheduled {
            self.events.publish_logged(PassEvent::for_pass(
                PassEventType::PassRescheduled,
                record.pass_id,
                record.ground_station.clone(),
                finished_at,
            ));
        }
        self.events.publish_logged(PassEvent::schedule_wide(
            PassEventType::ScheduleOptimized,
            Some(run_id.to_string()),
            finished_at,
        ));

        tracing::info!(
            %run_id,
            total_passes,
            rescheduled = outcome.rescheduled.len(),
            unresolved = outcome.unresolved.len(),
            "优化排程完成"
        );

        Ok(OptimizationReport {
            run_id,
            total_passes,
            passes_rescheduled: outcome.rescheduled.len(),
            passes_unresolved: outcome.unresolved.len(),
            status: OptimizationStatus::Completed,
            rescheduled: outcome.rescheduled,
            unresolved_pass_ids: outcome.unresolved,
            started_at,
            finished_at,
        })
    }

    // ==========================================
    // 查询（读锁）
    // ==========================================

    pub fn statistics(&self) -> EngineResult<ScheduleStatistics> {
        let index = self.read_index()?;
        Ok(StatisticsAggregator::collect(
            &index,
            self.clock.now(),
            self.config.upcoming_window(),
        ))
    }

    /// 全部过境（start 升序、id 升序）
    pub fn list_passes(&self) -> EngineResult<Vec<PassSchedule>> {
        let index = self.read_index()?;
        Ok(index.iter().cloned().collect())
    }

    /// 某地面站的过境
    pub fn list_by_station(&self, ground_station: &str) -> EngineResult<Vec<PassSchedule>> {
        let index = self.read_index()?;
        Ok(index
            .iter()
            .filter(|p| p.ground_station == ground_station)
            .cloned()
            .collect())
    }

    pub fn find_pass(&self, pass_id: PassId) -> EngineResult<Option<PassSchedule>> {
        let index = self.read_index()?;
        Ok(index.get(pass_id).cloned())
    }

    /// 引擎时钟的当前时间
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// 仓储连通性检查
    pub fn ping(&self) -> EngineResult<()> {
        self.repo.ping()?;
        Ok(())
    }
}
