// ==========================================
// 卫星过境排程系统 - 排程 API
// ==========================================
// 职责: 外部调用边界
// - 解析时间字符串、校验地面站/状态等输入形态
// - 形态错误在进入引擎前以 ApiError::InvalidInput 拒绝
// - 校验不通过以 ValidationResult 返回，不是错误
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::conflict::ValidationResult;
use crate::domain::pass::{PassRequest, PassSchedule};
use crate::domain::report::{CommitOutcome, IngestReport, OptimizationReport, ScheduleStatistics};
use crate::domain::satellite::Satellite;
use crate::domain::types::{NoradId, PassId, PassStatus};
use crate::engine::cancel::CancellationFlag;
use crate::engine::scheduler::PassScheduleEngine;
use crate::importer::pass_csv::{parse_utc_timestamp, PassCsvParser};
use crate::repository::satellite_repo::SatelliteRepository;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// 健康检查结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub checked_at: DateTime<Utc>,
}

// ==========================================
// ScheduleApi
// ==========================================
pub struct ScheduleApi {
    engine: Arc<PassScheduleEngine>,
    satellites: Arc<SatelliteRepository>,
}

impl ScheduleApi {
    pub fn new(engine: Arc<PassScheduleEngine>, satellites: Arc<SatelliteRepository>) -> Self {
        Self { engine, satellites }
    }

    pub fn engine(&self) -> &Arc<PassScheduleEngine> {
        &self.engine
    }

    // ==========================================
    // 校验 / 提交
    // ==========================================

    /// 校验过境申请（不写入）
    pub fn validate_schedule(
        &self,
        satellite_norad_id: NoradId,
        ground_station: &str,
        start_time: &str,
        end_time: &str,
    ) -> ApiResult<ValidationResult> {
        let request = build_request(satellite_norad_id, ground_station, start_time, end_time)?;
        Ok(self.engine.validate(&request)?)
    }

    /// 校验并提交（原子）
    pub fn commit_schedule(
        &self,
        satellite_norad_id: NoradId,
        ground_station: &str,
        start_time: &str,
        end_time: &str,
    ) -> ApiResult<CommitOutcome> {
        let request = build_request(satellite_norad_id, ground_station, start_time, end_time)?;
        Ok(self.engine.validate_and_commit(&request)?)
    }

    /// 从申请的开始时间起搜索空闲时段
    pub fn find_available_slot(
        &self,
        satellite_norad_id: NoradId,
        ground_station: &str,
        start_time: &str,
        end_time: &str,
    ) -> ApiResult<Option<DateTime<Utc>>> {
        let request = build_request(satellite_norad_id, ground_station, start_time, end_time)?;
        if request.start_time >= request.end_time {
            return Err(ApiError::InvalidInput(
                "开始时间必须早于结束时间".to_string(),
            ));
        }
        Ok(self.engine.find_slot(&request)?)
    }

    // ==========================================
    // 优化 / 统计
    // ==========================================

    pub fn optimize_schedule(&self) -> ApiResult<OptimizationReport> {
        self.optimize_schedule_with(&CancellationFlag::new())
    }

    /// 可取消的优化
    pub fn optimize_schedule_with(&self, cancel: &CancellationFlag) -> ApiResult<OptimizationReport> {
        Ok(self.engine.optimize(cancel)?)
    }

    pub fn get_statistics(&self) -> ApiResult<ScheduleStatistics> {
        Ok(self.engine.statistics()?)
    }

    // ==========================================
    // 过境管理
    // ==========================================

    /// 查询过境（可按地面站过滤）
    pub fn list_passes(&self, ground_station: Option<&str>) -> ApiResult<Vec<PassSchedule>> {
        match ground_station.map(str::trim) {
            Some(station) if !station.is_empty() => Ok(self.engine.list_by_station(station)?),
            _ => Ok(self.engine.list_passes()?),
        }
    }

    pub fn get_pass(&self, pass_id: PassId) -> ApiResult<PassSchedule> {
        self.engine
            .find_pass(pass_id)?
            .ok_or_else(|| ApiError::NotFound(format!("PassSchedule(id={})不存在", pass_id)))
    }

    pub fn delete_pass(&self, pass_id: PassId) -> ApiResult<PassSchedule> {
        Ok(self.engine.delete_pass(pass_id)?)
    }

    /// 变更状态（状态字符串: scheduled / active / completed / cancelled）
    pub fn update_pass_status(&self, pass_id: PassId, status: &str) -> ApiResult<PassSchedule> {
        let status = PassStatus::from_str(status)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知过境状态: {}", status)))?;
        Ok(self.engine.update_status(pass_id, status)?)
    }

    /// 从 CSV 文件批量登记候选过境
    pub fn import_candidates_csv(&self, file_path: &Path) -> ApiResult<IngestReport> {
        let requests = PassCsvParser.parse_file(file_path)?;
        tracing::info!(
            file = %file_path.display(),
            rows = requests.len(),
            "开始导入候选过境"
        );
        Ok(self.engine.ingest_candidates(requests)?)
    }

    // ==========================================
    // 卫星目录 / 健康检查
    // ==========================================

    /// 登记卫星；返回 true 表示新登记
    pub fn register_satellite(
        &self,
        norad_id: NoradId,
        name: &str,
        description: Option<&str>,
    ) -> ApiResult<bool> {
        if norad_id <= 0 {
            return Err(ApiError::InvalidInput(format!("NORAD 编号必须为正: {}", norad_id)));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::InvalidInput("卫星名称不能为空".to_string()));
        }

        let satellite = Satellite {
            norad_id,
            name: name.to_string(),
            description: description.map(str::to_string),
        };
        Ok(self.satellites.upsert(&satellite)?)
    }

    pub fn list_satellites(&self) -> ApiResult<Vec<Satellite>> {
        Ok(self.satellites.list()?)
    }

    pub fn health_check(&self) -> ApiResult<HealthStatus> {
        self.engine.ping()?;
        Ok(HealthStatus {
            status: "healthy".to_string(),
            database: "connected".to_string(),
            checked_at: self.engine.now(),
        })
    }
}

/// 构造过境申请：解析时间、校验地面站
///
/// start >= end 不在此拒绝，交给校验给出 temporal_overlap。
pub fn build_request(
    satellite_norad_id: NoradId,
    ground_station: &str,
    start_time: &str,
    end_time: &str,
) -> ApiResult<PassRequest> {
    let station = ground_station.trim();
    if station.is_empty() {
        return Err(ApiError::InvalidInput("地面站不能为空".to_string()));
    }

    let start = parse_utc_timestamp(start_time)
        .ok_or_else(|| ApiError::InvalidInput(format!("start_time 格式错误: {}", start_time)))?;
    let end = parse_utc_timestamp(end_time)
        .ok_or_else(|| ApiError::InvalidInput(format!("end_time 格式错误: {}", end_time)))?;

    Ok(PassRequest::new(satellite_norad_id, station, start, end))
}
