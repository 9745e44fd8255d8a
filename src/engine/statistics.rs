// ==========================================
// 卫星过境排程系统 - 排程统计
// ==========================================
// 只读: 总数、按状态（四种状态始终出现）、按地面站、即将到来
// ==========================================

use crate::domain::report::ScheduleStatistics;
use crate::domain::types::PassStatus;
use crate::engine::interval_index::IntervalIndex;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

pub struct StatisticsAggregator;

impl StatisticsAggregator {
    /// 汇总统计
    ///
    /// “即将到来”= 开始时间落在 [now, now + upcoming_window] 内（两端包含）
    pub fn collect(
        index: &IntervalIndex,
        now: DateTime<Utc>,
        upcoming_window: Duration,
    ) -> ScheduleStatistics {
        let mut passes_by_status: BTreeMap<PassStatus, usize> =
            PassStatus::ALL.iter().map(|s| (*s, 0)).collect();
        let mut passes_by_station: BTreeMap<String, usize> = BTreeMap::new();
        let upcoming_end = now + upcoming_window;
        let mut upcoming_passes = 0;

        for pass in index.iter() {
            *passes_by_status.entry(pass.status).or_insert(0) += 1;
            *passes_by_station
                .entry(pass.ground_station.clone())
                .or_insert(0) += 1;
            if pass.start_time >= now && pass.start_time <= upcoming_end {
                upcoming_passes += 1;
            }
        }

        ScheduleStatistics {
            total_passes: index.len(),
            passes_by_status,
            passes_by_station,
            upcoming_passes,
            upcoming_window_hours: upcoming_window.num_hours(),
            generated_at: now,
        }
    }
}
