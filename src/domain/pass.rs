// ==========================================
// 卫星过境排程系统 - 过境领域模型
// ==========================================
// 职责: 时间窗口、过境记录、候选过境
// 红线: start < end，时间一律以 UTC 存储
// ==========================================

use crate::domain::types::{NoradId, PassId, PassStatus};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// TimeWindow - 半开时间区间 [start, end)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// 从起始时间和时长构造
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    /// 窗口是否合法（start < end）
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// 半开区间重叠判定: s1 < e2 && s2 < e1
    ///
    /// 首尾相接（一个的 end 等于另一个的 start）不算重叠。
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// 两端各扩展 buffer
    pub fn widened(&self, buffer: Duration) -> TimeWindow {
        TimeWindow {
            start: self.start - buffer,
            end: self.end + buffer,
        }
    }

    /// 平移到新的起始时间，保持时长不变
    pub fn shifted_to(&self, new_start: DateTime<Utc>) -> TimeWindow {
        TimeWindow::starting_at(new_start, self.duration())
    }
}

// ==========================================
// PassSchedule - 已登记的过境（预约）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassSchedule {
    pub pass_id: PassId,               // 过境ID
    pub satellite_norad_id: NoradId,   // 卫星 NORAD 编号
    pub ground_station: String,        // 地面站
    pub start_time: DateTime<Utc>,     // 开始时间
    pub end_time: DateTime<Utc>,       // 结束时间
    pub status: PassStatus,            // 状态
}

impl PassSchedule {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// 以本记录构造重新校验用的候选（带自身ID，查询时排除自己）
    pub fn as_candidate(&self) -> PassCandidate {
        PassCandidate {
            pass_id: Some(self.pass_id),
            satellite_norad_id: self.satellite_norad_id,
            ground_station: self.ground_station.clone(),
            window: self.window(),
        }
    }
}

// ==========================================
// PassRequest - 外部提交的过境申请
// ==========================================
// 时间戳已在 API 边界完成解析
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassRequest {
    pub satellite_norad_id: NoradId,
    pub ground_station: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl PassRequest {
    pub fn new(
        satellite_norad_id: NoradId,
        ground_station: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Self {
        Self {
            satellite_norad_id,
            ground_station: ground_station.into(),
            start_time,
            end_time,
        }
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn as_candidate(&self) -> PassCandidate {
        PassCandidate {
            pass_id: None,
            satellite_norad_id: self.satellite_norad_id,
            ground_station: self.ground_station.clone(),
            window: self.window(),
        }
    }
}

// ==========================================
// PassCandidate - 冲突检测的输入
// ==========================================
// pass_id 为 Some 时表示重新校验已存在的过境
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassCandidate {
    pub pass_id: Option<PassId>,
    pub satellite_norad_id: NoradId,
    pub ground_station: String,
    pub window: TimeWindow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let windows = [
            TimeWindow::new(at(10, 0), at(10, 30)),
            TimeWindow::new(at(10, 30), at(11, 0)),
            TimeWindow::new(at(10, 15), at(10, 45)),
            TimeWindow::new(at(9, 0), at(12, 0)),
            TimeWindow::new(at(11, 0), at(11, 5)),
        ];
        for a in &windows {
            for b in &windows {
                assert_eq!(a.overlaps(b), b.overlaps(a), "{:?} vs {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_touching_windows_do_not_overlap() {
        let a = TimeWindow::new(at(10, 0), at(10, 30));
        let b = TimeWindow::new(at(10, 30), at(11, 0));
        assert!(!a.overlaps(&b));
        assert!(a.widened(Duration::minutes(1)).overlaps(&b));
    }

    #[test]
    fn test_shifted_window_keeps_duration() {
        let w = TimeWindow::new(at(10, 0), at(10, 12));
        let moved = w.shifted_to(at(13, 30));
        assert_eq!(moved.start, at(13, 30));
        assert_eq!(moved.duration(), Duration::minutes(12));
        assert!(!TimeWindow::new(at(10, 0), at(10, 0)).is_well_formed());
    }
}
