// ==========================================
// 卫星过境排程系统 - 空闲时段搜索
// ==========================================
// 从期望开始时间起按步长向后试探 [t, t + duration)，
// 第一个没有 high 冲突的 t 即为结果
// 停止条件: t 超出搜索范围，或已前进 max_steps 步
// 找不到返回 None（正常结果，不是错误）
// ==========================================

use crate::domain::pass::{PassCandidate, TimeWindow};
use crate::domain::types::{NoradId, PassId};
use crate::engine::conflict_detector::ConflictDetector;
use crate::engine::interval_index::IntervalIndex;
use chrono::{DateTime, Duration, Utc};

/// 搜索请求
#[derive(Debug, Clone)]
pub struct SlotRequest {
    pub desired_start: DateTime<Utc>,
    pub duration: Duration,
    pub satellite_norad_id: NoradId,
    pub ground_station: String,
    /// 重新安排已有过境时排除其自身
    pub exclude: Option<PassId>,
}

impl SlotRequest {
    /// 以候选过境的开始时间和时长构造
    pub fn for_candidate(candidate: &PassCandidate) -> Self {
        Self {
            desired_start: candidate.window.start,
            duration: candidate.window.duration(),
            satellite_norad_id: candidate.satellite_norad_id,
            ground_station: candidate.ground_station.clone(),
            exclude: candidate.pass_id,
        }
    }

    fn candidate_at(&self, start: DateTime<Utc>) -> PassCandidate {
        PassCandidate {
            pass_id: self.exclude,
            satellite_norad_id: self.satellite_norad_id,
            ground_station: self.ground_station.clone(),
            window: TimeWindow::starting_at(start, self.duration),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlotFinder {
    step: Duration,
    horizon: Duration,
    max_steps: u32,
}

impl SlotFinder {
    pub fn new(step: Duration, horizon: Duration, max_steps: u32) -> Self {
        Self {
            step,
            horizon,
            max_steps,
        }
    }

    /// 搜索空闲时段
    ///
    /// `max_steps = n` 时最多检查 n + 1 个开始时间。
    pub fn find_slot(
        &self,
        detector: &ConflictDetector,
        index: &IntervalIndex,
        request: &SlotRequest,
    ) -> Option<DateTime<Utc>> {
        // 范围越过可表示的最大时间时视为无空闲时段
        let search_end = request.desired_start.checked_add_signed(self.horizon)?;
        let mut t = request.desired_start;
        let mut steps = 0u32;

        while t < search_end {
            let candidate = request.candidate_at(t);
            let blocked = detector
                .detect(index, &candidate)
                .iter()
                .any(|c| c.is_blocking());
            if !blocked {
                tracing::debug!(
                    ground_station = %request.ground_station,
                    start = %t,
                    steps,
                    "找到空闲时段"
                );
                return Some(t);
            }

            if steps >= self.max_steps || self.step <= Duration::zero() {
                break;
            }
            t = match t.checked_add_signed(self.step) {
                Some(next) => next,
                None => break,
            };
            steps += 1;
        }

        tracing::debug!(
            ground_station = %request.ground_station,
            desired_start = %request.desired_start,
            steps,
            "搜索范围内无空闲时段"
        );
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pass::PassSchedule;
    use crate::domain::types::PassStatus;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 3, 1, 8, 0, 0).unwrap()
    }

    fn block(id: PassId, start_min: i64, end_min: i64) -> PassSchedule {
        PassSchedule {
            pass_id: id,
            satellite_norad_id: 25544,
            ground_station: "GS1".to_string(),
            start_time: base() + Duration::minutes(start_min),
            end_time: base() + Duration::minutes(end_min),
            status: PassStatus::Scheduled,
        }
    }

    fn request() -> SlotRequest {
        SlotRequest {
            desired_start: base(),
            duration: Duration::minutes(30),
            satellite_norad_id: 25544,
            ground_station: "GS1".to_string(),
            exclude: None,
        }
    }

    fn finder(max_steps: u32) -> SlotFinder {
        SlotFinder::new(Duration::minutes(30), Duration::hours(168), max_steps)
    }

    fn two_blocks() -> IntervalIndex {
        IntervalIndex::from_passes(vec![block(1, 0, 30), block(2, 30, 60)])
    }

    #[test]
    fn test_free_desired_start_returned_as_is() {
        let detector = ConflictDetector::new(Duration::minutes(10));
        let found = finder(50).find_slot(&detector, &IntervalIndex::new(), &request());
        assert_eq!(found, Some(base()));
    }

    #[test]
    fn test_two_steps_reach_third_block() {
        let detector = ConflictDetector::new(Duration::minutes(10));
        let found = finder(2).find_slot(&detector, &two_blocks(), &request());
        assert_eq!(found, Some(base() + Duration::minutes(60)));
    }

    #[test]
    fn test_one_step_exhausts() {
        let detector = ConflictDetector::new(Duration::minutes(10));
        assert_eq!(finder(1).find_slot(&detector, &two_blocks(), &request()), None);
    }

    #[test]
    fn test_horizon_bounds_search() {
        let detector = ConflictDetector::new(Duration::minutes(10));
        let finder = SlotFinder::new(Duration::minutes(30), Duration::minutes(60), 50);
        // 60 分钟范围内只能试 t0 与 t0+30，均被占用
        assert_eq!(finder.find_slot(&detector, &two_blocks(), &request()), None);
    }

    #[test]
    fn test_horizon_past_max_time_yields_none() {
        let detector = ConflictDetector::new(Duration::minutes(10));
        let mut req = request();
        req.desired_start = DateTime::<Utc>::MAX_UTC - Duration::hours(1);
        let finder = SlotFinder::new(Duration::minutes(30), Duration::hours(8760), 50);
        assert_eq!(finder.find_slot(&detector, &IntervalIndex::new(), &req), None);
    }

    #[test]
    fn test_other_station_does_not_block() {
        let detector = ConflictDetector::new(Duration::minutes(10));
        let mut req = request();
        req.ground_station = "GS2".to_string();
        assert_eq!(finder(0).find_slot(&detector, &two_blocks(), &req), Some(base()));
    }

    #[test]
    fn test_found_slot_never_has_high_conflict() {
        let detector = ConflictDetector::new(Duration::minutes(10));
        let index = IntervalIndex::from_passes(vec![
            block(1, 0, 45),
            block(2, 50, 95),
            block(3, 100, 200),
            block(4, 230, 260),
        ]);
        let found = finder(50).find_slot(&detector, &index, &request()).unwrap();
        let candidate = request().candidate_at(found);
        assert!(detector
            .detect(&index, &candidate)
            .iter()
            .all(|c| !c.is_blocking()));
        assert!(found > base());
    }
}
