// ==========================================
// 卫星过境排程系统 - 排程参数
// ==========================================

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// 排程引擎参数
///
/// 默认值:
/// - 最小间隔 10 分钟
/// - 搜索步长 30 分钟，搜索范围 168 小时（一周），最多前进 50 步
/// - 统计“即将到来”窗口 24 小时
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub min_separation_minutes: i64,
    pub slot_step_minutes: i64,
    pub slot_search_horizon_hours: i64,
    pub slot_max_steps: u32,
    pub upcoming_window_hours: i64,
    /// 校验失败时是否给出建议开始时间
    pub suggest_alternatives: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_separation_minutes: 10,
            slot_step_minutes: 30,
            slot_search_horizon_hours: 168,
            slot_max_steps: 50,
            upcoming_window_hours: 24,
            suggest_alternatives: true,
        }
    }
}

/// 分钟类参数上限（一天）
pub const MAX_MINUTES_PARAM: i64 = 24 * 60;
/// 小时类参数上限（一年）
pub const MAX_HOURS_PARAM: i64 = 365 * 24;

impl SchedulerConfig {
    // 越界值在 validate() 中被拒绝；此处按上限截断，不会 panic
    pub fn min_separation(&self) -> Duration {
        minutes_capped(self.min_separation_minutes)
    }

    pub fn slot_step(&self) -> Duration {
        minutes_capped(self.slot_step_minutes)
    }

    pub fn slot_search_horizon(&self) -> Duration {
        hours_capped(self.slot_search_horizon_hours)
    }

    pub fn upcoming_window(&self) -> Duration {
        hours_capped(self.upcoming_window_hours)
    }

    /// 参数合法性检查，返回第一个不合法项的说明
    pub fn validate(&self) -> Result<(), String> {
        check_range(
            "min_separation_minutes",
            self.min_separation_minutes,
            0,
            MAX_MINUTES_PARAM,
        )?;
        check_range("slot_step_minutes", self.slot_step_minutes, 1, MAX_MINUTES_PARAM)?;
        check_range(
            "slot_search_horizon_hours",
            self.slot_search_horizon_hours,
            1,
            MAX_HOURS_PARAM,
        )?;
        check_range(
            "upcoming_window_hours",
            self.upcoming_window_hours,
            1,
            MAX_HOURS_PARAM,
        )?;
        Ok(())
    }
}

fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<(), String> {
    if value < min || value > max {
        return Err(format!("{} 超出范围 [{}, {}]: {}", name, min, max, value));
    }
    Ok(())
}

fn minutes_capped(value: i64) -> Duration {
    Duration::try_minutes(value.clamp(0, MAX_MINUTES_PARAM)).unwrap_or_else(Duration::zero)
}

fn hours_capped(value: i64) -> Duration {
    Duration::try_hours(value.clamp(0, MAX_HOURS_PARAM)).unwrap_or_else(Duration::zero)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SchedulerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.slot_step(), Duration::minutes(30));
        assert_eq!(config.slot_search_horizon(), Duration::hours(168));
    }

    #[test]
    fn test_zero_step_is_rejected() {
        let config = SchedulerConfig {
            slot_step_minutes: 0,
            ..SchedulerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let huge_horizon = SchedulerConfig {
            slot_search_horizon_hours: i64::MAX,
            ..SchedulerConfig::default()
        };
        assert!(huge_horizon.validate().is_err());

        let huge_separation = SchedulerConfig {
            min_separation_minutes: i64::MAX / 2,
            ..SchedulerConfig::default()
        };
        assert!(huge_separation.validate().is_err());

        let year = SchedulerConfig {
            slot_search_horizon_hours: MAX_HOURS_PARAM,
            upcoming_window_hours: MAX_HOURS_PARAM,
            slot_step_minutes: MAX_MINUTES_PARAM,
            min_separation_minutes: MAX_MINUTES_PARAM,
            ..SchedulerConfig::default()
        };
        assert!(year.validate().is_ok());
    }

    #[test]
    fn test_durations_never_panic_on_extreme_values() {
        let config = SchedulerConfig {
            min_separation_minutes: i64::MAX / 2,
            slot_step_minutes: i64::MIN,
            slot_search_horizon_hours: i64::MAX,
            upcoming_window_hours: i64::MAX,
            ..SchedulerConfig::default()
        };
        assert_eq!(config.min_separation(), Duration::minutes(MAX_MINUTES_PARAM));
        assert_eq!(config.slot_step(), Duration::zero());
        assert_eq!(config.slot_search_horizon(), Duration::hours(MAX_HOURS_PARAM));
        assert_eq!(config.upcoming_window(), Duration::hours(MAX_HOURS_PARAM));
    }
}
