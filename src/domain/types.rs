// ==========================================
// 卫星过境排程系统 - 领域类型定义
// ==========================================
// 职责: 过境状态、冲突类型、严重程度、优化状态
// 序列化格式: snake_case (与数据库及调用方一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 过境记录主键（SQLite INTEGER PRIMARY KEY）
pub type PassId = i64;

/// 卫星 NORAD 编号
pub type NoradId = i64;

// ==========================================
// 过境状态 (Pass Status)
// ==========================================
// 状态流转由核心之外驱动，核心只负责存取
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassStatus {
    Scheduled, // 已排程
    Active,    // 执行中
    Completed, // 已完成
    Cancelled, // 已取消
}

impl PassStatus {
    /// 全部状态（统计时保证每个状态都有计数）
    pub const ALL: [PassStatus; 4] = [
        PassStatus::Scheduled,
        PassStatus::Active,
        PassStatus::Completed,
        PassStatus::Cancelled,
    ];

    /// 从字符串解析状态，未知值返回 None
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Some(PassStatus::Scheduled),
            "active" => Some(PassStatus::Active),
            "completed" => Some(PassStatus::Completed),
            "cancelled" => Some(PassStatus::Cancelled),
            _ => None,
        }
    }

    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            PassStatus::Scheduled => "scheduled",
            PassStatus::Active => "active",
            PassStatus::Completed => "completed",
            PassStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

// ==========================================
// 冲突类型 (Conflict Type)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictType {
    GroundStationConflict,      // 同一地面站时间重叠
    MinimumSeparationViolation, // 起始时间间隔不足
    TemporalOverlap,            // 时间窗口本身非法
    SatelliteAccessConflict,    // 卫星不存在 / 无法访问
}

impl ConflictType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictType::GroundStationConflict => "ground_station_conflict",
            ConflictType::MinimumSeparationViolation => "minimum_separation_violation",
            ConflictType::TemporalOverlap => "temporal_overlap",
            ConflictType::SatelliteAccessConflict => "satellite_access_conflict",
        }
    }
}

impl fmt::Display for ConflictType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 冲突严重程度 (Severity)
// ==========================================
// 红线: 仅 High 阻断提交，Medium/Low 为提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::High)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 优化终态 (Optimization Status)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum OptimizationStatus {
    Completed,      // 全量扫描完成并已提交
    Cancelled,      // 收到取消信号，已回滚
    Failed(String), // 仓储失败，已回滚
}

impl OptimizationStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, OptimizationStatus::Completed)
    }
}

impl fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationStatus::Completed => write!(f, "completed"),
            OptimizationStatus::Cancelled => write!(f, "cancelled"),
            OptimizationStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_status_round_trip_through_db_str() {
        for status in PassStatus::ALL {
            assert_eq!(PassStatus::from_str(status.to_db_str()), Some(status));
        }
        assert_eq!(PassStatus::from_str(" Active "), Some(PassStatus::Active));
        assert_eq!(PassStatus::from_str("paused"), None);
    }

    #[test]
    fn test_conflict_type_serializes_snake_case() {
        let json = serde_json::to_string(&ConflictType::MinimumSeparationViolation).unwrap();
        assert_eq!(json, "\"minimum_separation_violation\"");
        assert_eq!(
            ConflictType::GroundStationConflict.to_string(),
            "ground_station_conflict"
        );
    }

    #[test]
    fn test_only_high_severity_blocks() {
        assert!(Severity::High.is_blocking());
        assert!(!Severity::Medium.is_blocking());
        assert!(!Severity::Low.is_blocking());
    }
}
