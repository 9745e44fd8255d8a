// ==========================================
// 卫星过境排程系统 - 排程事件发布
// ==========================================
// 职责: 定义事件发布 trait，实现依赖倒置
// 说明: 引擎只依赖 trait，通知方式由调用方实现
// 红线: 发布失败只记录日志，不回滚已提交的变更
// ==========================================

use crate::domain::types::PassId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::sync::Arc;

// ==========================================
// 排程事件类型
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassEventType {
    /// 新过境已登记
    PassCommitted,
    /// 过境被优化重排
    PassRescheduled,
    /// 过境已删除
    PassDeleted,
    /// 过境状态变更
    PassStatusChanged,
    /// 一次优化完成
    ScheduleOptimized,
}

impl PassEventType {
    pub fn as_str(&self) -> &str {
        match self {
            PassEventType::PassCommitted => "PassCommitted",
            PassEventType::PassRescheduled => "PassRescheduled",
            PassEventType::PassDeleted => "PassDeleted",
            PassEventType::PassStatusChanged => "PassStatusChanged",
            PassEventType::ScheduleOptimized => "ScheduleOptimized",
        }
    }
}

/// 排程事件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassEvent {
    pub event_type: PassEventType,
    /// 相关过境（整体事件为 None）
    pub pass_id: Option<PassId>,
    pub ground_station: Option<String>,
    /// 事件来源描述
    pub source: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

impl PassEvent {
    /// 单条过境事件
    pub fn for_pass(
        event_type: PassEventType,
        pass_id: PassId,
        ground_station: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type,
            pass_id: Some(pass_id),
            ground_station: Some(ground_station.into()),
            source: None,
            occurred_at,
        }
    }

    /// 整体事件
    pub fn schedule_wide(event_type: PassEventType, source: Option<String>, occurred_at: DateTime<Utc>) -> Self {
        Self {
            event_type,
            pass_id: None,
            ground_station: None,
            source,
            occurred_at,
        }
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 排程事件发布者
///
/// # 返回
/// - `Ok(id)`: 下游分配的ID（如果支持）或空字符串
/// - `Err`: 发布失败
pub trait PassEventPublisher: Send + Sync {
    fn publish(&self, event: PassEvent) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// 空操作事件发布者
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

impl PassEventPublisher for NoOpEventPublisher {
    fn publish(&self, event: PassEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpEventPublisher: 跳过事件发布 - event_type={}, pass_id={:?}",
            event.event_type.as_str(),
            event.pass_id
        );
        Ok(String::new())
    }
}

/// 可选的事件发布者包装
///
/// 简化 Option<Arc<dyn PassEventPublisher>> 的使用
#[derive(Clone)]
pub struct OptionalEventPublisher {
    inner: Option<Arc<dyn PassEventPublisher>>,
}

impl OptionalEventPublisher {
    pub fn with_publisher(publisher: Arc<dyn PassEventPublisher>) -> Self {
        Self {
            inner: Some(publisher),
        }
    }

    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn publish(&self, event: PassEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
        match &self.inner {
            Some(publisher) => publisher.publish(event),
            None => Ok(String::new()),
        }
    }

    /// 发布并吞掉错误（仅记录警告）
    pub fn publish_logged(&self, event: PassEvent) {
        let event_type = event.event_type;
        let pass_id = event.pass_id;
        if let Err(e) = self.publish(event) {
            tracing::warn!(
                event_type = event_type.as_str(),
                pass_id = ?pass_id,
                "事件发布失败: {}",
                e
            );
        }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }
}

impl Default for OptionalEventPublisher {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collecting {
        events: Mutex<Vec<PassEvent>>,
    }

    impl PassEventPublisher for Collecting {
        fn publish(&self, event: PassEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
            self.events.lock().unwrap().push(event);
            Ok("ok".to_string())
        }
    }

    struct Failing;

    impl PassEventPublisher for Failing {
        fn publish(&self, _event: PassEvent) -> Result<String, Box<dyn Error + Send + Sync>> {
            Err("queue full".into())
        }
    }

    #[test]
    fn test_optional_publisher_none() {
        let publisher = OptionalEventPublisher::none();
        assert!(!publisher.is_configured());
        let event = PassEvent::schedule_wide(PassEventType::ScheduleOptimized, None, Utc::now());
        assert!(publisher.publish(event).unwrap().is_empty());
    }

    #[test]
    fn test_optional_publisher_forwards() {
        let sink = Arc::new(Collecting::default());
        let publisher = OptionalEventPublisher::with_publisher(sink.clone());
        publisher.publish_logged(PassEvent::for_pass(
            PassEventType::PassCommitted,
            7,
            "GS1",
            Utc::now(),
        ));

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].pass_id, Some(7));
        assert_eq!(events[0].event_type, PassEventType::PassCommitted);
    }

    #[test]
    fn test_publish_failure_is_swallowed() {
        let publisher = OptionalEventPublisher::with_publisher(Arc::new(Failing));
        let event = PassEvent::for_pass(PassEventType::PassDeleted, 1, "GS1", Utc::now());
        assert!(publisher.publish(event.clone()).is_err());
        publisher.publish_logged(event);
    }

    #[test]
    fn test_noop_publisher() {
        let event = PassEvent::for_pass(PassEventType::PassStatusChanged, 3, "GS2", Utc::now());
        assert!(NoOpEventPublisher.publish(event).unwrap().is_empty());
    }
}
