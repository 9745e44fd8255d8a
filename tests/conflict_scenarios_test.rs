// ==========================================
// 冲突检测场景测试
// ==========================================
// 职责: 校验 / 提交 / 空闲时段搜索在真实 SQLite 上的行为
// ==========================================


#[cfg(test)]
mod conflict_scenarios_test {
    use crate::test_helpers::*;
    use chrono::Duration;
    use pass_scheduler::config::SchedulerConfig;
    use pass_scheduler::domain::{ConflictType, PassRequest, PassStatus, Severity};

    // ==========================================
    // 地面站冲突
    // ==========================================

    #[test]
    fn test_same_station_overlap_is_rejected() {
        let env = setup_env();
        let existing = env
            .engine
            .validate_and_commit(&request(ISS, "GS1", 0, 10))
            .unwrap();
        assert!(existing.is_committed());

        let result = env.engine.validate(&request(ISS, "GS1", 5, 15)).unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.high_severity_count, 1);
        let station: Vec<_> = result
            .conflicts_of(ConflictType::GroundStationConflict)
            .collect();
        assert_eq!(station.len(), 1);
        assert_eq!(station[0].severity, Severity::High);
        assert_eq!(station[0].conflicting_pass_id, existing.pass_id);

        println!("✅ GS1 重叠被拒绝");
    }

    #[test]
    fn test_other_station_is_valid() {
        let env = setup_env();
        env.engine
            .validate_and_commit(&request(ISS, "GS1", 0, 10))
            .unwrap();

        let result = env.engine.validate(&request(ISS, "GS2", 5, 15)).unwrap();
        assert!(result.is_valid);
        assert_eq!(result.high_severity_count, 0);
    }

    #[test]
    fn test_touching_windows_are_not_station_conflict() {
        let env = setup_env();
        env.engine
            .validate_and_commit(&request(ISS, "GS1", 0, 30))
            .unwrap();

        let outcome = env
            .engine
            .validate_and_commit(&request(NOAA_20, "GS1", 30, 60))
            .unwrap();
        assert!(outcome.is_committed());
        assert_eq!(
            outcome
                .validation
                .conflicts_of(ConflictType::GroundStationConflict)
                .count(),
            0
        );
    }

    #[test]
    fn test_same_satellite_two_stations_allowed() {
        let env = setup_env();
        let a = env
            .engine
            .validate_and_commit(&request(ISS, "GS1", 0, 30))
            .unwrap();
        let b = env
            .engine
            .validate_and_commit(&request(ISS, "GS2", 15, 45))
            .unwrap();
        assert!(a.is_committed());
        assert!(b.is_committed());
    }

    // ==========================================
    // 前置检查
    // ==========================================

    #[test]
    fn test_empty_window_rejected_before_index() {
        let env = setup_env();
        let outcome = env
            .engine
            .validate_and_commit(&request(ISS, "GS1", 10, 10))
            .unwrap();

        assert!(!outcome.is_committed());
        assert_eq!(outcome.validation.total_conflicts, 1);
        let conflict = &outcome.validation.conflicts[0];
        assert_eq!(conflict.conflict_type, ConflictType::TemporalOverlap);
        assert_eq!(conflict.severity, Severity::High);
        assert!(conflict.conflicting_pass_id.is_none());
        assert_eq!(env.pass_repo.count().unwrap(), 0);
    }

    #[test]
    fn test_start_not_in_future_rejected() {
        let env = setup_env();
        let now = clock_now();
        let outcome = env
            .engine
            .validate_and_commit(&PassRequest::new(ISS, "GS1", now, now + Duration::minutes(10)))
            .unwrap();
        assert!(!outcome.is_committed());
        assert_eq!(
            outcome.validation.conflicts[0].conflict_type,
            ConflictType::TemporalOverlap
        );

        env.clock.set(at(20));
        let late = env.engine.validate(&request(ISS, "GS1", 10, 30)).unwrap();
        assert!(!late.is_valid);
    }

    #[test]
    fn test_unknown_satellite_rejected() {
        let env = setup_env();
        let result = env.engine.validate(&request(11111, "GS1", 0, 10)).unwrap();
        assert!(!result.is_valid);
        assert_eq!(
            result.conflicts[0].conflict_type,
            ConflictType::SatelliteAccessConflict
        );
    }

    // ==========================================
    // 最小间隔
    // ==========================================

    #[test]
    fn test_separation_violation_is_advisory() {
        let env = setup_env();
        env.engine
            .validate_and_commit(&request(ISS, "GS1", 0, 5))
            .unwrap();

        // 不同地面站、开始相差 7 分钟
        let outcome = env
            .engine
            .validate_and_commit(&request(NOAA_20, "GS2", 7, 20))
            .unwrap();
        assert!(outcome.is_committed());
        assert_eq!(outcome.validation.total_conflicts, 1);
        assert_eq!(
            outcome.validation.conflicts[0].conflict_type,
            ConflictType::MinimumSeparationViolation
        );
        assert_eq!(outcome.validation.conflicts[0].severity, Severity::Medium);
    }

    #[test]
    fn test_separation_exactly_at_buffer_is_clean() {
        let env = setup_env();
        env.engine
            .validate_and_commit(&request(ISS, "GS1", 0, 5))
            .unwrap();
        let result = env.engine.validate(&request(NOAA_20, "GS2", 10, 20)).unwrap();
        assert!(!result.has_conflicts());
    }

    // ==========================================
    // 建议时间与空闲时段
    // ==========================================

    #[test]
    fn test_rejection_carries_suggested_time() {
        let env = setup_env();
        env.engine
            .validate_and_commit(&request(ISS, "GS1", 0, 30))
            .unwrap();

        let result = env.engine.validate(&request(NOAA_20, "GS1", 10, 40)).unwrap();
        assert!(!result.is_valid);
        let station = result
            .conflicts_of(ConflictType::GroundStationConflict)
            .next()
            .unwrap();
        // 10 被占用，40 起的 30 分钟空闲
        assert_eq!(station.suggested_time, Some(at(40)));
    }

    #[test]
    fn test_suggestion_can_be_disabled() {
        let env = setup_env_with_config(SchedulerConfig {
            suggest_alternatives: false,
            ..SchedulerConfig::default()
        });
        env.engine
            .validate_and_commit(&request(ISS, "GS1", 0, 30))
            .unwrap();
        let result = env.engine.validate(&request(NOAA_20, "GS1", 10, 40)).unwrap();
        assert!(result.conflicts.iter().all(|c| c.suggested_time.is_none()));
    }

    #[test]
    fn test_slot_finder_two_steps_reach_third_block() {
        let env = setup_env_with_config(SchedulerConfig {
            slot_max_steps: 2,
            ..SchedulerConfig::default()
        });
        env.seed_pass(&request(ISS, "GS1", 0, 30));
        env.seed_pass(&request(ISS, "GS1", 30, 60));

        let slot = env.engine.find_slot(&request(NOAA_20, "GS1", 0, 30)).unwrap();
        assert_eq!(slot, Some(at(60)));
    }

    #[test]
    fn test_slot_finder_one_step_exhausts() {
        let env = setup_env_with_config(SchedulerConfig {
            slot_max_steps: 1,
            ..SchedulerConfig::default()
        });
        env.seed_pass(&request(ISS, "GS1", 0, 30));
        env.seed_pass(&request(ISS, "GS1", 30, 60));

        let slot = env.engine.find_slot(&request(NOAA_20, "GS1", 0, 30)).unwrap();
        assert_eq!(slot, None);
    }

    // ==========================================
    // 管理操作
    // ==========================================

    #[test]
    fn test_delete_frees_station() {
        let env = setup_env();
        let first = env
            .engine
            .validate_and_commit(&request(ISS, "GS1", 0, 30))
            .unwrap()
            .pass_id
            .unwrap();
        assert!(!env.engine.validate(&request(NOAA_20, "GS1", 10, 20)).unwrap().is_valid);

        env.engine.delete_pass(first).unwrap();
        assert!(env.engine.validate(&request(NOAA_20, "GS1", 10, 20)).unwrap().is_valid);
        assert!(env.pass_repo.count().unwrap() == 0);
        assert!(env.engine.delete_pass(first).is_err());
    }

    #[test]
    fn test_status_change_persists() {
        let env = setup_env();
        let id = env
            .engine
            .validate_and_commit(&request(ISS, "GS1", 0, 30))
            .unwrap()
            .pass_id
            .unwrap();

        let updated = env.engine.update_status(id, PassStatus::Active).unwrap();
        assert_eq!(updated.status, PassStatus::Active);

        let reopened = env.reopen_engine();
        assert_eq!(
            reopened.find_pass(id).unwrap().unwrap().status,
            PassStatus::Active
        );
    }

    #[test]
    fn test_statistics() {
        let env = setup_env();
        env.engine
            .validate_and_commit(&request(ISS, "GS1", 0, 10))
            .unwrap();
        env.engine
            .validate_and_commit(&request(ISS, "GS2", 0, 10))
            .unwrap();
        // 超出 24 小时窗口
        env.engine
            .validate_and_commit(&request(NOAA_20, "GS2", 24 * 60, 24 * 60 + 10))
            .unwrap();

        let stats = env.engine.statistics().unwrap();
        assert_eq!(stats.total_passes, 3);
        assert_eq!(stats.passes_by_status[&PassStatus::Scheduled], 3);
        assert_eq!(stats.passes_by_status[&PassStatus::Completed], 0);
        assert_eq!(stats.passes_by_station["GS2"], 2);
        assert_eq!(stats.upcoming_passes, 2);
        assert_eq!(stats.generated_at, clock_now());
    }
}
