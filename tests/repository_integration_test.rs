// ==========================================
// Repository 层集成测试
// ==========================================
// 职责: 过境/卫星仓储在真实 SQLite 上的 CRUD 与事务语义
// ==========================================


#[cfg(test)]
mod repository_integration_test {
    use crate::test_helpers::*;
    use pass_scheduler::domain::{PassStatus, Satellite, TimeWindow};
    use pass_scheduler::repository::{
        PassRepository, PassWriter, RepositoryError, SatelliteCatalog, SatelliteRepository,
        SqlitePassRepository,
    };

    fn open_repos(db_path: &str) -> (SqlitePassRepository, SatelliteRepository) {
        let passes = SqlitePassRepository::open(db_path).unwrap();
        let satellites = SatelliteRepository::open(db_path).unwrap();
        seed_satellites(&satellites);
        (passes, satellites)
    }

    #[test]
    fn test_insert_and_load_ordered() {
        let (_temp, db_path) = create_test_db().unwrap();
        let (repo, _) = open_repos(&db_path);

        let late = repo.insert(&request(ISS, "GS1", 60, 70), PassStatus::Scheduled).unwrap();
        let early = repo.insert(&request(ISS, "GS2", 0, 10), PassStatus::Active).unwrap();

        let all = repo.load_all().unwrap();
        assert_eq!(all.iter().map(|p| p.pass_id).collect::<Vec<_>>(), vec![early, late]);
        assert_eq!(all[0].status, PassStatus::Active);
        assert_eq!(all[0].start_time, at(0));
        assert_eq!(repo.count().unwrap(), 2);
        assert_eq!(repo.find_by_station("GS1").unwrap().len(), 1);
    }

    #[test]
    fn test_update_and_delete() {
        let (_temp, db_path) = create_test_db().unwrap();
        let (repo, _) = open_repos(&db_path);
        let id = repo.insert(&request(ISS, "GS1", 0, 10), PassStatus::Scheduled).unwrap();

        repo.update_window(id, &TimeWindow::new(at(100), at(110))).unwrap();
        repo.update_status(id, PassStatus::Completed).unwrap();
        let pass = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(pass.window(), TimeWindow::new(at(100), at(110)));
        assert_eq!(pass.status, PassStatus::Completed);

        repo.delete(id).unwrap();
        assert!(repo.find_by_id(id).unwrap().is_none());
        assert!(matches!(
            repo.delete(id),
            Err(RepositoryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let (_temp, db_path) = create_test_db().unwrap();
        let (repo, _) = open_repos(&db_path);
        let id = repo.insert(&request(ISS, "GS1", 0, 10), PassStatus::Scheduled).unwrap();

        let result = repo.within_transaction(&mut |writer: &mut dyn PassWriter| {
            writer.update_window(id, &TimeWindow::new(at(500), at(510)))?;
            writer.insert(&request(ISS, "GS2", 0, 10), PassStatus::Scheduled)?;
            Err(RepositoryError::TransactionAborted("test".to_string()))
        });

        assert!(matches!(result, Err(RepositoryError::TransactionAborted(_))));
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.find_by_id(id).unwrap().unwrap().start_time, at(0));
    }

    #[test]
    fn test_unknown_satellite_violates_foreign_key() {
        let (_temp, db_path) = create_test_db().unwrap();
        let (repo, _) = open_repos(&db_path);

        let result = repo.insert(&request(99999, "GS1", 0, 10), PassStatus::Scheduled);
        assert!(matches!(result, Err(RepositoryError::ForeignKeyViolation(_))));
    }

    #[test]
    fn test_satellite_upsert_and_catalog() {
        let (_temp, db_path) = create_test_db().unwrap();
        let satellites = SatelliteRepository::open(&db_path).unwrap();

        let sat = Satellite {
            norad_id: ISS,
            name: "ISS".to_string(),
            description: None,
        };
        assert!(satellites.upsert(&sat).unwrap());

        let renamed = Satellite {
            name: "ISS (ZARYA)".to_string(),
            description: Some("crewed".to_string()),
            ..sat
        };
        assert!(!satellites.upsert(&renamed).unwrap());

        assert_eq!(satellites.find_by_id(ISS).unwrap(), Some(renamed));
        assert!(satellites.exists(ISS).unwrap());
        assert!(!satellites.exists(NOAA_20).unwrap());
        assert_eq!(satellites.list().unwrap().len(), 1);
    }

    #[test]
    fn test_ping() {
        let (_temp, db_path) = create_test_db().unwrap();
        let (repo, _) = open_repos(&db_path);
        assert!(repo.ping().is_ok());
    }
}
