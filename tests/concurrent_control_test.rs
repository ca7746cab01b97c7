// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证并发写入同一 PR 时不丢失更新、不破坏评审人不变量
// ==========================================


#[cfg(test)]
mod concurrent_control_test {
    use pr_reviewer_service::api::ApiError;
    use pr_reviewer_service::domain::PrStatus;
    use pr_reviewer_service::engine::{AssignmentEngine, EngineError};
    use pr_reviewer_service::repository::{
        PullRequestRepository, PullRequestStore, RepositoryError, UnitOfWork,
    };
    use std::sync::{Arc, Barrier};
    use std::thread;

    use crate::test_helpers::{
        assert_pr_invariants, build_engine, create_test_db, load_pr, seed_pull_request, seed_team,
    };

    /// 并发执行同一操作，返回每个线程的结果
    fn run_concurrently<T, F>(
        engine: Arc<AssignmentEngine>,
        threads: usize,
        op: F,
    ) -> Vec<Result<T, EngineError>>
    where
        T: Send + 'static,
        F: Fn(&AssignmentEngine, usize) -> Result<T, EngineError> + Send + Sync + 'static,
    {
        let barrier = Arc::new(Barrier::new(threads));
        let op = Arc::new(op);
        let mut handles = vec![];

        for i in 0..threads {
            let engine = engine.clone();
            let barrier = barrier.clone();
            let op = op.clone();
            handles.push(thread::spawn(move || {
                barrier.wait();
                op(&engine, i)
            }));
        }

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    }

    #[test]
    fn test_concurrent_reassign_of_same_reviewer_succeeds_once() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(
            &db_path,
            "engineering",
            &[("A", true), ("B", true), ("C", true), ("D", true), ("E", true), ("F", true)],
        );
        seed_pull_request(&db_path, "pr1", "A", &["B", "C"]);
        let engine = Arc::new(build_engine(&db_path, 42));

        let results = run_concurrently(engine, 4, |engine, _| engine.reassign_reviewer("pr1", "B"));

        let successes: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(successes.len(), 1, "同一 slot 只能被替换一次: {:?}", results);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.code(), Some("NOT_ASSIGNED"), "意外错误: {}", err);
        }

        let stored = load_pr(&db_path, "pr1");
        assert_eq!(stored.assigned_reviewers, successes[0].pull_request.assigned_reviewers);
        assert_eq!(stored.assigned_reviewers[1], "C");
        assert_eq!(stored.revision, 2);
        assert_pr_invariants(&stored);
    }

    #[test]
    fn test_concurrent_reassign_of_both_slots_keeps_invariants() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(
            &db_path,
            "engineering",
            &[("A", true), ("B", true), ("C", true), ("D", true), ("E", true)],
        );
        seed_pull_request(&db_path, "pr1", "A", &["B", "C"]);
        let engine = Arc::new(build_engine(&db_path, 7));

        let results = run_concurrently(engine, 2, |engine, i| {
            let old = if i == 0 { "B" } else { "C" };
            engine.reassign_reviewer("pr1", old)
        });

        // 串行化后的两次替换均应成功；若后者选中了前者换下的人也同样合法
        for result in &results {
            assert!(result.is_ok(), "替换失败: {:?}", result);
        }
        let stored = load_pr(&db_path, "pr1");
        assert_eq!(stored.assigned_reviewers.len(), 2);
        assert!(!stored.assigned_reviewers.contains(&"A".to_string()));
        assert_eq!(stored.revision, 3);
        assert_pr_invariants(&stored);
    }

    #[test]
    fn test_concurrent_create_with_same_id_yields_single_pr() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(&db_path, "engineering", &[("A", true), ("B", true), ("C", true)]);
        let engine = Arc::new(build_engine(&db_path, 3));

        let results = run_concurrently(engine, 4, |engine, i| {
            engine.create_pull_request("pr1", &format!("feat-{}", i), "A")
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert_eq!(err.code(), Some("PR_EXISTS"));
        }
        assert_pr_invariants(&load_pr(&db_path, "pr1"));
    }

    #[test]
    fn test_concurrent_merge_and_reassign_never_touch_merged_pr() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(&db_path, "engineering", &[("A", true), ("B", true), ("C", true), ("D", true)]);
        seed_pull_request(&db_path, "pr1", "A", &["B"]);
        let engine = Arc::new(build_engine(&db_path, 9));

        let results = run_concurrently(engine, 2, |engine, i| {
            if i == 0 {
                engine.merge_pull_request("pr1").map(|pr| pr.assigned_reviewers)
            } else {
                engine
                    .reassign_reviewer("pr1", "B")
                    .map(|r| r.pull_request.assigned_reviewers)
            }
        });

        let merged = results[0].as_ref().unwrap();
        let stored = load_pr(&db_path, "pr1");
        assert_eq!(stored.status, PrStatus::Merged);
        // 合并时看到的评审人即最终评审人
        assert_eq!(&stored.assigned_reviewers, merged);

        match &results[1] {
            Ok(reviewers) => assert_eq!(reviewers, merged),
            Err(err) => {
                assert_eq!(err.code(), Some("PR_MERGED"));
                assert_eq!(stored.assigned_reviewers, vec!["B"]);
            }
        }
        assert_pr_invariants(&stored);
    }

    #[test]
    fn test_stale_revision_update_is_rejected_as_not_found() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(&db_path, "engineering", &[("A", true), ("B", true), ("C", true)]);
        seed_pull_request(&db_path, "pr1", "A", &["B"]);

        let uow = UnitOfWork::new(db_path.as_str());
        let repo = PullRequestRepository::new();
        let mut first = load_pr(&db_path, "pr1");
        let mut stale = first.clone();

        first.replace_reviewer(0, "C".to_string());
        uow.run(|tx| repo.update(tx, &first)).unwrap();

        stale.mark_merged(chrono::Utc::now());
        let err: RepositoryError = uow.run(|tx| repo.update(tx, &stale)).unwrap_err();
        assert!(matches!(err, RepositoryError::OptimisticLockFailure { .. }));
        assert_eq!(ApiError::from(err).code(), "NOT_FOUND");

        // 落败的写入没有覆盖先行者
        let stored = load_pr(&db_path, "pr1");
        assert_eq!(stored.status, PrStatus::Open);
        assert_eq!(stored.assigned_reviewers, vec!["C"]);
    }
}
