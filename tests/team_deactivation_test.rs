// ==========================================
// 团队批量停用测试
// ==========================================
// 职责: 验证批量停用、评审 slot 替换/移除、单 PR 失败隔离
// ==========================================


#[cfg(test)]
mod team_deactivation_test {
    use pr_reviewer_service::domain::{PrStatus, PullRequest, PullRequestShort, Team, User};
    use pr_reviewer_service::engine::{
        AssignmentEngine, AssignmentRepositories, RandomSource, ReviewerSelectionPolicy,
    };
    use pr_reviewer_service::repository::{
        DirectoryRepository, DirectoryStore, PullRequestRepository, PullRequestStore,
        RepositoryError, RepositoryResult, TxContext, UnitOfWork,
    };
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use crate::test_helpers::{
        assert_pr_invariants, build_engine, create_test_db, load_pr, load_user, seed_pull_request,
        seed_team,
    };

    // ==========================================
    // 测试替身
    // ==========================================

    /// 将指定团队的候选池替换为备用团队的活跃成员
    struct StandbyDirectory {
        inner: DirectoryRepository,
        team_name: &'static str,
        standby_team: &'static str,
    }

    impl DirectoryStore for StandbyDirectory {
        fn team_exists(&self, tx: &TxContext<'_>, team_name: &str) -> RepositoryResult<bool> {
            self.inner.team_exists(tx, team_name)
        }
        fn create_team(&self, tx: &TxContext<'_>, team: &Team) -> RepositoryResult<()> {
            self.inner.create_team(tx, team)
        }
        fn get_team(&self, tx: &TxContext<'_>, team_name: &str) -> RepositoryResult<Team> {
            self.inner.get_team(tx, team_name)
        }
        fn get_user(&self, tx: &TxContext<'_>, user_id: &str) -> RepositoryResult<User> {
            self.inner.get_user(tx, user_id)
        }
        fn get_users_by_team(
            &self,
            tx: &TxContext<'_>,
            team_name: &str,
        ) -> RepositoryResult<Vec<User>> {
            self.inner.get_users_by_team(tx, team_name)
        }
        fn get_active_users_by_team(
            &self,
            tx: &TxContext<'_>,
            team_name: &str,
        ) -> RepositoryResult<Vec<User>> {
            if team_name == self.team_name {
                self.inner.get_active_users_by_team(tx, self.standby_team)
            } else {
                self.inner.get_active_users_by_team(tx, team_name)
            }
        }
        fn upsert_users(&self, tx: &TxContext<'_>, users: &[User]) -> RepositoryResult<()> {
            self.inner.upsert_users(tx, users)
        }
        fn update_user(&self, tx: &TxContext<'_>, user: &User) -> RepositoryResult<()> {
            self.inner.update_user(tx, user)
        }
    }

    /// 对指定 PR 先真实写入再报错，模拟写到一半的存储故障
    struct FailingUpdateStore {
        inner: PullRequestRepository,
        failing_id: &'static str,
    }

    impl PullRequestStore for FailingUpdateStore {
        fn exists(&self, tx: &TxContext<'_>, id: &str) -> RepositoryResult<bool> {
            self.inner.exists(tx, id)
        }
        fn create(&self, tx: &TxContext<'_>, pr: &PullRequest) -> RepositoryResult<()> {
            self.inner.create(tx, pr)
        }
        fn update(&self, tx: &TxContext<'_>, pr: &PullRequest) -> RepositoryResult<i64> {
            let revision = self.inner.update(tx, pr)?;
            if pr.pull_request_id == self.failing_id {
                return Err(RepositoryError::DatabaseQueryError("disk I/O error".to_string()));
            }
            Ok(revision)
        }
        fn get_by_id(&self, tx: &TxContext<'_>, id: &str) -> RepositoryResult<Option<PullRequest>> {
            self.inner.get_by_id(tx, id)
        }
        fn get_open_by_reviewer(
            &self,
            tx: &TxContext<'_>,
            user_id: &str,
        ) -> RepositoryResult<Vec<PullRequest>> {
            self.inner.get_open_by_reviewer(tx, user_id)
        }
        fn list_by_reviewer(
            &self,
            tx: &TxContext<'_>,
            user_id: &str,
        ) -> RepositoryResult<Vec<PullRequestShort>> {
            self.inner.list_by_reviewer(tx, user_id)
        }
    }

    fn engine_with(
        db_path: &str,
        directory: Arc<dyn DirectoryStore>,
        pull_requests: Arc<dyn PullRequestStore>,
    ) -> AssignmentEngine {
        AssignmentEngine::new(
            AssignmentRepositories::new(UnitOfWork::new(db_path), directory, pull_requests),
            ReviewerSelectionPolicy::new(),
            RandomSource::seeded(17),
        )
    }

    // ==========================================
    // 基本流程
    // ==========================================

    #[test]
    fn test_deactivate_removes_slots_when_team_has_no_candidates() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(&db_path, "engineering", &[("A", true), ("B", true), ("C", true)]);
        seed_team(&db_path, "other", &[("X", true), ("Y", true)]);
        seed_pull_request(&db_path, "pr1", "A", &["B", "C"]);
        seed_pull_request(&db_path, "pr2", "X", &["Y"]);

        let engine = build_engine(&db_path, 1);
        let result = engine.deactivate_team_members("engineering").unwrap();

        assert_eq!(result.deactivated_count, 3);
        assert_eq!(result.user_ids, vec!["A", "B", "C"]);
        assert_eq!(result.reassigned_count, 1);
        assert_eq!(result.removed_slots, 2);
        assert!(result.skipped_pull_requests.is_empty());

        for id in ["A", "B", "C"] {
            assert!(!load_user(&db_path, id).is_active);
        }

        let pr1 = load_pr(&db_path, "pr1");
        assert!(pr1.assigned_reviewers.is_empty());
        assert_eq!(pr1.status, PrStatus::Open);
        assert_pr_invariants(&pr1);

        // 其他团队不受影响
        assert_eq!(load_pr(&db_path, "pr2").assigned_reviewers, vec!["Y"]);
        assert!(load_user(&db_path, "X").is_active);
    }

    #[test]
    fn test_deactivate_skips_merged_prs_and_inactive_users() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(&db_path, "engineering", &[("A", true), ("B", true), ("C", false)]);
        seed_pull_request(&db_path, "pr-merged", "A", &["B"]);
        let engine = build_engine(&db_path, 1);
        engine.merge_pull_request("pr-merged").unwrap();
        let merged_before = load_pr(&db_path, "pr-merged");

        let result = engine.deactivate_team_members("engineering").unwrap();
        assert_eq!(result.deactivated_count, 2);
        assert_eq!(result.user_ids, vec!["A", "B"]);
        assert_eq!(result.reassigned_count, 0);

        assert_eq!(load_pr(&db_path, "pr-merged"), merged_before);
    }

    #[test]
    fn test_deactivate_twice_is_noop() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(&db_path, "engineering", &[("A", true), ("B", true)]);
        let engine = build_engine(&db_path, 1);

        assert_eq!(engine.deactivate_team_members("engineering").unwrap().deactivated_count, 2);
        let second = engine.deactivate_team_members("engineering").unwrap();
        assert_eq!(second.deactivated_count, 0);
        assert!(second.user_ids.is_empty());
    }

    #[test]
    fn test_deactivate_unknown_team_is_not_found() {
        let (_tmp, db_path) = create_test_db().unwrap();
        let engine = build_engine(&db_path, 1);
        let err = engine.deactivate_team_members("ghost").unwrap_err();
        assert_eq!(err.code(), Some("NOT_FOUND"));
    }

    #[test]
    fn test_deactivate_small_team_within_100ms() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(&db_path, "engineering", &[("A", true), ("B", true), ("C", true)]);
        seed_pull_request(&db_path, "pr1", "A", &["B", "C"]);
        let engine = build_engine(&db_path, 1);

        let start = Instant::now();
        let result = engine.deactivate_team_members("engineering").unwrap();
        let elapsed = start.elapsed();

        assert_eq!(result.deactivated_count, 3);
        assert!(elapsed < Duration::from_millis(100), "批量停用耗时 {:?}", elapsed);
    }

    // ==========================================
    // 替换路径
    // ==========================================

    #[test]
    fn test_deactivate_replaces_reviewer_when_candidate_exists() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(&db_path, "engineering", &[("A", true), ("B", true), ("C", true)]);
        seed_team(&db_path, "standby", &[("S1", true)]);
        seed_pull_request(&db_path, "pr1", "A", &["B", "C"]);

        let directory = Arc::new(StandbyDirectory {
            inner: DirectoryRepository::new(),
            team_name: "engineering",
            standby_team: "standby",
        });
        let engine = engine_with(&db_path, directory, Arc::new(PullRequestRepository::new()));

        let result = engine.deactivate_team_members("engineering").unwrap();
        assert_eq!(result.reassigned_count, 1);
        // B 的 slot 由 S1 接替；C 处理时 S1 已是评审人，无候选人只能移除
        assert_eq!(result.removed_slots, 1);

        let pr1 = load_pr(&db_path, "pr1");
        assert_eq!(pr1.assigned_reviewers, vec!["S1"]);
        assert_pr_invariants(&pr1);
    }

    // ==========================================
    // 单 PR 失败隔离
    // ==========================================

    #[test]
    fn test_store_failure_on_one_pr_is_skipped_and_rolled_back() {
        let (_tmp, db_path) = create_test_db().unwrap();
        seed_team(&db_path, "engineering", &[("A", true), ("B", true)]);
        seed_pull_request(&db_path, "pr-bad", "A", &["B"]);
        seed_pull_request(&db_path, "pr-good", "A", &["B"]);
        let bad_before = load_pr(&db_path, "pr-bad");

        let store = Arc::new(FailingUpdateStore {
            inner: PullRequestRepository::new(),
            failing_id: "pr-bad",
        });
        let engine = engine_with(&db_path, Arc::new(DirectoryRepository::new()), store);

        let result = engine.deactivate_team_members("engineering").unwrap();
        assert_eq!(result.deactivated_count, 2);
        assert_eq!(result.reassigned_count, 1);
        assert_eq!(result.skipped_pull_requests, vec!["pr-bad"]);

        // 失败 PR 的半写入被保存点回滚，保持原评审人与 revision
        assert_eq!(load_pr(&db_path, "pr-bad"), bad_before);
        // 其余修改正常提交
        assert!(load_pr(&db_path, "pr-good").assigned_reviewers.is_empty());
        assert!(!load_user(&db_path, "B").is_active);
    }
}
