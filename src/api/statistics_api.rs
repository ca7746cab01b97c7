// ==========================================
// PR 评审人分配服务 - 统计 API
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::Statistics;
use crate::perf::PerfGuard;
use crate::repository::{StatisticsRepository, UnitOfWork};

pub struct StatisticsApi {
    uow: UnitOfWork,
    repo: StatisticsRepository,
}

impl StatisticsApi {
    pub fn new(uow: UnitOfWork, repo: StatisticsRepository) -> Self {
        Self { uow, repo }
    }

    /// 全局统计快照（单个只读事务内采集）
    pub fn get_statistics(&self) -> ApiResult<Statistics> {
        let _perf = PerfGuard::new("get_statistics");
        self.uow
            .read(|tx| -> ApiResult<Statistics> { Ok(self.repo.collect(tx)?) })
    }
}
