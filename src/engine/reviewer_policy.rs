// ==========================================
// PR 评审人分配服务 - 评审人选择策略
// ==========================================
// 职责: 给定候选池与排除集合，决定评审人（纯决策逻辑，无 IO）
// 规则:
// - 仅活跃用户可被选中；排除集合内的用户不可选中
// - 候选人先按 user_id 排序再均匀随机无放回抽样，种子相同则结果相同
// - 创建时无候选返回空列表；替换时无候选返回 NoCandidate
// ==========================================

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

use crate::domain::{User, MAX_REVIEWERS};

/// 替换评审人时最多选择的人数
pub const REPLACEMENT_COUNT: usize = 1;

/// 替换选择结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplacementChoice {
    /// 选中的替换人
    Selected(String),
    /// 无可用候选人（由调用方决定失败还是移除 slot）
    NoCandidate,
}

// ==========================================
// RandomSource - 可注入的随机源
// ==========================================

/// 随机源
#[derive(Debug)]
pub enum RandomSource {
    /// 线程本地生成器（生产环境，无跨请求锁竞争）
    ThreadLocal,
    /// 固定种子（测试环境，结果可复现）
    Seeded(Mutex<StdRng>),
}

impl RandomSource {
    pub fn thread_local() -> Self {
        RandomSource::ThreadLocal
    }

    pub fn seeded(seed: u64) -> Self {
        RandomSource::Seeded(Mutex::new(StdRng::seed_from_u64(seed)))
    }

    /// 借出随机数生成器执行 f
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        match self {
            RandomSource::ThreadLocal => {
                let mut rng = rand::thread_rng();
                f(&mut rng)
            }
            RandomSource::Seeded(rng) => {
                // 毒化只说明其他线程 panic 过，生成器状态仍可用
                let mut guard = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                f(&mut *guard)
            }
        }
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::thread_local()
    }
}

// ==========================================
// ReviewerSelectionPolicy - 评审人选择策略
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct ReviewerSelectionPolicy;

impl ReviewerSelectionPolicy {
    pub fn new() -> Self {
        Self
    }

    /// 过滤出合格候选人：活跃、不在排除集合中、去重，按 user_id 排序
    fn eligible<'a>(pool: &'a [User], exclude: &HashSet<String>) -> Vec<&'a str> {
        pool.iter()
            .filter(|u| u.is_active && !exclude.contains(&u.user_id))
            .map(|u| u.user_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// 选择评审人
    ///
    /// # 参数
    /// - `pool`: 候选池（调用方已按团队过滤）
    /// - `exclude`: 排除集合（作者及已分配评审人）
    /// - `max_count`: 最多选择人数，超过 MAX_REVIEWERS 时按 MAX_REVIEWERS 处理
    /// - `rng`: 随机源
    ///
    /// # 返回
    /// - 有序评审人 ID 列表，可能为空
    pub fn select_reviewers(
        &self,
        pool: &[User],
        exclude: &HashSet<String>,
        max_count: usize,
        rng: &mut dyn RngCore,
    ) -> Vec<String> {
        let candidates = Self::eligible(pool, exclude);
        let amount = max_count.min(MAX_REVIEWERS);
        candidates
            .choose_multiple(rng, amount)
            .map(|id| id.to_string())
            .collect()
    }

    /// 选择一名替换评审人
    pub fn select_replacement(
        &self,
        pool: &[User],
        exclude: &HashSet<String>,
        rng: &mut dyn RngCore,
    ) -> ReplacementChoice {
        match self
            .select_reviewers(pool, exclude, REPLACEMENT_COUNT, rng)
            .into_iter()
            .next()
        {
            Some(id) => ReplacementChoice::Selected(id),
            None => ReplacementChoice::NoCandidate,
        }
    }
}
