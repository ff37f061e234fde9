//! 查重服务 - 业务能力层
//!
//! 小写后按空白切词，计算 Jaccard 相似度。
//! 比较池在一次发布中逐条累积，结果依赖处理顺序：先出现的保留。

use std::collections::HashSet;

/// 默认重复阈值
pub const DEFAULT_THRESHOLD: f64 = 0.90;

fn tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// 两个题干的 Jaccard 相似度
///
/// 任一方没有词时返回 0.0
pub fn jaccard(a: &str, b: &str) -> f64 {
    jaccard_sets(&tokens(a), &tokens(b))
}

fn jaccard_sets(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// 查重器
///
/// 只在一次发布内有效，不做持久缓存
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    pool: Vec<HashSet<String>>,
    threshold: f64,
}

impl DuplicateDetector {
    pub fn new(threshold: f64) -> Self {
        Self {
            pool: Vec::new(),
            threshold,
        }
    }

    /// 用题库中已有的题干初始化比较池
    pub fn with_existing<I, S>(threshold: f64, stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut detector = Self::new(threshold);
        for stem in stems {
            detector.add(stem.as_ref());
        }
        detector
    }

    pub fn add(&mut self, stem: &str) {
        self.pool.push(tokens(stem));
    }

    /// 是否与池中任一题干重复
    pub fn is_duplicate(&self, stem: &str) -> bool {
        let candidate = tokens(stem);
        self.pool
            .iter()
            .any(|existing| jaccard_sets(&candidate, existing) >= self.threshold)
    }

    /// 查重；不重复时加入比较池
    ///
    /// # 返回
    /// 返回是否重复
    pub fn check_and_add(&mut self, stem: &str) -> bool {
        if self.is_duplicate(stem) {
            return true;
        }
        self.add(stem);
        false
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
