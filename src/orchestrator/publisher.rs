//! 发布器 - 编排层
//!
//! 查重必须串行并按固定顺序（文件名顺序 → 文件内顺序）进行，
//! 因此发布阶段不做并发。

use chrono::Local;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::clients::QuestionStore;
use crate::error::AppResult;
use crate::models::loaders::{list_stage_files, load_stage_file_lenient, save_json, LoadedRecord};
use crate::models::publication::{PublicationCandidate, PublicationRecord};
use crate::models::stage_file::{FailedInsert, PublicationBatch, ReviewedQuestion};
use crate::orchestrator::document_processor::APPROVED_SUFFIX;
use crate::services::DuplicateDetector;

/// 给记录打上重复标记
///
/// 比较池在遍历过程中累积：不重复的记录会加入池中参与后续比较
pub fn mark_duplicates(
    records: Vec<PublicationRecord>,
    detector: &mut DuplicateDetector,
) -> Vec<PublicationCandidate> {
    records
        .into_iter()
        .map(|record| {
            let duplicate = detector.check_and_add(&record.stem);
            PublicationCandidate { record, duplicate }
        })
        .collect()
}

/// 发布器
pub struct Publisher<S: QuestionStore> {
    store: S,
    approved_dir: PathBuf,
    threshold: f64,
}

impl<S: QuestionStore> Publisher<S> {
    pub fn new(store: S, approved_dir: PathBuf, threshold: f64) -> Self {
        Self {
            store,
            approved_dir,
            threshold,
        }
    }

    /// 按文件名顺序加载所有审核通过的题目
    async fn load_approved(&self) -> AppResult<Vec<ReviewedQuestion>> {
        let mut all = Vec::new();
        for path in list_stage_files(&self.approved_dir, APPROVED_SUFFIX).await? {
            let (_, records) = load_stage_file_lenient::<ReviewedQuestion>(&path).await?;
            for record in records {
                match record {
                    LoadedRecord::Valid { record, .. } => all.push(record),
                    LoadedRecord::Malformed { error, .. } => {
                        warn!("⚠️ 跳过无法解析的记录 {}: {}", path.display(), error)
                    }
                }
            }
        }
        Ok(all)
    }

    /// 发布所有审核通过的题目
    ///
    /// # 返回
    /// 本次发布报告；没有待发布题目时返回 None
    pub async fn publish(&self) -> AppResult<Option<PublicationBatch>> {
        let approved = self.load_approved().await?;
        if approved.is_empty() {
            info!("没有待发布的题目");
            return Ok(None);
        }
        info!("✓ 找到 {} 道审核通过的题目", approved.len());

        let existing = match self.store.existing_stems().await {
            Ok(stems) => stems,
            Err(e) => {
                warn!("⚠️ 无法读取已有题目，仅在本批内查重: {}", e);
                Vec::new()
            }
        };
        let mut detector = DuplicateDetector::with_existing(self.threshold, existing);

        let records: Vec<PublicationRecord> = approved
            .iter()
            .map(|r| PublicationRecord::from_question(&r.question, r.evaluation.status))
            .collect();
        let total = records.len();
        let candidates = mark_duplicates(records, &mut detector);

        let mut to_insert = Vec::new();
        let mut duplicates = Vec::new();
        let mut failed = Vec::new();

        for candidate in candidates {
            if candidate.duplicate {
                duplicates.push(candidate.record);
                continue;
            }
            match self.store.insert(&candidate.record).await {
                Ok(()) => to_insert.push(candidate.record),
                Err(e) => {
                    warn!("⚠️ 插入失败: {}", e);
                    failed.push(FailedInsert {
                        question: candidate.record,
                        reason: e.to_string(),
                    });
                }
            }
        }

        let generated_at = Local::now();
        let batch = PublicationBatch {
            generated_at,
            total_questions: total,
            to_insert_count: to_insert.len(),
            duplicates_count: duplicates.len(),
            failed_count: failed.len(),
            to_insert,
            duplicates,
            failed,
        };

        let batch_file = self.approved_dir.join(format!(
            "_publication_batch_{}.json",
            generated_at.format("%Y%m%d_%H%M%S")
        ));
        save_json(&batch_file, &batch).await?;

        log_publication(&batch);
        info!("发布报告已保存: {}", batch_file.display());
        Ok(Some(batch))
    }
}

// ========== 日志辅助函数 ==========

fn log_publication(batch: &PublicationBatch) {
    info!("📤 已发布: {}", batch.to_insert_count);
    info!("🔁 重复: {}", batch.duplicates_count);
    info!("❌ 失败: {}", batch.failed_count);

    let mut by_topic: BTreeMap<u32, usize> = BTreeMap::new();
    for record in &batch.to_insert {
        *by_topic.entry(record.topic).or_default() += 1;
    }
    info!("按主题分布:");
    for (topic, count) in by_topic {
        info!("  主题 {}: {} 道题", topic, count);
    }
}
