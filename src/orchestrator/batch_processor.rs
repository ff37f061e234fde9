//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责按阶段批量处理文档和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志头、加载知识库、创建共享资源
//! 2. **批量加载**：扫描各阶段目录中的待处理文件
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将文档分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总所有文档的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单个文档的细节
//! - **结果有序**：按文件名顺序收集结果，发布阶段串行执行
//! - **向下委托**：委托 document_processor 处理单个文档，publisher 负责发布

use chrono::Local;
use futures::future::join_all;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::StoreBackend;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{scan_documents, DocumentConverter};
use crate::knowledge::KnowledgeBase;
use crate::models::loaders::{list_stage_files, save_json};
use crate::models::stage_file::ExtractionSummary;
use crate::orchestrator::document_processor::{
    self, PipelineContext, QuestionStats, DRAFT_SUFFIX, RAW_SUFFIX,
};
use crate::orchestrator::publisher::Publisher;
use crate::orchestrator::status::{self, SUMMARY_FILE};
use crate::services::{AnswerResolver, StructuralExtractor};
use crate::utils::logging::{
    init_log_file, log_batch_complete, log_batch_start, log_documents_loaded, log_startup,
    print_stage_summary,
};
use crate::workflow::QuestionFlow;

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Prepare,
    Resolve,
    Review,
    Publish,
    All,
    Status,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Prepare => "prepare",
            Stage::Resolve => "resolve",
            Stage::Review => "review",
            Stage::Publish => "publish",
            Stage::All => "all",
            Stage::Status => "status",
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    ctx: Arc<PipelineContext>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;

        let knowledge = KnowledgeBase::load(config.knowledge_file.as_deref().map(std::path::Path::new))
            .await?;
        let flow = QuestionFlow::new(&config, AnswerResolver::new(knowledge));

        let ctx = Arc::new(PipelineContext {
            config: config.clone(),
            extractor: StructuralExtractor::default(),
            converter: DocumentConverter::from_config(&config),
            flow,
        });

        Ok(Self { config, ctx })
    }

    /// 运行指定阶段
    pub async fn run(&self, stage: Stage) -> AppResult<()> {
        if stage != Stage::Status {
            init_log_file(&self.config.output_log_file, stage.name())?;
            log_startup(stage.name(), self.config.max_concurrent_documents);
        }

        match stage {
            Stage::Extract => self.run_extract().await.map(|_| ()),
            Stage::Prepare => self.run_prepare().await.map(|_| ()),
            Stage::Resolve => self.run_resolve().await.map(|_| ()),
            Stage::Review => self.run_review().await.map(|_| ()),
            Stage::Publish => self.run_publish().await,
            Stage::Status => {
                status::log_status(&status::collect_status(&self.config).await);
                Ok(())
            }
            Stage::All => {
                info!("开始时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
                self.run_extract().await?;
                self.run_prepare().await?;
                self.run_resolve().await?;
                self.run_review().await?;
                self.run_publish().await?;
                info!("结束时间: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
                status::log_status(&status::collect_status(&self.config).await);
                Ok(())
            }
        }
    }

    /// 抽取阶段：试卷目录 → raw/
    pub async fn run_extract(&self) -> AppResult<ExtractionSummary> {
        info!("📁 正在扫描试卷目录: {}", self.config.exams_dir);
        let documents = scan_documents(std::path::Path::new(&self.config.exams_dir)).await?;

        let mut summary = ExtractionSummary {
            extraction_date: Some(Local::now()),
            total_files_scanned: documents.len(),
            ..ExtractionSummary::default()
        };

        if documents.is_empty() {
            warn!("⚠️ 没有找到待处理的文档");
        } else {
            let results = self
                .process_all_documents(Stage::Extract, documents, document_processor::extract_document)
                .await?;
            for metadata in results.into_iter().flatten().flatten() {
                summary.record(&metadata);
            }
        }

        save_json(&self.config.raw_dir().join(SUMMARY_FILE), &summary).await?;
        print_stage_summary(
            Stage::Extract.name(),
            &[
                ("📄 扫描文件", summary.total_files_scanned),
                ("✅ 有题目的文件", summary.files_with_questions),
                ("📝 题目总数", summary.total_questions),
            ],
            &self.config.output_log_file,
        );
        Ok(summary)
    }

    /// 准备阶段：raw/ → draft/
    pub async fn run_prepare(&self) -> AppResult<QuestionStats> {
        let files = self.stage_inputs(self.config.raw_dir(), RAW_SUFFIX).await?;
        let stats = self
            .run_question_stage(Stage::Prepare, files, document_processor::prepare_document)
            .await?;
        print_stage_summary(
            Stage::Prepare.name(),
            &[("📝 草稿题目", stats.questions)],
            &self.config.output_log_file,
        );
        Ok(stats)
    }

    /// 解析阶段：draft/（原地更新）
    pub async fn run_resolve(&self) -> AppResult<QuestionStats> {
        let files = self.stage_inputs(self.config.draft_dir(), DRAFT_SUFFIX).await?;
        let stats = self
            .run_question_stage(Stage::Resolve, files, document_processor::resolve_document)
            .await?;
        print_stage_summary(
            Stage::Resolve.name(),
            &[
                ("📝 题目总数", stats.questions),
                ("✅ 已解析", stats.resolved),
                ("⚠️ 待复核", stats.unresolved),
            ],
            &self.config.output_log_file,
        );
        Ok(stats)
    }

    /// 审核阶段：draft/ → approved/ + rejected/
    pub async fn run_review(&self) -> AppResult<QuestionStats> {
        let files = self.stage_inputs(self.config.draft_dir(), DRAFT_SUFFIX).await?;
        if let Err(e) = self.ctx.flow.begin_review() {
            warn!("⚠️ 无法清空复核清单，本轮记录将逐条报错: {}", e);
        }
        let stats = self
            .run_question_stage(Stage::Review, files, document_processor::review_document)
            .await?;
        print_stage_summary(
            Stage::Review.name(),
            &[
                ("📝 题目总数", stats.questions),
                ("✅ 自动通过", stats.approved),
                ("🔧 自动修正", stats.corrected),
                ("👤 人工处理", stats.rejected),
            ],
            &self.config.output_log_file,
        );
        Ok(stats)
    }

    /// 发布阶段：approved/ → 题库
    pub async fn run_publish(&self) -> AppResult<()> {
        let approved_dir = self.config.approved_dir();
        if !approved_dir.exists() {
            warn!("⚠️ 没有 approved/ 目录，跳过发布");
            return Ok(());
        }

        let store = StoreBackend::from_config(&self.config);
        info!("📦 题库: {}", store.describe());
        let publisher = Publisher::new(store, approved_dir, self.config.duplicate_threshold);

        if let Some(batch) = publisher.publish().await? {
            print_stage_summary(
                Stage::Publish.name(),
                &[
                    ("📝 候选题目", batch.total_questions),
                    ("📤 已发布", batch.to_insert_count),
                    ("🔁 重复", batch.duplicates_count),
                    ("❌ 失败", batch.failed_count),
                ],
                &self.config.output_log_file,
            );
        }
        Ok(())
    }

    /// 列出阶段输入文件；目录不存在视为没有输入
    async fn stage_inputs(&self, dir: PathBuf, suffix: &str) -> AppResult<Vec<PathBuf>> {
        if !dir.exists() {
            warn!("⚠️ 目录不存在: {}", dir.display());
            return Ok(Vec::new());
        }
        let files = list_stage_files(&dir, suffix).await?;
        if files.is_empty() {
            warn!("⚠️ 没有找到待处理的 *{} 文件", suffix);
        }
        Ok(files)
    }

    /// 逐文档执行并汇总题目统计
    async fn run_question_stage<F, Fut>(
        &self,
        stage: Stage,
        files: Vec<PathBuf>,
        task: F,
    ) -> AppResult<QuestionStats>
    where
        F: Fn(Arc<PipelineContext>, PathBuf, usize) -> Fut + Copy + Send + 'static,
        Fut: Future<Output = AppResult<QuestionStats>> + Send + 'static,
    {
        let mut total = QuestionStats::default();
        if files.is_empty() {
            return Ok(total);
        }
        for stats in self.process_all_documents(stage, files, task).await?.into_iter().flatten() {
            total.absorb(&stats);
        }
        Ok(total)
    }

    /// 分批并发处理所有文档
    ///
    /// # 返回
    /// 与输入顺序一致的结果；失败的文档为 None
    async fn process_all_documents<T, F, Fut>(
        &self,
        stage: Stage,
        documents: Vec<PathBuf>,
        task: F,
    ) -> AppResult<Vec<Option<T>>>
    where
        T: Send + 'static,
        F: Fn(Arc<PipelineContext>, PathBuf, usize) -> Fut + Copy + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let max_concurrent = self.config.max_concurrent_documents;
        let semaphore = Arc::new(Semaphore::new(max_concurrent));
        let total = documents.len();
        log_documents_loaded(stage.name(), total, max_concurrent);

        let mut results = Vec::with_capacity(total);
        let total_batches = total.div_ceil(max_concurrent);

        // 分批处理
        for (batch_idx, batch) in documents.chunks(max_concurrent).enumerate() {
            let batch_start = batch_idx * max_concurrent;
            let batch_num = batch_idx + 1;
            log_batch_start(
                stage.name(),
                batch_num,
                total_batches,
                (batch_start + 1, batch_start + batch.len()),
                total,
            );

            let batch_results = self
                .process_batch(batch, batch_start, semaphore.clone(), task)
                .await?;
            let success = batch_results.iter().filter(|r| r.is_some()).count();
            log_batch_complete(stage.name(), batch_num, success, batch.len());

            results.extend(batch_results);
        }

        Ok(results)
    }

    /// 处理单个批次
    async fn process_batch<T, F, Fut>(
        &self,
        batch: &[PathBuf],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
        task: F,
    ) -> AppResult<Vec<Option<T>>>
    where
        T: Send + 'static,
        F: Fn(Arc<PipelineContext>, PathBuf, usize) -> Fut + Copy + Send + 'static,
        Fut: Future<Output = AppResult<T>> + Send + 'static,
    {
        let mut handles = Vec::new();

        // 为本批创建并发任务
        for (idx, path) in batch.iter().enumerate() {
            let document_index = batch_start + idx + 1;
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Other(e.to_string()))?;
            let ctx = self.ctx.clone();
            let path = path.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                task(ctx, path, document_index).await
            });
            handles.push((document_index, handle));
        }

        // 等待本批所有任务完成（join_all 保持提交顺序）
        let (indices, handles): (Vec<usize>, Vec<_>) = handles.into_iter().unzip();
        let mut results = Vec::with_capacity(handles.len());
        for (document_index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(value)) => results.push(Some(value)),
                Ok(Err(e)) => {
                    error!("[文档 {}] ❌ 处理过程中发生错误: {}", document_index, e);
                    results.push(None);
                }
                Err(e) => {
                    error!("[文档 {}] 任务执行失败: {}", document_index, e);
                    results.push(None);
                }
            }
        }

        Ok(results)
    }
}
