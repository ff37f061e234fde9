//! # Oposita Pipeline
//!
//! 把试卷文档整理成可发布题库记录的流水线
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 基础设施层（Infrastructure / Clients）
//! - `infrastructure/` - 外部文档转换器，只暴露"转换"能力
//! - `clients/` - 外部题库，只暴露"读题干 / 插入"能力
//!
//! ### ② 业务能力层（Services / Knowledge）
//! - `services/` - 描述"我能做什么"，只处理单个文档或单道题
//! - `StructuralExtractor` - 三种版式解析 + 选择策略
//! - `AnswerResolver` - 知识库规则 → 兜底检查
//! - `QualityScorer` - 七维度加权评分
//! - `apply_fixes` - 机械修正
//! - `DuplicateDetector` - Jaccard 查重
//! - `knowledge/` - 只读知识库（启动时加载一次）
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一道题"的完整处理流程
//! - `QuestionCtx` - 上下文封装（文档 + 题目索引）
//! - `QuestionFlow` - 流程编排（resolve → score → fix → 分流）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 按阶段批量处理，管理并发
//! - `orchestrator/document_processor` - 单个文档处理器，读写阶段文件
//! - `orchestrator/publisher` - 串行查重与发布
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod knowledge;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use knowledge::KnowledgeBase;
pub use models::question::Question;
pub use orchestrator::{App, Stage};
pub use workflow::{QuestionCtx, QuestionFlow};
