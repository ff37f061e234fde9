//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责按阶段批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文档处理器
//! - 管理应用生命周期（初始化、运行）
//! - 扫描各阶段目录（Vec<PathBuf>）
//! - 控制并发数量（Semaphore）
//! - 输出全局统计信息
//!
//! ### `document_processor` - 单个文档处理器
//! - 遍历单个文档的所有题目（Vec<Question>）
//! - 复用共享的 QuestionFlow
//! - 读写阶段文件
//! - 输出单个文档的统计信息
//!
//! ### `publisher` - 发布器
//! - 串行查重（顺序固定，先出现者保留）
//! - 写入题库并生成发布报告
//!
//! ### `status` - 流水线状态
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Document>)
//!     ↓
//! document_processor (处理 Vec<Question>)        publisher (串行)
//!     ↓                                             ↓
//! workflow::QuestionFlow (处理单个 Question)     clients::QuestionStore
//!     ↓
//! services (能力层：extract / resolve / score / fix / dedup)
//!     ↓
//! infrastructure (基础设施：DocumentConverter)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，document_processor 管单个
//! 2. **资源隔离**：只有编排层持有转换器和题库客户端
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod batch_processor;
pub mod document_processor;
pub mod publisher;
pub mod status;

// 重新导出主要类型
pub use batch_processor::{App, Stage};
pub use document_processor::{PipelineContext, QuestionStats};
pub use publisher::{mark_duplicates, Publisher};
pub use status::{collect_status, PipelineStatus};
