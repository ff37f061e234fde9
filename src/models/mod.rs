pub mod evaluation;
pub mod loaders;
pub mod publication;
pub mod question;
pub mod raw_block;
pub mod stage_file;
pub mod subject;

pub use evaluation::{Dimension, EvaluationResult, ReviewStatus};
pub use loaders::{list_stage_files, load_stage_file, load_stage_file_lenient, save_json, LoadedRecord};
pub use publication::{PublicationCandidate, PublicationRecord, ValidationStatus};
pub use question::{AnswerOption, Difficulty, DifficultyLabel, OriginType, Question};
pub use raw_block::{BlockFormat, Provenance, RawBlock};
pub use stage_file::{
    ExtractionSummary, PublicationBatch, RejectedEntry, ReviewedQuestion, StageFile, StageMetadata,
    StageStatus,
};
pub use subject::{Category, SubjectArea};
