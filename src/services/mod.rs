pub mod auto_fixer;
pub mod draft_builder;
pub mod duplicate_detector;
pub mod extractor;
pub mod resolver;
pub mod review_writer;
pub mod scorer;
pub mod text_repair;

pub use auto_fixer::apply_fixes;
pub use draft_builder::{build_draft, estimate_difficulty, review_prompt};
pub use duplicate_detector::{jaccard, DuplicateDetector};
pub use extractor::{FormatExtractor, StructuralExtractor};
pub use resolver::{AnswerResolver, Resolution};
pub use review_writer::ReviewWriter;
pub use scorer::{QualityScorer, ScoreBand};
