pub mod converter;

pub use converter::{scan_documents, DocumentConverter};
