pub mod store_client;

pub use store_client::{FileStore, QuestionStore, RestStore, StoreBackend};
