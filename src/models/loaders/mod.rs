pub mod json_loader;

pub use json_loader::{
    list_stage_files, load_stage_file, load_stage_file_lenient, next_stage_name, safe_file_stem,
    save_json, LoadedRecord,
};
