//! Options for reading, merging, and writing tags

mod global_config;
mod merge_options;
mod parse_options;
mod write_options;

pub use global_config::{EngineConfig, apply_global_config, global_config};
pub use merge_options::{MergeOptions, TagPriority};
pub use parse_options::{ParseOptions, ParsingMode};
pub use write_options::WriteOptions;
