pub mod types;
pub mod write;

pub use types::CacheDocument;
pub use write::{write_cache, write_document};
