pub mod cache;
pub mod config;
pub mod error;
pub mod run;
pub mod sheet;

pub use config::Config;
pub use error::SheetError;
