pub mod envelope;
pub mod extract;
pub mod fetch;
pub mod types;

pub use envelope::{strip_envelope, EnvelopeError};
pub use extract::{extract_table, weighted_mask};
pub use fetch::{HttpSheetSource, SheetSource};
pub use types::{CellValue, Locator, SheetSpec, Table};
