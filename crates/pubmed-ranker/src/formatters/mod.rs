//! Output formatters for CSV, Markdown and JSON.

mod csv;
mod json;
mod markdown;

pub use self::csv::*;
pub use self::json::*;
pub use self::markdown::*;
