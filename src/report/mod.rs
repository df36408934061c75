//! Output of inferred connections
//!
//! # Submodules
//! - `markdown` - Markdown connection report
//! - `json` - JSON export
//! - `exclusions` - User exclusion rules applied after inference
//! - `summary` - Connection statistics

mod exclusions;
mod json;
mod markdown;
mod summary;

pub use exclusions::{load_exclusions, ExcludedConnection, ExcludedPin, ExclusionRules};
pub use json::{to_json, write_json};
pub use markdown::{markdown_report, write_markdown};
pub use summary::Summary;
