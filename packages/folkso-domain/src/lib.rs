pub mod source;
pub mod tag_match;
pub mod tags;

pub use source::{ContentSource, ParseSourceError};
pub use tag_match::TagMatch;
pub use tags::{dedup_preserving_order, normalize_slug};
