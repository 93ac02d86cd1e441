pub mod content;
pub mod db;
pub mod models;
pub mod schema;
pub mod tag_stats;
pub mod tags;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
