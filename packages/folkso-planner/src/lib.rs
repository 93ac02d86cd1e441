pub mod builder;
pub mod cardinality;
pub mod strategy;

pub use builder::{TagPredicate, apply_tag_filter};
pub use cardinality::{CardinalityKey, CardinalitySource, FixedCardinalities};
pub use strategy::{Strategy, StrategyChoice, StrategyPlanner};
