mod bucket;
mod comparison;
mod config;
mod equals;
mod equals_comparison;
mod factory;
mod indexer;
mod joiner;
mod node;
mod none;
mod properties;
mod range;

#[cfg(test)]
mod tests;

pub use bucket::Bucket;
pub use comparison::ComparisonIndexer;
pub use config::IndexerConfig;
pub use equals::EqualsIndexer;
pub use equals_comparison::EqualsComparisonIndexer;
pub use factory::IndexerFactory;
pub use indexer::{Indexer, IndexerKind};
pub use joiner::JoinerType;
pub use node::{IndexLevel, IndexerNode, IndexerPlan, RangeBound, RangeSpec};
pub use none::NoneIndexer;
pub use properties::{IndexKey, IndexProperties};
pub use range::RangeIndexer;
