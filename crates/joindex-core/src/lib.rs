//! Core runtime for joindex: layered join indexers, the interval tree with
//! incremental cluster upkeep, the two-input join node, and observability.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod error;
pub mod index;
pub mod interval;
pub mod join;
pub mod obs;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, metrics or indexer internals are re-exported here.
///

pub mod prelude {
    pub use crate::{
        index::{Indexer, IndexerConfig, IndexerFactory, IndexProperties, JoinerType},
        interval::{Interval, IntervalTree},
        join::{BiJoinNode, JoinEvent},
        value::IndexValue,
    };
}
