//! ## Crate layout
//! - `core`: indexers, the interval tree, the join node, values, errors and
//!   observability.
//!
//! The `prelude` module mirrors the surface used by stream evaluators.

pub use joindex_core as core;

pub use joindex_core::error::InternalError as Error;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        index::{Indexer as _, IndexerConfig, IndexerFactory, IndexProperties, JoinerType},
        interval::{Interval, IntervalTree},
        join::{BiJoinNode, JoinEvent},
        value::IndexValue,
    };
}
