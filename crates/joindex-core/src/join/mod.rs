mod node;
mod state;


// re-exports
pub use node::BiJoinNode;
pub use state::TupleState;

///
/// JoinEvent
///
/// One settled change to the join output, emitted by `BiJoinNode::flush`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JoinEvent<'a, L, R> {
    Insert { left: &'a L, right: &'a R },
    Update { left: &'a L, right: &'a R },
    Retract { left: &'a L, right: &'a R },
}

impl<'a, L, R> JoinEvent<'a, L, R> {
    #[must_use]
    pub const fn pair(&self) -> (&'a L, &'a R) {
        match *self {
            Self::Insert { left, right }
            | Self::Update { left, right }
            | Self::Retract { left, right } => (left, right),
        }
    }
}
