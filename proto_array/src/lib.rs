//! Array-based LMD GHOST block tree.
//!
//! Blocks are stored in a [`Vec`] in the order they are inserted. A block can only be inserted
//! after its parent, so every parent has a lower index than all of its children. Iterating over the
//! array backwards visits children before parents, which is what makes single-pass weight
//! propagation possible in [`ProtoArray::apply_score_changes`].
//!
//! Each node caches its best child and best descendant. The head is the best descendant of the
//! justified block, so [`ProtoArray::find_head`] does not have to walk the tree.
//!
//! Vote weights are applied as differences computed by [`compute_deltas`].
//! Proposer boost is applied the same way: the boost from the previous call is subtracted and the
//! new one is added, so the boost never accumulates in [`ProtoNode::weight`].
//!
//! See the [description] of the data structure by its author.
//!
//! [description]: https://github.com/protolambda/lmd-ghost/tree/242f0dced3b34feed0d4e9d2fd0e5e66e448c359#array-based-stateful-dag-proto_array

pub use crate::{
    error::Error,
    proposer_boost::{calculate_proposer_boost_score, ProposerBoost},
    proto_array::{BlockSummary, ProtoArray, ProtoNode},
    votes::{compute_deltas, VoteTracker},
};

mod error;
mod proposer_boost;
mod proto_array;
mod votes;
