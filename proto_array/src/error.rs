use thiserror::Error;
use types::phase0::primitives::H256;

/// Errors that indicate the block tree is in an inconsistent state.
///
/// None of them can be caused by invalid input from the network.
/// A [`ProtoArray`](crate::ProtoArray) that returned one of them should be discarded.
#[derive(Debug, Error)]
pub enum Error {
    #[error("best child index out of bounds: {index}")]
    InvalidBestChildIndex { index: usize },
    #[error("best descendant index out of bounds: {index}")]
    InvalidBestDescendantIndex { index: usize },
    #[error(
        "best node is not viable for head \
         (justified_root: {justified_root:?}, head_root: {head_root:?})"
    )]
    InvalidBestNode { justified_root: H256, head_root: H256 },
    #[error("deltas do not match nodes (deltas: {deltas}, nodes: {nodes})")]
    InvalidDeltaLength { deltas: usize, nodes: usize },
    #[error("justified index out of bounds: {index}")]
    InvalidJustifiedIndex { index: usize },
    #[error("node delta missing at index {index}")]
    InvalidNodeDelta { index: usize },
    #[error("node index out of bounds: {index}")]
    InvalidNodeIndex { index: usize },
    #[error("parent delta missing at index {index}")]
    InvalidParentDelta { index: usize },
    #[error("delta overflowed at index {index}")]
    DeltaOverflow { index: usize },
    #[error("weight of node at index {index} went out of range (weight: {weight}, delta: {delta})")]
    WeightOverflow { index: usize, weight: u64, delta: i64 },
    #[error("index {index} points below the pruning cutoff {finalized_index}")]
    IndexOverflow { index: usize, finalized_index: usize },
    #[error(
        "proposer boost score overflowed \
         (total_balance: {total_balance}, validator_count: {validator_count})"
    )]
    ProposerBoostOverflow { total_balance: u64, validator_count: u64 },
    #[error("justified block is not in the block tree: {root:?}")]
    JustifiedNodeUnknown { root: H256 },
    #[error("finalized block is not in the block tree: {root:?}")]
    FinalizedNodeUnknown { root: H256 },
}
