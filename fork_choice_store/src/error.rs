use anyhow::Error as AnyhowError;
use thiserror::Error;
use types::phase0::primitives::{Epoch, Slot, H256};

/// Reasons for rejecting a block. The store is left unchanged when one of these is returned.
#[derive(Debug, Error)]
pub enum InvalidBlock {
    #[error("parent block is not in fork choice (parent_root: {parent_root:?})")]
    UnknownParent { parent_root: H256 },
    #[error("block is from a future slot (block_slot: {block_slot}, current_slot: {current_slot})")]
    FutureSlot { block_slot: Slot, current_slot: Slot },
    #[error(
        "block is not later than the finalized slot \
         (block_slot: {block_slot}, finalized_slot: {finalized_slot})"
    )]
    FinalizedSlot { block_slot: Slot, finalized_slot: Slot },
    #[error(
        "block does not descend from the finalized block \
         (finalized_root: {finalized_root:?}, block_ancestor: {block_ancestor:?})"
    )]
    NotFinalizedDescendant {
        finalized_root: H256,
        block_ancestor: H256,
    },
}

/// Reasons for rejecting an attestation. The store is left unchanged when one of these is returned.
#[derive(Debug, Error)]
pub enum InvalidAttestation {
    #[error("attestation has no attesting indices")]
    EmptyAggregationBitfield,
    #[error(
        "attestation targets a future epoch \
         (target_epoch: {target_epoch}, current_epoch: {current_epoch})"
    )]
    FutureEpoch {
        target_epoch: Epoch,
        current_epoch: Epoch,
    },
    #[error(
        "attestation targets an epoch before the previous one \
         (target_epoch: {target_epoch}, current_epoch: {current_epoch})"
    )]
    PastEpoch {
        target_epoch: Epoch,
        current_epoch: Epoch,
    },
    #[error("attestation target is not in the epoch of its slot (target_epoch: {target_epoch}, slot: {slot})")]
    BadTargetEpoch { target_epoch: Epoch, slot: Slot },
    #[error("attestation target block is not in fork choice (target_root: {target_root:?})")]
    UnknownTargetRoot { target_root: H256 },
    #[error("attested block is not in fork choice (beacon_block_root: {beacon_block_root:?})")]
    UnknownHeadBlock { beacon_block_root: H256 },
    #[error(
        "LMD GHOST vote is inconsistent with FFG vote target \
         (target_root: {target_root:?}, expected: {expected:?})"
    )]
    InvalidTarget { target_root: H256, expected: H256 },
    #[error(
        "attestation votes for a block from the future \
         (block_slot: {block_slot}, attestation_slot: {attestation_slot})"
    )]
    AttestsToFutureBlock {
        block_slot: Slot,
        attestation_slot: Slot,
    },
}

/// Errors caused by an inconsistent store or by a caller breaking the store's assumptions.
///
/// A [`Store`](crate::Store) that returned one of these should be rebuilt from an anchor.
#[derive(Debug, Error)]
pub enum Error {
    #[error("anchor block is not at the start of an epoch (slot: {slot})")]
    AnchorNotAtEpochStart { slot: Slot },
    #[error(
        "attempted to revert justification \
         (store_justified_slot: {store_justified_slot}, state_slot: {state_slot})"
    )]
    AttemptToRevertJustification {
        store_justified_slot: Slot,
        state_slot: Slot,
    },
    #[error("state does not contain block root (slot: {slot}, state_slot: {state_slot})")]
    BlockRootUnavailable { slot: Slot, state_slot: Slot },
    #[error("inconsistent tick (previous_slot: {previous_slot}, time: {time})")]
    InconsistentOnTick { previous_slot: Slot, time: Slot },
    #[error("block is not in the block tree (block_root: {block_root:?})")]
    MissingProtoArrayBlock { block_root: H256 },
    #[error("block has no ancestor at slot (descendant_root: {descendant_root:?}, ancestor_slot: {ancestor_slot})")]
    UnknownAncestor {
        descendant_root: H256,
        ancestor_slot: Slot,
    },
}

/// Returns `false` if `error` was caused by an invalid block or attestation.
///
/// All other errors, including those from [`proto_array`], mean the store can no longer be used.
#[must_use]
pub fn is_fatal(error: &AnyhowError) -> bool {
    !(error.is::<InvalidBlock>() || error.is::<InvalidAttestation>())
}
