use std::{collections::BTreeMap, sync::Arc};

use types::phase0::{
    containers::Checkpoint,
    primitives::{Epoch, Slot, ValidatorIndex, H256},
};

/// The parts of a beacon block the fork choice rule needs.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Block {
    pub slot: Slot,
    pub block_root: H256,
    pub parent_root: H256,
    pub state_root: H256,
}

/// An attestation that cannot be applied until the slot after the one it was made in.
///
/// [`QueuedAttestation`]s are cloned whenever [`Store`](crate::Store) is, hence the [`Arc`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct QueuedAttestation {
    pub slot: Slot,
    pub attesting_indices: Arc<[ValidatorIndex]>,
    pub block_root: H256,
    pub target_epoch: Epoch,
}

/// [`LatestMessage`] from the Fork Choice specification.
///
/// [`LatestMessage`]: https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#latestmessage
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LatestMessage {
    pub epoch: Epoch,
    pub root: H256,
}

/// The parts of a post-state [`Store::on_block`](crate::Store::on_block) reads.
pub trait CheckpointState {
    fn slot(&self) -> Slot;

    fn current_justified_checkpoint(&self) -> Checkpoint;

    fn finalized_checkpoint(&self) -> Checkpoint;

    /// Returns the root of the latest block at or before `slot`.
    ///
    /// Must return [`None`] for slots not strictly before [`CheckpointState::slot`] and for slots
    /// too old to be remembered.
    fn block_root_at_slot(&self, slot: Slot) -> Option<H256>;
}

/// A [`CheckpointState`] backed by plain values.
///
/// `block_roots` only needs entries for slots with blocks. Empty slots resolve to the latest
/// preceding entry.
#[derive(Clone, Default, Debug)]
pub struct StateSummary {
    pub slot: Slot,
    pub current_justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
    pub block_roots: BTreeMap<Slot, H256>,
}

impl CheckpointState for StateSummary {
    fn slot(&self) -> Slot {
        self.slot
    }

    fn current_justified_checkpoint(&self) -> Checkpoint {
        self.current_justified_checkpoint
    }

    fn finalized_checkpoint(&self) -> Checkpoint {
        self.finalized_checkpoint
    }

    fn block_root_at_slot(&self, slot: Slot) -> Option<H256> {
        if slot >= self.slot {
            return None;
        }

        self.block_roots
            .range(..=slot)
            .next_back()
            .map(|(_, root)| *root)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(0 => None; "before first entry")]
    #[test_case(2 => Some(H256::repeat_byte(2)); "exact entry")]
    #[test_case(4 => Some(H256::repeat_byte(2)); "empty slot")]
    #[test_case(5 => Some(H256::repeat_byte(5)); "last slot before state")]
    #[test_case(6 => None; "state slot")]
    #[test_case(7 => None; "future slot")]
    fn state_summary_block_root_at_slot(slot: Slot) -> Option<H256> {
        let state = StateSummary {
            slot: 6,
            block_roots: BTreeMap::from([
                (1, H256::repeat_byte(1)),
                (2, H256::repeat_byte(2)),
                (5, H256::repeat_byte(5)),
            ]),
            ..StateSummary::default()
        };

        state.block_root_at_slot(slot)
    }
}
