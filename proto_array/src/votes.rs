use anyhow::Result;
use hash_hasher::HashedMap;
use types::phase0::primitives::{Epoch, Gwei, H256};

use crate::error::Error;

/// The latest LMD GHOST vote of a single validator.
///
/// `current_root` is the root the validator's balance is currently counted towards in the block
/// tree. `next_root` is the root it should be counted towards after the next call to
/// [`compute_deltas`].
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct VoteTracker {
    pub current_root: H256,
    pub next_root: H256,
    pub next_epoch: Epoch,
}

impl VoteTracker {
    /// Records a new vote unless the tracker already holds a vote from the same or a later epoch.
    ///
    /// A tracker that has never received a vote accepts any epoch, including the genesis epoch.
    /// Returns `true` if the vote was recorded.
    pub fn update(&mut self, next_root: H256, next_epoch: Epoch) -> bool {
        if *self == Self::default() || next_epoch > self.next_epoch {
            self.next_root = next_root;
            self.next_epoch = next_epoch;
            true
        } else {
            false
        }
    }
}

/// Returns the change in weight of every block in `indices` caused by votes and balances changing.
///
/// Votes are moved from `current_root` to `next_root` in the process.
/// Votes for blocks not present in `indices` (pruned or not yet seen) are skipped on that side.
/// A validator missing from `old_balances` or `new_balances` is treated as having a zero balance.
pub fn compute_deltas(
    indices: &HashedMap<H256, usize>,
    votes: &mut [VoteTracker],
    old_balances: &[Gwei],
    new_balances: &[Gwei],
) -> Result<Vec<i64>> {
    let mut deltas = vec![0_i64; indices.len()];

    for (validator_index, vote) in votes.iter_mut().enumerate() {
        // A zero root stands for the anchor before any block has been seen.
        // Votes for it are never counted.
        if vote.current_root.is_zero() && vote.next_root.is_zero() {
            continue;
        }

        let old_balance = old_balances.get(validator_index).copied().unwrap_or_default();
        let new_balance = new_balances.get(validator_index).copied().unwrap_or_default();

        if vote.current_root == vote.next_root && old_balance == new_balance {
            continue;
        }

        if let Some(index) = indices.get(&vote.current_root).copied() {
            let delta = deltas
                .get_mut(index)
                .ok_or(Error::InvalidNodeDelta { index })?;

            *delta = delta
                .checked_sub(i64::try_from(old_balance)?)
                .ok_or(Error::DeltaOverflow { index })?;
        }

        if let Some(index) = indices.get(&vote.next_root).copied() {
            let delta = deltas
                .get_mut(index)
                .ok_or(Error::InvalidNodeDelta { index })?;

            *delta = delta
                .checked_add(i64::try_from(new_balance)?)
                .ok_or(Error::DeltaOverflow { index })?;
        }

        vote.current_root = vote.next_root;
    }

    Ok(deltas)
}
