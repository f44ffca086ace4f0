use anyhow::Result;
use typenum::Unsigned as _;
use types::{
    phase0::primitives::{Gwei, H256},
    preset::Preset,
};

use crate::error::Error;

/// The block currently boosted for being timely and the weight it is boosted by.
///
/// A zero root means no block is boosted.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct ProposerBoost {
    pub root: H256,
    pub score: Gwei,
}

impl ProposerBoost {
    #[must_use]
    pub const fn new(root: H256, score: Gwei) -> Self {
        Self { root, score }
    }

    pub(crate) fn score_for(self, root: H256) -> Gwei {
        if !self.root.is_zero() && self.root == root {
            self.score
        } else {
            0
        }
    }
}

/// Computes the proposer boost from the balances of the justified state.
///
/// The boost is `proposer_score_boost` percent of the weight of an average committee.
/// Validators with a zero balance are treated as inactive.
/// The boost is 0 if there are no active validators.
///
/// See [`get_proposer_score`](https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#get_proposer_score).
pub fn calculate_proposer_boost_score<P: Preset>(
    justified_balances: &[Gwei],
    proposer_score_boost: u64,
) -> Result<Gwei> {
    let mut total_balance: Gwei = 0;
    let mut validator_count: u64 = 0;

    for balance in justified_balances.iter().copied().filter(|balance| *balance > 0) {
        total_balance = total_balance
            .checked_add(balance)
            .ok_or(Error::ProposerBoostOverflow {
                total_balance,
                validator_count,
            })?;

        validator_count += 1;
    }

    let Some(average_balance) = total_balance.checked_div(validator_count) else {
        return Ok(0);
    };

    let committee_size = validator_count / P::SlotsPerEpoch::U64;

    let score = committee_size
        .checked_mul(average_balance)
        .and_then(|committee_weight| committee_weight.checked_mul(proposer_score_boost))
        .ok_or(Error::ProposerBoostOverflow {
            total_balance,
            validator_count,
        })?;

    Ok(score / 100)
}
