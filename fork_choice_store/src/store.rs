use core::{marker::PhantomData, time::Duration};
use std::sync::Arc;

use anyhow::{bail, ensure, Result};
use helper_functions::misc;
use im::Vector;
use log::{debug, info, warn};
use prometheus_metrics::Metrics;
use proto_array::{
    calculate_proposer_boost_score, compute_deltas, BlockSummary, ProposerBoost, ProtoArray,
    ProtoNode, VoteTracker,
};
use static_assertions::assert_impl_all;
use types::{
    config::Config as ChainConfig,
    phase0::{
        containers::{AttestationData, Checkpoint, IndexedAttestation},
        primitives::{Epoch, Gwei, Slot, ValidatorIndex, H256},
    },
    preset::{Mainnet, Preset},
};

use crate::{
    error::{Error, InvalidAttestation, InvalidBlock},
    misc::{Block, CheckpointState, LatestMessage, QueuedAttestation},
    store_config::StoreConfig,
};

/// [`Store`] from the Fork Choice specification backed by a [`ProtoArray`].
///
/// [`Store`]: https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#store
#[derive(Clone)]
pub struct Store<P: Preset> {
    chain_config: Arc<ChainConfig>,
    store_config: StoreConfig,
    current_slot: Slot,
    justified_checkpoint: Checkpoint,
    finalized_checkpoint: Checkpoint,
    best_justified_checkpoint: Checkpoint,
    // A zero root means no block is boosted in the current slot.
    proposer_boost_root: H256,
    proto_array: ProtoArray,
    // Indexed by validator index. Grows when a vote from a new validator arrives.
    votes: Vec<VoteTracker>,
    // Attestations from the current slot or later.
    queued_attestations: Vector<QueuedAttestation>,
    // The balances the weights in `Store.proto_array` were last computed with.
    justified_balances: Arc<[Gwei]>,
    head: BlockSummary,
    // `false` if votes, checkpoints or proposer boost changed after weights were last applied.
    synced: bool,
    metrics: Option<Arc<Metrics>>,
    phantom: PhantomData<P>,
}

assert_impl_all!(Store<Mainnet>: Send, Sync);

impl<P: Preset> Store<P> {
    /// [`get_forkchoice_store`](https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#get_forkchoice_store)
    ///
    /// `justified_balances` are the effective balances of active validators in the anchor state.
    /// Inactive validators should have a balance of 0.
    pub fn new(
        chain_config: Arc<ChainConfig>,
        store_config: StoreConfig,
        anchor: Block,
        justified_balances: Arc<[Gwei]>,
        metrics: Option<Arc<Metrics>>,
    ) -> Result<Self> {
        ensure!(
            misc::is_epoch_start::<P>(anchor.slot),
            Error::AnchorNotAtEpochStart { slot: anchor.slot },
        );

        // If the anchor is the genesis block, this checkpoint will not be equal to any checkpoint
        // in the genesis state because all of them have their `root` set to 0x00…00.
        let checkpoint = Checkpoint {
            epoch: misc::compute_epoch_at_slot::<P>(anchor.slot),
            root: anchor.block_root,
        };

        let head = BlockSummary {
            slot: anchor.slot,
            block_root: anchor.block_root,
            parent_root: anchor.parent_root,
            state_root: anchor.state_root,
            target_root: anchor.block_root,
            justified_checkpoint: checkpoint,
            finalized_checkpoint: checkpoint,
        };

        let proto_array = ProtoArray::initialize(head, store_config.prune_threshold)?;

        Ok(Self {
            chain_config,
            store_config,
            current_slot: anchor.slot,
            justified_checkpoint: checkpoint,
            finalized_checkpoint: checkpoint,
            best_justified_checkpoint: checkpoint,
            proposer_boost_root: H256::zero(),
            proto_array,
            votes: vec![],
            queued_attestations: Vector::new(),
            justified_balances,
            head,
            synced: true,
            metrics,
            phantom: PhantomData,
        })
    }

    #[must_use]
    pub fn chain_config(&self) -> &ChainConfig {
        &self.chain_config
    }

    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        self.store_config
    }

    #[must_use]
    pub const fn current_slot(&self) -> Slot {
        self.current_slot
    }

    #[must_use]
    pub const fn current_epoch(&self) -> Epoch {
        misc::compute_epoch_at_slot::<P>(self.current_slot)
    }

    #[must_use]
    pub const fn justified_checkpoint(&self) -> Checkpoint {
        self.justified_checkpoint
    }

    #[must_use]
    pub const fn finalized_checkpoint(&self) -> Checkpoint {
        self.finalized_checkpoint
    }

    #[must_use]
    pub const fn best_justified_checkpoint(&self) -> Checkpoint {
        self.best_justified_checkpoint
    }

    #[must_use]
    pub const fn finalized_slot(&self) -> Slot {
        misc::compute_start_slot_at_epoch::<P>(self.finalized_checkpoint.epoch)
    }

    #[must_use]
    pub const fn proposer_boost_root(&self) -> H256 {
        self.proposer_boost_root
    }

    #[must_use]
    pub const fn proto_array(&self) -> &ProtoArray {
        &self.proto_array
    }

    #[must_use]
    pub fn justified_balances(&self) -> &[Gwei] {
        &self.justified_balances
    }

    /// Returns the head computed by the last call to [`Store::update_head`].
    #[must_use]
    pub const fn head(&self) -> BlockSummary {
        self.head
    }

    /// Number of blocks in the block tree, including the finalized block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.proto_array.len()
    }

    #[must_use]
    pub fn queued_attestation_count(&self) -> usize {
        self.queued_attestations.len()
    }

    pub fn set_prune_threshold(&mut self, prune_threshold: usize) {
        self.store_config.prune_threshold = prune_threshold;
        self.proto_array.set_prune_threshold(prune_threshold);
    }

    /// Returns `true` if the block is known **and** descends from the finalized block.
    #[must_use]
    pub fn has_block(&self, block_root: H256) -> bool {
        self.proto_array.contains_block(block_root) && self.is_descendant_of_finalized(block_root)
    }

    /// Returns the block if it is known **and** descends from the finalized block.
    #[must_use]
    pub fn block(&self, block_root: H256) -> Option<BlockSummary> {
        let node = self.proto_array.node(block_root)?;

        self.is_descendant_of_finalized(block_root)
            .then_some(node.block_summary())
    }

    #[must_use]
    pub fn justified_block(&self) -> Option<BlockSummary> {
        self.block(self.justified_checkpoint.root)
    }

    #[must_use]
    pub fn finalized_block(&self) -> Option<BlockSummary> {
        self.block(self.finalized_checkpoint.root)
    }

    /// Returns `true` if the block is the finalized block or one of its known descendants.
    #[must_use]
    pub fn is_descendant_of_finalized(&self, block_root: H256) -> bool {
        self.proto_array
            .is_descendant(self.finalized_checkpoint.root, block_root)
    }

    #[must_use]
    pub fn is_descendant(&self, ancestor_root: H256, descendant_root: H256) -> bool {
        self.proto_array.is_descendant(ancestor_root, descendant_root)
    }

    #[must_use]
    pub fn common_ancestor(&self, first_root: H256, second_root: H256) -> Option<BlockSummary> {
        self.proto_array
            .common_ancestor(first_root, second_root)
            .map(ProtoNode::block_summary)
    }

    /// Returns the latest vote of a validator, including votes not yet reflected in weights.
    #[must_use]
    pub fn latest_message(&self, validator_index: ValidatorIndex) -> Option<LatestMessage> {
        let index = usize::try_from(validator_index).ok()?;
        let vote = self.votes.get(index)?;

        (*vote != VoteTracker::default()).then_some(LatestMessage {
            epoch: vote.next_epoch,
            root: vote.next_root,
        })
    }

    /// Returns the leaves of the block tree. Some of them may not be viable.
    #[must_use]
    pub fn heads(&self) -> Vec<BlockSummary> {
        self.proto_array
            .heads()
            .into_iter()
            .map(ProtoNode::block_summary)
            .collect()
    }

    /// Returns the block and its ancestors down to the finalized block, latest first.
    pub fn chain_ending_with(&self, block_root: H256) -> impl Iterator<Item = BlockSummary> + '_ {
        self.proto_array
            .iter_nodes(block_root)
            .map(ProtoNode::block_summary)
    }

    /// Returns all blocks that are neither the block nor its ancestors.
    #[must_use]
    pub fn non_ancestors(&self, block_root: H256) -> Vec<BlockSummary> {
        self.proto_array
            .iter_non_ancestor_nodes(block_root)
            .into_iter()
            .map(ProtoNode::block_summary)
            .collect()
    }

    #[must_use]
    pub fn block_summaries_at_slot(&self, slot: Slot) -> Vec<BlockSummary> {
        self.proto_array
            .nodes_at_slot(slot)
            .map(ProtoNode::block_summary)
            .collect()
    }

    #[must_use]
    pub fn block_summaries_by_parent_root(&self, parent_root: H256) -> Vec<BlockSummary> {
        self.proto_array
            .nodes()
            .iter()
            .filter(|node| node.parent_root == parent_root)
            .map(ProtoNode::block_summary)
            .collect()
    }

    /// Returns the block at `slot` in the chain ending with the cached head.
    ///
    /// Returns [`None`] if `slot` is empty in that chain.
    #[must_use]
    pub fn canonical_block_summary_at_slot(&self, slot: Slot) -> Option<BlockSummary> {
        self.chain_ending_with(self.head.block_root)
            .find(|block| block.slot <= slot)
            .filter(|block| block.slot == slot)
    }

    /// [`get_ancestor`](https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#get_ancestor)
    ///
    /// Returns the root of the latest block at or before `ancestor_slot` in the chain ending with
    /// `descendant_root`.
    pub fn ancestor(&self, descendant_root: H256, ancestor_slot: Slot) -> Result<H256> {
        ensure!(
            self.proto_array.contains_block(descendant_root),
            Error::MissingProtoArrayBlock {
                block_root: descendant_root,
            },
        );

        self.proto_array
            .iter_nodes(descendant_root)
            .find(|node| node.slot <= ancestor_slot)
            .map(|node| node.root)
            .ok_or_else(|| {
                Error::UnknownAncestor {
                    descendant_root,
                    ancestor_slot,
                }
                .into()
            })
    }

    /// [`on_block`](https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#on_block)
    ///
    /// `state` must be the post-state of `block`. The state transition is not run again.
    /// `block_delay` is the time between the start of `block.slot` and the arrival of the block.
    ///
    /// Blocks that are already known are skipped.
    pub fn on_block(
        &mut self,
        block: &Block,
        state: &impl CheckpointState,
        block_delay: Duration,
    ) -> Result<()> {
        if self.proto_array.contains_block(block.block_root) {
            debug!("block already in fork choice (block_root: {:?})", block.block_root);
            return Ok(());
        }

        self.validate_block(block)?;

        let target_root = self.target_root(block, state)?;

        let state_justified_checkpoint = state.current_justified_checkpoint();
        let state_finalized_checkpoint = state.finalized_checkpoint();

        // > Update justified checkpoint
        if state_justified_checkpoint.epoch > self.justified_checkpoint.epoch {
            let should_update_justified = self.should_update_justified_checkpoint(state)?;

            if state_justified_checkpoint.epoch > self.best_justified_checkpoint.epoch {
                self.best_justified_checkpoint = state_justified_checkpoint;
            }

            if should_update_justified {
                self.set_justified_checkpoint(state_justified_checkpoint);
            }
        }

        // > Update finalized checkpoint
        if state_finalized_checkpoint.epoch > self.finalized_checkpoint.epoch {
            info!(
                "finalized checkpoint updated (old: {:?}, new: {state_finalized_checkpoint:?})",
                self.finalized_checkpoint,
            );

            self.finalized_checkpoint = state_finalized_checkpoint;
            self.synced = false;

            // > Potentially update justified if different from store
            let newer_justified = self.justified_checkpoint != state_justified_checkpoint
                && state_justified_checkpoint.epoch > self.justified_checkpoint.epoch;

            // The stored justified block may be on a branch that the new finalized block has
            // excluded. It is still in the block tree because pruning happens later.
            let justified_ancestor =
                self.ancestor(self.justified_checkpoint.root, self.finalized_slot())?;

            let justified_excluded = justified_ancestor != self.finalized_checkpoint.root;

            if newer_justified || justified_excluded {
                self.set_justified_checkpoint(state_justified_checkpoint);
            }
        }

        self.proto_array.on_block(BlockSummary {
            slot: block.slot,
            block_root: block.block_root,
            parent_root: block.parent_root,
            state_root: block.state_root,
            target_root,
            justified_checkpoint: state_justified_checkpoint,
            finalized_checkpoint: state_finalized_checkpoint,
        })?;

        // > Add proposer score boost if the block is timely
        let is_before_attesting_interval = block_delay < self.chain_config.timely_block_cutoff();

        if self.current_slot == block.slot
            && is_before_attesting_interval
            && self.proposer_boost_root.is_zero()
        {
            debug!(
                "applying proposer boost (block_root: {:?}, block_delay: {block_delay:?})",
                block.block_root,
            );

            self.proposer_boost_root = block.block_root;
            self.synced = false;
        }

        Ok(())
    }

    /// [`on_attestation`](https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#on_attestation)
    ///
    /// `attestation` must have passed `is_valid_indexed_attestation`. Signatures are not checked.
    pub fn on_attestation(&mut self, attestation: &IndexedAttestation) -> Result<()> {
        let AttestationData {
            slot,
            beacon_block_root,
            target,
            ..
        } = attestation.data;

        // Validators that have not seen any block may attest to 0x00…00.
        // Votes for it are never counted.
        if beacon_block_root.is_zero() {
            return Ok(());
        }

        self.validate_attestation(attestation)?;

        if slot < self.current_slot {
            for validator_index in attestation.attesting_indices.iter().copied() {
                self.add_latest_message(validator_index, target.epoch, beacon_block_root)?;
            }
        } else {
            // > Attestations can only affect the fork choice of subsequent slots.
            // > Delay consideration in the fork choice until their slot is in the past.
            debug!(
                "queueing attestation (slot: {slot}, current_slot: {}, beacon_block_root: {beacon_block_root:?})",
                self.current_slot,
            );

            self.queued_attestations.push_back(QueuedAttestation {
                slot,
                attesting_indices: attestation.attesting_indices.as_slice().into(),
                block_root: beacon_block_root,
                target_epoch: target.epoch,
            });
        }

        Ok(())
    }

    /// [`update_latest_messages`](https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#update_latest_messages)
    ///
    /// Votes from epochs not later than the latest recorded one are ignored.
    pub fn add_latest_message(
        &mut self,
        validator_index: ValidatorIndex,
        epoch: Epoch,
        root: H256,
    ) -> Result<()> {
        let index = usize::try_from(validator_index)?;

        if self.votes.len() <= index {
            self.votes.resize(index + 1, VoteTracker::default());
        }

        if self.votes[index].update(root, epoch) {
            self.synced = false;
        }

        Ok(())
    }

    /// Applies vote and balance changes to the block tree.
    ///
    /// `new_balances` become the baseline for the next call.
    pub fn update_balances(&mut self, new_balances: impl Into<Arc<[Gwei]>>) -> Result<()> {
        let new_balances = new_balances.into();
        let proposer_boost = self.proposer_boost(&new_balances)?;

        let deltas = compute_deltas(
            self.proto_array.indices(),
            &mut self.votes,
            &self.justified_balances,
            &new_balances,
        )?;

        self.proto_array.apply_score_changes(
            deltas,
            proposer_boost,
            self.justified_checkpoint,
            self.finalized_checkpoint,
        )?;

        self.justified_balances = new_balances;
        self.synced = true;

        Ok(())
    }

    /// Advances the store to `slot` one slot at a time.
    ///
    /// Queued attestations from `slot` and earlier are applied afterwards.
    /// Earlier slots are ignored apart from processing the queue.
    pub fn update_time(&mut self, slot: Slot) -> Result<()> {
        while self.current_slot < slot {
            self.on_tick(self.current_slot + 1)?;
        }

        self.process_queued_attestations()
    }

    /// [`get_head`](https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#get_head)
    ///
    /// Pending changes are applied first. The result is cached and available through
    /// [`Store::head`].
    pub fn update_head(&mut self) -> Result<BlockSummary> {
        let _timer = self
            .metrics
            .as_ref()
            .map(|metrics| metrics.fork_choice_find_head_times.start_timer());

        if let Some(metrics) = self.metrics.as_ref() {
            metrics.fork_choice_requests.inc();
        }

        let result = self.compute_head();

        if let Some(metrics) = self.metrics.as_ref() {
            if result.is_err() {
                metrics.fork_choice_errors.inc();
            }

            metrics.set_collection_sizes(
                self.proto_array.len(),
                self.queued_attestations.len(),
                self.votes.len(),
            );
        }

        result
    }

    /// Removes blocks before the finalized block if there are at least as many as the prune
    /// threshold.
    ///
    /// Returns the removed blocks so they can be archived.
    pub fn prune(&mut self) -> Result<Vec<BlockSummary>> {
        let removed = self.proto_array.maybe_prune(self.finalized_checkpoint.root)?;

        if !removed.is_empty() {
            info!(
                "pruned blocks before finalized block (count: {}, finalized_root: {:?})",
                removed.len(),
                self.finalized_checkpoint.root,
            );
        }

        Ok(removed.iter().map(ProtoNode::block_summary).collect())
    }

    fn validate_block(&self, block: &Block) -> Result<()> {
        // > Parent block must be known
        ensure!(
            self.proto_array.contains_block(block.parent_root),
            InvalidBlock::UnknownParent {
                parent_root: block.parent_root,
            },
        );

        // > Blocks cannot be in the future.
        // > If they are, their consideration must be delayed until they are in the past.
        //
        // Delaying is left to the caller.
        ensure!(
            block.slot <= self.current_slot,
            InvalidBlock::FutureSlot {
                block_slot: block.slot,
                current_slot: self.current_slot,
            },
        );

        // > Check that block is later than the finalized epoch slot
        let finalized_slot = self.finalized_slot();

        ensure!(
            block.slot > finalized_slot,
            InvalidBlock::FinalizedSlot {
                block_slot: block.slot,
                finalized_slot,
            },
        );

        // > Check block is a descendant of the finalized block at the checkpoint finalized slot
        //
        // Pruning leaves blocks from abandoned forks without parents.
        // A chain that ends above the finalized slot does not descend from the finalized block.
        let mut block_ancestor = block.parent_root;

        for node in self.proto_array.iter_nodes(block.parent_root) {
            block_ancestor = node.root;

            if node.slot <= finalized_slot {
                break;
            }
        }

        let finalized_root = self.finalized_checkpoint.root;

        ensure!(
            block_ancestor == finalized_root,
            InvalidBlock::NotFinalizedDescendant {
                finalized_root,
                block_ancestor,
            },
        );

        Ok(())
    }

    fn target_root(&self, block: &Block, state: &impl CheckpointState) -> Result<H256> {
        let epoch = misc::compute_epoch_at_slot::<P>(block.slot);
        let target_slot = misc::compute_start_slot_at_epoch::<P>(epoch);

        if block.slot == target_slot {
            return Ok(block.block_root);
        }

        state.block_root_at_slot(target_slot).ok_or_else(|| {
            Error::BlockRootUnavailable {
                slot: target_slot,
                state_slot: state.slot(),
            }
            .into()
        })
    }

    /// [`should_update_justified_checkpoint`](https://github.com/ethereum/consensus-specs/blob/v1.0.0/specs/phase0/fork-choice.md#should_update_justified_checkpoint)
    fn should_update_justified_checkpoint(&self, state: &impl CheckpointState) -> Result<bool> {
        let slots_since_epoch_start = misc::slots_since_epoch_start::<P>(self.current_slot);

        if slots_since_epoch_start < self.chain_config.safe_slots_to_update_justified {
            return Ok(true);
        }

        let justified_slot = misc::compute_start_slot_at_epoch::<P>(self.justified_checkpoint.epoch);

        // A state cannot justify its own slot or anything later.
        ensure!(
            justified_slot < state.slot(),
            Error::AttemptToRevertJustification {
                store_justified_slot: justified_slot,
                state_slot: state.slot(),
            },
        );

        // The new justified block is an ancestor of `state` and is at or before `state.slot()`.
        let new_justified_root = state.current_justified_checkpoint().root;
        let justified_ancestor = self.ancestor(new_justified_root, justified_slot)?;

        Ok(justified_ancestor == self.justified_checkpoint.root)
    }

    fn validate_attestation(&self, attestation: &IndexedAttestation) -> Result<()> {
        let AttestationData {
            slot,
            beacon_block_root,
            target,
            ..
        } = attestation.data;

        // An attestation with no attesters would have no effect.
        ensure!(
            !attestation.attesting_indices.is_empty(),
            InvalidAttestation::EmptyAggregationBitfield,
        );

        // > Attestations must be from the current or previous epoch
        let current_epoch = self.current_epoch();

        ensure!(
            target.epoch <= current_epoch,
            InvalidAttestation::FutureEpoch {
                target_epoch: target.epoch,
                current_epoch,
            },
        );

        ensure!(
            target.epoch + 1 >= current_epoch,
            InvalidAttestation::PastEpoch {
                target_epoch: target.epoch,
                current_epoch,
            },
        );

        // > Check that the epoch number and slot number are matching
        ensure!(
            target.epoch == misc::compute_epoch_at_slot::<P>(slot),
            InvalidAttestation::BadTargetEpoch {
                target_epoch: target.epoch,
                slot,
            },
        );

        // > Attestation target must be for a known block.
        //
        // Attestations are not delayed until the block arrives.
        ensure!(
            self.proto_array.contains_block(target.root),
            InvalidAttestation::UnknownTargetRoot {
                target_root: target.root,
            },
        );

        // > Attestations must be for a known block.
        let Some(block) = self.proto_array.node(beacon_block_root) else {
            bail!(InvalidAttestation::UnknownHeadBlock { beacon_block_root });
        };

        // If the block is from an earlier epoch than the target, all slots between them must be
        // empty, making the block its own target.
        let expected = if target.epoch > misc::compute_epoch_at_slot::<P>(block.slot) {
            beacon_block_root
        } else {
            block.target_root
        };

        // > LMD vote must be consistent with FFG vote target
        ensure!(
            target.root == expected,
            InvalidAttestation::InvalidTarget {
                target_root: target.root,
                expected,
            },
        );

        // > Attestations must not be for blocks in the future. If not, the attestation should not be considered
        ensure!(
            block.slot <= slot,
            InvalidAttestation::AttestsToFutureBlock {
                block_slot: block.slot,
                attestation_slot: slot,
            },
        );

        Ok(())
    }

    /// [`on_tick`](https://github.com/ethereum/consensus-specs/blob/v1.0.0/specs/phase0/fork-choice.md#on_tick)
    fn on_tick(&mut self, slot: Slot) -> Result<()> {
        let previous_slot = self.current_slot;

        ensure!(
            slot == previous_slot + 1,
            Error::InconsistentOnTick {
                previous_slot,
                time: slot,
            },
        );

        self.current_slot = slot;

        // > Reset store.proposer_boost_root if this is a new slot
        if !self.proposer_boost_root.is_zero() {
            self.proposer_boost_root = H256::zero();
            self.synced = false;
        }

        // > Not a new epoch, return
        if !misc::is_epoch_start::<P>(slot) {
            return Ok(());
        }

        // > Update store.justified_checkpoint if a better checkpoint on the store.finalized_checkpoint chain
        if self.best_justified_checkpoint.epoch > self.justified_checkpoint.epoch {
            self.set_justified_checkpoint(self.best_justified_checkpoint);
        }

        Ok(())
    }

    fn process_queued_attestations(&mut self) -> Result<()> {
        let current_slot = self.current_slot;

        let (ready, pending) = core::mem::take(&mut self.queued_attestations)
            .into_iter()
            .partition::<Vector<_>, _>(|attestation| attestation.slot <= current_slot);

        self.queued_attestations = pending;

        for attestation in ready {
            for validator_index in attestation.attesting_indices.iter().copied() {
                self.add_latest_message(
                    validator_index,
                    attestation.target_epoch,
                    attestation.block_root,
                )?;
            }
        }

        Ok(())
    }

    fn set_justified_checkpoint(&mut self, checkpoint: Checkpoint) {
        if self.justified_checkpoint == checkpoint {
            return;
        }

        info!(
            "justified checkpoint updated (old: {:?}, new: {checkpoint:?})",
            self.justified_checkpoint,
        );

        self.justified_checkpoint = checkpoint;
        self.synced = false;
    }

    fn proposer_boost(&self, justified_balances: &[Gwei]) -> Result<ProposerBoost> {
        if self.proposer_boost_root.is_zero() {
            return Ok(ProposerBoost::default());
        }

        let score = calculate_proposer_boost_score::<P>(
            justified_balances,
            self.chain_config.proposer_score_boost,
        )?;

        Ok(ProposerBoost::new(self.proposer_boost_root, score))
    }

    fn compute_head(&mut self) -> Result<BlockSummary> {
        if !self.synced {
            self.update_balances(Arc::clone(&self.justified_balances))?;
        }

        let head_root = self.proto_array.find_head(self.justified_checkpoint.root)?;

        let new_head = self
            .proto_array
            .node(head_root)
            .map(ProtoNode::block_summary)
            .ok_or(Error::MissingProtoArrayBlock {
                block_root: head_root,
            })?;

        let old_head = core::mem::replace(&mut self.head, new_head);

        if old_head.block_root != new_head.block_root {
            self.on_head_changed(old_head, new_head);
        }

        Ok(new_head)
    }

    fn on_head_changed(&self, old_head: BlockSummary, new_head: BlockSummary) {
        if let Some(metrics) = self.metrics.as_ref() {
            metrics.fork_choice_changed_head.inc();
        }

        // A pruned head cannot be compared with the new one.
        let reorganized = self.proto_array.contains_block(old_head.block_root)
            && !self
                .proto_array
                .is_descendant(old_head.block_root, new_head.block_root);

        if reorganized {
            let common_ancestor_slot = self
                .proto_array
                .common_ancestor(old_head.block_root, new_head.block_root)
                .map(|node| node.slot);

            warn!(
                "chain reorganized \
                 (old_head: {:?} at slot {}, new_head: {:?} at slot {}, \
                 common_ancestor_slot: {common_ancestor_slot:?})",
                old_head.block_root, old_head.slot, new_head.block_root, new_head.slot,
            );

            if let Some(metrics) = self.metrics.as_ref() {
                metrics.fork_choice_reorg.inc();
            }
        } else {
            debug!(
                "head changed (old_head: {:?}, new_head: {:?} at slot {})",
                old_head.block_root, new_head.block_root, new_head.slot,
            );
        }
    }
}
