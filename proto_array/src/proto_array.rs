use anyhow::{bail, ensure, Result};
use hash_hasher::HashedMap;
use itertools::Itertools as _;
use log::debug;
use types::phase0::{
    consts::GENESIS_EPOCH,
    containers::Checkpoint,
    primitives::{Gwei, Slot, H256},
};

use crate::{error::Error, proposer_boost::ProposerBoost};

/// Block fields tracked by fork choice.
///
/// The checkpoints are the ones in the post-state of the block.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct BlockSummary {
    pub slot: Slot,
    pub block_root: H256,
    pub parent_root: H256,
    pub state_root: H256,
    pub target_root: H256,
    pub justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProtoNode {
    pub slot: Slot,
    pub root: H256,
    pub parent_root: H256,
    pub state_root: H256,
    pub target_root: H256,
    pub justified_checkpoint: Checkpoint,
    pub finalized_checkpoint: Checkpoint,
    pub weight: Gwei,
    pub parent: Option<usize>,
    pub best_child: Option<usize>,
    pub best_descendant: Option<usize>,
}

impl ProtoNode {
    #[must_use]
    pub const fn block_summary(&self) -> BlockSummary {
        BlockSummary {
            slot: self.slot,
            block_root: self.root,
            parent_root: self.parent_root,
            state_root: self.state_root,
            target_root: self.target_root,
            justified_checkpoint: self.justified_checkpoint,
            finalized_checkpoint: self.finalized_checkpoint,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ProtoArray {
    // Pruning only happens once the finalized block is at least this far into `ProtoArray.nodes`.
    // Pruning shifts every index, so doing it on every finalization would be wasteful.
    prune_threshold: usize,
    justified_checkpoint: Checkpoint,
    finalized_checkpoint: Checkpoint,
    nodes: Vec<ProtoNode>,
    indices: HashedMap<H256, usize>,
    previous_proposer_boost: ProposerBoost,
}

impl ProtoArray {
    #[must_use]
    pub fn new(
        justified_checkpoint: Checkpoint,
        finalized_checkpoint: Checkpoint,
        prune_threshold: usize,
    ) -> Self {
        Self {
            prune_threshold,
            justified_checkpoint,
            finalized_checkpoint,
            nodes: vec![],
            indices: HashedMap::default(),
            previous_proposer_boost: ProposerBoost::default(),
        }
    }

    /// Creates a block tree containing only `anchor`.
    ///
    /// The checkpoints of `anchor` become the tracked checkpoints.
    pub fn initialize(anchor: BlockSummary, prune_threshold: usize) -> Result<Self> {
        let mut proto_array = Self::new(
            anchor.justified_checkpoint,
            anchor.finalized_checkpoint,
            prune_threshold,
        );

        proto_array.on_block(anchor)?;

        Ok(proto_array)
    }

    #[must_use]
    pub const fn prune_threshold(&self) -> usize {
        self.prune_threshold
    }

    pub fn set_prune_threshold(&mut self, prune_threshold: usize) {
        self.prune_threshold = prune_threshold;
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
    pub const fn previous_proposer_boost(&self) -> ProposerBoost {
        self.previous_proposer_boost
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn nodes(&self) -> &[ProtoNode] {
        &self.nodes
    }

    #[must_use]
    pub const fn indices(&self) -> &HashedMap<H256, usize> {
        &self.indices
    }

    #[must_use]
    pub fn contains_block(&self, block_root: H256) -> bool {
        self.indices.contains_key(&block_root)
    }

    #[must_use]
    pub fn node(&self, block_root: H256) -> Option<&ProtoNode> {
        let index = self.indices.get(&block_root).copied()?;
        self.nodes.get(index)
    }

    /// Adds a block to the tree.
    ///
    /// The parent of `block` need not be present. Blocks without a known parent become roots.
    /// Adding a block that is already present does nothing.
    pub fn on_block(&mut self, block: BlockSummary) -> Result<()> {
        if self.contains_block(block.block_root) {
            return Ok(());
        }

        let node_index = self.nodes.len();
        let parent = self.indices.get(&block.parent_root).copied();

        self.indices.insert(block.block_root, node_index);

        self.nodes.push(ProtoNode {
            slot: block.slot,
            root: block.block_root,
            parent_root: block.parent_root,
            state_root: block.state_root,
            target_root: block.target_root,
            justified_checkpoint: block.justified_checkpoint,
            finalized_checkpoint: block.finalized_checkpoint,
            weight: 0,
            parent,
            best_child: None,
            best_descendant: None,
        });

        // The new block may change the best descendant of every one of its ancestors.
        let mut child_index = node_index;

        while let Some(parent_index) = self.parent_index(child_index)? {
            self.maybe_update_best_child_and_descendant(parent_index, child_index)?;
            child_index = parent_index;
        }

        debug!(
            "block added to block tree (slot: {}, block_root: {:?}, parent: {parent:?})",
            block.slot, block.block_root,
        );

        Ok(())
    }

    /// Applies weight changes to every node and updates best children and descendants.
    ///
    /// `deltas` must contain one element for every node, in the same order as the nodes.
    /// The checkpoints are stored unconditionally. They affect which nodes are viable.
    pub fn apply_score_changes(
        &mut self,
        mut deltas: Vec<i64>,
        proposer_boost: ProposerBoost,
        justified_checkpoint: Checkpoint,
        finalized_checkpoint: Checkpoint,
    ) -> Result<()> {
        ensure!(
            deltas.len() == self.nodes.len(),
            Error::InvalidDeltaLength {
                deltas: deltas.len(),
                nodes: self.nodes.len(),
            },
        );

        self.justified_checkpoint = justified_checkpoint;
        self.finalized_checkpoint = finalized_checkpoint;

        // Iterating backwards visits children before their parents.
        // A delta added to a parent is applied when the loop reaches the parent.
        for node_index in (0..self.nodes.len()).rev() {
            let node = &mut self.nodes[node_index];

            if node.root.is_zero() {
                continue;
            }

            let current_boost = i64::try_from(proposer_boost.score_for(node.root))?;
            let previous_boost = i64::try_from(self.previous_proposer_boost.score_for(node.root))?;

            let node_delta = deltas
                .get(node_index)
                .copied()
                .ok_or(Error::InvalidNodeDelta { index: node_index })?
                .checked_add(current_boost)
                .and_then(|delta| delta.checked_sub(previous_boost))
                .ok_or(Error::DeltaOverflow { index: node_index })?;

            node.weight = node
                .weight
                .checked_add_signed(node_delta)
                .ok_or(Error::WeightOverflow {
                    index: node_index,
                    weight: node.weight,
                    delta: node_delta,
                })?;

            if let Some(parent_index) = node.parent {
                let parent_delta = deltas
                    .get_mut(parent_index)
                    .ok_or(Error::InvalidParentDelta {
                        index: parent_index,
                    })?;

                *parent_delta = parent_delta
                    .checked_add(node_delta)
                    .ok_or(Error::DeltaOverflow {
                        index: parent_index,
                    })?;
            }
        }

        for node_index in (0..self.nodes.len()).rev() {
            if let Some(parent_index) = self.parent_index(node_index)? {
                self.maybe_update_best_child_and_descendant(parent_index, node_index)?;
            }
        }

        self.previous_proposer_boost = proposer_boost;

        Ok(())
    }

    /// Returns the root of the best descendant of the justified block.
    ///
    /// The justified block itself is always an acceptable head, even if it is not viable.
    /// The tracked checkpoints are only updated by [`Self::apply_score_changes`], so it should be
    /// called after any checkpoint change before calling this.
    pub fn find_head(&self, justified_root: H256) -> Result<H256> {
        let Some(justified_index) = self.indices.get(&justified_root).copied() else {
            bail!(Error::JustifiedNodeUnknown {
                root: justified_root,
            });
        };

        let justified_node = self
            .nodes
            .get(justified_index)
            .ok_or(Error::InvalidJustifiedIndex {
                index: justified_index,
            })?;

        let best_descendant_index = justified_node.best_descendant.unwrap_or(justified_index);

        let best_node = self
            .nodes
            .get(best_descendant_index)
            .ok_or(Error::InvalidBestDescendantIndex {
                index: best_descendant_index,
            })?;

        ensure!(
            best_descendant_index == justified_index || self.node_is_viable_for_head(best_node),
            Error::InvalidBestNode {
                justified_root,
                head_root: best_node.root,
            },
        );

        Ok(best_node.root)
    }

    /// Removes all blocks before the finalized block.
    ///
    /// Nothing is removed if the finalized block is closer to the start than the prune threshold.
    /// Returns the removed nodes in their original order.
    pub fn maybe_prune(&mut self, finalized_root: H256) -> Result<Vec<ProtoNode>> {
        let Some(finalized_index) = self.indices.get(&finalized_root).copied() else {
            bail!(Error::FinalizedNodeUnknown {
                root: finalized_root,
            });
        };

        if finalized_index < self.prune_threshold {
            debug!(
                "not pruning block tree \
                 (finalized_index: {finalized_index}, prune_threshold: {})",
                self.prune_threshold,
            );

            return Ok(vec![]);
        }

        // Check every remaining link before mutating anything.
        // Parents before the finalized block are expected and get cleared below.
        for node in &self.nodes[finalized_index..] {
            for index in [node.best_child, node.best_descendant].into_iter().flatten() {
                ensure!(
                    index >= finalized_index,
                    Error::IndexOverflow {
                        index,
                        finalized_index,
                    },
                );
            }
        }

        let removed = self.nodes.drain(..finalized_index).collect_vec();

        for node in &removed {
            self.indices.remove(&node.root);
        }

        for index in self.indices.values_mut() {
            *index -= finalized_index;
        }

        for node in &mut self.nodes {
            node.parent = node
                .parent
                .and_then(|index| index.checked_sub(finalized_index));

            node.best_child = node.best_child.map(|index| index - finalized_index);
            node.best_descendant = node.best_descendant.map(|index| index - finalized_index);
        }

        debug!(
            "pruned block tree (removed: {}, remaining: {})",
            removed.len(),
            self.nodes.len(),
        );

        Ok(removed)
    }

    /// Returns `true` if `descendant_root` is `ancestor_root` or one of its descendants.
    ///
    /// Returns `false` if either block is not in the tree.
    #[must_use]
    pub fn is_descendant(&self, ancestor_root: H256, descendant_root: H256) -> bool {
        let Some(ancestor) = self.node(ancestor_root) else {
            return false;
        };

        self.iter_nodes(descendant_root)
            .take_while(|node| node.slot >= ancestor.slot)
            .any(|node| node.root == ancestor_root)
    }

    /// Returns the latest block that both blocks descend from.
    ///
    /// Either block counts as its own ancestor.
    #[must_use]
    pub fn common_ancestor(&self, first_root: H256, second_root: H256) -> Option<&ProtoNode> {
        let mut first = self.node(first_root)?;
        let mut second = self.node(second_root)?;

        loop {
            if first.root == second.root {
                return Some(first);
            }

            if first.slot > second.slot {
                first = self.nodes.get(first.parent?)?;
            } else if second.slot > first.slot {
                second = self.nodes.get(second.parent?)?;
            } else {
                first = self.nodes.get(first.parent?)?;
                second = self.nodes.get(second.parent?)?;
            }
        }
    }

    /// Iterates over the block with root `block_root` and its ancestors, latest first.
    pub fn iter_nodes(&self, block_root: H256) -> impl Iterator<Item = &ProtoNode> {
        let start = self.node(block_root);

        core::iter::successors(start, |node| {
            node.parent.and_then(|index| self.nodes.get(index))
        })
    }

    /// Returns all blocks that are neither the block with root `block_root` nor its ancestors.
    ///
    /// The blocks are returned in insertion order.
    #[must_use]
    pub fn iter_non_ancestor_nodes(&self, block_root: H256) -> Vec<&ProtoNode> {
        let ancestors = self
            .iter_nodes(block_root)
            .map(|node| node.root)
            .collect::<Vec<_>>();

        self.nodes
            .iter()
            .filter(|node| !ancestors.contains(&node.root))
            .collect()
    }

    pub fn nodes_at_slot(&self, slot: Slot) -> impl Iterator<Item = &ProtoNode> {
        self.nodes.iter().filter(move |node| node.slot == slot)
    }

    /// Returns the nodes that have no children.
    #[must_use]
    pub fn heads(&self) -> Vec<&ProtoNode> {
        let mut has_children = vec![false; self.nodes.len()];

        for parent_index in self.nodes.iter().filter_map(|node| node.parent) {
            if let Some(has_children) = has_children.get_mut(parent_index) {
                *has_children = true;
            }
        }

        self.nodes
            .iter()
            .zip(has_children)
            .filter(|(_, has_children)| !has_children)
            .map(|(node, _)| node)
            .collect()
    }

    /// A node is viable for head if its checkpoints match the tracked ones.
    ///
    /// Checkpoints from the genesis epoch are not checked.
    ///
    /// See [`filter_block_tree`](https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md#filter_block_tree).
    #[must_use]
    pub fn node_is_viable_for_head(&self, node: &ProtoNode) -> bool {
        let correct_justified = node.justified_checkpoint == self.justified_checkpoint
            || self.justified_checkpoint.epoch == GENESIS_EPOCH;

        let correct_finalized = node.finalized_checkpoint == self.finalized_checkpoint
            || self.finalized_checkpoint.epoch == GENESIS_EPOCH;

        correct_justified && correct_finalized
    }

    fn node_leads_to_viable_head(&self, node: &ProtoNode) -> Result<bool> {
        let best_descendant_is_viable = match node.best_descendant {
            Some(index) => {
                let best_descendant = self
                    .nodes
                    .get(index)
                    .ok_or(Error::InvalidBestDescendantIndex { index })?;

                self.node_is_viable_for_head(best_descendant)
            }
            None => false,
        };

        Ok(best_descendant_is_viable || self.node_is_viable_for_head(node))
    }

    fn parent_index(&self, node_index: usize) -> Result<Option<usize>> {
        self.nodes
            .get(node_index)
            .map(|node| node.parent)
            .ok_or_else(|| Error::InvalidNodeIndex { index: node_index }.into())
    }

    // The child that leads to a viable head is preferred.
    // Among children that are equal in that regard, the heavier one is preferred.
    // Weight ties are broken in favor of the larger root.
    fn maybe_update_best_child_and_descendant(
        &mut self,
        parent_index: usize,
        child_index: usize,
    ) -> Result<()> {
        let child = self
            .nodes
            .get(child_index)
            .ok_or(Error::InvalidNodeIndex { index: child_index })?;

        let parent = self
            .nodes
            .get(parent_index)
            .ok_or(Error::InvalidNodeIndex {
                index: parent_index,
            })?;

        let child_leads_to_viable_head = self.node_leads_to_viable_head(child)?;

        let change_to_none = (None, None);
        let change_to_child = (
            Some(child_index),
            Some(child.best_descendant.unwrap_or(child_index)),
        );
        let no_change = (parent.best_child, parent.best_descendant);

        let (best_child, best_descendant) = match parent.best_child {
            Some(best_child_index) if best_child_index == child_index => {
                if child_leads_to_viable_head {
                    change_to_child
                } else {
                    change_to_none
                }
            }
            Some(best_child_index) => {
                let best_child = self
                    .nodes
                    .get(best_child_index)
                    .ok_or(Error::InvalidBestChildIndex {
                        index: best_child_index,
                    })?;

                let best_child_leads_to_viable_head = self.node_leads_to_viable_head(best_child)?;

                if child_leads_to_viable_head && !best_child_leads_to_viable_head {
                    change_to_child
                } else if !child_leads_to_viable_head && best_child_leads_to_viable_head {
                    no_change
                } else if child.weight == best_child.weight {
                    if child.root >= best_child.root {
                        change_to_child
                    } else {
                        no_change
                    }
                } else if child.weight > best_child.weight {
                    change_to_child
                } else {
                    no_change
                }
            }
            None => {
                if child_leads_to_viable_head {
                    change_to_child
                } else {
                    no_change
                }
            }
        };

        let parent = self
            .nodes
            .get_mut(parent_index)
            .ok_or(Error::InvalidNodeIndex {
                index: parent_index,
            })?;

        parent.best_child = best_child;
        parent.best_descendant = best_descendant;

        Ok(())
    }
}
