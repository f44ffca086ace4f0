//! Implementation of [Beacon Chain Fork Choice] on top of [`proto_array`].
//!
//! [`Store`] tracks time, checkpoints, votes and proposer boost. It validates blocks and
//! attestations before passing them on to [`ProtoArray`], which holds the block tree and its
//! weights.
//!
//! Weights are not updated when votes arrive. Vote changes are accumulated in [`VoteTracker`]s and
//! applied all at once by [`Store::update_balances`] or lazily by [`Store::update_head`].
//! The last computed head is cached and can be read cheaply with [`Store::head`].
//!
//! Attestations can only affect fork choice starting with the slot after the one they were made
//! in. Attestations that arrive too early are queued and applied by [`Store::update_time`].
//!
//! Errors caused by invalid objects are represented by [`InvalidBlock`] and
//! [`InvalidAttestation`]. They leave [`Store`] unchanged. All other errors mean the store is
//! inconsistent and has to be rebuilt. Use [`is_fatal`] to tell them apart.
//!
//! Python `assert`s from the Fork Choice specification are represented by statements that return
//! [`Err`]. Unlike the specification, blocks and attestations that cannot be processed yet are
//! rejected rather than delayed. Delaying them is left to the caller.
//!
//! Notes on nomenclature:
//! - Pruning means removing blocks before the finalized block.
//! - The anchor is the block the store was created from. It is treated as justified and finalized.
//!
//! [`ProtoArray`]:  proto_array::ProtoArray
//! [`VoteTracker`]: proto_array::VoteTracker
//!
//! [Beacon Chain Fork Choice]: https://github.com/ethereum/consensus-specs/blob/v1.3.0/specs/phase0/fork-choice.md

pub use crate::{
    error::{is_fatal, Error, InvalidAttestation, InvalidBlock},
    misc::{Block, CheckpointState, LatestMessage, QueuedAttestation, StateSummary},
    store::Store,
    store_config::StoreConfig,
};

mod error;
mod misc;
mod store;
mod store_config;
