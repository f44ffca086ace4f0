use core::num::NonZeroU32;

use nonzero_ext::nonzero;

use crate::phase0::primitives::{Epoch, Slot};

pub const GENESIS_EPOCH: Epoch = 0;
pub const GENESIS_SLOT: Slot = 0;
pub const INTERVALS_PER_SLOT: NonZeroU32 = nonzero!(3_u32);
