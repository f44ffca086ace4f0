#[derive(Clone, Copy, Default, Debug)]
pub struct StoreConfig {
    /// Minimum number of blocks before the finalized block needed to trigger pruning.
    ///
    /// Pruning shifts the indices of every remaining block. A higher threshold makes it happen
    /// less often at the cost of memory.
    pub prune_threshold: usize,
}
