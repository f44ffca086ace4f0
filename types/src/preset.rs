use core::{fmt::Debug, hash::Hash};

use serde::{Deserialize, Serialize};
use typenum::{NonZero, Unsigned, U32, U8};

use crate::config::Config;

/// Compile-time configuration variables.
///
/// Only the parameters used by fork choice are present.
/// See [presets in `consensus-specs`](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/presets).
pub trait Preset: Copy + Eq + Ord + Hash + Default + Debug + Send + Sync + 'static {
    type SlotsPerEpoch: Unsigned + NonZero;

    const NAME: PresetName;

    #[must_use]
    fn default_config() -> Config {
        Self::NAME.default_config()
    }
}

/// [Mainnet preset](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/presets/mainnet).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Mainnet;

impl Preset for Mainnet {
    type SlotsPerEpoch = U32;

    const NAME: PresetName = PresetName::Mainnet;
}

/// [Minimal preset](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/presets/minimal).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug)]
pub struct Minimal;

impl Preset for Minimal {
    type SlotsPerEpoch = U8;

    const NAME: PresetName = PresetName::Minimal;
}

#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetName {
    #[default]
    Mainnet,
    Minimal,
}

impl PresetName {
    #[must_use]
    pub fn default_config(self) -> Config {
        match self {
            Self::Mainnet => Config::mainnet(),
            Self::Minimal => Config::minimal(),
        }
    }

    #[must_use]
    pub const fn slots_per_epoch(self) -> u64 {
        match self {
            Self::Mainnet => <Mainnet as Preset>::SlotsPerEpoch::U64,
            Self::Minimal => <Minimal as Preset>::SlotsPerEpoch::U64,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case(PresetName::Mainnet, 32)]
    #[test_case(PresetName::Minimal, 8)]
    fn preset_name_matches_preset(preset_name: PresetName, expected_slots_per_epoch: u64) {
        assert_eq!(preset_name.slots_per_epoch(), expected_slots_per_epoch);
        assert_eq!(preset_name.default_config().preset_base, preset_name);
    }

    #[test]
    fn preset_default_config_matches_its_name() {
        assert_eq!(Mainnet::default_config().preset_base, PresetName::Mainnet);
        assert_eq!(Minimal::default_config().preset_base, PresetName::Minimal);
        assert_eq!(Minimal::default_config().safe_slots_to_update_justified, 2);
    }
}
