use core::time::Duration;
use std::{borrow::Cow, collections::BTreeMap};

use serde::{de::IgnoredAny, Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, DurationMilliSeconds, PickFirst};

use crate::{phase0::consts::INTERVALS_PER_SLOT, preset::PresetName};

/// Configuration variables customizable at runtime.
///
/// See [configurations in `consensus-specs`](https://github.com/ethereum/consensus-specs/tree/aac851f860fa384916f62027b2dbe3318a354c5b/configs).
///
/// Numeric values may be written either as integers or as strings.
/// Standard configuration files quote most of them.
#[serde_as]
#[derive(Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    // Meta
    pub config_name: Cow<'static, str>,
    pub preset_base: PresetName,

    // Time parameters
    #[serde_as(as = "PickFirst<(DurationMilliSeconds<u64>, DurationMilliSeconds<String>)>")]
    pub slot_duration_ms: Duration,

    // Fork choice
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub proposer_score_boost: u64,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub safe_slots_to_update_justified: u64,

    // Configuration files contain many variables fork choice does not use.
    #[serde(flatten, skip_serializing)]
    pub unknown: BTreeMap<String, IgnoredAny>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Meta
            //
            // Use `default` as the default `config_name` and override it in `Config::mainnet`.
            // This way custom network data will be kept separate from mainnet data if a user
            // forgets to specify a custom `CONFIG_NAME`.
            config_name: Cow::Borrowed("default"),
            preset_base: PresetName::Mainnet,

            // Time parameters
            slot_duration_ms: Duration::from_millis(12000),

            // Fork choice
            proposer_score_boost: 40,
            safe_slots_to_update_justified: 8,

            unknown: BTreeMap::new(),
        }
    }
}

impl Config {
    /// [Mainnet configuration](https://github.com/eth-clients/mainnet/blob/978f1794eada6f85bee76e4d2d5959a5fb8e0cc5/metadata/config.yaml).
    #[must_use]
    pub fn mainnet() -> Self {
        Self {
            config_name: Cow::Borrowed("mainnet"),
            ..Self::default()
        }
    }

    /// [Minimal configuration](https://github.com/ethereum/consensus-specs/blob/aac851f860fa384916f62027b2dbe3318a354c5b/configs/minimal.yaml).
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            // Meta
            config_name: Cow::Borrowed("minimal"),
            preset_base: PresetName::Minimal,

            // Time parameters
            slot_duration_ms: Duration::from_millis(6000),

            // Fork choice
            safe_slots_to_update_justified: 2,

            ..Self::default()
        }
    }

    /// Blocks that arrive later than this into their slot are not eligible for proposer boost.
    #[must_use]
    pub fn timely_block_cutoff(&self) -> Duration {
        self.slot_duration_ms / INTERVALS_PER_SLOT.get()
    }
}

#[cfg(test)]
mod tests {
    use serde_yaml::Error as YamlError;

    use super::*;

    #[test]
    fn config_deserializes_from_quoted_and_native_numbers() -> Result<(), YamlError> {
        let config = serde_yaml::from_str::<Config>(
            "CONFIG_NAME: 'custom'\n\
             PRESET_BASE: 'minimal'\n\
             SLOT_DURATION_MS: '4000'\n\
             PROPOSER_SCORE_BOOST: 70\n\
             SAFE_SLOTS_TO_UPDATE_JUSTIFIED: '3'\n\
             DEPOSIT_CHAIN_ID: 5\n",
        )?;

        assert_eq!(config.config_name, "custom");
        assert_eq!(config.preset_base, PresetName::Minimal);
        assert_eq!(config.slot_duration_ms, Duration::from_millis(4000));
        assert_eq!(config.proposer_score_boost, 70);
        assert_eq!(config.safe_slots_to_update_justified, 3);
        assert!(config.unknown.contains_key("DEPOSIT_CHAIN_ID"));

        Ok(())
    }

    #[test]
    fn missing_variables_fall_back_to_defaults() -> Result<(), YamlError> {
        let config = serde_yaml::from_str::<Config>("CONFIG_NAME: 'sparse'")?;

        assert_eq!(config.proposer_score_boost, Config::default().proposer_score_boost);
        assert_eq!(config.slot_duration_ms, Config::default().slot_duration_ms);

        Ok(())
    }

    #[test]
    fn timely_block_cutoff_is_a_third_of_a_slot() {
        assert_eq!(
            Config::mainnet().timely_block_cutoff(),
            Duration::from_secs(4),
        );
        assert_eq!(
            Config::minimal().timely_block_cutoff(),
            Duration::from_secs(2),
        );
    }
}
