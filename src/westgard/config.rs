//! Selection of the rules a laboratory runs for a control procedure.

use serde::{Deserialize, Serialize};

use super::rules::WestgardRule;

/// Enabled rule set for a [`WestgardEvaluator`](super::WestgardEvaluator).
///
/// Rules left out of `rules` never fire. Enabled rules are always checked
/// in [`WestgardRule::PRIORITY`] order, whatever order they are listed in.
///
/// # Examples
///
/// ```
/// use u_westgard::{WestgardConfig, WestgardRule};
///
/// let config: WestgardConfig =
///     serde_json::from_str(r#"{ "rules": ["R_4s", "1_3s", "2_2s"] }"#).unwrap();
/// assert!(config.is_enabled(WestgardRule::OneThreeS));
/// assert!(!config.is_enabled(WestgardRule::TenX));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WestgardConfig {
    pub rules: Vec<WestgardRule>,
}

impl Default for WestgardConfig {
    fn default() -> Self {
        Self {
            rules: WestgardRule::PRIORITY.to_vec(),
        }
    }
}

impl WestgardConfig {
    /// Configuration enabling only the given rules.
    pub fn with_rules(rules: impl IntoIterator<Item = WestgardRule>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn is_enabled(&self, rule: WestgardRule) -> bool {
        self.rules.contains(&rule)
    }

    /// Enabled rules in priority order, without duplicates.
    pub(crate) fn ordered_rules(&self) -> Vec<WestgardRule> {
        WestgardRule::PRIORITY
            .into_iter()
            .filter(|&rule| self.is_enabled(rule))
            .collect()
    }
}
