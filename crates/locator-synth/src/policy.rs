//! Tunable scoring and synthesis policy.
//!
//! The numeric cutoffs here are empirically tuned, not derived from a
//! model; they are configuration, not contracts. Hosts may override any of
//! them via deserialization.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorePolicy {
    /// Awarded when the expression matches exactly one node.
    pub unique_base: i32,
    /// Subtracted from the base per extra match beyond the first.
    pub duplicate_penalty: i32,
    /// Durability-tier bonuses, inspected from the expression text.
    pub test_hook_bonus: i32,
    pub test_attr_bonus: i32,
    pub qa_attr_bonus: i32,
    pub aria_label_bonus: i32,
    pub plain_id_bonus: i32,
    pub role_bonus: i32,
    /// Ordinal-predicate penalties; the path-dialect form is more fragile.
    pub nth_of_type_penalty: i32,
    pub path_ordinal_penalty: i32,
    /// Length shaping.
    pub short_length: usize,
    pub short_bonus: i32,
    pub long_length: usize,
    pub long_penalty: i32,
    /// Awarded when the expression names a semantic tag.
    pub semantic_bonus: i32,
    /// Hard ceiling; scores clamp to `0..=max_score`.
    pub max_score: i32,
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self {
            unique_base: 100,
            duplicate_penalty: 10,
            test_hook_bonus: 50,
            test_attr_bonus: 45,
            qa_attr_bonus: 40,
            aria_label_bonus: 35,
            plain_id_bonus: 30,
            role_bonus: 25,
            nth_of_type_penalty: 15,
            path_ordinal_penalty: 20,
            short_length: 20,
            short_bonus: 10,
            long_length: 100,
            long_penalty: 10,
            semantic_bonus: 5,
            max_score: 200,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisPolicy {
    /// How many top candidates land in `best`.
    pub best_count: usize,
    /// Minimum score a candidate needs to claim a category slot.
    pub min_slot_score: i32,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        Self {
            best_count: 3,
            min_slot_score: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_deserialize_from_empty_table() {
        let policy: ScorePolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, ScorePolicy::default());
        let synth: SynthesisPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(synth, SynthesisPolicy::default());
    }

    #[test]
    fn overrides_apply_field_by_field() {
        let policy: ScorePolicy = serde_json::from_str("{\"unique_base\": 120}").unwrap();
        assert_eq!(policy.unique_base, 120);
        assert_eq!(policy.duplicate_penalty, 10);
    }
}
