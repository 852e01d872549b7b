//! Policy configuration loading.
//!
//! Every numeric threshold in the engine is policy, not contract. Overrides
//! come from an explicit `--policy` file, or from the per-user config
//! directory when present; anything unspecified keeps its default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ::config::{Config, File};
use picker_session::EnginePolicies;
use tracing::debug;

fn default_policy_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pinpoint").join("policy.toml"))
}

/// Load engine policies, layering an optional override file on defaults.
pub fn load_policies(explicit: Option<&Path>) -> Result<EnginePolicies> {
    let mut builder = Config::builder();

    match explicit {
        Some(path) => {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }
        None => {
            if let Some(path) = default_policy_path() {
                debug!(path = %path.display(), "checking user policy file");
                builder = builder.add_source(File::from(path).required(false));
            }
        }
    }

    let settings = builder.build().context("reading policy configuration")?;
    let policies: EnginePolicies = settings
        .try_deserialize()
        .context("decoding policy configuration")?;
    Ok(policies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_override_yields_defaults() {
        let policies = load_policies(None).unwrap();
        assert_eq!(policies.score.unique_base, 100);
        assert_eq!(policies.synthesis.min_slot_score, 50);
        assert_eq!(policies.resolve.resolve.search_radius, 5);
    }

    #[test]
    fn explicit_file_overrides_fields() {
        let dir = std::env::temp_dir().join("pinpoint-config-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("policy.toml");
        std::fs::write(
            &path,
            "[score]\nunique_base = 150\n\n[backdrop]\nz_index_threshold = 500\n",
        )
        .unwrap();

        let policies = load_policies(Some(&path)).unwrap();
        assert_eq!(policies.score.unique_base, 150);
        assert_eq!(policies.resolve.backdrop.z_index_threshold, 500);
        // Untouched fields keep their defaults.
        assert_eq!(policies.score.duplicate_penalty, 10);
    }
}
