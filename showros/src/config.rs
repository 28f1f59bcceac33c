use serde::{Deserialize, Serialize};

use quake_demo::types::EntityId;

/// Fixer configuration, loadable from a TOML file.
///
/// All fields default to their standard values. CLI arguments override config file values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixerConfig {
    /// Model the recorded player's entity shows while its view model
    /// animation should be drawn instead.
    pub sentinel_model: String,
    /// Smallest health drop that plays the pain animation.
    pub pain_threshold: i16,
    /// Entity to track. Read from the demo's set view message when unset.
    pub view_entity: Option<EntityId>,
}

impl Default for FixerConfig {
    fn default() -> Self {
        Self {
            sentinel_model: "progs/eyes.mdl".to_string(),
            pain_threshold: 5,
            view_entity: None,
        }
    }
}

impl FixerConfig {
    /// Load config from a TOML file.
    #[cfg(feature = "bin")]
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
        let config: Self = toml::from_str(&contents).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Generate a commented default TOML config string.
    pub fn generate_default_toml() -> String {
        r#"# showros configuration
# Pass with --config <path>.

# Model shown on the recorded player's entity where the view model
# animation should be drawn
sentinel_model = "progs/eyes.mdl"

# Smallest drop in health that triggers the pain animation
pain_threshold = 5

# Entity number of the recorded player. Detected from the demo when omitted.
# view_entity = 1
"#
        .to_string()
    }

    /// Apply CLI argument overrides.
    #[cfg(feature = "bin")]
    pub fn apply_cli_overrides(&mut self, matches: &clap::ArgMatches) -> anyhow::Result<()> {
        use anyhow::Context;
        if let Some(entity) = matches.value_of("VIEW_ENTITY") {
            let entity: u16 = entity
                .parse()
                .with_context(|| format!("Invalid view entity {entity:?}"))?;
            self.view_entity = Some(EntityId(entity));
        }
        Ok(())
    }
}
