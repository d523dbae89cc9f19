//! Reaction settings: the template, the fixed amine and the catalyst.
//!
//! Settings come from a TOML file. Missing fields fall back to the
//! Buchwald–Hartwig amination constants.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// C–N coupling of an aryl halide with a primary aryl amine.
pub const DEFAULT_TEMPLATE: &str = "[F,Cl,Br,I]-[c;H0;D3;+0:1](:[c,n:2]):[c,n:3].[NH2;D1;+0:4]-[c:5]>>[c,n:2]:[c;H0;D3;+0:1](:[c,n:3])-[NH;D2;+0:4]-[c:5]";

/// p-Toluidine.
pub const DEFAULT_COREACTANT: &str = "Cc1ccc(N)cc1";

/// Palladacycle precatalyst, as a triflate.
pub const DEFAULT_CATALYST: &str = "O=S(=O)(O[Pd]1~[NH2]C2C=CC=CC=2C2C=CC=CC1=2)C(F)(F)F";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("setting `{field}` must not be empty")]
    EmptyField { field: &'static str },
    #[error("template has no '>' separator: {0}")]
    NotAReaction(String),
}

/// Everything a batch shares across rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSettings {
    /// Reaction SMARTS with the aryl halide template first.
    #[serde(default = "default_template")]
    pub template: String,

    /// Second reactant, written into every reaction string as given.
    #[serde(default = "default_coreactant")]
    pub coreactant: String,

    /// Canonicalized once per batch.
    #[serde(default = "default_catalyst")]
    pub catalyst: String,
}

impl Default for ReactionSettings {
    fn default() -> Self {
        Self {
            template: default_template(),
            coreactant: default_coreactant(),
            catalyst: default_catalyst(),
        }
    }
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.into()
}
fn default_coreactant() -> String {
    DEFAULT_COREACTANT.into()
}
fn default_catalyst() -> String {
    DEFAULT_CATALYST.into()
}

impl ReactionSettings {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(?path, "loaded reaction settings");
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("template", &self.template),
            ("coreactant", &self.coreactant),
            ("catalyst", &self.catalyst),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField { field });
            }
        }
        if !self.template.contains('>') {
            return Err(ConfigError::NotAReaction(self.template.clone()));
        }
        Ok(())
    }
}
