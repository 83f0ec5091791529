//! Configuration for embedders and the command line front ends.
//!
//! Everything here is optional: an unset field falls back to the process
//! environment. The config can be round-tripped through TOML.

use serde::{Deserialize, Serialize};

use crate::paths::Environment;

/// Locale and path overrides for table construction.
///
/// # Example
///
/// ```
/// use libcompose_core::ComposeConfig;
///
/// let config = ComposeConfig::from_toml_str(
///     "locale = \"en_US.UTF-8\"\nxlocaledir = \"/opt/X11/locale\"\n",
/// ).unwrap();
/// assert_eq!(config.locale.as_deref(), Some("en_US.UTF-8"));
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// Locale to build the table for. Empty/unset resolves through the
    /// usual locale environment variables.
    pub locale: Option<String>,

    /// Override for the X locale directory (`XLOCALEDIR`).
    pub xlocaledir: Option<String>,

    /// Override for the user Compose file (`XCOMPOSEFILE`).
    pub xcomposefile: Option<String>,

    /// Override for the home directory (`HOME`), used by `%H` expansion
    /// and the `~/.XCompose` lookup.
    pub home: Option<String>,
}

impl ComposeConfig {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(
        path: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: ComposeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The locale to request, `""` meaning "resolve from the environment".
    pub fn locale(&self) -> &str {
        self.locale.as_deref().unwrap_or("")
    }

    /// The process environment overlaid with this config's overrides.
    pub fn environment(&self) -> Environment {
        let mut env = Environment::from_process();
        if let Some(home) = &self.home {
            env = env.with_home(home.clone());
        }
        if let Some(dir) = &self.xlocaledir {
            env = env.with_xlocaledir(dir.clone());
        }
        if let Some(path) = &self.xcomposefile {
            env = env.with_xcomposefile(path.clone());
        }
        env
    }
}
