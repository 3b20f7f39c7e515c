//! Plugins compiled into the binary.
//!
//! Each plugin exposes `pub fn module() -> Module`. Adding a plugin means adding its
//! file here and one line to [`all`].

pub mod echo;
pub mod git;
pub mod goto;
pub mod run;

use crate::registry::Module;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Configuration key holding [`PluginSettings`].
pub const SECTION: &str = "plugins";

/// Which plugins to load.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct PluginSettings {
    /// Plugin names to skip.
    #[serde(default)]
    pub disabled: Vec<String>,
}

/// Every plugin, in registration order.
pub fn all() -> Vec<Module> {
    vec![echo::module(), git::module(), goto::module(), run::module()]
}

/// The plugins `settings` leaves enabled.
pub fn load(settings: &PluginSettings) -> Vec<Module> {
    let modules = all();
    for name in &settings.disabled {
        if !modules.iter().any(|m| m.name() == name) {
            warn!(plugin = %name, "ignoring unknown plugin in disabled list");
        }
    }
    modules
        .into_iter()
        .filter(|m| {
            let disabled = settings.disabled.iter().any(|d| d == m.name());
            if disabled {
                info!(plugin = m.name(), "plugin disabled by configuration");
            }
            !disabled
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    fn names(modules: &[Module]) -> Vec<&'static str> {
        modules.iter().map(|m| m.name()).collect()
    }

    #[test]
    fn test_all_plugins_register_cleanly() {
        let registry = Registry::discover(crate::core_module(), all()).unwrap();
        let modules: Vec<&str> = registry.catalog().modules().iter().map(|m| m.name).collect();
        assert_eq!(modules, vec!["ikein", "echo", "git", "goto", "run"]);
        for name in ["hello", "gnewf", "gupdate", "guser", "goto", "run", "list"] {
            assert!(registry.command(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_load_everything_by_default() {
        assert_eq!(
            names(&load(&PluginSettings::default())),
            vec!["echo", "git", "goto", "run"]
        );
    }

    #[test]
    fn test_load_skips_disabled() {
        let settings = PluginSettings {
            disabled: vec!["git".to_string(), "unknown".to_string()],
        };
        assert_eq!(names(&load(&settings)), vec!["echo", "goto", "run"]);
    }
}
