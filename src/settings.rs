//! Settings for the rule registry and the `pwout` binary.
//!
//! Settings come from an optional `pwout.toml` (or `.json`, `.yaml`, ...) in
//! the working directory, an optional explicit file, and `PWOUT_*`
//! environment variables, later sources overriding earlier ones.
//!
//! ```toml
//! log_filter = "pwout=debug"
//! disabled_rules = ["cpu_time"]
//!
//! [[rules]]
//! name = "magnetization"
//! pattern = 'total magnetization\s*=\s*(?P<value>\S+)\s+(?P<unit>Bohr mag/cell)'
//! key = "total magnetization"
//! ```

// config lets you read a separate config file
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::warn;

use crate::error::Result;
use crate::phrase::PhraseRule;
use crate::rule::{Rule, RuleRegistry};

/// A user supplied [`PhraseRule`]. Custom rules are tried before the generic
/// scalar rule, in the order they are listed.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomRule {
    pub name: String,
    pub pattern: String,
    pub key: String,
    /// Fixed unit, used when the pattern has no `unit` group.
    #[serde(default)]
    pub unit: Option<String>,
}

impl CustomRule {
    pub fn compile(&self) -> Result<PhraseRule> {
        let rule = PhraseRule::new(&self.name, &self.pattern, &self.key)?;
        Ok(match &self.unit {
            Some(unit) => rule.with_unit(unit),
            None => rule,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_filter: String,
    pub disabled_rules: Vec<String>,
    pub rules: Vec<CustomRule>,
    pub pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            disabled_rules: Vec::new(),
            rules: Vec::new(),
            pretty: false,
        }
    }
}

impl Settings {
    /// Loads `pwout.*` from the working directory if present, then `path` if
    /// given (it must exist), then the environment.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder().add_source(File::with_name("pwout").required(false));
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        let config = builder
            .add_source(
                Environment::with_prefix("PWOUT")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("disabled_rules"),
            )
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// Reads settings from TOML text only.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// The standard registry with disabled rules removed and custom rules added.
    pub fn registry(&self) -> Result<RuleRegistry> {
        let mut registry = RuleRegistry::standard();
        for name in &self.disabled_rules {
            if registry.disable(name) == 0 {
                warn!(rule = %name, "cannot disable unknown rule");
            }
        }
        for custom in &self.rules {
            registry.insert_before("scalar", Rule::Phrase(custom.compile()?));
        }
        Ok(registry)
    }
}
