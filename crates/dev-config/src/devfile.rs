//! Devfile loading.
//!
//! A Devfile is a YAML document in the project root:
//!
//! ```yaml
//! name: shop
//! up:
//!   - pip: requirements/dev.txt
//!   - run: docker-compose up -d
//! down:
//!   - run: docker-compose down
//! open:
//!   ci: https://ci.example.com/shop
//! commands:
//!   test: py.test
//!   logs:
//!     description: Tail development logs
//!     tasks:
//!       - run: docker-compose logs -f
//! ```
//!
//! The whole file is validated and parsed on load, so a broken definition
//! anywhere is reported before any task runs.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::invocation::InvocationList;
use crate::parse::{parse, parse_command};

/// Project name used when the Devfile is missing or empty.
pub const UNKNOWN_PROJECT: &str = "unknown";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDevfile {
    name: Option<String>,
    #[serde(default)]
    up: Value,
    #[serde(default)]
    down: Value,
    #[serde(default)]
    open: BTreeMap<String, String>,
    #[serde(default)]
    commands: Mapping,
}

/// A custom command declared under `commands:`.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandDefinition {
    pub name: String,
    pub description: Option<String>,
    pub tasks: InvocationList,
}

/// A validated, fully parsed Devfile.
#[derive(Debug, Clone, PartialEq)]
pub struct Devfile {
    name: String,
    up: InvocationList,
    down: InvocationList,
    open: BTreeMap<String, String>,
    commands: Vec<CommandDefinition>,
}

impl Default for Devfile {
    fn default() -> Self {
        Self::empty()
    }
}

impl Devfile {
    /// The configuration used when no Devfile exists.
    pub fn empty() -> Self {
        Self {
            name: UNKNOWN_PROJECT.to_string(),
            up: InvocationList::new(),
            down: InvocationList::new(),
            open: BTreeMap::new(),
            commands: Vec::new(),
        }
    }

    /// Load and validate the Devfile at `path`.
    ///
    /// A missing file is an empty configuration.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no Devfile, using empty configuration");
                return Ok(Self::empty());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let devfile = Self::from_yaml(&content, path)?;
        debug!(
            path = %path.display(),
            name = %devfile.name,
            commands = devfile.commands.len(),
            "loaded Devfile"
        );
        Ok(devfile)
    }

    /// Parse Devfile content. `origin` is only used in error messages.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        if is_empty_document(&value) {
            return Ok(Self::empty());
        }

        let invalid = |message: String| ConfigError::Invalid {
            path: origin.to_path_buf(),
            message,
        };

        if !value.is_mapping() {
            return Err(invalid("expected a mapping at the top level".to_string()));
        }

        let raw: RawDevfile = serde_yaml::from_value(value).map_err(|e| invalid(e.to_string()))?;
        let name = raw
            .name
            .ok_or_else(|| invalid("missing required key 'name'".to_string()))?;

        let up = parse(&raw.up).map_err(|e| invalid(format!("up: {}", e)))?;
        let down = parse(&raw.down).map_err(|e| invalid(format!("down: {}", e)))?;

        let mut commands = Vec::with_capacity(raw.commands.len());
        for (key, definition) in &raw.commands {
            let Some(command) = key.as_str() else {
                return Err(invalid("command names must be strings".to_string()));
            };
            let (description, tasks) =
                parse_command(definition).map_err(|e| invalid(format!("commands.{}: {}", command, e)))?;
            commands.push(CommandDefinition {
                name: command.to_string(),
                description,
                tasks,
            });
        }

        Ok(Self {
            name,
            up,
            down,
            open: raw.open,
            commands,
        })
    }

    /// Project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tasks declared under `up:`.
    pub fn up(&self) -> &InvocationList {
        &self.up
    }

    /// Tasks declared under `down:`.
    pub fn down(&self) -> &InvocationList {
        &self.down
    }

    /// The `open:` target to URL map.
    pub fn open_targets(&self) -> &BTreeMap<String, String> {
        &self.open
    }

    /// Custom commands in declaration order.
    pub fn commands(&self) -> &[CommandDefinition] {
        &self.commands
    }

    /// Look up a custom command by name.
    pub fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.iter().find(|command| command.name == name)
    }
}

fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    }
}
