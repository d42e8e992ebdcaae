//! Logs a one-line summary of every message and forwards it.

use isobar_action::{Action, ActionError, ActionRegistry, Successor};
use isobar_core::{Configuration, Message};

/// Registered stage name.
pub const NAME: &str = "print";

/// Logging pass-through stage.
///
/// Reads an optional `prefix` prepended to every summary line.
#[derive(Debug)]
pub struct Print {
    prefix: String,
    next: Successor,
}

impl Print {
    /// Build from configuration.
    pub fn from_config(config: &Configuration, registry: &ActionRegistry) -> Result<Self, ActionError> {
        Ok(Self {
            prefix: config.get_str_or("prefix", "")?.to_string(),
            next: Successor::from_config(config, registry)?,
        })
    }
}

impl Action for Print {
    fn name(&self) -> &str {
        NAME
    }

    fn execute(&mut self, msg: Message) -> Result<(), ActionError> {
        tracing::info!("{}{}", self.prefix, msg);
        self.next.forward(msg)
    }

    fn next(&self) -> Option<&dyn Action> {
        self.next.get()
    }
}
