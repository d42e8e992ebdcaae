//! Reusable stage fixtures.
//!
//! - [`Collector`]: terminal stage recording every message it receives.
//! - [`Relay`]: forwards unchanged to its configured successor.
//! - [`FailingAction`]: fails deterministically after N messages.

use std::sync::{Arc, Mutex};

use isobar_action::{Action, ActionError, ActionRegistry, Successor};
use isobar_core::{Configuration, Message, Tag};

/// Shared record of the messages a [`Collector`] received.
#[derive(Clone, Debug, Default)]
pub struct Collected {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl Collected {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message received so far.
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.messages.lock().unwrap().iter().map(|m| m.tag()).collect()
    }

    /// Messages carrying `tag`.
    pub fn with_tag(&self, tag: Tag) -> Vec<Message> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.tag() == tag)
            .cloned()
            .collect()
    }

    fn push(&self, msg: Message) {
        self.messages.lock().unwrap().push(msg);
    }
}

/// Terminal stage recording every message.
pub struct Collector {
    collected: Collected,
}

impl Collector {
    pub fn new(collected: Collected) -> Self {
        Self { collected }
    }
}

impl Action for Collector {
    fn name(&self) -> &str {
        "collector"
    }

    fn execute(&mut self, msg: Message) -> Result<(), ActionError> {
        self.collected.push(msg);
        Ok(())
    }
}

/// Builder for a [`Collector`] writing into `collected`.
pub fn collector_builder(
    collected: Collected,
) -> impl Fn(&Configuration, &ActionRegistry) -> Result<Box<dyn Action>, ActionError> + Send + Sync
{
    move |_: &Configuration, _: &ActionRegistry| -> Result<Box<dyn Action>, ActionError> {
        Ok(Box::new(Collector::new(collected.clone())))
    }
}

/// Forwards every message unchanged.
pub struct Relay {
    name: String,
    next: Successor,
}

impl Relay {
    pub fn new(name: impl Into<String>, next: Successor) -> Self {
        Self {
            name: name.into(),
            next,
        }
    }
}

impl Action for Relay {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, msg: Message) -> Result<(), ActionError> {
        self.next.forward(msg)
    }

    fn next(&self) -> Option<&dyn Action> {
        self.next.get()
    }
}

/// Builder for a [`Relay`] named `name`, resolving its `next` block.
pub fn relay_builder(
    name: &'static str,
) -> impl Fn(&Configuration, &ActionRegistry) -> Result<Box<dyn Action>, ActionError> + Send + Sync
{
    move |config: &Configuration,
          registry: &ActionRegistry|
          -> Result<Box<dyn Action>, ActionError> {
        Ok(Box::new(Relay::new(
            name,
            Successor::from_config(config, registry)?,
        )))
    }
}

/// Forwards `succeed_count` messages, then fails every call.
pub struct FailingAction {
    succeed_count: usize,
    calls: usize,
    next: Successor,
}

impl FailingAction {
    pub fn new(succeed_count: usize, next: Successor) -> Self {
        Self {
            succeed_count,
            calls: 0,
            next,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl Action for FailingAction {
    fn name(&self) -> &str {
        "failing"
    }

    fn execute(&mut self, msg: Message) -> Result<(), ActionError> {
        self.calls += 1;
        if self.calls > self.succeed_count {
            return Err(ActionError::stage(
                "failing",
                format!("failed on call {}", self.calls),
            ));
        }
        self.next.forward(msg)
    }

    fn next(&self) -> Option<&dyn Action> {
        self.next.get()
    }
}

/// Builder for a [`FailingAction`] reading `succeed` (default 0).
pub fn failing_builder(
) -> impl Fn(&Configuration, &ActionRegistry) -> Result<Box<dyn Action>, ActionError> + Send + Sync
{
    |config: &Configuration, registry: &ActionRegistry| -> Result<Box<dyn Action>, ActionError> {
        let succeed = if config.has("succeed") {
            config.get_i64("succeed")?.max(0) as usize
        } else {
            0
        };
        Ok(Box::new(FailingAction::new(
            succeed,
            Successor::from_config(config, registry)?,
        )))
    }
}
