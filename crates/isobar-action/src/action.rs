//! The [`Action`] trait and the owned link to the next stage.
//!
//! A pipeline is a singly-linked chain of actions. Each node exclusively
//! owns its successor through a [`Successor`], built once from the
//! stage's nested `next` configuration block and never re-linked.

use isobar_core::{Configuration, Message};

use crate::error::ActionError;
use crate::registry::ActionRegistry;

/// Configuration key of the nested successor block.
pub const NEXT_KEY: &str = "next";

/// A single pipeline stage.
///
/// # Contract
///
/// - `execute()` consumes the message. It may forward it (unchanged or
///   transformed) to its successor, consume it terminally, or emit derived
///   messages as well as forwarding the original.
/// - A stage mutates only its own state and calls into its own successor.
/// - Errors from the successor are returned unchanged.
///
/// # Examples
///
/// A stage that drops every message it receives:
///
/// ```
/// use isobar_action::{Action, ActionError};
/// use isobar_core::{Message, Tag};
///
/// struct Drain;
///
/// impl Action for Drain {
///     fn name(&self) -> &str { "drain" }
///
///     fn execute(&mut self, _msg: Message) -> Result<(), ActionError> {
///         Ok(())
///     }
/// }
///
/// let mut stage = Drain;
/// stage.execute(Message::control(Tag::Close)).unwrap();
/// assert!(stage.next().is_none());
/// ```
pub trait Action: Send {
    /// Stage name for error reporting and diagnostics.
    fn name(&self) -> &str;

    /// Handle one message.
    fn execute(&mut self, msg: Message) -> Result<(), ActionError>;

    /// The owned successor, if this stage is not a terminus.
    fn next(&self) -> Option<&dyn Action> {
        None
    }
}

/// Owned link from a stage to the rest of its chain.
#[derive(Default)]
pub struct Successor {
    next: Option<Box<dyn Action>>,
}

impl Successor {
    /// A chain terminus.
    pub fn none() -> Self {
        Self { next: None }
    }

    /// Link to an already-built stage.
    pub fn new(next: Box<dyn Action>) -> Self {
        Self { next: Some(next) }
    }

    /// Build the successor described by `config`'s `next` block, if any.
    ///
    /// The nested block is resolved through `registry` by its `type` key.
    /// This is typically called from inside a builder, i.e. while
    /// `registry` is already building the current stage.
    pub fn from_config(
        config: &Configuration,
        registry: &ActionRegistry,
    ) -> Result<Self, ActionError> {
        match config.sub(NEXT_KEY)? {
            Some(next) => {
                let kind = next.action_type()?;
                Ok(Self::new(registry.build(kind, &next)?))
            }
            None => Ok(Self::none()),
        }
    }

    /// Hand `msg` to the successor. A terminus drops it.
    pub fn forward(&mut self, msg: Message) -> Result<(), ActionError> {
        match self.next.as_mut() {
            Some(next) => next.execute(msg),
            None => Ok(()),
        }
    }

    /// Whether there is no successor.
    pub fn is_terminal(&self) -> bool {
        self.next.is_none()
    }

    /// The successor stage.
    pub fn get(&self) -> Option<&dyn Action> {
        self.next.as_deref()
    }
}

impl std::fmt::Debug for Successor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Successor")
            .field("next", &self.next.as_ref().map(|n| n.name()))
            .finish()
    }
}

/// Number of stages in the chain starting at `root`.
pub fn chain_len(root: &dyn Action) -> usize {
    stage_names(root).len()
}

/// Names of the stages in the chain starting at `root`, outermost first.
pub fn stage_names(root: &dyn Action) -> Vec<String> {
    let mut names = Vec::new();
    let mut current = Some(root);
    while let Some(stage) = current {
        names.push(stage.name().to_string());
        current = stage.next();
    }
    names
}
